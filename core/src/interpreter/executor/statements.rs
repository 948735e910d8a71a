//! Statement execution

use std::sync::Arc;

use super::control::{Control, EvalResult};
use super::expressions::{index_value, member, resolve_position};
use super::operators;
use super::values::{FuncDef, Val};
use super::Interpreter;
use crate::interpreter::ast::{AssignOp, Expr, MemberAccess, Stmt};
use crate::interpreter::errors::{
    GuestError, ATTRIBUTE_ERROR, KEY_ERROR, NAME_ERROR, TYPE_ERROR, USER_ERROR,
};

/// Evaluated assignment path segment
enum Key {
    Name(String),
    Value(Val),
}

impl Interpreter<'_> {
    pub(crate) fn exec_block(&mut self, stmts: &[Stmt]) -> EvalResult<()> {
        for stmt in stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> EvalResult<()> {
        self.exec_stmt_inner(stmt)
            .map_err(|control| self.locate(control, stmt.span()))
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt) -> EvalResult<()> {
        match stmt {
            Stmt::Expr { expr, .. } => {
                self.eval_expr(expr)?;
                Ok(())
            }

            Stmt::Assign {
                var,
                path,
                op,
                value,
                ..
            } => self.exec_assign(var, path, *op, value),

            Stmt::If {
                test,
                then_body,
                else_body,
                ..
            } => {
                if self.eval_expr(test)?.is_truthy() {
                    self.exec_block(then_body)
                } else if let Some(else_body) = else_body {
                    self.exec_block(else_body)
                } else {
                    Ok(())
                }
            }

            Stmt::While { test, body, .. } => {
                while self.eval_expr(test)?.is_truthy() {
                    match self.exec_block(body) {
                        Ok(()) | Err(Control::Continue) => {}
                        Err(Control::Break) => break,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }

            Stmt::For {
                binding,
                iterable,
                body,
                ..
            } => {
                let items = self.iterate(iterable)?;
                for item in items {
                    self.bind(binding, item);
                    match self.exec_block(body) {
                        Ok(()) | Err(Control::Continue) => {}
                        Err(Control::Break) => break,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }

            Stmt::FnDef {
                name, params, body, ..
            } => {
                let def = FuncDef {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                };
                self.bind(name, Val::Func(Arc::new(def)));
                Ok(())
            }

            Stmt::Try {
                body,
                catch_var,
                catch_body,
                ..
            } => match self.exec_block(body) {
                Err(Control::Throw(err)) => {
                    self.bind(catch_var, Val::Error(err.info));
                    self.exec_block(catch_body)
                }
                other => other,
            },

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Val::Null,
                };
                Err(Control::Return(value))
            }

            Stmt::Throw { value, .. } => {
                let err = match self.eval_expr(value)? {
                    Val::Error(info) => GuestError::from_info(info),
                    Val::Str(message) => GuestError::new(USER_ERROR, message),
                    other => GuestError::new(USER_ERROR, other.to_string()),
                };
                Err(err.into())
            }

            Stmt::Break { .. } => Err(Control::Break),
            Stmt::Continue { .. } => Err(Control::Continue),
        }
    }

    /// Materialize the items a `for` loop walks over
    fn iterate(&mut self, iterable: &Expr) -> EvalResult<Vec<Val>> {
        match self.eval_expr(iterable)? {
            Val::List(items) => Ok(items),
            Val::Str(s) => Ok(s.chars().map(|c| Val::Str(c.to_string())).collect()),
            Val::Dict(map) => Ok(map.into_keys().map(Val::Str).collect()),
            other => Err(self.locate(
                GuestError::new(
                    TYPE_ERROR,
                    format!("'{}' object is not iterable", other.type_name()),
                )
                .into(),
                iterable.span(),
            )),
        }
    }

    fn exec_assign(
        &mut self,
        var: &str,
        path: &[MemberAccess],
        op: AssignOp,
        value: &Expr,
    ) -> EvalResult<()> {
        let mut keys = Vec::with_capacity(path.len());
        for segment in path {
            keys.push(match segment {
                MemberAccess::Prop { property, .. } => Key::Name(property.clone()),
                MemberAccess::Index { expr, .. } => Key::Value(self.eval_expr(expr)?),
            });
        }
        let rhs = self.eval_expr(value)?;

        let Some((last, parents)) = keys.split_last() else {
            let new_value = match op.binary() {
                None => rhs,
                Some(bop) => {
                    let current = self.lookup(var).ok_or_else(|| undefined(var))?;
                    operators::binary(bop, current, rhs)?
                }
            };
            self.bind(var, new_value);
            return Ok(());
        };

        let root = self.assignment_root(var).ok_or_else(|| undefined(var))?;
        let mut target = root;
        for key in parents {
            target = slot_mut(target, key)?;
        }

        let new_value = match op.binary() {
            None => rhs,
            Some(bop) => operators::binary(bop, read_key(target, last)?, rhs)?,
        };
        store(target, last, new_value)?;
        Ok(())
    }

    /// Binding mutated by an element assignment: the local if present, else the namespace entry
    fn assignment_root(&mut self, var: &str) -> Option<&mut Val> {
        let is_local = self
            .frames
            .last()
            .map(|frame| frame.locals.contains_key(var))
            .unwrap_or(false);
        if is_local {
            self.binding_mut(var)
        } else {
            self.namespace.get_mut(var)
        }
    }
}

/* ===================== Assignment Helpers ===================== */

fn undefined(var: &str) -> GuestError {
    GuestError::new(NAME_ERROR, format!("name '{}' is not defined", var))
}

fn read_key(target: &Val, key: &Key) -> Result<Val, GuestError> {
    match key {
        Key::Name(name) => member(target, name),
        Key::Value(index) => index_value(target, index),
    }
}

fn slot_mut<'v>(target: &'v mut Val, key: &Key) -> Result<&'v mut Val, GuestError> {
    let type_name = target.type_name();
    match (target, key) {
        (Val::Dict(map), Key::Name(k)) | (Val::Dict(map), Key::Value(Val::Str(k))) => map
            .get_mut(k)
            .ok_or_else(|| GuestError::new(KEY_ERROR, format!("{:?}", k))),
        (Val::List(items), Key::Value(Val::Int(i))) => {
            let pos = resolve_position(*i, items.len(), "list")?;
            Ok(&mut items[pos])
        }
        (target, key) => Err(not_assignable(type_name, target, key)),
    }
}

fn store(target: &mut Val, key: &Key, value: Val) -> Result<(), GuestError> {
    let type_name = target.type_name();
    match (target, key) {
        (Val::Dict(map), Key::Name(k)) | (Val::Dict(map), Key::Value(Val::Str(k))) => {
            map.insert(k.clone(), value);
            Ok(())
        }
        (Val::List(items), Key::Value(Val::Int(i))) => {
            let pos = resolve_position(*i, items.len(), "list assignment")?;
            items[pos] = value;
            Ok(())
        }
        (target, key) => Err(not_assignable(type_name, target, key)),
    }
}

fn not_assignable(type_name: &str, target: &Val, key: &Key) -> GuestError {
    match (target, key) {
        (_, Key::Name(name)) => GuestError::new(
            ATTRIBUTE_ERROR,
            format!("'{}' object has no attribute '{}'", type_name, name),
        ),
        (Val::Dict(_), Key::Value(other)) => GuestError::new(
            TYPE_ERROR,
            format!("dict keys must be str, not {}", other.type_name()),
        ),
        (Val::List(_), Key::Value(other)) => GuestError::new(
            TYPE_ERROR,
            format!("list indices must be integers, not {}", other.type_name()),
        ),
        _ => GuestError::new(
            TYPE_ERROR,
            format!("'{}' object does not support item assignment", type_name),
        ),
    }
}
