//! Expression evaluation

use indexmap::IndexMap;

use super::control::{Control, EvalResult};
use super::operators;
use super::values::Val;
use super::Interpreter;
use crate::interpreter::ast::{BinaryOp, Expr, Span};
use crate::interpreter::errors::{
    GuestError, ATTRIBUTE_ERROR, INDEX_ERROR, KEY_ERROR, NAME_ERROR, TYPE_ERROR,
};

impl Interpreter<'_> {
    /// Evaluate an expression, recording its position if it raises
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> EvalResult {
        self.eval_expr_inner(expr)
            .map_err(|control| self.locate(control, expr.span()))
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> EvalResult {
        match expr {
            Expr::LitNull { .. } => Ok(Val::Null),
            Expr::LitBool { v, .. } => Ok(Val::Bool(*v)),
            Expr::LitInt { v, .. } => Ok(Val::Int(*v)),
            Expr::LitFloat { v, .. } => Ok(Val::Float(*v)),
            Expr::LitStr { v, .. } => Ok(Val::Str(v.clone())),

            Expr::LitList { elements, .. } => {
                let items = elements
                    .iter()
                    .map(|element| self.eval_expr(element))
                    .collect::<EvalResult<Vec<Val>>>()?;
                Ok(Val::List(items))
            }

            Expr::LitDict { entries, .. } => {
                let mut map = IndexMap::with_capacity(entries.len());
                for (key_expr, value_expr) in entries {
                    let key = match self.eval_expr(key_expr)? {
                        Val::Str(key) => key,
                        other => {
                            return Err(GuestError::new(
                                TYPE_ERROR,
                                format!("dict keys must be str, not {}", other.type_name()),
                            )
                            .into())
                        }
                    };
                    let value = self.eval_expr(value_expr)?;
                    map.insert(key, value);
                }
                Ok(Val::Dict(map))
            }

            Expr::Ident { name, .. } => self.lookup(name).ok_or_else(|| {
                GuestError::new(NAME_ERROR, format!("name '{}' is not defined", name)).into()
            }),

            Expr::Member {
                object, property, ..
            } => {
                let object = self.eval_expr(object)?;
                Ok(member(&object, property)?)
            }

            Expr::Index { object, index, .. } => {
                let object = self.eval_expr(object)?;
                let index = self.eval_expr(index)?;
                Ok(index_value(&object, &index)?)
            }

            Expr::Call { callee, args, .. } => {
                let callee = self.eval_expr(callee)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval_expr(arg))
                    .collect::<EvalResult<Vec<Val>>>()?;
                self.call_value(callee, args)
            }

            Expr::Unary { op, operand, .. } => {
                let operand = self.eval_expr(operand)?;
                Ok(operators::unary(*op, operand)?)
            }

            Expr::Binary {
                op: BinaryOp::And,
                left,
                right,
                ..
            } => {
                let left = self.eval_expr(left)?;
                if !left.is_truthy() {
                    return Ok(left);
                }
                self.eval_expr(right)
            }

            Expr::Binary {
                op: BinaryOp::Or,
                left,
                right,
                ..
            } => {
                let left = self.eval_expr(left)?;
                if left.is_truthy() {
                    return Ok(left);
                }
                self.eval_expr(right)
            }

            Expr::Binary {
                op, left, right, ..
            } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                Ok(operators::binary(*op, left, right)?)
            }

            Expr::Ternary {
                condition,
                consequent,
                alternate,
                ..
            } => {
                if self.eval_expr(condition)?.is_truthy() {
                    self.eval_expr(consequent)
                } else {
                    self.eval_expr(alternate)
                }
            }
        }
    }

    /// Attach the current function and span to a raised error
    pub(crate) fn locate(&self, control: Control, span: Span) -> Control {
        match control {
            Control::Throw(err) => {
                Control::Throw(Box::new(err.locate(self.current_function(), span)))
            }
            other => other,
        }
    }
}

/* ===================== Access Helpers ===================== */

/// `object.property`: dict keys and error fields
pub(crate) fn member(object: &Val, property: &str) -> Result<Val, GuestError> {
    match (object, property) {
        (Val::Dict(map), _) => map.get(property).cloned().ok_or_else(|| {
            GuestError::new(KEY_ERROR, format!("'{}'", property))
        }),
        (Val::Error(info), "kind") => Ok(Val::Str(info.kind.clone())),
        (Val::Error(info), "message") => Ok(Val::Str(info.message.clone())),
        _ => Err(GuestError::new(
            ATTRIBUTE_ERROR,
            format!(
                "'{}' object has no attribute '{}'",
                object.type_name(),
                property
            ),
        )),
    }
}

/// `object[index]`: list/string positions (negative counts from the end) and dict keys
pub(crate) fn index_value(object: &Val, index: &Val) -> Result<Val, GuestError> {
    match (object, index) {
        (Val::List(items), Val::Int(i)) => {
            let pos = resolve_position(*i, items.len(), "list")?;
            Ok(items[pos].clone())
        }
        (Val::Str(s), Val::Int(i)) => {
            let chars: Vec<char> = s.chars().collect();
            let pos = resolve_position(*i, chars.len(), "string")?;
            Ok(Val::Str(chars[pos].to_string()))
        }
        (Val::Dict(map), Val::Str(key)) => map
            .get(key)
            .cloned()
            .ok_or_else(|| GuestError::new(KEY_ERROR, format!("{:?}", key))),
        (Val::List(_) | Val::Str(_), other) => Err(GuestError::new(
            TYPE_ERROR,
            format!(
                "{} indices must be integers, not {}",
                object.type_name(),
                other.type_name()
            ),
        )),
        (Val::Dict(_), other) => Err(GuestError::new(
            TYPE_ERROR,
            format!("dict keys must be str, not {}", other.type_name()),
        )),
        (other, _) => Err(GuestError::new(
            TYPE_ERROR,
            format!("'{}' object is not subscriptable", other.type_name()),
        )),
    }
}

/// Map a possibly negative index onto `0..len`
pub(crate) fn resolve_position(index: i64, len: usize, what: &str) -> Result<usize, GuestError> {
    let resolved = if index < 0 {
        i64::try_from(len).ok().and_then(|len| len.checked_add(index))
    } else {
        Some(index)
    };
    resolved
        .and_then(|pos| usize::try_from(pos).ok())
        .filter(|pos| *pos < len)
        .ok_or_else(|| GuestError::new(INDEX_ERROR, format!("{} index out of range", what)))
}
