//! # Executor - tree-walking evaluator for Cadence script
//!
//! Runs parsed statements and expressions against a persistent [`Namespace`].
//! All guest-visible side effects go through [`HostContext`]: captured
//! stdout/stderr and the VFS facade.
//!
//! Name lookup order: current function's locals, then the namespace, then
//! builtins. Assignment writes the locals inside a function and the namespace
//! at top level.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::interpreter::ast::{Expr, Stmt};
use crate::interpreter::errors::{
    self, GuestError, INTERNAL_ERROR, RECURSION_ERROR, TOP_LEVEL, TYPE_ERROR,
};
use crate::interpreter::stdlib::{self, Builtin};
use crate::vfs::VfsFacade;

pub mod control;
pub mod expressions;
pub mod namespace;
pub mod operators;
pub mod statements;
pub mod values;

#[cfg(test)]
pub(crate) mod tests;

pub use control::{Control, EvalResult};
pub use namespace::Namespace;
pub use values::{FuncDef, Val};

/* ===================== Host Context ===================== */

/// Side-effect surface available to guest code
pub trait HostContext {
    /// Append text to the captured standard output
    fn write_stdout(&mut self, text: &str);

    /// Append text to the captured standard error
    fn write_stderr(&mut self, text: &str);

    /// File operations, if storage is attached
    fn vfs(&self) -> Option<&VfsFacade>;
}

/* ===================== Interpreter ===================== */

struct CallFrame {
    function: String,
    locals: IndexMap<String, Val>,
}

/// Evaluator for one execution; borrows the namespace and host for its lifetime
pub struct Interpreter<'a> {
    namespace: &'a mut Namespace,
    host: &'a mut dyn HostContext,
    frames: Vec<CallFrame>,
    max_call_depth: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        namespace: &'a mut Namespace,
        host: &'a mut dyn HostContext,
        max_call_depth: usize,
    ) -> Self {
        Self {
            namespace,
            host,
            frames: Vec::new(),
            max_call_depth,
        }
    }

    /// Evaluate a single expression at top level
    pub fn eval(&mut self, expr: &Expr) -> Result<Val, GuestError> {
        self.eval_expr(expr).map_err(escaped)
    }

    /// Execute a statement list at top level
    pub fn exec(&mut self, stmts: &[Stmt]) -> Result<(), GuestError> {
        self.exec_block(stmts).map_err(escaped)
    }

    /// Name of the function whose body is executing
    fn current_function(&self) -> &str {
        self.frames
            .last()
            .map(|frame| frame.function.as_str())
            .unwrap_or(TOP_LEVEL)
    }

    fn lookup(&self, name: &str) -> Option<Val> {
        if let Some(frame) = self.frames.last() {
            if let Some(value) = frame.locals.get(name) {
                return Some(value.clone());
            }
        }
        if let Some(value) = self.namespace.get(name) {
            return Some(value.clone());
        }
        Builtin::lookup(name).map(Val::Builtin)
    }

    fn bind(&mut self, name: &str, value: Val) {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.locals.insert(name.to_string(), value);
            }
            None => self.namespace.set(name, value),
        }
    }

    /// Mutable access to a binding in the scope assignment would write to
    fn binding_mut(&mut self, name: &str) -> Option<&mut Val> {
        match self.frames.last_mut() {
            Some(frame) => frame.locals.get_mut(name),
            None => self.namespace.get_mut(name),
        }
    }

    fn call_value(&mut self, callee: Val, args: Vec<Val>) -> EvalResult {
        match callee {
            Val::Func(def) => self.call_function(def, args),
            Val::Builtin(builtin) => Ok(stdlib::call_builtin(builtin, args, &mut *self.host)?),
            other => Err(GuestError::new(
                TYPE_ERROR,
                format!("'{}' object is not callable", other.type_name()),
            )
            .into()),
        }
    }

    fn call_function(&mut self, def: Arc<FuncDef>, args: Vec<Val>) -> EvalResult {
        if args.len() != def.params.len() {
            return Err(GuestError::new(
                TYPE_ERROR,
                format!(
                    "{}() takes {} argument{} but {} {} given",
                    def.name,
                    def.params.len(),
                    if def.params.len() == 1 { "" } else { "s" },
                    args.len(),
                    if args.len() == 1 { "was" } else { "were" },
                ),
            )
            .into());
        }
        if self.frames.len() >= self.max_call_depth {
            return Err(GuestError::new(
                RECURSION_ERROR,
                format!("maximum call depth exceeded ({})", self.max_call_depth),
            )
            .into());
        }

        let locals = def.params.iter().cloned().zip(args).collect();
        self.frames.push(CallFrame {
            function: def.name.clone(),
            locals,
        });
        let result = self.exec_block(&def.body);
        self.frames.pop();

        match result {
            Ok(()) => Ok(Val::Null),
            Err(Control::Return(value)) => Ok(value),
            Err(Control::Throw(mut err)) => {
                err.leave_frame();
                Err(Control::Throw(err))
            }
            Err(Control::Break | Control::Continue) => Err(GuestError::new(
                INTERNAL_ERROR,
                format!("loop control escaped function '{}'", def.name),
            )
            .into()),
        }
    }
}

/// Convert a control signal that reached top level into an error
fn escaped(control: Control) -> GuestError {
    match control {
        Control::Throw(err) => *err,
        Control::Break => GuestError::new(errors::SYNTAX_ERROR, "'break' outside loop"),
        Control::Continue => {
            GuestError::new(errors::SYNTAX_ERROR, "'continue' not properly in loop")
        }
        Control::Return(_) => GuestError::new(errors::SYNTAX_ERROR, "'return' outside function"),
    }
}
