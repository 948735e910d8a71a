//! Cadence script: grammar, AST, evaluator and builtins

pub mod ast;
pub mod errors;
pub mod executor;
pub mod parser;
pub mod stdlib;

pub use errors::{ErrorInfo, GuestError, TraceFrame};
pub use executor::{HostContext, Interpreter, Namespace, Val};
pub use parser::{parse_expression, parse_program, ParseError};
