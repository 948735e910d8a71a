//! Control flow signals

use super::values::Val;
use crate::interpreter::errors::GuestError;

/// Non-local exit from a statement or expression
///
/// `Throw` carries a raised guest error; the others unwind to the nearest
/// loop or function call.
#[derive(Debug)]
pub enum Control {
    Break,
    Continue,
    Return(Val),
    Throw(Box<GuestError>),
}

impl From<GuestError> for Control {
    fn from(err: GuestError) -> Self {
        Control::Throw(Box::new(err))
    }
}

pub type EvalResult<T = Val> = Result<T, Control>;
