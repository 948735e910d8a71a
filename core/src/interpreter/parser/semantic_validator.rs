//! Semantic validation for Cadence programs
//!
//! Rules the grammar cannot enforce: `break`/`continue` must appear inside a
//! loop and `return` inside a function body. Runs before any statement executes.

use crate::interpreter::ast::{Span, Stmt};

/* ===================== Error Types ===================== */

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    BreakOutsideLoop { span: Span },
    ContinueOutsideLoop { span: Span },
    ReturnOutsideFunction { span: Span },
}

impl ValidationError {
    pub fn span(&self) -> Span {
        match self {
            ValidationError::BreakOutsideLoop { span }
            | ValidationError::ContinueOutsideLoop { span }
            | ValidationError::ReturnOutsideFunction { span } => *span,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::BreakOutsideLoop { .. } => write!(f, "'break' outside loop"),
            ValidationError::ContinueOutsideLoop { .. } => {
                write!(f, "'continue' not properly in loop")
            }
            ValidationError::ReturnOutsideFunction { .. } => {
                write!(f, "'return' outside function")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

/* ===================== Public API ===================== */

/// Validate a parsed program
pub fn validate_program(stmts: &[Stmt]) -> ValidationResult<()> {
    validate_block(stmts, false, false)
}

fn validate_block(stmts: &[Stmt], in_loop: bool, in_function: bool) -> ValidationResult<()> {
    stmts
        .iter()
        .try_for_each(|stmt| validate_stmt(stmt, in_loop, in_function))
}

fn validate_stmt(stmt: &Stmt, in_loop: bool, in_function: bool) -> ValidationResult<()> {
    match stmt {
        Stmt::Break { span } if !in_loop => Err(ValidationError::BreakOutsideLoop { span: *span }),
        Stmt::Continue { span } if !in_loop => {
            Err(ValidationError::ContinueOutsideLoop { span: *span })
        }
        Stmt::Return { span, .. } if !in_function => {
            Err(ValidationError::ReturnOutsideFunction { span: *span })
        }
        Stmt::If {
            then_body,
            else_body,
            ..
        } => {
            validate_block(then_body, in_loop, in_function)?;
            match else_body {
                Some(body) => validate_block(body, in_loop, in_function),
                None => Ok(()),
            }
        }
        Stmt::While { body, .. } | Stmt::For { body, .. } => {
            validate_block(body, true, in_function)
        }
        Stmt::Try {
            body, catch_body, ..
        } => {
            validate_block(body, in_loop, in_function)?;
            validate_block(catch_body, in_loop, in_function)
        }
        // A function body starts a fresh loop context
        Stmt::FnDef { body, .. } => validate_block(body, false, true),
        _ => Ok(()),
    }
}
