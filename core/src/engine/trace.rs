//! Structured execution results and their rendered form

use serde::{Deserialize, Serialize};

use crate::interpreter::errors::{GuestError, TraceFrame, INTERNAL_ERROR, SYNTAX_ERROR, TOP_LEVEL};
use crate::interpreter::parser::semantic_validator::ValidationError;
use crate::interpreter::parser::ParseError;

pub const TRACEBACK_HEADER: &str = "Traceback (most recent call last):";

/// A failed execution: error kind, message and the call stack, outermost first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub kind: String,
    pub message: String,
    pub frames: Vec<TraceFrame>,
}

impl Trace {
    pub fn new(kind: &str, message: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            message: message.into(),
            frames: Vec::new(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }

    pub fn render(&self) -> String {
        let mut out = String::from(TRACEBACK_HEADER);
        for frame in &self.frames {
            out.push_str(&format!(
                "\n  at {} (line {}, column {})",
                frame.function, frame.line, frame.column
            ));
        }
        out.push_str(&format!("\n{}: {}", self.kind, self.message));
        out
    }
}

impl std::fmt::Display for Trace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl From<GuestError> for Trace {
    fn from(err: GuestError) -> Self {
        let mut frames = err.frames;
        frames.reverse();
        Self {
            kind: err.info.kind,
            message: err.info.message,
            frames,
        }
    }
}

impl From<ParseError> for Trace {
    fn from(err: ParseError) -> Self {
        let mut trace = Self::new(SYNTAX_ERROR, err.message());
        if let Some(span) = err.span() {
            trace.frames.push(TraceFrame::new(TOP_LEVEL, span));
        }
        trace
    }
}

impl From<ValidationError> for Trace {
    fn from(err: ValidationError) -> Self {
        let mut trace = Self::new(SYNTAX_ERROR, err.to_string());
        trace.frames.push(TraceFrame::new(TOP_LEVEL, err.span()));
        trace
    }
}

/// Outcome of one execution; never both output and failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum ExecutionResult {
    /// Captured stdout/stderr text, whitespace-trimmed
    Output(String),
    Failure(Trace),
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Output(_))
    }

    pub fn trace(&self) -> Option<&Trace> {
        match self {
            ExecutionResult::Failure(trace) => Some(trace),
            ExecutionResult::Output(_) => None,
        }
    }

    /// The string handed back by `Engine::execute`
    pub fn render(&self) -> String {
        match self {
            ExecutionResult::Output(text) => text.clone(),
            ExecutionResult::Failure(trace) => trace.render(),
        }
    }
}
