//! Guest error kinds and the error type raised by guest code

use serde::{Deserialize, Serialize};

use super::ast::Span;

/* ===================== Error Kinds ===================== */

pub const NAME_ERROR: &str = "NameError";
pub const TYPE_ERROR: &str = "TypeError";
pub const VALUE_ERROR: &str = "ValueError";
pub const INDEX_ERROR: &str = "IndexError";
pub const KEY_ERROR: &str = "KeyError";
pub const ATTRIBUTE_ERROR: &str = "AttributeError";
pub const ZERO_DIVISION_ERROR: &str = "ZeroDivisionError";
pub const OVERFLOW_ERROR: &str = "OverflowError";
pub const RECURSION_ERROR: &str = "RecursionError";
pub const SYNTAX_ERROR: &str = "SyntaxError";
pub const FILE_NOT_FOUND_ERROR: &str = "FileNotFoundError";
pub const IO_ERROR: &str = "IOError";
pub const TIMEOUT_ERROR: &str = "TimeoutError";
pub const INTERNAL_ERROR: &str = "InternalError";
/// Kind given to values raised with `throw "message"`
pub const USER_ERROR: &str = "Error";

/// Function name recorded for code outside any function
pub const TOP_LEVEL: &str = "<snippet>";

/* ===================== Error Values ===================== */

/// Kind and message of a guest error, also the payload of `Val::Error`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: &str, message: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// One entry of a guest call stack (1-based line and column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceFrame {
    pub function: String,
    pub line: usize,
    pub column: usize,
}

impl TraceFrame {
    pub fn new(function: &str, span: Span) -> Self {
        Self {
            function: function.to_string(),
            line: span.start_line + 1,
            column: span.start_col + 1,
        }
    }
}

/// A guest runtime error together with where it was raised
///
/// Frames are collected innermost first while the error unwinds.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{info}")]
pub struct GuestError {
    pub info: ErrorInfo,
    pub frames: Vec<TraceFrame>,
    located: bool,
}

impl GuestError {
    pub fn new(kind: &str, message: impl Into<String>) -> Self {
        Self::from_info(ErrorInfo::new(kind, message))
    }

    pub fn from_info(info: ErrorInfo) -> Self {
        Self {
            info,
            frames: Vec::new(),
            located: false,
        }
    }

    pub fn kind(&self) -> &str {
        &self.info.kind
    }

    pub fn message(&self) -> &str {
        &self.info.message
    }

    /// Record the position in `function` where the error surfaced, once per frame
    pub fn locate(mut self, function: &str, span: Span) -> Self {
        if !self.located {
            self.frames.push(TraceFrame::new(function, span));
            self.located = true;
        }
        self
    }

    /// Called when the error leaves a function body so the caller's position is recorded too
    pub fn leave_frame(&mut self) {
        self.located = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_records_innermost_position_once() {
        let inner = Span::new(4, 5, 0, 4, 0, 5);
        let outer = Span::new(0, 9, 0, 0, 0, 9);

        let err = GuestError::new(NAME_ERROR, "name 'y' is not defined")
            .locate(TOP_LEVEL, inner)
            .locate(TOP_LEVEL, outer);

        assert_eq!(err.frames.len(), 1);
        assert_eq!(err.frames[0].line, 1);
        assert_eq!(err.frames[0].column, 5);
    }

    #[test]
    fn test_leave_frame_allows_caller_position() {
        let mut err = GuestError::new(VALUE_ERROR, "bad").locate("f", Span::new(0, 1, 2, 0, 2, 1));
        err.leave_frame();
        let err = err.locate(TOP_LEVEL, Span::new(0, 1, 5, 3, 5, 4));

        let functions: Vec<_> = err.frames.iter().map(|f| f.function.as_str()).collect();
        assert_eq!(functions, vec!["f", TOP_LEVEL]);
        assert_eq!(err.frames[1].line, 6);
    }

    #[test]
    fn test_display_is_kind_and_message() {
        let err = GuestError::new(ZERO_DIVISION_ERROR, "division by zero");
        assert_eq!(err.to_string(), "ZeroDivisionError: division by zero");
    }
}
