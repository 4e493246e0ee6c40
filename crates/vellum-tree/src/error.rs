use std::fmt;

/// Classification of recoverable parse errors.
///
/// Parsers record these and keep going; none of them aborts a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UnexpectedToken,
    InvalidCharacterReference,
    UnexpectedEof,
    MalformedEnvironment,
    AllocationFailed,
}

impl ErrorCode {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCode::UnexpectedToken => "UNEXPECTED_TOKEN",
            ErrorCode::InvalidCharacterReference => "INVALID_CHARACTER_REFERENCE",
            ErrorCode::UnexpectedEof => "UNEXPECTED_EOF",
            ErrorCode::MalformedEnvironment => "MALFORMED_ENVIRONMENT",
            ErrorCode::AllocationFailed => "ALLOCATION_FAILED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A recorded parse error with its source position.
///
/// Errors are returned alongside the resulting tree, never thrown across a
/// parser boundary. Callers are expected to check the error list before
/// trusting a parse:
///
/// ```rust
/// # use vellum_tree::{ErrorCode, ParseError};
/// let err = ParseError::new(ErrorCode::UnexpectedEof, "eof-in-tag", 3, 17);
/// assert_eq!(err.to_string(), "UNEXPECTED_EOF: eof-in-tag at 3:17");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message} at {line}:{column}")]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    /// 1-based line of the offending input. Tabs count as one column.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl ParseError {
    pub fn new(code: ErrorCode, message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            code,
            message: message.into(),
            line,
            column,
        }
    }
}
