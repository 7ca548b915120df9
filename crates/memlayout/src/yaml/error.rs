//! Loader error types

use thiserror::Error;

/// Failure to load a document
///
/// `line` is the 0-based index of the offending input line.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} (line {})", .line + 1)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }

    /// 1-based line number, as shown to users
    pub fn display_line(&self) -> usize {
        self.line + 1
    }
}

/// Fault while decoding a scalar token
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScalarError {
    #[error("integer '{text}' out of range")]
    IntegerOverflow { text: String },

    #[error("invalid number '{text}'")]
    InvalidNumber { text: String },

    #[error("invalid escape sequence '\\{escape}'")]
    InvalidEscape { escape: String },
}

impl ScalarError {
    /// Wrap the fault with the line it occurred on
    pub fn at_line(self, line: usize) -> ParseError {
        ParseError::new(format!("ScalarError: {}", self), line)
    }
}
