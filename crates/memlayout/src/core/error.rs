//! Core error types for diagram processing
//!
//! Errors raised while turning a document into a diagram. Loader errors
//! convert into [`DiagramError::Parse`] so callers can use `?` throughout.

use thiserror::Error;

use crate::yaml::ParseError;

/// Core error types for diagram processing
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Parse error: {error}")]
    Parse { error: ParseError },

    #[error("Config error: {message}")]
    Config { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Unknown output format: {format}")]
    UnknownFormat { format: String },

    #[error("IO error: {error}")]
    Io { error: std::io::Error },
}

impl From<ParseError> for DiagramError {
    fn from(error: ParseError) -> Self {
        Self::Parse { error }
    }
}

impl From<std::io::Error> for DiagramError {
    fn from(error: std::io::Error) -> Self {
        Self::Io { error }
    }
}

impl DiagramError {
    /// Create a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render_error(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create a new unknown format error
    pub fn unknown_format(format: impl Into<String>) -> Self {
        Self::UnknownFormat {
            format: format.into(),
        }
    }
}
