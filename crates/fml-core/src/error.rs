//! Error types for FML parsing and configuration

use std::path::PathBuf;
use thiserror::Error;

use crate::parser::ParseError;

/// Main error type for FML operations
#[derive(Debug, Error)]
pub enum FmlError {
    /// The mapping text could not be turned into a document.
    ///
    /// Carries every diagnostic produced by the failed parse, in source order.
    #[error("{}", describe_parse_errors(errors))]
    Parse { errors: Vec<ParseError> },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Config,
    Io,
}

impl FmlError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FmlError::Parse { .. } => ErrorKind::Parse,
            FmlError::ConfigError { .. } => ErrorKind::Config,
            FmlError::IoError { .. } => ErrorKind::Io,
        }
    }

    /// Parse diagnostics carried by this error, empty for every other kind
    pub fn parse_errors(&self) -> &[ParseError] {
        match self {
            FmlError::Parse { errors } => errors,
            _ => &[],
        }
    }

    /// Create a parse error from collected diagnostics
    pub fn parse(errors: Vec<ParseError>) -> Self {
        Self::Parse { errors }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }
}

fn describe_parse_errors(errors: &[ParseError]) -> String {
    match errors {
        [] => "Parse error".to_string(),
        [only] => format!("Parse error: {only}"),
        [first, rest @ ..] => format!("Parse error: {first} (and {} more)", rest.len()),
    }
}
