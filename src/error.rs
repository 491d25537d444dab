//! Error types for the module style compiler
//!
//! The style compiler itself never fails: degraded attribute data simply
//! contributes no declarations. These errors only surface at the I/O
//! boundary (page documents, configuration files, CLI output).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Unknown module type '{kind}'")]
    UnknownModule { kind: String },

    #[error("Page error in {file}: {message}")]
    Page { file: String, message: String },
}

pub type Result<T> = std::result::Result<T, CompilerError>;

impl CompilerError {
    pub fn page(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Page {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    pub fn unknown_module(kind: impl Into<String>) -> Self {
        Self::UnknownModule { kind: kind.into() }
    }
}
