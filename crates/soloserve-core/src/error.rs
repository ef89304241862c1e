//! Error types shared across the Soloserve crates.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the Soloserve pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// A command-line flag was malformed or missing its value.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the argument error.
        message: String,
    },

    /// Required request input (text, query, documents) was absent or empty.
    #[error("{message}")]
    MissingInput {
        /// Description of what was missing and how to supply it.
        message: String,
    },

    /// The requested operation has no route handler.
    #[error("unsupported operation: {operation}")]
    UnsupportedOperation {
        /// The operation string exactly as the user supplied it.
        operation: String,
    },

    /// Model loading failed.
    #[error("failed to load model: {message}")]
    ModelLoad {
        /// Error message.
        message: String,
    },

    /// Backend-specific failure during handler execution.
    #[error("backend error: {message}")]
    Backend {
        /// Error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error (unexpected state).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Creates an argument error with the given message.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a missing-input error with the given message.
    #[must_use]
    pub fn missing_input(message: impl Into<String>) -> Self {
        Self::MissingInput {
            message: message.into(),
        }
    }

    /// Creates an unsupported-operation error carrying the raw user string.
    #[must_use]
    pub fn unsupported_operation(operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
        }
    }

    /// Creates a model load error.
    #[must_use]
    pub fn model_load(message: impl Into<String>) -> Self {
        Self::ModelLoad {
            message: message.into(),
        }
    }

    /// Creates a backend error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Creates an internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
