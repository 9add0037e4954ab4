//! # Application Errors
//!
//! Failures of the binary outside request handling: configuration,
//! startup and CLI commands. Request-level failures are `api::ApiError`.

use graphrest_core::GraphError;
use thiserror::Error;

/// Errors raised while configuring or running the server and CLI.
#[derive(Debug, Error)]
pub enum AppError {
    /// The configuration file is missing, unreadable or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A core operation failed (schema registration, store access).
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Socket or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
