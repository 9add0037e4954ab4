//! # API Errors
//!
//! Request-level failures and their HTTP mapping. Every failure becomes a
//! JSON body `{"error": "...", "code": "..."}` with exactly one status.

use super::types::{ErrorResponse, ResourceResponse};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use graphrest_core::GraphError;
use thiserror::Error;

/// A failed resource request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A core component rejected the request.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The path names a type that is not exposed.
    #[error("Type '{0}' is not exposed")]
    UnexposedType(String),

    /// No route exists for this verb and path shape.
    #[error("No resource at {method} {path}")]
    UnknownResource { method: String, path: String },

    /// A query parameter is missing or invalid.
    #[error("Bad query: {0}")]
    BadQuery(String),

    /// The server-wide request budget is spent.
    #[error("Too many requests")]
    RateLimited,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Graph(err) => match err {
                GraphError::Addressing(_)
                | GraphError::MalformedBody(_)
                | GraphError::UnknownRelation { .. }
                | GraphError::UndeclaredProperty { .. }
                | GraphError::TargetMismatch { .. } => StatusCode::BAD_REQUEST,
                GraphError::NotFound(_) | GraphError::SchemaConflict(_) => StatusCode::NOT_FOUND,
                GraphError::Serialization(_) | GraphError::Storage(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::BadQuery(_) => StatusCode::BAD_REQUEST,
            Self::UnexposedType(_) | Self::UnknownResource { .. } => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Graph(err) => match err {
                GraphError::Addressing(_) => "MALFORMED_PATH",
                GraphError::SchemaConflict(_) => "SCHEMA_CONFLICT",
                GraphError::NotFound(_) => "NOT_FOUND",
                GraphError::MalformedBody(_) => "MALFORMED_BODY",
                GraphError::UnknownRelation { .. } => "UNKNOWN_RELATION",
                GraphError::UndeclaredProperty { .. } => "UNDECLARED_PROPERTY",
                GraphError::TargetMismatch { .. } => "TARGET_MISMATCH",
                GraphError::Serialization(_) => "SERIALIZATION_ERROR",
                GraphError::Storage(_) => "STORAGE_ERROR",
            },
            Self::UnexposedType(_) => "NOT_EXPOSED",
            Self::UnknownResource { .. } => "UNKNOWN_RESOURCE",
            Self::BadQuery(_) => "BAD_QUERY",
            Self::RateLimited => "RATE_LIMITED",
        }
    }

    fn body(&self) -> serde_json::Value {
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        };
        serde_json::to_value(body).unwrap_or_default()
    }
}

impl From<ApiError> for ResourceResponse {
    fn from(err: ApiError) -> Self {
        ResourceResponse::with_status(err.status(), err.body())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ResourceResponse::from(self).into_response()
    }
}

// =============================================================================
// TESTS
// =============================================================================
