//! # API Request/Response Types
//!
//! The transport-neutral request and response the dispatcher works on,
//! plus the JSON bodies with a fixed shape.

use axum::{
    Json,
    body::Bytes,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// RESOURCE REQUEST
// =============================================================================

/// One inbound request, reduced to what routing needs.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub body: Bytes,
}

impl ResourceRequest {
    /// A request with no query and an empty body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: BTreeMap::new(),
            body: Bytes::new(),
        }
    }

    /// Add a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set the raw body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the body to a serialized JSON value.
    #[must_use]
    pub fn with_json(self, body: &Value) -> Self {
        self.with_body(body.to_string())
    }
}

// =============================================================================
// RESOURCE RESPONSE
// =============================================================================

/// Status, optional `Location` and optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Option<Value>,
}

impl ResourceResponse {
    /// 200 with a JSON body.
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            location: None,
            body: Some(body),
        }
    }

    /// 201 pointing at the new resource.
    pub fn created(location: String) -> Self {
        Self {
            status: StatusCode::CREATED,
            location: Some(location),
            body: None,
        }
    }

    /// Any status with a JSON body.
    pub fn with_status(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            location: None,
            body: Some(body),
        }
    }
}

impl IntoResponse for ResourceResponse {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        };
        if let Some(location) = self.location
            && let Ok(value) = HeaderValue::from_str(&location)
        {
            response.headers_mut().insert(header::LOCATION, value);
        }
        response
    }
}

// =============================================================================
// FIXED-SHAPE BODIES
// =============================================================================

/// Body of a relationship creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationshipRequest {
    /// URI of the node at the other end.
    pub uri: String,
    /// Properties to store on the relationship.
    #[serde(default)]
    pub properties: Option<Value>,
}

/// Body of a traversal response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UriListResponse {
    pub uri_list: Vec<String>,
}

/// Error body: a message and a stable machine-readable code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// =============================================================================
// TESTS
// =============================================================================
