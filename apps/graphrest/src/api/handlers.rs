//! # API Endpoint Handlers
//!
//! Thin axum glue: the health probe, and the fallback that hands every
//! other request to the dispatcher.

use super::{
    AppState,
    error::ApiError,
    types::{HealthResponse, ResourceRequest},
};
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::{Method, Uri},
    response::{IntoResponse, Response},
};
use std::collections::BTreeMap;

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// RESOURCE HANDLER
// =============================================================================

/// Fallback for every path without an explicit route.
pub async fn resource_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    query: Result<Query<BTreeMap<String, String>>, QueryRejection>,
    body: Bytes,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return ApiError::BadQuery(rejection.body_text()).into_response(),
    };

    let request = ResourceRequest {
        method,
        path: uri.path().to_string(),
        query,
        body,
    };
    state.dispatcher.dispatch(&request).await.into_response()
}
