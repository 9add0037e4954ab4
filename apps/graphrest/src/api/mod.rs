//! # graphrest HTTP API Module
//!
//! Serves exposed graph entities as resources using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - everything else - resource requests, routed by the `Dispatcher`
//!
//! ## Configuration (Environment Variables)
//!
//! - `GRAPHREST_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `GRAPHREST_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)

mod dispatcher;
mod error;
mod handlers;
mod middleware;
mod types;

pub use dispatcher::{
    Dispatcher, DispatcherConfig, RELATION_END_KEY, RELATION_START_KEY, RELATION_TYPE_KEY, Route,
    SharedStore,
};
pub use error::ApiError;
pub use handlers::{health_handler, resource_handler};
pub use middleware::{DEFAULT_RATE_LIMIT, create_rate_limiter, get_rate_limit_from_env};
pub use types::{
    ErrorResponse, HealthResponse, RelationshipRequest, ResourceRequest, ResourceResponse,
    UriListResponse,
};

use crate::config::ServerConfig;
use crate::error::AppError;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::get,
};
use graphrest_core::{Addressing, Session, TypeRegistry, primitives::MAX_BODY_BYTES};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the dispatcher and, through it, the store.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Build state from its parts, wrapping the session in a shared lock.
    pub fn from_parts(session: Session, addressing: Addressing, registry: TypeRegistry) -> Self {
        Self::new(Dispatcher::new(DispatcherConfig {
            store: Arc::new(RwLock::new(session)),
            addressing,
            registry,
        }))
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const CORS_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::OPTIONS];

/// Build CORS layer from `GRAPHREST_CORS_ORIGINS`.
///
/// - `*` allows all origins
/// - unset defaults to localhost only
/// - otherwise a comma-separated list of origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("GRAPHREST_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (GRAPHREST_CORS_ORIGINS=*)");
            CorsLayer::permissive().expose_headers([header::LOCATION])
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in GRAPHREST_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods(CORS_METHODS)
                    .allow_headers([header::CONTENT_TYPE])
                    .expose_headers([header::LOCATION])
            }
        }
        None => {
            tracing::info!("CORS: No GRAPHREST_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::LOCATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate limiting (if enabled)
pub fn create_router(state: AppState) -> Router {
    create_router_with_rate_limit(state, get_rate_limit_from_env())
}

/// Create the router with an explicit requests-per-second budget (0 disables).
pub fn create_router_with_rate_limit(state: AppState, rate_limit: u32) -> Router {
    let cors = build_cors_layer();

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .fallback(handlers::resource_handler);

    if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        router = router.layer(axum_middleware::from_fn_with_state(
            create_rate_limiter(rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Rate limiting disabled");
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Bind, then serve until Ctrl-C.
///
/// Generated URIs use `public_base` when configured, otherwise the address
/// the listener actually bound (so port 0 yields the real port).
pub async fn run_server(
    server: &ServerConfig,
    session: Session,
    registry: TypeRegistry,
) -> Result<(), AppError> {
    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    let base = server
        .public_base
        .clone()
        .unwrap_or_else(|| format!("http://{}", local_addr));
    let addressing = Addressing::new(base)?;

    tracing::info!(
        %local_addr,
        base = addressing.base(),
        types = registry.types().count(),
        "graphrest HTTP server listening"
    );

    let router = create_router(AppState::from_parts(session, addressing, registry));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("graphrest HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

// =============================================================================
// TESTS
// =============================================================================
