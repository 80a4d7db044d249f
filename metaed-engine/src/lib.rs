//! metaed-engine library - metadata engine service
//!
//! HTTP front end over a [`MetadataBackend`] (exiftool in production):
//! - `POST /api/extract` returns a file's metadata
//! - `POST /api/modify` writes a change-set and returns the modified file
//! - `GET /health`

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::Router;
use chrono::{DateTime, Utc};
use metaed_common::FieldMutabilityPolicy;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod exiftool;
pub mod services;

pub use crate::backend::MetadataBackend;
pub use crate::config::EngineConfig;
pub use crate::error::{ApiError, ApiResult};

/// Content-Security-Policy sent with every response
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; style-src 'self'; \
     form-action 'self'; base-uri 'self'; frame-ancestors 'none'";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Reads and writes file metadata
    pub backend: Arc<dyn MetadataBackend>,
    /// Fields that are never written
    pub policy: Arc<FieldMutabilityPolicy>,
    pub config: Arc<EngineConfig>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(backend: Arc<dyn MetadataBackend>, config: EngineConfig) -> Self {
        Self {
            backend,
            policy: Arc::new(FieldMutabilityPolicy::standard()),
            config: Arc::new(config),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes();

    let security_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ));

    Router::new()
        .merge(api::metadata_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(security_headers)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
