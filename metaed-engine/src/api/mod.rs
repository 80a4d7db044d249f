//! HTTP API handlers for metaed-engine

pub mod extract;
pub mod form;
pub mod health;
pub mod modify;

pub use extract::extract_metadata;
pub use health::health_routes;
pub use modify::modify_metadata;

use axum::{routing::post, Router};
use metaed_common::api::{EXTRACT_PATH, MODIFY_PATH};

use crate::AppState;

/// Build extract/modify routes
pub fn metadata_routes() -> Router<AppState> {
    Router::new()
        .route(EXTRACT_PATH, post(extract_metadata))
        .route(MODIFY_PATH, post(modify_metadata))
}
