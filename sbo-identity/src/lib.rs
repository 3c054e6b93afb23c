//! sbo-identity library interface
//!
//! Customer Identity Resolution & Deduplication Engine for the SBO back
//! office: candidate lookup, match resolution, batch import matching,
//! identity assignment with cascade, and customer merge.

pub mod api;
pub mod db;
pub mod error;
pub mod services;
pub mod types;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::matching_routes())
        .merge(api::import_routes())
        .merge(api::assignment_routes())
        .merge(api::merge_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Local deployments call the service cross-origin from the UI
        .layer(CorsLayer::permissive())
}
