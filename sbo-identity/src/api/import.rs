//! Batch match endpoint for the import pipeline
//!
//! The file-parsing layer posts parsed rows here and renders the per-row
//! results (resolved / auto-created / failed) for operator review.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::api::TenantId;
use crate::error::ApiResult;
use crate::services::{BatchMatcher, RowMatch, RowSignals};
use crate::AppState;

/// Request body for batch matching
#[derive(Debug, Deserialize)]
pub struct BatchMatchRequest {
    pub rows: Vec<RowSignals>,
}

/// POST /import/match
pub async fn batch_match(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(request): Json<BatchMatchRequest>,
) -> ApiResult<Json<Vec<RowMatch>>> {
    let matcher = BatchMatcher::new(state.db.clone());
    let matches = matcher.batch_match(&tenant_id, request.rows).await?;

    Ok(Json(matches))
}

/// Build import routes
pub fn import_routes() -> Router<AppState> {
    Router::new().route("/import/match", post(batch_match))
}
