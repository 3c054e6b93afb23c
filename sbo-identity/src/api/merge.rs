//! Customer merge endpoint

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::TenantId;
use crate::error::ApiResult;
use crate::services::CustomerMerger;
use crate::AppState;

/// Merge response with per-store audit counts
#[derive(Debug, Serialize)]
pub struct MergeResponse {
    pub success: bool,
    pub confirmed_updated: u64,
    pub pooled_updated: u64,
    pub captured_updated: u64,
}

/// POST /customers/:primary/merge/:secondary
pub async fn merge_customers(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Path((primary_guid, secondary_guid)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MergeResponse>> {
    let merger = CustomerMerger::new(state.db.clone());
    let outcome = merger.merge(&tenant_id, primary_guid, secondary_guid).await?;

    Ok(Json(MergeResponse {
        success: true,
        confirmed_updated: outcome.confirmed_updated,
        pooled_updated: outcome.pooled_updated,
        captured_updated: outcome.captured_updated,
    }))
}

/// Build merge routes
pub fn merge_routes() -> Router<AppState> {
    Router::new().route("/customers/:primary/merge/:secondary", post(merge_customers))
}
