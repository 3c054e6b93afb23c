//! Identity assignment endpoints
//!
//! The operator-facing assignment action: write one or two identifiers
//! onto a record, resolve it, cascade to unresolved siblings. The store
//! is part of the path (`captured`, `pooled`, or `confirmed`).

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::TenantId;
use crate::error::ApiResult;
use crate::services::{AssignmentItem, AssignmentOutcome, BatchAssignmentOutcome, IdentityAssigner};
use crate::AppState;
use sbo_common::db::models::RecordStore;

/// Request body for single assignment
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub national_id: Option<String>,
    pub tax_id: Option<String>,
}

/// Request body for batch assignment
#[derive(Debug, Deserialize)]
pub struct BatchAssignRequest {
    pub items: Vec<AssignmentItem>,
}

/// POST /records/:store/:guid/assign-identity
pub async fn assign_identity(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Path((store, record_guid)): Path<(RecordStore, Uuid)>,
    Json(request): Json<AssignRequest>,
) -> ApiResult<Json<AssignmentOutcome>> {
    let assigner = IdentityAssigner::new(state.db.clone());
    let outcome = assigner
        .assign_identity(
            &tenant_id,
            store,
            record_guid,
            request.national_id,
            request.tax_id,
        )
        .await?;

    Ok(Json(outcome))
}

/// POST /records/:store/assign-identities
pub async fn assign_identities(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Path(store): Path<RecordStore>,
    Json(request): Json<BatchAssignRequest>,
) -> ApiResult<Json<BatchAssignmentOutcome>> {
    let assigner = IdentityAssigner::new(state.db.clone());
    let outcome = assigner
        .assign_identities(&tenant_id, store, request.items)
        .await;

    Ok(Json(outcome))
}

/// Build assignment routes
pub fn assignment_routes() -> Router<AppState> {
    Router::new()
        .route("/records/:store/:guid/assign-identity", post(assign_identity))
        .route("/records/:store/assign-identities", post(assign_identities))
}
