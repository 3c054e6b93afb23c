//! Candidate lookup and match resolution endpoints
//!
//! Both are pure reads. The candidate endpoint backs "who might this be"
//! UI lookups; the resolve endpoint reports the single best match and
//! never creates customers.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::TenantId;
use crate::error::ApiResult;
use crate::services::{CandidateFinder, MatchResolver, DEFAULT_CANDIDATE_LIMIT};
use crate::types::{MatchCandidate, MatchResult, MatchSignals};
use crate::AppState;

/// Query parameters for candidate lookup
#[derive(Debug, Deserialize)]
pub struct CandidateQuery {
    pub national_id: Option<String>,
    pub tax_id: Option<String>,
    pub name: Option<String>,
    pub plate: Option<String>,
    /// Result cap, default 10
    pub limit: Option<u32>,
}

/// GET /customers/candidates
pub async fn find_candidates(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Query(query): Query<CandidateQuery>,
) -> ApiResult<Json<Vec<MatchCandidate>>> {
    let signals = MatchSignals::new(query.national_id, query.tax_id, query.name, query.plate);
    let limit = query.limit.unwrap_or(DEFAULT_CANDIDATE_LIMIT);

    let finder = CandidateFinder::new(state.db.clone());
    let candidates = finder.find_candidates(&tenant_id, &signals, limit).await?;

    Ok(Json(candidates))
}

/// POST /customers/resolve
pub async fn resolve_match(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(signals): Json<MatchSignals>,
) -> ApiResult<Json<MatchResult>> {
    let signals = signals.normalized();
    let resolver = MatchResolver::new(state.db.clone());
    let result = resolver.resolve(&tenant_id, &signals).await?;

    Ok(Json(result))
}

/// Build matching routes
pub fn matching_routes() -> Router<AppState> {
    Router::new()
        .route("/customers/candidates", get(find_candidates))
        .route("/customers/resolve", post(resolve_match))
}
