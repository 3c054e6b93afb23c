//! HTTP API for the identity engine
//!
//! One module per concern; each exports a `*_routes()` builder merged by
//! `build_router`. Tenant context arrives as the `X-Tenant-Id` header,
//! validated upstream by the gateway — handlers trust it and never
//! re-derive it from credentials.

pub mod assignment;
pub mod health;
pub mod import;
pub mod matching;
pub mod merge;

pub use assignment::assignment_routes;
pub use health::health_routes;
pub use import::import_routes;
pub use matching::matching_routes;
pub use merge::merge_routes;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// Tenant header carried on every request
pub const TENANT_HEADER: &str = "X-Tenant-Id";

/// Caller's tenant, extracted from the `X-Tenant-Id` header
#[derive(Debug, Clone)]
pub struct TenantId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for TenantId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ApiError::BadRequest(format!("missing or empty {} header", TENANT_HEADER))
            })?;

        Ok(TenantId(value.to_string()))
    }
}
