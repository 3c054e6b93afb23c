//! Match Resolver
//!
//! Turns a ranked candidate list into a single best-match decision. The
//! resolver never creates customers: single-record flows report "no match"
//! and leave creation to their caller, so an operator-entered lookup can
//! never silently spawn a customer.

use sqlx::SqlitePool;

use crate::services::candidate_finder::{CandidateFinder, DEFAULT_CANDIDATE_LIMIT};
use crate::types::{MatchConfidence, MatchResult, MatchSignals};
use sbo_common::Result;

/// Match Resolver
pub struct MatchResolver {
    finder: CandidateFinder,
}

impl MatchResolver {
    /// Create new match resolver
    pub fn new(db: SqlitePool) -> Self {
        Self {
            finder: CandidateFinder::new(db),
        }
    }

    /// Resolve a signal set to at most one customer.
    ///
    /// The candidate list arrives priority-ordered, so the first candidate
    /// holding the maximum confidence wins; signal priority is the tie
    /// breaker by construction. `customer_guid` stays `None` when nothing
    /// qualifies above `None` confidence. Pure read.
    pub async fn resolve(&self, tenant_id: &str, signals: &MatchSignals) -> Result<MatchResult> {
        let candidates = self
            .finder
            .find_candidates(tenant_id, signals, DEFAULT_CANDIDATE_LIMIT)
            .await?;

        // First of the maximal confidence: the list is priority-ordered,
        // so on equal confidence the higher-priority signal wins
        let best = candidates
            .iter()
            .map(|c| c.confidence)
            .max()
            .filter(|&max| max > MatchConfidence::None)
            .and_then(|max| candidates.iter().find(|c| c.confidence == max))
            .cloned();

        let result = match best {
            Some(candidate) => {
                tracing::debug!(
                    tenant_id = %tenant_id,
                    customer_guid = %candidate.customer_guid,
                    confidence = candidate.confidence.as_str(),
                    "Resolved to existing customer"
                );
                MatchResult {
                    customer_guid: Some(candidate.customer_guid),
                    confidence: candidate.confidence,
                    matched_by: Some(candidate.matched_by),
                    auto_created: false,
                    candidates,
                }
            }
            None => {
                tracing::debug!(tenant_id = %tenant_id, "No candidate qualified");
                MatchResult {
                    candidates,
                    ..MatchResult::no_match()
                }
            }
        };

        Ok(result)
    }
}
