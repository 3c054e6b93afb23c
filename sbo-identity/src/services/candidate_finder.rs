//! Candidate Finder
//!
//! Ranked customer candidate lookup over one tenant's customer store.
//! Signals are probed in fixed priority order — national ID, tax ID, then
//! free-text name — and results are deduplicated by customer guid, so the
//! list is already sorted best-first. Pure read; no side effects.

use sqlx::SqlitePool;

use crate::db::{customers, records};
use crate::types::{MatchCandidate, MatchConfidence, MatchSignal, MatchSignals};
use sbo_common::Result;

/// Result cap for the name-search step and for direct UI lookups
pub const DEFAULT_CANDIDATE_LIMIT: u32 = 10;

/// Candidate Finder
pub struct CandidateFinder {
    db: SqlitePool,
}

impl CandidateFinder {
    /// Create new candidate finder
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Find ranked customer candidates for a signal set within a tenant.
    ///
    /// Lookup order:
    /// 1. Exact national-ID match → `Exact`
    /// 2. Exact tax-ID match → `High` (skipped if already found in step 1)
    /// 3. Plate match via resolved confirmed records → `Medium`
    /// 4. Name substring match against first/last name, capped at `limit`
    ///    → `Medium` when the step yields exactly one customer, else `Low`
    ///
    /// An empty signal set returns an empty list.
    pub async fn find_candidates(
        &self,
        tenant_id: &str,
        signals: &MatchSignals,
        limit: u32,
    ) -> Result<Vec<MatchCandidate>> {
        let mut candidates: Vec<MatchCandidate> = Vec::new();

        if signals.is_empty() {
            tracing::debug!(tenant_id = %tenant_id, "No signals supplied, skipping lookup");
            return Ok(candidates);
        }

        // Step 1: exact national-ID equality
        if let Some(national_id) = &signals.national_id {
            if let Some(customer) =
                customers::find_by_national_id(&self.db, tenant_id, national_id).await?
            {
                candidates.push(to_candidate(
                    &customer,
                    MatchConfidence::Exact,
                    MatchSignal::NationalId,
                ));
            }
        }

        // Step 2: exact tax-ID equality
        if let Some(tax_id) = &signals.tax_id {
            if let Some(customer) = customers::find_by_tax_id(&self.db, tenant_id, tax_id).await? {
                if !candidates.iter().any(|c| c.customer_guid == customer.guid) {
                    candidates.push(to_candidate(
                        &customer,
                        MatchConfidence::High,
                        MatchSignal::TaxId,
                    ));
                }
            }
        }

        // Step 3: plate lookup through the confirmed ledger. A plate only
        // identifies a customer via a record already resolved with it.
        if let Some(plate) = &signals.plate {
            if let Some(guid) =
                records::find_resolved_customer_by_plate(&self.db, tenant_id, plate).await?
            {
                if !candidates.iter().any(|c| c.customer_guid == guid) {
                    if let Some(customer) =
                        customers::load_customer(&self.db, tenant_id, guid).await?
                    {
                        candidates.push(to_candidate(
                            &customer,
                            MatchConfidence::Medium,
                            MatchSignal::Plate,
                        ));
                    }
                }
            }
        }

        // Step 4: name substring search
        if let Some(name) = &signals.name {
            let hits = customers::search_by_name(&self.db, tenant_id, name, limit).await?;
            // Exactly one name hit is a usable match; several are only
            // disambiguation candidates
            let confidence = if hits.len() == 1 {
                MatchConfidence::Medium
            } else {
                MatchConfidence::Low
            };
            for customer in &hits {
                if !candidates.iter().any(|c| c.customer_guid == customer.guid) {
                    candidates.push(to_candidate(customer, confidence, MatchSignal::Name));
                }
            }
        }

        tracing::debug!(
            tenant_id = %tenant_id,
            candidate_count = candidates.len(),
            "Candidate lookup complete"
        );

        Ok(candidates)
    }
}

fn to_candidate(
    customer: &sbo_common::db::models::Customer,
    confidence: MatchConfidence,
    matched_by: MatchSignal,
) -> MatchCandidate {
    MatchCandidate {
        customer_guid: customer.guid,
        display_name: customer.display_name(),
        national_id: customer.national_id.clone(),
        tax_id: customer.tax_id.clone(),
        confidence,
        matched_by,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbo_common::db::init::create_schema;
    use sbo_common::db::models::Customer;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        pool
    }

    async fn insert_customer(
        pool: &SqlitePool,
        tenant_id: &str,
        national_id: Option<&str>,
        tax_id: Option<&str>,
        first_name: &str,
        last_name: &str,
    ) -> Customer {
        let mut customer = Customer::new(tenant_id.to_string());
        customer.national_id = national_id.map(str::to_string);
        customer.tax_id = tax_id.map(str::to_string);
        customer.first_name = Some(first_name.to_string());
        customer.last_name = Some(last_name.to_string());
        crate::db::customers::insert_customer(pool, &customer)
            .await
            .unwrap();
        customer
    }

    #[tokio::test]
    async fn empty_signals_yield_no_candidates() {
        let pool = setup_test_db().await;
        let finder = CandidateFinder::new(pool);

        let candidates = finder
            .find_candidates("t1", &MatchSignals::default(), DEFAULT_CANDIDATE_LIMIT)
            .await
            .unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn national_id_match_ranks_first() {
        let pool = setup_test_db().await;
        let by_national =
            insert_customer(&pool, "t1", Some("11111111111"), None, "Ayşe", "Yılmaz").await;
        let by_tax = insert_customer(&pool, "t1", None, Some("2222222222"), "Kaya", "Ltd").await;

        let finder = CandidateFinder::new(pool);
        let signals = MatchSignals::new(
            Some("11111111111".to_string()),
            Some("2222222222".to_string()),
            None,
            None,
        );

        let candidates = finder
            .find_candidates("t1", &signals, DEFAULT_CANDIDATE_LIMIT)
            .await
            .unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].customer_guid, by_national.guid);
        assert_eq!(candidates[0].confidence, MatchConfidence::Exact);
        assert_eq!(candidates[0].matched_by, MatchSignal::NationalId);
        assert_eq!(candidates[1].customer_guid, by_tax.guid);
        assert_eq!(candidates[1].confidence, MatchConfidence::High);
    }

    #[tokio::test]
    async fn same_customer_not_duplicated_across_signals() {
        let pool = setup_test_db().await;
        let customer = insert_customer(
            &pool,
            "t1",
            Some("11111111111"),
            Some("2222222222"),
            "Ayşe",
            "Yılmaz",
        )
        .await;

        let finder = CandidateFinder::new(pool);
        let signals = MatchSignals::new(
            Some("11111111111".to_string()),
            Some("2222222222".to_string()),
            Some("Yılmaz".to_string()),
            None,
        );

        let candidates = finder
            .find_candidates("t1", &signals, DEFAULT_CANDIDATE_LIMIT)
            .await
            .unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].customer_guid, customer.guid);
        assert_eq!(candidates[0].confidence, MatchConfidence::Exact);
    }

    #[tokio::test]
    async fn single_name_hit_is_medium_multiple_are_low() {
        let pool = setup_test_db().await;
        insert_customer(&pool, "t1", None, None, "Ayşe", "Yılmaz").await;
        insert_customer(&pool, "t1", None, None, "Fatma", "Yılmaz").await;
        insert_customer(&pool, "t1", None, None, "Mehmet", "Demir").await;

        let finder = CandidateFinder::new(pool);

        let one_hit = MatchSignals::new(None, None, Some("Demir".to_string()), None);
        let candidates = finder
            .find_candidates("t1", &one_hit, DEFAULT_CANDIDATE_LIMIT)
            .await
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].confidence, MatchConfidence::Medium);
        assert_eq!(candidates[0].matched_by, MatchSignal::Name);

        let two_hits = MatchSignals::new(None, None, Some("Yılmaz".to_string()), None);
        let candidates = finder
            .find_candidates("t1", &two_hits, DEFAULT_CANDIDATE_LIMIT)
            .await
            .unwrap();
        assert_eq!(candidates.len(), 2);
        assert!(candidates
            .iter()
            .all(|c| c.confidence == MatchConfidence::Low));
    }

    #[tokio::test]
    async fn plate_resolves_through_confirmed_ledger() {
        let pool = setup_test_db().await;
        let customer = insert_customer(&pool, "t1", None, None, "Mehmet", "Demir").await;

        // A confirmed record already resolved to the customer carries the plate
        sqlx::query(
            r#"
            INSERT INTO confirmed_records (guid, tenant_id, customer_guid, plate)
            VALUES (?, 't1', ?, '34ABC123')
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(customer.guid.to_string())
        .execute(&pool)
        .await
        .unwrap();

        // An unresolved record with the same plate must not contribute
        sqlx::query(
            "INSERT INTO confirmed_records (guid, tenant_id, plate) VALUES (?, 't1', '34ABC123')",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .execute(&pool)
        .await
        .unwrap();

        let finder = CandidateFinder::new(pool);
        let signals = MatchSignals::new(None, None, None, Some("34ABC123".to_string()));

        let candidates = finder
            .find_candidates("t1", &signals, DEFAULT_CANDIDATE_LIMIT)
            .await
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].customer_guid, customer.guid);
        assert_eq!(candidates[0].confidence, MatchConfidence::Medium);
        assert_eq!(candidates[0].matched_by, MatchSignal::Plate);
    }

    #[tokio::test]
    async fn candidates_never_cross_tenants() {
        let pool = setup_test_db().await;
        insert_customer(&pool, "tenant-b", Some("11111111111"), None, "Ayşe", "Yılmaz").await;

        let finder = CandidateFinder::new(pool);
        let signals = MatchSignals::new(Some("11111111111".to_string()), None, None, None);

        let candidates = finder
            .find_candidates("tenant-a", &signals, DEFAULT_CANDIDATE_LIMIT)
            .await
            .unwrap();
        assert!(candidates.is_empty());
    }
}
