//! Batch Matcher
//!
//! Amortizes match resolution over an import file: the tenant's customer
//! set is loaded once into an in-memory index, then every row resolves
//! against that snapshot with the same priority rules as the single-record
//! resolver. Bulk import is the accepted entry point for net-new customers,
//! so this path may auto-create; customers created mid-batch are added to
//! the index so later rows in the same file resolve to them. The snapshot
//! is per-call and discarded afterward.

use std::collections::HashMap;

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::customers;
use crate::types::{
    normalize_name, MatchCandidate, MatchConfidence, MatchResult, MatchSignal, MatchSignals,
};
use sbo_common::db::models::Customer;
use sbo_common::Result;

/// One import row to match: caller-assigned row id plus its raw signals
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RowSignals {
    pub row_id: String,
    #[serde(flatten)]
    pub signals: MatchSignals,
}

/// Per-row outcome. `error` is set (and confidence is `None`) when
/// auto-creation failed for this row; the batch continues regardless.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RowMatch {
    pub row_id: String,
    #[serde(flatten)]
    pub result: MatchResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// In-memory customer index for one tenant, valid for one batch
struct CustomerIndex {
    by_national_id: HashMap<String, Uuid>,
    by_tax_id: HashMap<String, Uuid>,
    by_name: HashMap<String, Vec<Uuid>>,
    customers: HashMap<Uuid, Customer>,
}

impl CustomerIndex {
    fn build(snapshot: Vec<Customer>) -> Self {
        let mut index = Self {
            by_national_id: HashMap::new(),
            by_tax_id: HashMap::new(),
            by_name: HashMap::new(),
            customers: HashMap::new(),
        };
        for customer in snapshot {
            index.insert(customer);
        }
        index
    }

    fn insert(&mut self, customer: Customer) {
        if let Some(national_id) = &customer.national_id {
            self.by_national_id.insert(national_id.clone(), customer.guid);
        }
        if let Some(tax_id) = &customer.tax_id {
            self.by_tax_id.insert(tax_id.clone(), customer.guid);
        }
        let name_key = normalize_name(&customer.display_name());
        if !name_key.is_empty() {
            self.by_name.entry(name_key).or_default().push(customer.guid);
        }
        self.customers.insert(customer.guid, customer);
    }

    fn candidate(
        &self,
        guid: Uuid,
        confidence: MatchConfidence,
        matched_by: MatchSignal,
    ) -> MatchCandidate {
        let customer = &self.customers[&guid];
        MatchCandidate {
            customer_guid: guid,
            display_name: customer.display_name(),
            national_id: customer.national_id.clone(),
            tax_id: customer.tax_id.clone(),
            confidence,
            matched_by,
        }
    }

    /// Resolve one row against the snapshot, same priority order as the
    /// candidate finder (plate is absent here: the snapshot holds
    /// customers, which carry no plate)
    fn resolve(&self, signals: &MatchSignals) -> MatchResult {
        if let Some(national_id) = &signals.national_id {
            if let Some(&guid) = self.by_national_id.get(national_id) {
                let candidate =
                    self.candidate(guid, MatchConfidence::Exact, MatchSignal::NationalId);
                return MatchResult {
                    customer_guid: Some(guid),
                    confidence: MatchConfidence::Exact,
                    matched_by: Some(MatchSignal::NationalId),
                    auto_created: false,
                    candidates: vec![candidate],
                };
            }
        }

        if let Some(tax_id) = &signals.tax_id {
            if let Some(&guid) = self.by_tax_id.get(tax_id) {
                let candidate = self.candidate(guid, MatchConfidence::High, MatchSignal::TaxId);
                return MatchResult {
                    customer_guid: Some(guid),
                    confidence: MatchConfidence::High,
                    matched_by: Some(MatchSignal::TaxId),
                    auto_created: false,
                    candidates: vec![candidate],
                };
            }
        }

        if let Some(name) = &signals.name {
            if let Some(guids) = self.by_name.get(&normalize_name(name)) {
                if !guids.is_empty() {
                    let confidence = if guids.len() == 1 {
                        MatchConfidence::Medium
                    } else {
                        MatchConfidence::Low
                    };
                    let candidates: Vec<MatchCandidate> = guids
                        .iter()
                        .map(|&g| self.candidate(g, confidence, MatchSignal::Name))
                        .collect();
                    return MatchResult {
                        customer_guid: Some(guids[0]),
                        confidence,
                        matched_by: Some(MatchSignal::Name),
                        auto_created: false,
                        candidates,
                    };
                }
            }
        }

        MatchResult::no_match()
    }
}

/// Batch Matcher
pub struct BatchMatcher {
    db: SqlitePool,
}

impl BatchMatcher {
    /// Create new batch matcher
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Match every row of an import batch for one tenant.
    ///
    /// Output order follows input order. A row with no candidate and at
    /// least one identifier or a name auto-creates a customer; a row with
    /// neither stays unmatched without creating an empty customer shell.
    /// Creation failures (uniqueness race) mark the row `confidence = None`
    /// with a per-row error and the batch continues.
    pub async fn batch_match(
        &self,
        tenant_id: &str,
        rows: Vec<RowSignals>,
    ) -> Result<Vec<RowMatch>> {
        let snapshot = customers::load_all_for_tenant(&self.db, tenant_id).await?;
        tracing::info!(
            tenant_id = %tenant_id,
            customer_count = snapshot.len(),
            row_count = rows.len(),
            "Batch match started"
        );
        let mut index = CustomerIndex::build(snapshot);

        let mut matches = Vec::with_capacity(rows.len());
        for row in rows {
            let signals = row.signals.normalized();
            let mut resolved = index.resolve(&signals);
            let mut error = None;

            if resolved.customer_guid.is_none() && has_creatable_identity(&signals) {
                match self.create_customer(tenant_id, &signals).await {
                    Ok(customer) => {
                        resolved.customer_guid = Some(customer.guid);
                        resolved.auto_created = true;
                        // Later rows in this batch must see the new customer
                        index.insert(customer);
                    }
                    Err(e) => {
                        let e = e.classify_unique_violation("customer creation failed");
                        tracing::warn!(
                            tenant_id = %tenant_id,
                            row_id = %row.row_id,
                            error = %e,
                            "Customer auto-creation failed, continuing batch"
                        );
                        resolved = MatchResult::no_match();
                        error = Some(e.to_string());
                    }
                }
            }

            matches.push(RowMatch {
                row_id: row.row_id,
                result: resolved,
                error,
            });
        }

        let created = matches.iter().filter(|m| m.result.auto_created).count();
        let failed = matches.iter().filter(|m| m.error.is_some()).count();
        tracing::info!(
            tenant_id = %tenant_id,
            matched = matches.len() - created - failed,
            created = created,
            failed = failed,
            "Batch match complete"
        );

        Ok(matches)
    }

    async fn create_customer(&self, tenant_id: &str, signals: &MatchSignals) -> Result<Customer> {
        let mut customer = Customer::new(tenant_id.to_string());
        customer.national_id = signals.national_id.clone();
        customer.tax_id = signals.tax_id.clone();
        if let Some(name) = &signals.name {
            let (first, last) = split_name(name);
            customer.first_name = first;
            customer.last_name = last;
        }
        customers::insert_customer(&self.db, &customer).await?;
        tracing::debug!(
            tenant_id = %tenant_id,
            customer_guid = %customer.guid,
            "Auto-created customer from import row"
        );
        Ok(customer)
    }
}

/// A row can justify a new customer only when it carries a concrete
/// identifier or at least a name
fn has_creatable_identity(signals: &MatchSignals) -> bool {
    signals.national_id.is_some() || signals.tax_id.is_some() || signals.name.is_some()
}

/// Split a free-text insured name into first/last: final token is the last
/// name, everything before it the first name(s). A single token becomes
/// the last name.
pub fn split_name(name: &str) -> (Option<String>, Option<String>) {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    match tokens.as_slice() {
        [] => (None, None),
        [single] => (None, Some((*single).to_string())),
        [first @ .., last] => (Some(first.join(" ")), Some((*last).to_string())),
    }
}
