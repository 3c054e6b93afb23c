//! Identity Assignment & Cascade
//!
//! Writes an operator-supplied identifier onto one record, resolves the
//! record to a customer, then propagates that identity to unresolved
//! sibling records in the same store and tenant sharing the identifier.
//! Target update, customer creation, and cascade commit as one
//! transaction; a failure anywhere rolls everything back.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::{customers, records};
use crate::db::records::IdentifierColumn;
use crate::services::batch_matcher::split_name;
use crate::services::match_resolver::MatchResolver;
use crate::types::{normalize_signal, MatchSignals};
use sbo_common::db::models::{Customer, RecordStore};
use sbo_common::{Error, Result};

/// Outcome of one assignment
#[derive(Debug, Clone, serde::Serialize)]
pub struct AssignmentOutcome {
    pub customer_guid: Uuid,
    pub auto_created: bool,
    /// Sibling records the identity was propagated to
    pub cascade_count: u64,
}

/// One item of a batch assignment
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AssignmentItem {
    pub record_guid: Uuid,
    pub national_id: Option<String>,
    pub tax_id: Option<String>,
}

/// Aggregate outcome of a batch assignment
#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchAssignmentOutcome {
    pub success_count: usize,
    pub failed_count: usize,
    pub cascade_updated: u64,
    /// Per-item failures, `"id {record}: {error}"`, in input order
    pub errors: Vec<String>,
}

/// Identity Assigner
pub struct IdentityAssigner {
    db: SqlitePool,
    resolver: MatchResolver,
}

impl IdentityAssigner {
    /// Create new identity assigner
    pub fn new(db: SqlitePool) -> Self {
        Self {
            resolver: MatchResolver::new(db.clone()),
            db,
        }
    }

    /// Assign an identity to one record and cascade it to unresolved
    /// siblings.
    ///
    /// At least one of `national_id`/`tax_id` must be non-blank. The
    /// supplied identifiers are trimmed and written onto the record
    /// (omitted fields keep their stored values), the record is resolved
    /// using the full signal set, and every unresolved record in the same
    /// store and tenant with an equal identifier adopts the resolved
    /// customer. Idempotent: a second identical call reports
    /// `cascade_count = 0` because all siblings are already resolved.
    pub async fn assign_identity(
        &self,
        tenant_id: &str,
        store: RecordStore,
        record_guid: Uuid,
        national_id: Option<String>,
        tax_id: Option<String>,
    ) -> Result<AssignmentOutcome> {
        let national_id = normalize_signal(national_id);
        let tax_id = normalize_signal(tax_id);
        if national_id.is_none() && tax_id.is_none() {
            return Err(Error::InvalidArgument(
                "at least one of national ID or tax ID must be supplied".to_string(),
            ));
        }

        let record = records::load_record(&self.db, store, tenant_id, record_guid)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("record {} in {} store", record_guid, store))
            })?;

        // Full signal set: supplied identifiers win over stored ones;
        // name and plate come from the record
        let signals = MatchSignals::new(
            national_id.clone().or(record.national_id.clone()),
            tax_id.clone().or(record.tax_id.clone()),
            record.insured_name.clone(),
            record.plate.clone(),
        );

        let resolution = self.resolver.resolve(tenant_id, &signals).await?;
        let (customer_guid, new_customer, auto_created) = match resolution.customer_guid {
            Some(guid) => (guid, None, false),
            None => {
                // The operator supplied a concrete identifier, so creating
                // the customer here is explicit, not phantom
                let mut customer = Customer::new(tenant_id.to_string());
                customer.national_id = national_id.clone();
                customer.tax_id = tax_id.clone();
                if let Some(name) = &record.insured_name {
                    let (first, last) = split_name(name);
                    customer.first_name = first;
                    customer.last_name = last;
                }
                (customer.guid, Some(customer), true)
            }
        };

        // Single transaction: target update, optional creation, cascade
        let mut tx = self.db.begin().await?;

        if let Some(customer) = &new_customer {
            customers::insert_customer(&mut *tx, customer)
                .await
                .map_err(|e| e.classify_unique_violation("customer creation failed"))?;
        }

        records::write_identifiers(
            &mut *tx,
            store,
            tenant_id,
            record_guid,
            national_id.as_deref(),
            tax_id.as_deref(),
        )
        .await?;

        records::set_customer(&mut *tx, store, tenant_id, record_guid, customer_guid).await?;

        let mut cascade_count = 0u64;
        if let Some(national_id) = &national_id {
            cascade_count += records::cascade_customer(
                &mut *tx,
                store,
                tenant_id,
                IdentifierColumn::NationalId,
                national_id,
                customer_guid,
                record_guid,
            )
            .await?;
        }
        if let Some(tax_id) = &tax_id {
            cascade_count += records::cascade_customer(
                &mut *tx,
                store,
                tenant_id,
                IdentifierColumn::TaxId,
                tax_id,
                customer_guid,
                record_guid,
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            store = %store,
            record_guid = %record_guid,
            customer_guid = %customer_guid,
            auto_created = auto_created,
            cascade_count = cascade_count,
            "Identity assigned"
        );

        Ok(AssignmentOutcome {
            customer_guid,
            auto_created,
            cascade_count,
        })
    }

    /// Assign identities to many records, isolating per-item failures.
    ///
    /// Sequential by design; error strings keep input order so batch
    /// output is reproducible.
    pub async fn assign_identities(
        &self,
        tenant_id: &str,
        store: RecordStore,
        items: Vec<AssignmentItem>,
    ) -> BatchAssignmentOutcome {
        let mut outcome = BatchAssignmentOutcome {
            success_count: 0,
            failed_count: 0,
            cascade_updated: 0,
            errors: Vec::new(),
        };

        for item in items {
            match self
                .assign_identity(
                    tenant_id,
                    store,
                    item.record_guid,
                    item.national_id,
                    item.tax_id,
                )
                .await
            {
                Ok(result) => {
                    outcome.success_count += 1;
                    outcome.cascade_updated += result.cascade_count;
                }
                Err(e) => {
                    outcome.failed_count += 1;
                    outcome.errors.push(format!("id {}: {}", item.record_guid, e));
                }
            }
        }

        tracing::info!(
            tenant_id = %tenant_id,
            store = %store,
            succeeded = outcome.success_count,
            failed = outcome.failed_count,
            cascade_updated = outcome.cascade_updated,
            "Batch identity assignment complete"
        );

        outcome
    }
}
