//! Customer Merge
//!
//! Folds a duplicate customer into a primary one: blank-only field
//! backfill, reference migration across all three record stores, then
//! deletion of the secondary row — all in one transaction, so the
//! secondary can never be deleted while references still point at it.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::{customers, records};
use sbo_common::db::models::{Customer, RecordStore};
use sbo_common::{Error, Result};

/// Per-store audit counts of rewritten references
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MergeOutcome {
    /// Confirmed-store (policy ledger) rows rewritten
    pub confirmed_updated: u64,
    /// Pooled-store insured-party rows rewritten
    pub pooled_updated: u64,
    /// Captured-store rows rewritten
    pub captured_updated: u64,
}

/// Customer Merger
pub struct CustomerMerger {
    db: SqlitePool,
}

impl CustomerMerger {
    /// Create new customer merger
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Merge `secondary` into `primary` within one tenant.
    ///
    /// Field policy: each mergeable attribute is copied from secondary only
    /// where primary's value is NULL or blank; primary's non-blank values
    /// always survive, including when both sides differ. Every record
    /// reference to the secondary (insured party in all three stores, plus
    /// the pooled store's contracting party) is rewritten to the primary,
    /// then the secondary row is deleted. One transaction end to end.
    pub async fn merge(
        &self,
        tenant_id: &str,
        primary_guid: Uuid,
        secondary_guid: Uuid,
    ) -> Result<MergeOutcome> {
        if primary_guid == secondary_guid {
            return Err(Error::InvalidArgument(
                "a customer cannot be merged with itself".to_string(),
            ));
        }

        let primary = self.load_tenant_checked(tenant_id, primary_guid).await?;
        let secondary = self.load_tenant_checked(tenant_id, secondary_guid).await?;

        let reconciled = backfill_fields(primary, &secondary);

        let mut tx = self.db.begin().await?;

        let confirmed_updated = records::migrate_customer_refs(
            &mut *tx,
            RecordStore::Confirmed,
            tenant_id,
            secondary_guid,
            primary_guid,
        )
        .await?;
        let pooled_updated = records::migrate_customer_refs(
            &mut *tx,
            RecordStore::Pooled,
            tenant_id,
            secondary_guid,
            primary_guid,
        )
        .await?;
        let contracting_updated =
            records::migrate_contracting_refs(&mut *tx, tenant_id, secondary_guid, primary_guid)
                .await?;
        let captured_updated = records::migrate_customer_refs(
            &mut *tx,
            RecordStore::Captured,
            tenant_id,
            secondary_guid,
            primary_guid,
        )
        .await?;

        // Delete the secondary before the backfill lands: SQLite enforces
        // the (tenant_id, national_id) unique index immediately, and the
        // backfilled identifier must never have two holders inside the
        // transaction
        customers::delete_customer(&mut *tx, tenant_id, secondary_guid).await?;

        customers::update_customer_fields(&mut *tx, &reconciled).await?;

        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            primary = %primary_guid,
            secondary = %secondary_guid,
            confirmed_updated = confirmed_updated,
            pooled_updated = pooled_updated,
            contracting_updated = contracting_updated,
            captured_updated = captured_updated,
            "Customers merged"
        );

        Ok(MergeOutcome {
            confirmed_updated,
            pooled_updated,
            captured_updated,
        })
    }

    /// Load a customer, distinguishing missing from cross-tenant.
    ///
    /// A guid that exists under another tenant is a tenant-boundary
    /// violation, logged as security-relevant.
    async fn load_tenant_checked(&self, tenant_id: &str, guid: Uuid) -> Result<Customer> {
        let customer = customers::load_customer_any_tenant(&self.db, guid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("customer {}", guid)))?;

        if customer.tenant_id != tenant_id {
            tracing::warn!(
                tenant_id = %tenant_id,
                customer_guid = %guid,
                "Merge attempted on customer belonging to another tenant"
            );
            return Err(Error::Forbidden(format!(
                "customer {} belongs to another tenant",
                guid
            )));
        }

        Ok(customer)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Copy each mergeable attribute from secondary into primary only where
/// primary is blank
fn backfill_fields(mut primary: Customer, secondary: &Customer) -> Customer {
    let pairs: [(&mut Option<String>, &Option<String>); 8] = [
        (&mut primary.national_id, &secondary.national_id),
        (&mut primary.tax_id, &secondary.tax_id),
        (&mut primary.first_name, &secondary.first_name),
        (&mut primary.last_name, &secondary.last_name),
        (&mut primary.phone, &secondary.phone),
        (&mut primary.email, &secondary.email),
        (&mut primary.birth_date, &secondary.birth_date),
        (&mut primary.birth_place, &secondary.birth_place),
    ];
    for (target, source) in pairs {
        if is_blank(target) && !is_blank(source) {
            *target = source.clone();
        }
    }
    primary
}
