//! Record store queries (captured, pooled, confirmed)
//!
//! The three stores share identical identity columns, so reads and cascade
//! updates are parameterized by `RecordStore`; table names come from the
//! enum, never from caller input. The pooled store's contracting-party
//! reference has its own explicit migration function.

use sbo_common::db::models::RecordStore;
use sbo_common::{Error, Result};
use sqlx::{Row, SqliteExecutor, SqlitePool};
use uuid::Uuid;

/// Uniform identity view over one record in any store.
///
/// Matching and cascade only ever need these fields.
#[derive(Debug, Clone)]
pub struct RecordIdentity {
    pub guid: Uuid,
    pub tenant_id: String,
    pub customer_guid: Option<Uuid>,
    pub national_id: Option<String>,
    pub tax_id: Option<String>,
    pub insured_name: Option<String>,
    pub plate: Option<String>,
}

fn parse_guid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))
}

/// Load one record's identity fields within a tenant
pub async fn load_record(
    pool: &SqlitePool,
    store: RecordStore,
    tenant_id: &str,
    guid: Uuid,
) -> Result<Option<RecordIdentity>> {
    let row = sqlx::query(&format!(
        r#"
        SELECT guid, tenant_id, customer_guid, national_id, tax_id, insured_name, plate
        FROM {} WHERE tenant_id = ? AND guid = ?
        "#,
        store.table_name()
    ))
    .bind(tenant_id)
    .bind(guid.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.get("guid");
            let customer_str: Option<String> = row.get("customer_guid");
            Ok(Some(RecordIdentity {
                guid: parse_guid(&guid_str)?,
                tenant_id: row.get("tenant_id"),
                customer_guid: customer_str.as_deref().map(parse_guid).transpose()?,
                national_id: row.get("national_id"),
                tax_id: row.get("tax_id"),
                insured_name: row.get("insured_name"),
                plate: row.get("plate"),
            }))
        }
        None => Ok(None),
    }
}

/// Write identifiers onto a record's raw fields.
///
/// Fields the caller left empty keep their stored value; COALESCE keeps the
/// update a single statement.
pub async fn write_identifiers(
    executor: impl SqliteExecutor<'_>,
    store: RecordStore,
    tenant_id: &str,
    guid: Uuid,
    national_id: Option<&str>,
    tax_id: Option<&str>,
) -> Result<()> {
    sqlx::query(&format!(
        r#"
        UPDATE {} SET
            national_id = COALESCE(?, national_id),
            tax_id = COALESCE(?, tax_id),
            updated_at = CURRENT_TIMESTAMP
        WHERE tenant_id = ? AND guid = ?
        "#,
        store.table_name()
    ))
    .bind(national_id)
    .bind(tax_id)
    .bind(tenant_id)
    .bind(guid.to_string())
    .execute(executor)
    .await?;

    Ok(())
}

/// Set a record's customer reference
pub async fn set_customer(
    executor: impl SqliteExecutor<'_>,
    store: RecordStore,
    tenant_id: &str,
    guid: Uuid,
    customer_guid: Uuid,
) -> Result<()> {
    sqlx::query(&format!(
        r#"
        UPDATE {} SET customer_guid = ?, updated_at = CURRENT_TIMESTAMP
        WHERE tenant_id = ? AND guid = ?
        "#,
        store.table_name()
    ))
    .bind(customer_guid.to_string())
    .bind(tenant_id)
    .bind(guid.to_string())
    .execute(executor)
    .await?;

    Ok(())
}

/// Which raw identifier column a cascade matches against
#[derive(Debug, Clone, Copy)]
pub enum IdentifierColumn {
    NationalId,
    TaxId,
}

impl IdentifierColumn {
    fn column_name(&self) -> &'static str {
        match self {
            IdentifierColumn::NationalId => "national_id",
            IdentifierColumn::TaxId => "tax_id",
        }
    }
}

/// Cascade a resolved customer to unresolved sibling records.
///
/// Only rows with `customer_guid IS NULL` are touched — a resolved record
/// reflects a human or prior-process decision and must keep it. The guid
/// guard excludes the assignment target itself. Returns the number of rows
/// updated.
pub async fn cascade_customer(
    executor: impl SqliteExecutor<'_>,
    store: RecordStore,
    tenant_id: &str,
    column: IdentifierColumn,
    identifier: &str,
    customer_guid: Uuid,
    exclude_guid: Uuid,
) -> Result<u64> {
    let result = sqlx::query(&format!(
        r#"
        UPDATE {table} SET customer_guid = ?, updated_at = CURRENT_TIMESTAMP
        WHERE tenant_id = ?
          AND {column} = ?
          AND customer_guid IS NULL
          AND guid != ?
        "#,
        table = store.table_name(),
        column = column.column_name(),
    ))
    .bind(customer_guid.to_string())
    .bind(tenant_id)
    .bind(identifier)
    .bind(exclude_guid.to_string())
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Rewrite insured-party references from one customer to another.
///
/// Returns the number of rows rewritten (the per-store audit count merge
/// reports).
pub async fn migrate_customer_refs(
    executor: impl SqliteExecutor<'_>,
    store: RecordStore,
    tenant_id: &str,
    from: Uuid,
    to: Uuid,
) -> Result<u64> {
    let result = sqlx::query(&format!(
        r#"
        UPDATE {} SET customer_guid = ?, updated_at = CURRENT_TIMESTAMP
        WHERE tenant_id = ? AND customer_guid = ?
        "#,
        store.table_name()
    ))
    .bind(to.to_string())
    .bind(tenant_id)
    .bind(from.to_string())
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Rewrite the pooled store's contracting-party references
pub async fn migrate_contracting_refs(
    executor: impl SqliteExecutor<'_>,
    tenant_id: &str,
    from: Uuid,
    to: Uuid,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE pooled_records SET contracting_customer_guid = ?, updated_at = CURRENT_TIMESTAMP
        WHERE tenant_id = ? AND contracting_customer_guid = ?
        "#,
    )
    .bind(to.to_string())
    .bind(tenant_id)
    .bind(from.to_string())
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Find the customer a plate was most recently resolved to.
///
/// Customers carry no plate of their own; a plate only identifies a
/// customer through a record that was already resolved with it. Scans the
/// confirmed store (the ledger) within the tenant.
pub async fn find_resolved_customer_by_plate(
    pool: &SqlitePool,
    tenant_id: &str,
    plate: &str,
) -> Result<Option<Uuid>> {
    let guid: Option<String> = sqlx::query_scalar(
        r#"
        SELECT customer_guid FROM confirmed_records
        WHERE tenant_id = ? AND plate = ? AND customer_guid IS NOT NULL
        ORDER BY updated_at DESC
        LIMIT 1
        "#,
    )
    .bind(tenant_id)
    .bind(plate)
    .fetch_optional(pool)
    .await?;

    guid.as_deref().map(parse_guid).transpose()
}

/// Count rows in a store still referencing a customer (merge audits, tests)
pub async fn count_customer_refs(
    pool: &SqlitePool,
    store: RecordStore,
    tenant_id: &str,
    customer_guid: Uuid,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {} WHERE tenant_id = ? AND customer_guid = ?",
        store.table_name()
    ))
    .bind(tenant_id)
    .bind(customer_guid.to_string())
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbo_common::db::init::create_schema;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        pool
    }

    async fn insert_record(
        pool: &SqlitePool,
        store: RecordStore,
        guid: Uuid,
        tenant_id: &str,
        national_id: Option<&str>,
        customer_guid: Option<Uuid>,
    ) {
        sqlx::query(&format!(
            r#"
            INSERT INTO {} (guid, tenant_id, customer_guid, national_id)
            VALUES (?, ?, ?, ?)
            "#,
            store.table_name()
        ))
        .bind(guid.to_string())
        .bind(tenant_id)
        .bind(customer_guid.map(|c| c.to_string()))
        .bind(national_id)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn load_record_is_tenant_scoped() {
        let pool = setup_test_db().await;
        let guid = Uuid::new_v4();
        insert_record(&pool, RecordStore::Confirmed, guid, "t1", Some("111"), None).await;

        let found = load_record(&pool, RecordStore::Confirmed, "t1", guid)
            .await
            .unwrap();
        assert!(found.is_some());

        let other_tenant = load_record(&pool, RecordStore::Confirmed, "t2", guid)
            .await
            .unwrap();
        assert!(other_tenant.is_none());
    }

    #[tokio::test]
    async fn write_identifiers_preserves_omitted_fields() {
        let pool = setup_test_db().await;
        let guid = Uuid::new_v4();
        insert_record(&pool, RecordStore::Captured, guid, "t1", Some("111"), None).await;

        // Supply only tax_id; national_id must survive
        write_identifiers(&pool, RecordStore::Captured, "t1", guid, None, Some("222"))
            .await
            .unwrap();

        let record = load_record(&pool, RecordStore::Captured, "t1", guid)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.national_id.as_deref(), Some("111"));
        assert_eq!(record.tax_id.as_deref(), Some("222"));
    }

    #[tokio::test]
    async fn cascade_skips_resolved_records_and_target() {
        let pool = setup_test_db().await;
        let customer = Uuid::new_v4();
        let prior_customer = Uuid::new_v4();
        let target = Uuid::new_v4();
        let sibling = Uuid::new_v4();
        let resolved = Uuid::new_v4();
        let other_tenant = Uuid::new_v4();

        let store = RecordStore::Confirmed;
        insert_record(&pool, store, target, "t1", Some("111"), None).await;
        insert_record(&pool, store, sibling, "t1", Some("111"), None).await;
        insert_record(&pool, store, resolved, "t1", Some("111"), Some(prior_customer)).await;
        insert_record(&pool, store, other_tenant, "t2", Some("111"), None).await;

        let updated = cascade_customer(
            &pool,
            store,
            "t1",
            IdentifierColumn::NationalId,
            "111",
            customer,
            target,
        )
        .await
        .unwrap();

        // Only the unresolved sibling in the same tenant
        assert_eq!(updated, 1);

        let sibling_row = load_record(&pool, store, "t1", sibling)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sibling_row.customer_guid, Some(customer));

        // Prior decision untouched
        let resolved_row = load_record(&pool, store, "t1", resolved)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved_row.customer_guid, Some(prior_customer));

        // Other tenant untouched
        let foreign_row = load_record(&pool, store, "t2", other_tenant)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(foreign_row.customer_guid, None);
    }

    #[tokio::test]
    async fn migrate_rewrites_only_matching_refs() {
        let pool = setup_test_db().await;
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();
        let keep = Uuid::new_v4();

        let r1 = Uuid::new_v4();
        let r2 = Uuid::new_v4();
        let r3 = Uuid::new_v4();
        insert_record(&pool, RecordStore::Pooled, r1, "t1", None, Some(from)).await;
        insert_record(&pool, RecordStore::Pooled, r2, "t1", None, Some(keep)).await;
        insert_record(&pool, RecordStore::Pooled, r3, "t1", None, Some(from)).await;

        let moved = migrate_customer_refs(&pool, RecordStore::Pooled, "t1", from, to)
            .await
            .unwrap();
        assert_eq!(moved, 2);

        assert_eq!(
            count_customer_refs(&pool, RecordStore::Pooled, "t1", from)
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            count_customer_refs(&pool, RecordStore::Pooled, "t1", to)
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            count_customer_refs(&pool, RecordStore::Pooled, "t1", keep)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn contracting_refs_migrate_independently() {
        let pool = setup_test_db().await;
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();
        let insured = Uuid::new_v4();
        let record = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO pooled_records (guid, tenant_id, customer_guid, contracting_customer_guid)
            VALUES (?, 't1', ?, ?)
            "#,
        )
        .bind(record.to_string())
        .bind(insured.to_string())
        .bind(from.to_string())
        .execute(&pool)
        .await
        .unwrap();

        let moved = migrate_contracting_refs(&pool, "t1", from, to).await.unwrap();
        assert_eq!(moved, 1);

        // Insured reference untouched
        let (customer, contracting): (String, String) = sqlx::query_as(
            "SELECT customer_guid, contracting_customer_guid FROM pooled_records WHERE guid = ?",
        )
        .bind(record.to_string())
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(customer, insured.to_string());
        assert_eq!(contracting, to.to_string());
    }
}
