//! Schema creation for the customer store and the three record stores
//!
//! All tables are tenant-partitioned via `tenant_id`. Every statement is
//! idempotent (`IF NOT EXISTS`) so services can share one database file.

use crate::Result;
use sqlx::SqlitePool;

/// Create all tables and indexes if they don't exist
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_customers_table(pool).await?;
    create_record_store_table(pool, "captured_records", false).await?;
    create_record_store_table(pool, "pooled_records", true).await?;
    create_record_store_table(pool, "confirmed_records", false).await?;

    tracing::info!("Database schema initialized (customers, captured/pooled/confirmed records)");

    Ok(())
}

/// Create the authoritative customer table
///
/// Partial unique indexes enforce the invariant that within one tenant at
/// most one customer carries a given non-null national ID or tax ID.
/// Concurrent identical auto-creates therefore surface as a uniqueness
/// violation on the second insert rather than a silent duplicate.
pub async fn create_customers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS customers (
            guid TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            national_id TEXT,
            tax_id TEXT,
            first_name TEXT,
            last_name TEXT,
            phone TEXT,
            email TEXT,
            birth_date TEXT,
            birth_place TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_customers_tenant_national_id
        ON customers (tenant_id, national_id)
        WHERE national_id IS NOT NULL
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_customers_tenant_tax_id
        ON customers (tenant_id, tax_id)
        WHERE tax_id IS NOT NULL
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_customers_tenant ON customers (tenant_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create one record-store table (captured, pooled, or confirmed)
///
/// All three share the same identity columns; the pooled store alone
/// carries a second customer-like reference for the contracting party.
async fn create_record_store_table(
    pool: &SqlitePool,
    table: &str,
    with_contracting_party: bool,
) -> Result<()> {
    let contracting_column = if with_contracting_party {
        "contracting_customer_guid TEXT,"
    } else {
        ""
    };

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            guid TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            customer_guid TEXT,
            {contracting_column}
            national_id TEXT,
            tax_id TEXT,
            insured_name TEXT,
            plate TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_tenant_national_id ON {table} (tenant_id, national_id)"
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_tenant_tax_id ON {table} (tenant_id, tax_id)"
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_tenant_customer ON {table} (tenant_id, customer_guid)"
    ))
    .execute(pool)
    .await?;

    Ok(())
}
