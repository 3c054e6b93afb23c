//! Customer store queries
//!
//! All lookups filter by tenant; nothing here ever reads across tenants.

use sbo_common::db::models::Customer;
use sbo_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteExecutor, SqlitePool};
use uuid::Uuid;

const CUSTOMER_COLUMNS: &str = "guid, tenant_id, national_id, tax_id, first_name, last_name, \
                                phone, email, birth_date, birth_place";

/// Map one customers row into the model
fn customer_from_row(row: &SqliteRow) -> Result<Customer> {
    let guid_str: String = row.get("guid");
    let guid = Uuid::parse_str(&guid_str)
        .map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))?;

    Ok(Customer {
        guid,
        tenant_id: row.get("tenant_id"),
        national_id: row.get("national_id"),
        tax_id: row.get("tax_id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        phone: row.get("phone"),
        email: row.get("email"),
        birth_date: row.get("birth_date"),
        birth_place: row.get("birth_place"),
    })
}

/// Insert a new customer
pub async fn insert_customer(
    executor: impl SqliteExecutor<'_>,
    customer: &Customer,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO customers
            (guid, tenant_id, national_id, tax_id, first_name, last_name,
             phone, email, birth_date, birth_place, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(customer.guid.to_string())
    .bind(&customer.tenant_id)
    .bind(&customer.national_id)
    .bind(&customer.tax_id)
    .bind(&customer.first_name)
    .bind(&customer.last_name)
    .bind(&customer.phone)
    .bind(&customer.email)
    .bind(&customer.birth_date)
    .bind(&customer.birth_place)
    .execute(executor)
    .await?;

    Ok(())
}

/// Load one customer by guid within a tenant
pub async fn load_customer(
    pool: &SqlitePool,
    tenant_id: &str,
    guid: Uuid,
) -> Result<Option<Customer>> {
    let row = sqlx::query(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE tenant_id = ? AND guid = ?"
    ))
    .bind(tenant_id)
    .bind(guid.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(customer_from_row).transpose()
}

/// Load one customer by guid regardless of tenant.
///
/// Only the merge precondition check uses this, to distinguish
/// "does not exist" (NotFound) from "exists in another tenant" (Forbidden).
pub async fn load_customer_any_tenant(
    pool: &SqlitePool,
    guid: Uuid,
) -> Result<Option<Customer>> {
    let row = sqlx::query(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE guid = ?"
    ))
    .bind(guid.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(customer_from_row).transpose()
}

/// Exact national-ID lookup within a tenant
pub async fn find_by_national_id(
    pool: &SqlitePool,
    tenant_id: &str,
    national_id: &str,
) -> Result<Option<Customer>> {
    let row = sqlx::query(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE tenant_id = ? AND national_id = ?"
    ))
    .bind(tenant_id)
    .bind(national_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(customer_from_row).transpose()
}

/// Exact tax-ID lookup within a tenant
pub async fn find_by_tax_id(
    pool: &SqlitePool,
    tenant_id: &str,
    tax_id: &str,
) -> Result<Option<Customer>> {
    let row = sqlx::query(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE tenant_id = ? AND tax_id = ?"
    ))
    .bind(tenant_id)
    .bind(tax_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(customer_from_row).transpose()
}

/// Substring search against first or last name, capped at `limit`
pub async fn search_by_name(
    pool: &SqlitePool,
    tenant_id: &str,
    name: &str,
    limit: u32,
) -> Result<Vec<Customer>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {CUSTOMER_COLUMNS} FROM customers
        WHERE tenant_id = ?
          AND (first_name LIKE '%' || ? || '%' OR last_name LIKE '%' || ? || '%')
        ORDER BY last_name, first_name
        LIMIT ?
        "#
    ))
    .bind(tenant_id)
    .bind(name)
    .bind(name)
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    rows.iter().map(customer_from_row).collect()
}

/// Load a tenant's full customer set (batch-match snapshot)
pub async fn load_all_for_tenant(pool: &SqlitePool, tenant_id: &str) -> Result<Vec<Customer>> {
    let rows = sqlx::query(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE tenant_id = ?"
    ))
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(customer_from_row).collect()
}

/// Write back a customer's mergeable attributes (merge backfill)
pub async fn update_customer_fields(
    executor: impl SqliteExecutor<'_>,
    customer: &Customer,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE customers SET
            national_id = ?,
            tax_id = ?,
            first_name = ?,
            last_name = ?,
            phone = ?,
            email = ?,
            birth_date = ?,
            birth_place = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE tenant_id = ? AND guid = ?
        "#,
    )
    .bind(&customer.national_id)
    .bind(&customer.tax_id)
    .bind(&customer.first_name)
    .bind(&customer.last_name)
    .bind(&customer.phone)
    .bind(&customer.email)
    .bind(&customer.birth_date)
    .bind(&customer.birth_place)
    .bind(&customer.tenant_id)
    .bind(customer.guid.to_string())
    .execute(executor)
    .await?;

    Ok(())
}

/// Delete a customer row (merge secondary side only)
pub async fn delete_customer(
    executor: impl SqliteExecutor<'_>,
    tenant_id: &str,
    guid: Uuid,
) -> Result<()> {
    sqlx::query("DELETE FROM customers WHERE tenant_id = ? AND guid = ?")
        .bind(tenant_id)
        .bind(guid.to_string())
        .execute(executor)
        .await?;

    Ok(())
}
