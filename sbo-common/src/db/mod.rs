//! Database access shared across SBO services
//!
//! Pool initialization plus the tenant-partitioned schema: the customer
//! store and the three record stores (captured, pooled, confirmed).

pub mod init;
pub mod models;

use crate::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Connects to the shared sbo.db in the root folder, creating it (and the
/// schema) on first run.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init::create_schema(&pool).await?;

    Ok(pool)
}
