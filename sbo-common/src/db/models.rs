//! Persistent entity models
//!
//! The authoritative customer entity plus the `RecordStore` enum naming
//! the three record-store tables.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authoritative customer entity, tenant-scoped.
///
/// Within one tenant at most one customer carries a given non-null
/// national ID; same for tax ID (enforced by partial unique indexes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub guid: Uuid,
    pub tenant_id: String,
    pub national_id: Option<String>,
    pub tax_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<String>,
    pub birth_place: Option<String>,
}

impl Customer {
    /// Create a new customer with a fresh surrogate key
    pub fn new(tenant_id: String) -> Self {
        Self {
            guid: Uuid::new_v4(),
            tenant_id,
            national_id: None,
            tax_id: None,
            first_name: None,
            last_name: None,
            phone: None,
            email: None,
            birth_date: None,
            birth_place: None,
        }
    }

    /// Display name assembled from first/last name, empty when both absent
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => String::new(),
        }
    }
}

/// The three sequential stages a raw insurance record passes through.
///
/// Cascade and migration queries are uniform across stores except for the
/// pooled store's extra reference; the enum keeps table names out of
/// caller-supplied strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStore {
    Captured,
    Pooled,
    Confirmed,
}

impl RecordStore {
    /// SQL table name for this store
    pub fn table_name(&self) -> &'static str {
        match self {
            RecordStore::Captured => "captured_records",
            RecordStore::Pooled => "pooled_records",
            RecordStore::Confirmed => "confirmed_records",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStore::Captured => "captured",
            RecordStore::Pooled => "pooled",
            RecordStore::Confirmed => "confirmed",
        }
    }

    /// All stores, in pipeline order
    pub fn all() -> [RecordStore; 3] {
        [
            RecordStore::Captured,
            RecordStore::Pooled,
            RecordStore::Confirmed,
        ]
    }
}

impl std::str::FromStr for RecordStore {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "captured" => Ok(RecordStore::Captured),
            "pooled" => Ok(RecordStore::Pooled),
            "confirmed" => Ok(RecordStore::Confirmed),
            other => Err(crate::Error::InvalidArgument(format!(
                "Unknown record store: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
