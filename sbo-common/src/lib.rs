//! # SBO Common Library
//!
//! Shared code for SBO (insurance brokerage back office) services including:
//! - Error taxonomy and result type
//! - Database pool initialization and schema
//! - Persistent entity models (customers, record stores)
//! - Configuration loading and root folder resolution

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
