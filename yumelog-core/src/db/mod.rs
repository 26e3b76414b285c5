//! Database access for the diary core
//!
//! One module per table, plus schema initialization. All tables use TEXT
//! guids and RFC 3339 timestamps.

pub mod dream_tags;
pub mod dreams;
pub mod init;
pub mod models;
pub mod tags;
pub mod users;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};

pub use init::init_database;

/// Parse a stored guid column. Corrupt guids indicate a broken database,
/// not bad user input.
pub(crate) fn parse_guid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| Error::Internal(format!("invalid guid in database: {e}")))
}

/// Parse a stored RFC 3339 timestamp column
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("invalid timestamp in database: {e}")))
}
