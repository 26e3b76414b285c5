//! Common error types for the yumelog core

use thiserror::Error;

/// Common result type for yumelog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the diary core.
///
/// All domain operations return these as explicit results; nothing in the
/// core is expected to panic past its boundary.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested record does not exist, or belongs to another user.
    /// The two cases are intentionally indistinguishable to the caller.
    #[error("Not found: {0}")]
    NotFound(String),

    /// One or more fields failed a declared constraint. Carries every
    /// violated field message, not just the first.
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Unexpected failure while attaching or replacing tags on a dream.
    /// Always aborts the enclosing write transaction.
    #[error("Tag reconciliation failed: {0}")]
    Reconciliation(String),

    /// Unexpected failure during overflow fragment extraction
    #[error("Fragment sampling failed: {0}")]
    Sampling(String),

    /// Internal invariant violation (e.g. corrupt stored data)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Single-message validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(vec![message.into()])
    }

    /// Generic not-found message for ownership-scoped lookups
    pub fn not_found(what: &str) -> Self {
        Error::NotFound(format!("{what} not found"))
    }
}
