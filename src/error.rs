//! Error types for article-migrator.
//!
//! Only configuration problems and collaborator I/O failures surface as
//! errors. Pattern mismatches inside a page are warnings, see
//! [`crate::result::Warnings`].

/// Error type for migration operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required run configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The page could not be fetched (transport failure, not an empty body).
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Document store read or write failed.
    #[error("Document store error: {0}")]
    Store(String),

    /// Ledger table read or append failed.
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Redirect registration was rejected or could not be sent.
    #[error("Redirect registration failed: {0}")]
    Redirect(String),

    /// Filesystem I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Ledger row (de)serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// HTTP client failure.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, Error>;
