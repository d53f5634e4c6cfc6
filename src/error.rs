//! Error types for the cell model
//!
//! Only caller precondition violations surface as `Error`. Broken geometric
//! invariants (a point escaping the covered domain, a bucket index outside the
//! lattice) are programming defects and panic instead.

use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid caller-supplied parameter (lengths, ranges, non-finite values).
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Malformed or unreadable configuration document.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
