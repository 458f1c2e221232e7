//! Unified error types for the crate.
//!
//! Business-rule rejections (bad amount, expired deadline, sold-out tier) are not
//! errors: the transaction engine reports those as the rejected arm of
//! [`PledgeResult`](crate::core::pledge::PledgeResult). This enum covers the
//! failures that abort an operation outright - storage I/O, configuration, and
//! records that cannot be located for an update.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of what went wrong
        message: String,
    },

    /// Underlying file I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read or write failure from the record store.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A persisted row could not be decoded into its entity.
    ///
    /// Collection loads skip-and-log these rather than failing, but the decode
    /// helpers still report them individually.
    #[error("Malformed record in {file}: {message}")]
    MalformedRecord {
        /// Collection file the row came from
        file: &'static str,
        /// What failed to parse
        message: String,
    },

    /// An `update` targeted a primary key that is not present in the collection.
    #[error("Record {id} not found in {file}")]
    RecordNotFound {
        /// Collection file that was searched
        file: &'static str,
        /// Primary key that was not found
        id: String,
    },
}

// Convenience `Result` type
/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
