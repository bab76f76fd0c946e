//! Unified error types for the tracker core.
//!
//! Every fallible operation returns the crate-level [`Result`]. Failures are
//! terminal for the user action that triggered them; the persisted collections
//! are left in their last-good state.

use thiserror::Error;

/// All error conditions surfaced by the tracker core.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected input, surfaced synchronously with no partial mutation
    #[error("validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// Import payload not recognized as either supported shape
    #[error("unrecognized import payload: {message}")]
    Format {
        /// Why the payload could not be classified
        message: String,
    },

    /// Import payload parsed but yielded zero usable records
    #[error("import contained no usable records")]
    EmptyImport,

    /// An id-addressed operation targeted a need-list item that does not exist
    #[error("no item with id {id}")]
    ItemNotFound {
        /// The id that failed to resolve
        id: String,
    },

    /// An id-addressed operation targeted a history entry that does not exist
    #[error("no history entry with id {id}")]
    EntryNotFound {
        /// The id that failed to resolve
        id: String,
    },

    /// Underlying storage failure
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A stored record or outgoing payload failed to (de)serialize
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
