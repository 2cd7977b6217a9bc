//! Error types for the hash-tree buffer.

use thiserror::Error;

/// Errors from the hash-tree buffer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HasherError {
    /// More chunks were written than the declared limit allows.
    #[error("chunk count {count} exceeds limit {limit}")]
    LimitExceeded {
        /// Number of chunks present.
        count: u64,
        /// Chunk limit requested by the caller.
        limit: u64,
    },

    /// The buffer does not hold exactly one chunk when a root is requested.
    #[error("expected a single 32 byte root, buffer holds {0} bytes")]
    InvalidRootLength(usize),

    /// Bitlist was empty or its last byte had no delimiting bit.
    #[error("bitlist missing delimiter bit")]
    BitlistMissingDelimiter,
}
