//! Error types for tag resolution and root building.
use strata_ssz_hasher::HasherError;
use thiserror::Error;

use crate::value::HashRootError;

/// Errors from parsing size tags and evaluating spec expressions.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TagError {
    /// A tag entry that should be an integer was not.
    #[error("invalid size {0:?}")]
    InvalidNumber(String),

    /// A spec expression could not be parsed.
    #[error("invalid expression {expr:?}: {reason}")]
    InvalidExpression {
        /// The expression text.
        expr: String,
        /// What went wrong.
        reason: &'static str,
    },

    /// A spec expression divided by zero.
    #[error("division by zero in {0:?}")]
    DivisionByZero(String),

    /// A spec expression over- or underflowed `u64`.
    #[error("arithmetic overflow in {0:?}")]
    Overflow(String),
}

/// Errors from computing a hash tree root.
///
/// All of these abort the traversal, the buffer contents are unspecified
/// afterwards.
#[derive(Debug, Error)]
pub enum DynSszError {
    /// A value that has to be present was absent.
    #[error("nil value for {0}")]
    NilValue(String),

    /// The type has no hashing rule.
    #[error("unsupported type {0}")]
    UnsupportedType(String),

    /// A sequence nested in a sequence whose innermost elements are not bytes.
    #[error("unsupported nesting: non-byte sequence {0} in sequence")]
    UnsupportedNesting(String),

    /// A sequence element kind with no packing or hashing rule.
    #[error("unsupported sequence element {0}")]
    UnsupportedElement(String),

    /// The fast path compatibility check failed.
    #[error("failed checking hash compatibility of {ty}: {source}")]
    CompatibilityCheckFailed {
        /// Type being checked.
        ty: String,
        /// Underlying tag error.
        #[source]
        source: TagError,
    },

    /// A precompiled hash routine was invoked and failed.
    #[error("precompiled hash tree root of {ty} failed: {source}")]
    PrecompiledHashFailed {
        /// Type being hashed.
        ty: String,
        /// Error reported by the routine.
        #[source]
        source: HashRootError,
    },

    /// A field's size tags could not be resolved.
    #[error("invalid tags on field {field}: {source}")]
    FieldTags {
        /// Field name.
        field: String,
        /// Underlying tag error.
        #[source]
        source: TagError,
    },

    /// A value's contents do not match its descriptor.
    #[error("value of {ty} does not match its type: expected {expected}, found {found}")]
    ValueMismatch {
        /// Type being hashed.
        ty: String,
        /// Kind the descriptor expects.
        expected: &'static str,
        /// Kind of view the value produced.
        found: &'static str,
    },

    /// A struct value exposes a different number of fields than described.
    #[error("{ty} has {found} fields, expected {expected}")]
    FieldCountMismatch {
        /// Type being hashed.
        ty: String,
        /// Number of described fields.
        expected: usize,
        /// Number of fields in the value.
        found: usize,
    },

    /// The hash-tree buffer rejected an operation.
    #[error("hasher: {0}")]
    Hasher(#[from] HasherError),
}

/// Result type alias for root building.
pub type DynSszResult<T> = Result<T, DynSszError>;
