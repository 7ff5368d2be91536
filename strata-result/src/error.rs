use std::fmt;

use thiserror::Error;

/// Unified error type for the Strata client crates.
///
/// Every fallible operation in the client returns this type. The partition
/// pruner raises all of its failures synchronously while it is being
/// constructed; once built, iteration over partition key ranges is
/// infallible.
#[derive(Error, Debug)]
pub enum Error {
    /// The partition schema does not agree with the table schema.
    ///
    /// Raised when a hash or range component names a column id that is absent
    /// from the table schema, references a non-key column, or overlaps with
    /// another component. This is a fatal configuration error: the table
    /// metadata handed to the client is inconsistent and no scan against it
    /// can be planned.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Invalid user input or API parameter.
    ///
    /// This error indicates a problem with arguments passed to client APIs:
    /// - A value whose type does not match the target column
    /// - Raw value bytes of the wrong length for a fixed-width column
    /// - A hash component with fewer than two buckets or no columns
    /// - A schema with duplicate column names or ids
    ///
    /// These errors are recoverable: fix the input and retry the operation.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// Internal error indicating a bug or unexpected state.
    ///
    /// This error should never occur during normal operation. It indicates a
    /// violated internal invariant, such as a range partition column that was
    /// left unset before key encoding. If you encounter this error, it likely
    /// indicates a bug in Strata that should be reported.
    #[error("An internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Create a schema mismatch error from any displayable value.
    #[inline]
    pub fn schema_mismatch<E: fmt::Display>(err: E) -> Self {
        Error::SchemaMismatch(err.to_string())
    }

    /// Create an invalid argument error from any displayable value.
    #[inline]
    pub fn invalid_argument<E: fmt::Display>(err: E) -> Self {
        Error::InvalidArgumentError(err.to_string())
    }
}
