//! Error types for the reader core.
//!
//! The core distinguishes three failure kinds:
//! - [`SheetError::Source`]: the cell source failed (I/O, malformed input). Fatal to the split.
//! - [`SheetError::Conversion`]: a non-empty cell cannot be coerced into its column type.
//! - [`SheetError::InvalidState`]: an operation was called in the wrong lifecycle state.
//!
//! Nothing in the core retries or swallows these; re-scheduling a failed split is
//! the caller's job.

use crate::convert::ConversionError;
use crate::reader::ReaderState;

/// Result alias used across the core modules.
pub type Result<T> = std::result::Result<T, SheetError>;

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("cell source: {0}")]
    Source(#[from] std::io::Error),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("`{operation}` is not valid while the reader is {state}")]
    InvalidState {
        operation: &'static str,
        state: ReaderState,
    },
}

impl SheetError {
    pub(crate) fn invalid_state(operation: &'static str, state: ReaderState) -> Self {
        Self::InvalidState { operation, state }
    }

    /// Wrap a failure of a custom cell source, e.g. a parser error.
    pub fn source_failure<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Source(std::io::Error::other(err))
    }

    #[must_use]
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion(_))
    }

    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}
