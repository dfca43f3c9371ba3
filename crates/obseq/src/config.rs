#![forbid(unsafe_code)]

//! Per-instance configuration.

use crate::error::{Result, SeqError};

/// Largest slot count a sequence accepts by default.
///
/// Matches the length limit of a 32-bit indexed array, so sparse writes such
/// as `set(usize::MAX, v)` fail instead of attempting a huge allocation.
pub const DEFAULT_MAX_LEN: usize = u32::MAX as usize;

/// Configuration for an [`ObservableSeq`](crate::ObservableSeq).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqConfig {
    /// Maximum number of slots. Growth past this fails with
    /// [`SeqError::InvalidArgument`].
    pub max_len: usize,
}

impl Default for SeqConfig {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl SeqConfig {
    /// Create a configuration with a custom length limit.
    #[must_use]
    pub const fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    /// Set the maximum number of slots.
    #[must_use]
    pub const fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Create an unlimited configuration (for testing).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self { max_len: usize::MAX }
    }

    /// Check that a sequence may hold `len` slots.
    pub(crate) fn check_len(&self, len: usize) -> Result<()> {
        if len > self.max_len {
            return Err(SeqError::invalid(format!(
                "length {len} exceeds maximum length {}",
                self.max_len
            )));
        }
        Ok(())
    }

    /// Check that `index` addresses a slot this sequence may hold.
    pub(crate) fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.max_len {
            return Err(SeqError::invalid(format!(
                "index {index} exceeds maximum length {}",
                self.max_len
            )));
        }
        Ok(())
    }
}
