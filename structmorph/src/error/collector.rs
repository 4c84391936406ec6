//! Per-call accumulation of non-fatal failures.

use std::sync::Arc;

use super::MorphError;
use crate::MorphResult;

/// Accumulates errors across a loop without aborting it.
///
/// Map-to-struct copies, map-to-map copies and the merger record one entry
/// per failed key or field and report them together once iteration ends.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<Arc<MorphError>>,
}

impl ErrorCollector {
    /// Create an empty collector.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record the error from `result`, if any.
    pub fn attach<T>(&mut self, result: MorphResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(err);
                None
            }
        }
    }

    /// Record `err`.
    pub fn push(&mut self, err: MorphError) {
        self.errors.push(Arc::new(err));
    }

    /// Record `err`, flattening an aggregate into its causes.
    pub fn absorb(&mut self, err: MorphError) {
        match err {
            MorphError::Aggregate(causes) => self.errors.extend(*causes),
            other => self.push(other),
        }
    }

    /// Returns `true` when nothing has been recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Borrow the recorded causes.
    #[must_use]
    pub fn causes(&self) -> &[Arc<MorphError>] {
        &self.errors
    }

    /// Drop every recorded error.
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Consume the collector, yielding `Ok(())` or the combined error.
    ///
    /// # Errors
    ///
    /// Returns the single recorded error, or [`MorphError::Aggregate`] when
    /// more than one was recorded.
    pub fn finish(self) -> MorphResult<()> {
        MorphError::try_aggregate(self.errors).map_or(Ok(()), Err)
    }

    /// Build the combined error without consuming the collector.
    #[must_use]
    pub fn snapshot(&self) -> Option<MorphError> {
        MorphError::try_aggregate(self.errors.iter().cloned())
    }
}
