//! The combined error reported when one copy or merge meets several failures.

use std::{error::Error, fmt, sync::Arc};

use super::MorphError;

/// Causes recorded by one copy or merge call, in the order they occurred.
///
/// Causes are shared so a [`Merger`](crate::Merger) can report the same
/// failures from every later `merge_to` until it is reset.
///
/// # Examples
///
/// ```
/// use structmorph::{ErrorCollector, MorphError};
///
/// let mut collector = ErrorCollector::new();
/// collector.push(MorphError::FieldNotFound { field: "Port".into(), owner: "Config".into() });
/// collector.push(MorphError::ConversionFailed { from: "string".into(), to: "i64".into() });
/// let err = collector.finish().unwrap_err();
/// assert!(matches!(&err, MorphError::Aggregate(causes) if causes.len() == 2));
/// ```
#[derive(Debug, Default)]
pub struct AggregatedErrors(Vec<Arc<MorphError>>);

impl AggregatedErrors {
    #[must_use]
    pub(crate) const fn new(causes: Vec<Arc<MorphError>>) -> Self {
        Self(causes)
    }

    /// Iterate over the causes.
    #[must_use = "iterators should be consumed to inspect errors"]
    pub fn iter(&self) -> impl Iterator<Item = &MorphError> {
        self.0.iter().map(Arc::as_ref)
    }

    /// Number of causes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when there are no causes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One numbered cause per line.
impl fmt::Display for AggregatedErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut causes = self.iter().enumerate();
        if let Some((_, first)) = causes.next() {
            write!(f, "1: {first}")?;
        }
        causes.try_for_each(|(i, cause)| write!(f, "\n{}: {cause}", i + 1))
    }
}

impl Error for AggregatedErrors {}

impl IntoIterator for AggregatedErrors {
    type Item = Arc<MorphError>;
    type IntoIter = std::vec::IntoIter<Arc<MorphError>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
