//! Constructors for `MorphError` naming the types and fields involved.

use std::sync::Arc;

use super::{AggregatedErrors, MorphError};
use crate::value::Type;

impl MorphError {
    /// Combine recorded errors into one.
    ///
    /// Returns `None` for no errors. A single error is returned as is unless
    /// its [`Arc`] is shared elsewhere, in which case it is wrapped in a
    /// one-cause [`Self::Aggregate`]. Two or more become an aggregate.
    #[must_use]
    pub fn try_aggregate<I, E>(errors: I) -> Option<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Self>>,
    {
        let mut causes: Vec<Arc<Self>> = errors.into_iter().map(Into::into).collect();
        match causes.len() {
            0 => None,
            1 => causes.pop().map(|only| {
                Arc::try_unwrap(only).unwrap_or_else(|shared| {
                    Self::Aggregate(Box::new(AggregatedErrors::new(vec![shared])))
                })
            }),
            _ => Some(Self::Aggregate(Box::new(AggregatedErrors::new(causes)))),
        }
    }

    /// Construct a [`MorphError::ConversionFailed`] naming both types.
    #[must_use]
    pub fn conversion(from: &Type, to: &Type) -> Self {
        Self::ConversionFailed {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Construct a [`MorphError::IncompatibleField`] naming both fields and
    /// both types.
    #[must_use]
    pub fn incompatible(from_field: &str, from_type: &Type, to_field: &str, to_type: &Type) -> Self {
        Self::IncompatibleField {
            from_field: from_field.to_owned(),
            from_type: from_type.to_string(),
            to_field: to_field.to_owned(),
            to_type: to_type.to_string(),
        }
    }

    /// Construct a [`MorphError::UnsupportedShape`].
    #[must_use]
    pub fn unsupported(from: &Type, to: &Type) -> Self {
        Self::UnsupportedShape {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Construct a [`MorphError::CallFailed`].
    #[must_use]
    pub fn call_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CallFailed {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns `true` when this error, or any aggregated cause, is of the
    /// variant selected by `predicate`.
    #[must_use]
    pub fn any(&self, predicate: impl Fn(&Self) -> bool + Copy) -> bool {
        match self {
            Self::Aggregate(agg) => agg.iter().any(|e| e.any(predicate)),
            other => predicate(other),
        }
    }
}
