//! Primary error enum for copy and merge flows.

use thiserror::Error;

use super::aggregate::AggregatedErrors;

/// Errors that can occur while copying or merging value graphs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MorphError {
    /// A top-level argument does not have a copyable shape.
    #[error("invalid argument '{name}': expected a struct, pointer or map, found {found}")]
    InvalidArgument {
        /// Which argument was rejected (`source` or `destination`).
        name: &'static str,
        /// Type description of the rejected value.
        found: String,
    },

    /// The destination cannot be written through.
    #[error("destination of type {ty} is unaddressable")]
    Unaddressable {
        /// Type description of the destination.
        ty: String,
    },

    /// No field of the requested name exists on the destination.
    #[error("no such field '{field}' in {owner}")]
    FieldNotFound {
        /// Field name that was looked up.
        field: String,
        /// Type description of the struct searched.
        owner: String,
    },

    /// The destination field exists but cannot be written.
    #[error("cannot set field '{field}' of {owner}")]
    FieldNotSettable {
        /// Field name that rejected the write.
        field: String,
        /// Type description of the owning struct.
        owner: String,
    },

    /// Source and destination fields have no viable coercion.
    #[error("cannot set '{from_field}' ({from_type}) -> '{to_field}' ({to_type})")]
    IncompatibleField {
        /// Source field name.
        from_field: String,
        /// Source field type.
        from_type: String,
        /// Destination field name.
        to_field: String,
        /// Destination field type.
        to_type: String,
    },

    /// A safe conversion attempt failed.
    #[error("cannot convert {from} to {to}")]
    ConversionFailed {
        /// Type description of the value being converted.
        from: String,
        /// Requested target type.
        to: String,
    },

    /// The pairing of source and destination shapes has no defined behaviour.
    #[error("copying {from} into {to} is not supported")]
    UnsupportedShape {
        /// Source type description.
        from: String,
        /// Destination type description.
        to: String,
    },

    /// A user-supplied method, callable or copy capability failed or panicked.
    #[error("call to '{name}' failed: {message}")]
    CallFailed {
        /// Name of the method or capability invoked.
        name: String,
        /// Failure or panic payload rendered as text.
        message: String,
    },

    /// The serialisation fallback copier failed.
    #[error("serialisation fallback failed: {0}")]
    Serde(#[from] serde_json::Error),

    /// Multiple errors occurred during one call.
    #[error("multiple copy errors:\n{0}")]
    Aggregate(Box<AggregatedErrors>),
}
