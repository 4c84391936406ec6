//! Error types produced by the cloner and the merger.

mod aggregate;
mod collector;
mod constructors;
mod helpers;
mod types;

pub use aggregate::AggregatedErrors;
pub use collector::ErrorCollector;
pub use types::MorphError;

pub(crate) use helpers::guarded;
