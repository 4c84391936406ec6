//! Structural value transformation: deep copy and deep merge.
//!
//! Values are lowered into the dynamic [`Value`] model (usually through
//! `#[derive(Reflect)]`) and then transformed:
//!
//! * [`Cloner`] copies a source graph onto a destination, matching struct
//!   fields by name, converting numbers, calling getter and setter methods,
//!   and honouring the policies of a [`CopyConfig`].
//! * [`Merger`] folds one source into many destinations, deduplicating slice
//!   elements and recursing through maps and structs, and accumulates every
//!   failure it meets.
//! * [`equal`] compares two graphs structurally and terminates on cycles.
//!
//! ```
//! use structmorph::{CopyConfig, Reflect, copy_into};
//!
//! #[derive(Reflect, Default, Debug, PartialEq)]
//! struct User {
//!     pub name: String,
//!     pub age: i32,
//! }
//!
//! #[derive(Reflect, Default, Debug, PartialEq)]
//! struct Employee {
//!     pub name: String,
//!     pub age: i64,
//! }
//!
//! # fn main() -> structmorph::MorphResult<()> {
//! let user = User { name: "Ann".into(), age: 30 };
//! let mut employee = Employee::default();
//! copy_into(&user, &mut employee, CopyConfig::global())?;
//! assert_eq!(employee, Employee { name: "Ann".into(), age: 30 });
//! # Ok(())
//! # }
//! ```

pub use structmorph_macros::Reflect;

mod cloner;
mod config;
mod equal;
mod error;
mod held;
mod merge;
mod naming;
pub mod reflect;
mod result_ext;
pub mod value;

pub use cloner::{Cloner, Copier, SerdeCopier, clone, copy, copy_into};
pub use config::{CopyConfig, NameRule};
pub use equal::{Seen, equal, equal_with};
pub use error::{AggregatedErrors, ErrorCollector, MorphError};
pub use held::{HeldTarget, MapEntryTarget, StructFieldTarget};
pub use merge::Merger;
pub use naming::{NameResolver, needs_title_retry, title_case};
pub use reflect::{Complex64, Complex128, Reflect};
pub use result_ext::MorphResultExt;
pub use value::{
    FieldDescriptor, Kind, MethodDescriptor, StructType, StructValue, Timestamp, Type, Value,
};

/// Result alias used throughout the crate.
pub type MorphResult<T> = Result<T, MorphError>;
