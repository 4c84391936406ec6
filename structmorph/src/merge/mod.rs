//! Deep merge of a bound source into destination graphs.
//!
//! Sequences accumulate like sets, structs reconcile field by field and maps
//! key by key. A [`Merger`] keeps every failure it meets; once it holds an
//! error it refuses further merges until [`Merger::reset`] is called.

mod maps;
mod slices;
mod structs;

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::error::ErrorCollector;
use crate::held::HeldTarget;
use crate::value::{Pointer, Value, terminal_cell};
use crate::{MorphError, MorphResult};

/// Merges one source value into any number of destinations.
///
/// # Examples
///
/// ```
/// use structmorph::reflect::concrete;
/// use structmorph::value::Value;
/// use structmorph::{Merger, Reflect};
///
/// let mut merger = Merger::new(vec![2_i64, 3].to_value());
/// let target = Value::pointer_to(vec![1_i64, 2].to_value());
/// merger.merge_to(&target)?;
/// merger.merge_to(&target)?;
/// let merged = Vec::<i64>::from_value(&*concrete(&target)?)?;
/// assert_eq!(merged, vec![1, 2, 3]);
/// # Ok::<(), structmorph::MorphError>(())
/// ```
#[derive(Debug)]
pub struct Merger {
    source: Value,
    errors: ErrorCollector,
    ignore_unexported_error: bool,
    ignored_names: BTreeSet<String>,
}

impl Merger {
    /// Bind `source` for later merges.
    #[must_use]
    pub fn new(source: Value) -> Self {
        Self {
            source,
            errors: ErrorCollector::new(),
            ignore_unexported_error: true,
            ignored_names: BTreeSet::new(),
        }
    }

    /// Report private source fields as errors instead of skipping them.
    #[must_use]
    pub const fn with_ignore_unexported_error(mut self, ignore: bool) -> Self {
        self.ignore_unexported_error = ignore;
        self
    }

    /// Skip source fields and map keys with these names.
    #[must_use]
    pub fn with_ignored_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// The bound source.
    #[must_use]
    pub const fn source(&self) -> &Value {
        &self.source
    }

    /// Merge the source into the storage reached through `to`.
    ///
    /// Nothing is attempted while earlier errors are held.
    ///
    /// # Errors
    ///
    /// Returns every error recorded since the last [`Merger::reset`],
    /// combined into one.
    pub fn merge_to(&mut self, to: &Value) -> MorphResult<()> {
        if self.errors.is_empty() {
            if let Err(err) = self.merge(to) {
                self.errors.absorb(err);
            }
        } else {
            debug!(held = self.errors.causes().len(), "merger holds errors, skipping");
        }
        self.errors.snapshot().map_or(Ok(()), Err)
    }

    /// Whether any error has been recorded.
    #[must_use]
    pub const fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The recorded causes.
    #[must_use]
    pub fn errors(&self) -> &[Arc<MorphError>] {
        self.errors.causes()
    }

    /// Forget recorded errors, keeping the source.
    pub fn reset(&mut self) {
        self.errors.clear();
    }

    fn merge(&self, to: &Value) -> MorphResult<()> {
        let cell = terminal_cell(to)?;
        let Some(source) = self.source.indirect_recursive() else {
            debug!(ty = %self.source.type_of(), "nil source, nothing to merge");
            return Ok(());
        };
        let mut guard = cell.try_borrow_mut().map_err(|_| MorphError::Unaddressable {
            ty: to.type_of().to_string(),
        })?;
        debug!(from = %source.type_of(), to = %guard.type_of(), "merging");
        self.merge_value(&source, &mut guard)
    }

    /// Merge `from` into the storage `to`, dispatching on the source kind.
    fn merge_value(&self, from: &Value, to: &mut Value) -> MorphResult<()> {
        let Some(from) = from.indirect_recursive() else {
            debug!("nil source link, nothing to merge");
            return Ok(());
        };
        through(to, |to| match &from {
            Value::Sequence(seq) => Self::merge_slice_to(seq, to),
            Value::Struct(sv) => self.merge_struct_to(sv, to),
            Value::Map(map) => self.merge_map_to(map, to),
            Value::Callable(_) => Err(MorphError::unsupported(&from.type_of(), &to.type_of())),
            _ => merge_primitive(&from, to),
        })
    }

    /// Merge one field or entry. A zero source zeroes the destination.
    fn merge_held(&self, from: &Value, held: &mut dyn HeldTarget) -> MorphResult<()> {
        let slot = held.slot()?;
        if from.is_zero() {
            debug!("zero source, zeroing destination");
            return through(slot, |to| {
                to.set_zero();
                Ok(())
            });
        }
        self.merge_value(from, slot)
    }
}

/// Run `merge` against the storage `to` designates.
///
/// Pointers are followed and allocated when nil; interfaces expose their
/// payload.
fn through<F>(to: &mut Value, merge: F) -> MorphResult<()>
where
    F: FnOnce(&mut Value) -> MorphResult<()>,
{
    match to.dynamic_mut() {
        Value::Pointer(ptr) => {
            if ptr.is_nil() {
                let pointee = ptr.pointee().clone();
                let zero = pointee.resolve().zero();
                *ptr = Pointer::with_type(pointee, zero);
            }
            let unaddressable = || MorphError::Unaddressable {
                ty: ptr.pointee_type().to_string(),
            };
            let cell = ptr.cell().cloned().ok_or_else(unaddressable)?;
            let mut guard = cell.try_borrow_mut().map_err(|_| unaddressable())?;
            through(&mut guard, merge)
        }
        other => merge(other),
    }
}

/// Assign a scalar, converting when the types differ.
fn merge_primitive(from: &Value, to: &mut Value) -> MorphResult<()> {
    let target = to.type_of();
    *to = from
        .fit(&target)
        .map_err(|_| MorphError::conversion(&from.type_of(), &target))?;
    Ok(())
}
