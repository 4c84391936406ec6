//! Deep copy between value graphs.
//!
//! A copy starts from a source struct, pointer or map and writes into the
//! storage reached through a destination pointer. Struct fields are matched by
//! name, map entries by key, and each individual write goes through the
//! coercion rules in `coerce`.

mod coerce;
mod maps;
mod serde_copier;
mod structs;

use std::rc::Rc;

use tracing::{debug, warn};

pub(crate) use maps::key_name;
pub use serde_copier::SerdeCopier;

use crate::config::CopyConfig;
use crate::error::guarded;
use crate::value::{Kind, SelfCopy, Value, terminal_cell};
use crate::{MorphError, MorphResult, Reflect};

/// Something able to copy one value graph onto another.
pub trait Copier {
    /// Copy `from` onto the storage reached through `to`.
    ///
    /// # Errors
    ///
    /// Returns a [`MorphError`] describing why the copy could not complete.
    fn copy(&self, from: &Value, to: &Value) -> MorphResult<()>;
}

/// Field-by-field copier steered by a [`CopyConfig`].
#[derive(Clone, Debug, Default)]
pub struct Cloner {
    config: CopyConfig,
}

fn check_shape(name: &'static str, value: &Value) -> MorphResult<()> {
    match value.kind() {
        Kind::Struct | Kind::PointerLike | Kind::AssociativeMap => Ok(()),
        _ => Err(MorphError::InvalidArgument {
            name,
            found: value.type_of().to_string(),
        }),
    }
}

/// Address of the innermost storage reached from `value` through pointers.
fn innermost_addr(value: &Value) -> Option<usize> {
    let mut addr = None;
    let mut current = value.clone();
    while let Value::Pointer(ptr) = &current {
        addr = ptr.addr();
        current = ptr.load()?;
    }
    addr
}

impl Cloner {
    /// Copier using `config`.
    #[must_use]
    pub const fn new(config: CopyConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &CopyConfig {
        &self.config
    }

    fn copy_via_capability(
        &self,
        capability: &SelfCopy,
        source: &Value,
        to: &Value,
    ) -> MorphResult<()> {
        let produced = guarded("Clone", || capability(source))?;
        let produced = produced.indirect_recursive().unwrap_or_default();
        let cell = terminal_cell(to)?;
        let mut guard = cell.try_borrow_mut().map_err(|_| MorphError::Unaddressable {
            ty: to.type_of().to_string(),
        })?;
        let target = guard.type_of();
        *guard = produced
            .fit(&target)
            .map_err(|_| MorphError::conversion(&produced.type_of(), &target))?;
        debug!(ty = %target, "copied through self-copy capability");
        Ok(())
    }

    /// Dispatch on the (already dereferenced) source kind.
    pub(crate) fn copy_value(&self, from: &Value, to: &mut Value) -> MorphResult<()> {
        match from {
            Value::Struct(sv) => self.copy_struct_to(sv, to),
            Value::Map(map) => self.copy_map_to(map, to),
            _ => {
                warn!(
                    from = %from.type_of(),
                    to = %to.type_of(),
                    "copying between these kinds is not implemented"
                );
                Ok(())
            }
        }
    }
}

impl Copier for Cloner {
    fn copy(&self, from: &Value, to: &Value) -> MorphResult<()> {
        check_shape("source", from)?;
        check_shape("destination", to)?;
        let cell = terminal_cell(to)?;
        let unaddressable = || MorphError::Unaddressable {
            ty: to.type_of().to_string(),
        };
        let Some(source) = from.indirect_recursive() else {
            debug!(ty = %from.type_of(), "nil source, zeroing destination");
            cell.try_borrow_mut().map_err(|_| unaddressable())?.set_zero();
            return Ok(());
        };
        if let Value::Struct(sv) = &source {
            if let Some(capability) = sv.struct_type().self_copy().map(Rc::clone) {
                return self.copy_via_capability(&capability, &source, to);
            }
        }
        if source.is_zero() {
            debug!(ty = %source.type_of(), "zero source, zeroing destination");
            cell.try_borrow_mut().map_err(|_| unaddressable())?.set_zero();
            return Ok(());
        }
        if innermost_addr(from) == Some(Rc::as_ptr(&cell).addr()) {
            debug!("source and destination share storage");
            return Ok(());
        }
        let mut guard = cell.try_borrow_mut().map_err(|_| unaddressable())?;
        self.copy_value(&source, &mut guard)
    }
}

/// Copy `from` onto `to` with `config`.
///
/// # Errors
///
/// See [`Copier::copy`].
pub fn copy(from: &Value, to: &Value, config: &CopyConfig) -> MorphResult<()> {
    Cloner::new(config.clone()).copy(from, to)
}

/// Best-effort copy returning the destination.
///
/// An invalid source zeroes the destination; an invalid or nil destination is
/// returned untouched. Failures are logged rather than returned.
pub fn clone<'a>(from: &Value, to: &'a Value, config: &CopyConfig) -> &'a Value {
    if !to.can_address() {
        return to;
    }
    if !from.is_valid() {
        if let Ok(cell) = terminal_cell(to) {
            if let Ok(mut guard) = cell.try_borrow_mut() {
                guard.set_zero();
            }
        }
        return to;
    }
    if let Err(err) = copy(from, to, config) {
        warn!(error = %err, "clone did not complete");
    }
    to
}

/// Copy between native values through their reflected form.
///
/// # Errors
///
/// Returns the copy error, or a conversion error when the copied value cannot
/// be raised back into `D`.
pub fn copy_into<S: Reflect, D: Reflect>(
    from: &S,
    to: &mut D,
    config: &CopyConfig,
) -> MorphResult<()> {
    let source = from.to_value();
    let destination = Value::pointer_to(to.to_value());
    copy(&source, &destination, config)?;
    let copied = destination.indirect_recursive().unwrap_or_default();
    *to = D::from_value(&copied)?;
    Ok(())
}

#[cfg(test)]
mod tests;
