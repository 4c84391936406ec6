//! Map sources, merged entry by entry.
//!
//! Each entry is classified by the dynamic kind of its value: scalars
//! overwrite, sequences accumulate, maps recurse and pointers are either
//! cloned into a fresh entry or reconciled with the existing one.

use tracing::debug;

use super::{Merger, slices::merge_sequences, through};
use crate::cloner::{Cloner, Copier, key_name};
use crate::error::ErrorCollector;
use crate::held::{HeldTarget, MapEntryTarget, StructFieldTarget};
use crate::naming::title_case;
use crate::value::{Kind, MapValue, StructValue, Type, Value};
use crate::{MorphError, MorphResult};

impl Merger {
    pub(super) fn merge_map_to(&self, from: &MapValue, to: &mut Value) -> MorphResult<()> {
        match to {
            Value::Map(dst) => self.merge_map_entries(from, dst),
            Value::Struct(dst) => self.merge_map_to_struct(from, dst),
            Value::Invalid | Value::Interface(None) => {
                *to = Value::interface(Value::Map(from.clone()));
                Ok(())
            }
            other => Err(MorphError::unsupported(&from.type_of(), &other.type_of())),
        }
    }

    fn merge_map_entries(&self, from: &MapValue, to: &mut MapValue) -> MorphResult<()> {
        let key_ty = to.key_type();
        let mut errors = ErrorCollector::new();
        for (key, value) in from.iter() {
            if !key.type_of().assignable_to(&key_ty) {
                errors.push(MorphError::conversion(&key.type_of(), &key_ty));
                continue;
            }
            if key_name(key).is_some_and(|name| self.ignored_names.contains(&name)) {
                continue;
            }
            let Some(value) = value.dynamic() else {
                debug!(key = %key, "nil entry skipped");
                continue;
            };
            let mut held = MapEntryTarget::new(to, key.assign_into(&key_ty));
            errors.attach(self.merge_entry(value, &mut held));
        }
        errors.finish()
    }

    fn merge_entry(&self, value: &Value, held: &mut MapEntryTarget<'_>) -> MorphResult<()> {
        let current = held.current().and_then(Value::dynamic);
        let absent = current.is_none_or(Value::is_zero);
        debug!(key = held.name(), kind = %value.kind(), absent, "merging entry");
        match value.kind() {
            kind if kind.is_primitive() => held.set(fit_entry(value, &held.target_type())?),
            Kind::Sequence | Kind::AssociativeMap | Kind::Struct if absent => {
                held.set(fit_entry(value, &held.target_type())?)
            }
            Kind::Sequence => match (value, held.slot()?.dynamic_mut()) {
                (Value::Sequence(src), Value::Sequence(dst)) => merge_sequences(src, dst),
                (_, other) => Err(MorphError::unsupported(&value.type_of(), &other.type_of())),
            },
            Kind::AssociativeMap | Kind::Struct => self.merge_value(value, held.slot()?),
            Kind::PointerLike if absent => Self::clone_entry(value, held),
            Kind::PointerLike => {
                let Some(pointee) = value.indirect_recursive() else {
                    return Ok(());
                };
                if pointee.is_zero() {
                    return through(held.slot()?, |to| {
                        to.set_zero();
                        Ok(())
                    });
                }
                self.merge_value(&pointee, held.slot()?)
            }
            _ => Err(MorphError::unsupported(&value.type_of(), &held.target_type())),
        }
    }

    /// Deep-copy the value behind `value` into a fresh entry.
    fn clone_entry(value: &Value, held: &mut MapEntryTarget<'_>) -> MorphResult<()> {
        let Some(pointee) = value.indirect_recursive() else {
            return held.set(held.target_type().zero());
        };
        let copied = if matches!(pointee, Value::Struct(_) | Value::Map(_)) {
            let target = Value::pointer_to(pointee.type_of().zero());
            Cloner::default().copy(value, &target)?;
            target
        } else {
            Value::pointer_to(pointee)
        };
        let target_ty = held.target_type();
        let stored = if matches!(target_ty, Type::Pointer(_)) {
            copied
        } else {
            copied.indirect_recursive().unwrap_or_default()
        };
        held.set(fit_entry(&stored, &target_ty)?)
    }

    fn merge_map_to_struct(&self, from: &MapValue, to: &mut StructValue) -> MorphResult<()> {
        let mut errors = ErrorCollector::new();
        for (key, value) in from.iter() {
            let Some(Value::String(name)) = key.dynamic() else {
                errors.push(MorphError::conversion(&key.type_of(), &Type::String));
                continue;
            };
            if self.ignored_names.contains(name) {
                continue;
            }
            let owner = to.struct_type().clone();
            let Some(field) = [name.clone(), title_case(name)]
                .into_iter()
                .find(|candidate| owner.field_path(candidate).is_some())
            else {
                debug!(key = %name, owner = owner.name(), "no destination field");
                continue;
            };
            let source = value.dynamic().cloned().unwrap_or_default();
            errors.attach(
                StructFieldTarget::new(to, &field, false)
                    .and_then(|mut held| self.merge_held(&source, &mut held)),
            );
        }
        errors.finish()
    }
}

fn fit_entry(value: &Value, to: &Type) -> MorphResult<Value> {
    value
        .fit(to)
        .map_err(|_| MorphError::conversion(&value.type_of(), to))
}
