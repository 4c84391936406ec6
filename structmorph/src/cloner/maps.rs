//! Map sources: map-to-map and map-to-struct copies.

use tracing::{debug, warn};

use super::Cloner;
use crate::error::ErrorCollector;
use crate::held::{MapEntryTarget, StructFieldTarget};
use crate::naming::NameResolver;
use crate::value::{MapValue, StructValue, Type, Value};
use crate::{MorphError, MorphResult};

/// Field name carried by a map key.
///
/// Strings are used verbatim. Integers convert like any other integer to
/// string conversion, to the single code point they denote.
pub(crate) fn key_name(key: &Value) -> Option<String> {
    let key = key.dynamic()?;
    if !matches!(key, Value::String(_) | Value::Int(..) | Value::Uint(..)) {
        return None;
    }
    match key.try_convert(&Type::String) {
        Ok(Value::String(name)) => Some(name),
        _ => None,
    }
}

impl Cloner {
    pub(super) fn copy_map_to(&self, from: &MapValue, to: &mut Value) -> MorphResult<()> {
        match to.dynamic_mut() {
            Value::Map(dst) => self.copy_map_entries(from, dst),
            Value::Struct(dst) => self.copy_map_to_struct(from, dst),
            iface @ Value::Interface(None) => {
                *iface = Value::interface(Value::Map(from.clone()));
                Ok(())
            }
            other => {
                warn!(
                    from = %from.type_of(),
                    to = %other.type_of(),
                    "copying a map into this kind is not implemented"
                );
                Ok(())
            }
        }
    }

    fn copy_map_entries(&self, from: &MapValue, to: &mut MapValue) -> MorphResult<()> {
        let key_ty = to.key_type();
        let mut errors = ErrorCollector::new();
        for (key, value) in from.iter() {
            let Some(key) = errors.attach(key.fit(&key_ty)) else {
                continue;
            };
            let name = key_name(&key).unwrap_or_else(|| key.to_string());
            let mut held = MapEntryTarget::new(to, key);
            errors.attach(self.coerce(&name, value, &mut held));
        }
        errors.finish()
    }

    fn copy_map_to_struct(&self, from: &MapValue, to: &mut StructValue) -> MorphResult<()> {
        let resolver = NameResolver::new(&self.config);
        let over = self.config.visibility_override();
        let owner = to.struct_type().clone();
        let mut errors = ErrorCollector::new();
        for (key, value) in from.iter() {
            let Some(name) = key_name(key) else {
                errors.push(MorphError::conversion(&key.type_of(), &Type::String));
                continue;
            };
            if self.config.is_ignored(&name) {
                continue;
            }
            let located = resolver.lookup(&name, |candidate| {
                owner
                    .field_path(candidate)
                    .and_then(|path| owner.field_at(&path))
                    .map(|field| ((), field.is_visible() || over))
            });
            match located {
                None => errors.push(MorphError::FieldNotFound {
                    field: name,
                    owner: owner.name().to_owned(),
                }),
                Some((to_name, (), false)) => errors.push(MorphError::FieldNotSettable {
                    field: to_name,
                    owner: owner.name().to_owned(),
                }),
                Some((to_name, (), true)) => {
                    debug!(key = %name, field = %to_name, "copying map entry into field");
                    let source = value.dynamic().cloned().unwrap_or_else(|| value.clone());
                    errors.attach(
                        StructFieldTarget::new(to, &to_name, over)
                            .and_then(|mut held| self.coerce(&name, &source, &mut held)),
                    );
                }
            }
        }
        errors.finish()
    }
}
