//! Field-by-field reconciliation of structs.

use tracing::debug;

use super::Merger;
use crate::error::ErrorCollector;
use crate::held::StructFieldTarget;
use crate::value::{StructValue, Timestamp, Type, Value};
use crate::{MorphError, MorphResult};

impl Merger {
    pub(super) fn merge_struct_to(&self, from: &StructValue, to: &mut Value) -> MorphResult<()> {
        match to {
            Value::Struct(dst) => self.merge_struct_fields(from, dst),
            Value::Invalid | Value::Interface(None) => {
                *to = Value::interface(Value::Struct(from.clone()));
                Ok(())
            }
            other => Err(MorphError::unsupported(
                &Type::Struct(from.struct_type().clone()),
                &other.type_of(),
            )),
        }
    }

    fn merge_struct_fields(&self, from: &StructValue, to: &mut StructValue) -> MorphResult<()> {
        if to.struct_type().is_timestamp() {
            return merge_timestamp(from, to);
        }
        let mut errors = ErrorCollector::new();
        for (field, value) in from.struct_type().fields().iter().zip(from.fields()) {
            if self.ignored_names.contains(field.name()) {
                debug!(field = field.name(), "ignored");
                continue;
            }
            if field.is_embedded() {
                if let Some(Value::Struct(inner)) = value.indirect_recursive() {
                    errors.attach(self.merge_struct_fields(&inner, to));
                }
                continue;
            }
            if !field.is_visible() {
                if !self.ignore_unexported_error {
                    errors.push(MorphError::FieldNotSettable {
                        field: field.name().to_owned(),
                        owner: from.struct_type().name().to_owned(),
                    });
                }
                continue;
            }
            if to.struct_type().field_path(field.name()).is_none() {
                debug!(
                    field = field.name(),
                    owner = to.struct_type().name(),
                    "no destination field"
                );
                continue;
            }
            errors.attach(
                StructFieldTarget::new(to, field.name(), false)
                    .and_then(|mut held| self.merge_held(value, &mut held)),
            );
        }
        errors.finish()
    }
}

/// Copy a timestamp verbatim through its binary form.
fn merge_timestamp(from: &StructValue, to: &mut StructValue) -> MorphResult<()> {
    if !from.struct_type().is_timestamp() {
        return Err(MorphError::conversion(
            &Type::Struct(from.struct_type().clone()),
            &Type::Struct(to.struct_type().clone()),
        ));
    }
    let encoded = Timestamp::from_struct(from)?.to_binary();
    *to = Timestamp::from_binary(&encoded)?.to_struct();
    Ok(())
}
