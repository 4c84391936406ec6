//! Struct sources: struct-to-struct and struct-to-sequence copies.

use tracing::{debug, warn};

use super::Cloner;
use crate::error::ErrorCollector;
use crate::held::StructFieldTarget;
use crate::naming::NameResolver;
use crate::value::{
    FieldDescriptor, MethodDescriptor, Pointer, SequenceValue, StructType, StructValue, Type,
    Value,
};
use crate::{MorphError, MorphResult};

/// Where a source field lands on the destination.
enum Landing {
    Field,
    Setter(MethodDescriptor),
}

fn land(to: &StructType, name: &str, visibility_override: bool) -> Option<(Landing, bool)> {
    if let Some(field) = to.field_path(name).and_then(|path| to.field_at(&path)) {
        return Some((Landing::Field, field.is_visible() || visibility_override));
    }
    to.method(name)
        .filter(|m| m.is_visible() && m.signature().accepts_one())
        .map(|m| (Landing::Setter(m.clone()), true))
}

fn land_field(to: &StructType, name: &str, visibility_override: bool) -> Option<((), bool)> {
    to.field_path(name)
        .and_then(|path| to.field_at(&path))
        .map(|field| ((), field.is_visible() || visibility_override))
}

impl Cloner {
    pub(super) fn copy_struct_to(&self, from: &StructValue, to: &mut Value) -> MorphResult<()> {
        match to {
            Value::Struct(dst) => self.copy_struct_fields(from, dst),
            Value::Sequence(seq) => self.copy_struct_into_sequence(from, seq),
            Value::Interface(_) => {
                *to = Value::interface(Value::Struct(from.clone()));
                Ok(())
            }
            Value::Map(map) => Err(MorphError::unsupported(
                &Type::Struct(from.struct_type().clone()),
                &map.type_of(),
            )),
            other => {
                warn!(
                    from = from.struct_type().name(),
                    to = %other.type_of(),
                    "copying a struct into this kind is not implemented"
                );
                Ok(())
            }
        }
    }

    /// Copy every field of `from` onto `to`, accumulating per-field failures.
    pub(crate) fn copy_struct_fields(
        &self,
        from: &StructValue,
        to: &mut StructValue,
    ) -> MorphResult<()> {
        let resolver = NameResolver::new(&self.config);
        let mut errors = ErrorCollector::new();
        for (field, value) in from.struct_type().fields().iter().zip(from.fields()) {
            if self.config.is_ignored(field.name()) {
                debug!(field = field.name(), "ignored by configuration");
                continue;
            }
            if field.is_embedded() {
                if let Some(Value::Struct(inner)) = value.indirect_recursive() {
                    errors.attach(self.copy_struct_fields(&inner, to));
                }
                continue;
            }
            if !field.is_visible() {
                errors.attach(self.copy_private_field(field, value, to));
                continue;
            }
            errors.attach(self.copy_field(&resolver, field.name(), value, to));
        }
        self.copy_getters(&resolver, from, to, &mut errors);
        errors.finish()
    }

    fn copy_field(
        &self,
        resolver: &NameResolver<'_>,
        name: &str,
        value: &Value,
        to: &mut StructValue,
    ) -> MorphResult<()> {
        let over = self.config.visibility_override();
        let ty = to.struct_type().clone();
        match resolver.lookup(name, |candidate| land(&ty, candidate, over)) {
            None => {
                debug!(field = name, owner = ty.name(), "no destination field or setter");
                Ok(())
            }
            Some((to_name, Landing::Field, false)) if self.config.ignore_unexported_error() => {
                debug!(field = %to_name, owner = ty.name(), "destination field is private");
                Ok(())
            }
            Some((to_name, Landing::Field, _)) => {
                let mut held = StructFieldTarget::new(to, &to_name, over)?;
                self.coerce(name, value, &mut held)
            }
            Some((_, Landing::Setter(method), _)) => self.call_setter(&method, name, value, to),
        }
    }

    fn call_setter(
        &self,
        method: &MethodDescriptor,
        from_name: &str,
        value: &Value,
        to: &mut StructValue,
    ) -> MorphResult<()> {
        let Some(param) = method.signature().params.first() else {
            return Ok(());
        };
        let arg = value.fit(param).map_err(|_| {
            MorphError::incompatible(from_name, &value.type_of(), method.name(), param)
        })?;
        debug!(method = method.name(), "copying through setter");
        method.invoke(to, &[arg]).map(drop)
    }

    fn copy_getters(
        &self,
        resolver: &NameResolver<'_>,
        from: &StructValue,
        to: &mut StructValue,
        errors: &mut ErrorCollector,
    ) {
        let over = self.config.visibility_override();
        let ty = to.struct_type().clone();
        let mut receiver = from.clone();
        for method in from.struct_type().methods() {
            if !method.is_visible()
                || !method.signature().is_getter()
                || self.config.is_ignored(method.name())
            {
                continue;
            }
            let Some((to_name, (), true)) =
                resolver.lookup(method.name(), |candidate| land_field(&ty, candidate, over))
            else {
                continue;
            };
            let Some(result) = errors
                .attach(method.invoke(&mut receiver, &[]))
                .and_then(|mut out| out.pop())
            else {
                continue;
            };
            debug!(method = method.name(), field = %to_name, "copying getter result");
            errors.attach(
                StructFieldTarget::new(to, &to_name, over)
                    .and_then(|mut held| self.coerce(method.name(), &result, &mut held)),
            );
        }
    }

    fn copy_private_field(
        &self,
        field: &FieldDescriptor,
        value: &Value,
        to: &mut StructValue,
    ) -> MorphResult<()> {
        let owner = to.struct_type().clone();
        let Some(path) = owner.field_path(field.name()) else {
            return Ok(());
        };
        let Some(dest) = owner.field_at(&path) else {
            return Ok(());
        };
        let permitted = dest.is_visible() || self.config.visibility_override();
        if permitted && value.type_of().assignable_to(dest.ty()) {
            if let Some(slot) = to.at_path_mut(&path) {
                *slot = value.assign_into(dest.ty());
            }
            return Ok(());
        }
        if self.config.ignore_unexported_error() {
            debug!(field = field.name(), owner = owner.name(), "private field skipped");
            return Ok(());
        }
        Err(MorphError::FieldNotSettable {
            field: field.name().to_owned(),
            owner: owner.name().to_owned(),
        })
    }

    fn copy_struct_into_sequence(
        &self,
        from: &StructValue,
        seq: &mut SequenceValue,
    ) -> MorphResult<()> {
        let element = self.struct_element(from, &seq.elem_type())?;
        if let Some(first) = seq.items_mut().first_mut() {
            *first = element;
            return Ok(());
        }
        seq.push(element).map_err(|_| {
            MorphError::unsupported(&Type::Struct(from.struct_type().clone()), &seq.type_of())
        })
    }

    fn struct_element(&self, from: &StructValue, elem: &Type) -> MorphResult<Value> {
        match elem {
            Type::Struct(st) => {
                let mut element = StructValue::zero(st.clone());
                self.copy_struct_fields(from, &mut element)?;
                Ok(Value::Struct(element))
            }
            Type::Pointer(pointee) => {
                let inner = self.struct_element(from, &pointee.resolve())?;
                Ok(Value::Pointer(Pointer::with_type(pointee.clone(), inner)))
            }
            Type::Interface => Ok(Value::interface(Value::Struct(from.clone()))),
            other => Err(MorphError::unsupported(
                &Type::Struct(from.struct_type().clone()),
                other,
            )),
        }
    }
}
