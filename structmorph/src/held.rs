//! Uniform write targets for struct fields and map entries.
//!
//! Coercion logic is written once against [`HeldTarget`] and reused for both
//! struct-to-struct and map-to-map copies.

use crate::value::{MapValue, StructValue, Type, Value};
use crate::{MorphError, MorphResult};

/// A location a coerced value can be written to.
pub trait HeldTarget {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Declared type of the location.
    fn target_type(&self) -> Type;

    /// Current content, if any.
    fn current(&self) -> Option<&Value>;

    /// Whether writes are permitted.
    fn can_set(&self) -> bool;

    /// Overwrite the content.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::FieldNotSettable`] when writes are not permitted.
    fn set(&mut self, value: Value) -> MorphResult<()>;

    /// In-place access, materialising a zero value when the location is
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::FieldNotSettable`] when writes are not permitted.
    fn slot(&mut self) -> MorphResult<&mut Value>;
}

/// A field of a struct, possibly promoted from an embedded struct.
#[derive(Debug)]
pub struct StructFieldTarget<'a> {
    owner: &'a mut StructValue,
    path: Vec<usize>,
    name: String,
    ty: Type,
    settable: bool,
}

impl<'a> StructFieldTarget<'a> {
    /// Target the field called `name` of `owner`.
    ///
    /// Private fields are settable only when `visibility_override` is set.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::FieldNotFound`] when `owner` has no such field.
    pub fn new(
        owner: &'a mut StructValue,
        name: &str,
        visibility_override: bool,
    ) -> MorphResult<Self> {
        let not_found = || MorphError::FieldNotFound {
            field: name.to_owned(),
            owner: owner.struct_type().name().to_owned(),
        };
        let path = owner.struct_type().field_path(name).ok_or_else(not_found)?;
        let field = owner.struct_type().field_at(&path).ok_or_else(not_found)?;
        Ok(Self {
            settable: field.is_visible() || visibility_override,
            ty: field.ty().clone(),
            name: name.to_owned(),
            path,
            owner,
        })
    }

    fn not_settable(&self) -> MorphError {
        MorphError::FieldNotSettable {
            field: self.name.clone(),
            owner: self.owner.struct_type().name().to_owned(),
        }
    }
}

impl HeldTarget for StructFieldTarget<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn target_type(&self) -> Type {
        self.ty.clone()
    }

    fn current(&self) -> Option<&Value> {
        self.owner.at_path(&self.path)
    }

    fn can_set(&self) -> bool {
        self.settable
    }

    fn set(&mut self, value: Value) -> MorphResult<()> {
        *self.slot()? = value;
        Ok(())
    }

    fn slot(&mut self) -> MorphResult<&mut Value> {
        if !self.settable {
            return Err(self.not_settable());
        }
        let err = self.not_settable();
        self.owner.at_path_mut(&self.path).ok_or(err)
    }
}

/// An entry of a map, created on first write.
#[derive(Debug)]
pub struct MapEntryTarget<'a> {
    map: &'a mut MapValue,
    key: Value,
    name: String,
}

impl<'a> MapEntryTarget<'a> {
    /// Target the entry for `key` in `map`.
    #[must_use]
    pub fn new(map: &'a mut MapValue, key: Value) -> Self {
        let name = key.to_string();
        Self { map, key, name }
    }
}

impl HeldTarget for MapEntryTarget<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn target_type(&self) -> Type {
        self.map.elem_type()
    }

    fn current(&self) -> Option<&Value> {
        self.map.get(&self.key)
    }

    fn can_set(&self) -> bool {
        true
    }

    fn set(&mut self, value: Value) -> MorphResult<()> {
        self.map.insert(self.key.clone(), value);
        Ok(())
    }

    fn slot(&mut self) -> MorphResult<&mut Value> {
        if !self.map.contains_key(&self.key) {
            let zero = self.map.elem_type().zero();
            self.map.insert(self.key.clone(), zero);
        }
        let err = MorphError::FieldNotSettable {
            field: self.name.clone(),
            owner: self.map.type_of().to_string(),
        };
        self.map.get_mut(&self.key).ok_or(err)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for held targets.

    use anyhow::{Result, ensure};
    use rstest::rstest;

    use super::*;
    use crate::value::{FieldDescriptor, IntKind, StructType};

    fn owner() -> StructValue {
        let inner = StructType::builder("Inner")
            .field(FieldDescriptor::new("Depth", Type::Int(IntKind::I64)))
            .build();
        let outer = StructType::builder("Outer")
            .field(FieldDescriptor::new("Inner", Type::Struct(inner)).embedded())
            .field(FieldDescriptor::new("secret", Type::String).private())
            .build();
        StructValue::zero(outer)
    }

    #[rstest]
    fn writes_promoted_field() -> Result<()> {
        let mut owner = owner();
        let mut target = StructFieldTarget::new(&mut owner, "Depth", false)?;
        ensure!(target.can_set());
        target.set(Value::Int(7, IntKind::I64))?;
        ensure!(matches!(owner.field("Depth"), Some(Value::Int(7, _))));
        Ok(())
    }

    #[rstest]
    #[case(false, false)]
    #[case(true, true)]
    fn private_field_respects_override(#[case] over: bool, #[case] settable: bool) -> Result<()> {
        let mut owner = owner();
        let mut target = StructFieldTarget::new(&mut owner, "secret", over)?;
        ensure!(target.can_set() == settable);
        ensure!(target.set(Value::String("x".into())).is_ok() == settable);
        Ok(())
    }

    #[rstest]
    fn missing_field_is_reported() {
        let mut owner = owner();
        let err = StructFieldTarget::new(&mut owner, "Nope", false).err();
        assert!(matches!(err, Some(MorphError::FieldNotFound { .. })));
    }

    #[rstest]
    fn map_entry_slot_materialises_zero() -> Result<()> {
        let mut map = MapValue::new(Type::String.into(), Type::Int(IntKind::I64).into());
        let mut target = MapEntryTarget::new(&mut map, Value::String("k".into()));
        ensure!(target.current().is_none());
        *target.slot()? = Value::Int(3, IntKind::I64);
        ensure!(matches!(map.get_str("k"), Some(Value::Int(3, _))));
        Ok(())
    }
}
