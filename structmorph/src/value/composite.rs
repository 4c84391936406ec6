//! Struct, sequence and map payloads.

use std::rc::Rc;

use super::{StructType, Type, TypeRef, Value};
use crate::equal::equal;

/// A struct instance: its type table plus one value per declared field.
#[derive(Clone, Debug)]
pub struct StructValue {
    ty: Rc<StructType>,
    fields: Vec<Value>,
}

impl StructValue {
    /// Build an instance from field values in declaration order.
    ///
    /// Missing trailing values are filled with zeros; surplus values are
    /// dropped.
    #[must_use]
    pub fn new(ty: Rc<StructType>, mut fields: Vec<Value>) -> Self {
        let declared = ty.fields();
        fields.truncate(declared.len());
        for field in declared.iter().skip(fields.len()) {
            fields.push(field.ty().zero());
        }
        Self { ty, fields }
    }

    /// Instance with every field zero.
    #[must_use]
    pub fn zero(ty: Rc<StructType>) -> Self {
        Self::new(ty, Vec::new())
    }

    /// Set the field called `name` during construction.
    #[must_use]
    pub fn with(mut self, name: &str, value: Value) -> Self {
        if let Some(slot) = self.field_mut(name) {
            *slot = value;
        }
        self
    }

    /// Type table.
    #[must_use]
    pub const fn struct_type(&self) -> &Rc<StructType> {
        &self.ty
    }

    /// Field values in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    /// Field called `name`, including promoted fields.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.at_path(&self.ty.field_path(name)?)
    }

    /// Mutable field called `name`, including promoted fields.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        let path = self.ty.field_path(name)?;
        self.at_path_mut(&path)
    }

    /// Field at an index path through embedded structs.
    #[must_use]
    pub fn at_path(&self, path: &[usize]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let value = self.fields.get(*first)?;
        if rest.is_empty() {
            return Some(value);
        }
        match value {
            Value::Struct(inner) => inner.at_path(rest),
            _ => None,
        }
    }

    /// Mutable field at an index path through embedded structs.
    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Value> {
        let (first, rest) = path.split_first()?;
        let value = self.fields.get_mut(*first)?;
        if rest.is_empty() {
            return Some(value);
        }
        match value {
            Value::Struct(inner) => inner.at_path_mut(rest),
            _ => None,
        }
    }
}

/// A slice or a fixed-length array.
#[derive(Clone, Debug)]
pub struct SequenceValue {
    elem: TypeRef,
    items: Vec<Value>,
    array: bool,
}

impl SequenceValue {
    /// A growable slice.
    #[must_use]
    pub const fn slice(elem: TypeRef, items: Vec<Value>) -> Self {
        Self {
            elem,
            items,
            array: false,
        }
    }

    /// A fixed-length array.
    #[must_use]
    pub const fn array(elem: TypeRef, items: Vec<Value>) -> Self {
        Self {
            elem,
            items,
            array: true,
        }
    }

    /// Element type.
    #[must_use]
    pub fn elem_type(&self) -> Type {
        self.elem.resolve()
    }

    /// Static type of the sequence.
    #[must_use]
    pub fn type_of(&self) -> Type {
        if self.array {
            Type::Array(self.elem.clone(), self.items.len())
        } else {
            Type::Slice(self.elem.clone())
        }
    }

    /// Whether the length is fixed.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.array
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements.
    #[must_use]
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Mutable elements; the length cannot change through this view.
    pub fn items_mut(&mut self) -> &mut [Value] {
        &mut self.items
    }

    /// Append an element. Arrays refuse to grow and return the value back.
    ///
    /// # Errors
    ///
    /// Returns `value` when the sequence is an array.
    pub fn push(&mut self, value: Value) -> Result<(), Value> {
        if self.array {
            return Err(value);
        }
        self.items.push(value);
        Ok(())
    }
}

/// An insertion-ordered map keyed by structural equality.
#[derive(Clone, Debug)]
pub struct MapValue {
    key: TypeRef,
    elem: TypeRef,
    entries: Vec<(Value, Value)>,
}

impl MapValue {
    /// An empty map.
    #[must_use]
    pub const fn new(key: TypeRef, elem: TypeRef) -> Self {
        Self {
            key,
            elem,
            entries: Vec::new(),
        }
    }

    /// Key type.
    #[must_use]
    pub fn key_type(&self) -> Type {
        self.key.resolve()
    }

    /// Element type.
    #[must_use]
    pub fn elem_type(&self) -> Type {
        self.elem.resolve()
    }

    /// Static type of the map.
    #[must_use]
    pub fn type_of(&self) -> Type {
        Type::Map(self.key.clone(), self.elem.clone())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &Value) -> Option<usize> {
        self.entries.iter().position(|(k, _)| equal(k, key))
    }

    /// Value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.position(key).map(|index| &self.entries[index].1)
    }

    /// Mutable value stored under `key`.
    pub fn get_mut(&mut self, key: &Value) -> Option<&mut Value> {
        let index = self.position(key)?;
        self.entries.get_mut(index).map(|(_, v)| v)
    }

    /// Value stored under the string key `key`.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| matches!(k.dynamic(), Some(Value::String(s)) if s == key))
            .map(|(_, v)| v)
    }

    /// Whether an entry exists for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.position(key).is_some()
    }

    /// Insert or replace the entry for `key`, returning the previous value.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        match self.position(&key) {
            Some(index) => self
                .entries
                .get_mut(index)
                .map(|(_, slot)| std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}
