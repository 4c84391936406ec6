//! Bridge between native Rust types and [`Value`].
//!
//! [`Reflect`] is implemented here for scalars, strings, containers,
//! `Option` (as a nilable pointer), `Box`, timestamps and [`Value`] itself
//! (as the interface type). User structs obtain it through
//! `#[derive(Reflect)]`.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::time::SystemTime;

use crate::value::{
    ComplexKind, FloatKind, IntKind, MapValue, Pointer, SequenceValue, StructValue, Timestamp,
    Type, TypeRef, UintKind, Value,
};
use crate::{MorphError, MorphResult};

/// Types that can be described by, lowered into and raised from [`Value`].
pub trait Reflect: Sized {
    /// Static type descriptor.
    fn reflect_type() -> Type;

    /// Lower `self` into a dynamic value.
    fn to_value(&self) -> Value;

    /// Raise a dynamic value back into `Self`.
    ///
    /// Interfaces are unwrapped first. Pointers are followed for struct
    /// types.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::ConversionFailed`] when `value` does not have the
    /// shape of `Self`.
    fn from_value(value: &Value) -> MorphResult<Self>;
}

fn mismatch<T: Reflect>(value: &Value) -> MorphError {
    MorphError::conversion(&value.type_of(), &T::reflect_type())
}

/// Strip interfaces and pointers from `value`.
///
/// # Errors
///
/// Returns [`MorphError::ConversionFailed`] when a nil link is met.
pub fn concrete(value: &Value) -> MorphResult<Cow<'_, Value>> {
    match value {
        Value::Pointer(_) | Value::Interface(_) => value
            .indirect_recursive()
            .map(Cow::Owned)
            .ok_or_else(|| MorphError::ConversionFailed {
                from: value.type_of().to_string(),
                to: String::from("non-nil value"),
            }),
        other => Ok(Cow::Borrowed(other)),
    }
}

/// Read the field called `name` of `owner` as `T`.
///
/// # Errors
///
/// Returns [`MorphError::FieldNotFound`] when the field is absent, or the
/// conversion error produced by `T`.
pub fn field_from<T: Reflect>(owner: &StructValue, name: &str) -> MorphResult<T> {
    let value = owner.field(name).ok_or_else(|| MorphError::FieldNotFound {
        field: name.to_owned(),
        owner: owner.struct_type().name().to_owned(),
    })?;
    T::from_value(value)
}

macro_rules! reflect_int {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl Reflect for $ty {
            fn reflect_type() -> Type {
                Type::Int(IntKind::$kind)
            }

            fn to_value(&self) -> Value {
                Value::Int(i64::from(*self), IntKind::$kind)
            }

            fn from_value(value: &Value) -> MorphResult<Self> {
                match value.dynamic() {
                    Some(Value::Int(v, IntKind::$kind)) => {
                        <$ty>::try_from(*v).map_err(|_| mismatch::<Self>(value))
                    }
                    _ => Err(mismatch::<Self>(value)),
                }
            }
        }
    )*};
}

macro_rules! reflect_uint {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl Reflect for $ty {
            fn reflect_type() -> Type {
                Type::Uint(UintKind::$kind)
            }

            fn to_value(&self) -> Value {
                Value::Uint(u64::from(*self), UintKind::$kind)
            }

            fn from_value(value: &Value) -> MorphResult<Self> {
                match value.dynamic() {
                    Some(Value::Uint(v, UintKind::$kind)) => {
                        <$ty>::try_from(*v).map_err(|_| mismatch::<Self>(value))
                    }
                    _ => Err(mismatch::<Self>(value)),
                }
            }
        }
    )*};
}

reflect_int!(i8 => I8, i16 => I16, i32 => I32, i64 => I64);
reflect_uint!(u8 => U8, u16 => U16, u32 => U32, u64 => U64);

impl Reflect for isize {
    fn reflect_type() -> Type {
        Type::Int(IntKind::I64)
    }

    fn to_value(&self) -> Value {
        Value::Int(*self as i64, IntKind::I64)
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        i64::from_value(value).and_then(|v| Self::try_from(v).map_err(|_| mismatch::<Self>(value)))
    }
}

impl Reflect for usize {
    fn reflect_type() -> Type {
        Type::Uint(UintKind::U64)
    }

    fn to_value(&self) -> Value {
        Value::Uint(*self as u64, UintKind::U64)
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        u64::from_value(value).and_then(|v| Self::try_from(v).map_err(|_| mismatch::<Self>(value)))
    }
}

impl Reflect for f32 {
    fn reflect_type() -> Type {
        Type::Float(FloatKind::F32)
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self), FloatKind::F32)
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        match value.dynamic() {
            Some(Value::Float(v, FloatKind::F32)) => Ok(*v as Self),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl Reflect for f64 {
    fn reflect_type() -> Type {
        Type::Float(FloatKind::F64)
    }

    fn to_value(&self) -> Value {
        Value::Float(*self, FloatKind::F64)
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        match value.dynamic() {
            Some(Value::Float(v, FloatKind::F64)) => Ok(*v),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

/// A complex number with single-precision parts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex64 {
    /// Real part.
    pub re: f32,
    /// Imaginary part.
    pub im: f32,
}

/// A complex number with double-precision parts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex128 {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

impl Reflect for Complex64 {
    fn reflect_type() -> Type {
        Type::Complex(ComplexKind::C64)
    }

    fn to_value(&self) -> Value {
        Value::Complex(f64::from(self.re), f64::from(self.im), ComplexKind::C64)
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        match value.dynamic() {
            Some(Value::Complex(re, im, ComplexKind::C64)) => Ok(Self {
                re: *re as f32,
                im: *im as f32,
            }),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl Reflect for Complex128 {
    fn reflect_type() -> Type {
        Type::Complex(ComplexKind::C128)
    }

    fn to_value(&self) -> Value {
        Value::Complex(self.re, self.im, ComplexKind::C128)
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        match value.dynamic() {
            Some(Value::Complex(re, im, ComplexKind::C128)) => Ok(Self { re: *re, im: *im }),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl Reflect for bool {
    fn reflect_type() -> Type {
        Type::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        match value.dynamic() {
            Some(Value::Bool(b)) => Ok(*b),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl Reflect for String {
    fn reflect_type() -> Type {
        Type::String
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        match value.dynamic() {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn reflect_type() -> Type {
        Type::Slice(TypeRef::Lazy(T::reflect_type))
    }

    fn to_value(&self) -> Value {
        Value::Sequence(SequenceValue::slice(
            TypeRef::Lazy(T::reflect_type),
            self.iter().map(Reflect::to_value).collect(),
        ))
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        match value.dynamic() {
            Some(Value::Sequence(seq)) => seq.items().iter().map(T::from_value).collect(),
            None => Ok(Self::new()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn reflect_type() -> Type {
        Type::Array(TypeRef::Lazy(T::reflect_type), N)
    }

    fn to_value(&self) -> Value {
        Value::Sequence(SequenceValue::array(
            TypeRef::Lazy(T::reflect_type),
            self.iter().map(Reflect::to_value).collect(),
        ))
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        match value.dynamic() {
            Some(Value::Sequence(seq)) if seq.len() == N => {
                let items = seq
                    .items()
                    .iter()
                    .map(T::from_value)
                    .collect::<MorphResult<Vec<T>>>()?;
                items.try_into().map_err(|_| mismatch::<Self>(value))
            }
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn reflect_type() -> Type {
        Type::Pointer(TypeRef::Lazy(T::reflect_type))
    }

    fn to_value(&self) -> Value {
        let pointee = TypeRef::Lazy(T::reflect_type);
        Value::Pointer(match self {
            Some(inner) => Pointer::with_type(pointee, inner.to_value()),
            None => Pointer::nil(pointee),
        })
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        match value.dynamic() {
            None => Ok(None),
            Some(Value::Pointer(ptr)) if ptr.is_nil() => Ok(None),
            Some(Value::Pointer(ptr)) => {
                let inner = ptr.load().ok_or_else(|| mismatch::<Self>(value))?;
                T::from_value(&inner).map(Some)
            }
            Some(other) => T::from_value(other).map(Some),
        }
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn reflect_type() -> Type {
        T::reflect_type()
    }

    fn to_value(&self) -> Value {
        T::to_value(self)
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: Reflect> Reflect for Rc<T> {
    fn reflect_type() -> Type {
        T::reflect_type()
    }

    fn to_value(&self) -> Value {
        T::to_value(self)
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        T::from_value(value).map(Rc::new)
    }
}

impl<K, V, S> Reflect for HashMap<K, V, S>
where
    K: Reflect + Eq + Hash,
    V: Reflect,
    S: BuildHasher + Default,
{
    fn reflect_type() -> Type {
        Type::Map(TypeRef::Lazy(K::reflect_type), TypeRef::Lazy(V::reflect_type))
    }

    fn to_value(&self) -> Value {
        let mut map = MapValue::new(TypeRef::Lazy(K::reflect_type), TypeRef::Lazy(V::reflect_type));
        for (k, v) in self {
            map.insert(k.to_value(), v.to_value());
        }
        Value::Map(map)
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        match value.dynamic() {
            Some(Value::Map(map)) => map
                .iter()
                .map(|(k, v)| -> MorphResult<(K, V)> { Ok((K::from_value(k)?, V::from_value(v)?)) })
                .collect(),
            None => Ok(Self::default()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: Reflect + Ord,
    V: Reflect,
{
    fn reflect_type() -> Type {
        Type::Map(TypeRef::Lazy(K::reflect_type), TypeRef::Lazy(V::reflect_type))
    }

    fn to_value(&self) -> Value {
        let mut map = MapValue::new(TypeRef::Lazy(K::reflect_type), TypeRef::Lazy(V::reflect_type));
        for (k, v) in self {
            map.insert(k.to_value(), v.to_value());
        }
        Value::Map(map)
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        match value.dynamic() {
            Some(Value::Map(map)) => map
                .iter()
                .map(|(k, v)| -> MorphResult<(K, V)> { Ok((K::from_value(k)?, V::from_value(v)?)) })
                .collect(),
            None => Ok(Self::new()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl Reflect for Value {
    fn reflect_type() -> Type {
        Type::Interface
    }

    fn to_value(&self) -> Value {
        Self::interface(self.clone())
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        Ok(value.dynamic().cloned().unwrap_or_default())
    }
}

impl Reflect for Timestamp {
    fn reflect_type() -> Type {
        Type::Struct(Self::struct_type())
    }

    fn to_value(&self) -> Value {
        Value::Struct(self.to_struct())
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        match concrete(value)?.as_ref() {
            Value::Struct(sv) => Self::from_struct(sv),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl Reflect for SystemTime {
    fn reflect_type() -> Type {
        Timestamp::reflect_type()
    }

    fn to_value(&self) -> Value {
        Timestamp::from(*self).to_value()
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        Timestamp::from_value(value).map(Self::from)
    }
}

impl Reflect for crate::value::Callable {
    fn reflect_type() -> Type {
        Type::Func(Rc::new(crate::value::FuncType::default()))
    }

    fn to_value(&self) -> Value {
        Value::Callable(self.clone())
    }

    fn from_value(value: &Value) -> MorphResult<Self> {
        match value.dynamic() {
            Some(Value::Callable(func)) => Ok(func.clone()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}
