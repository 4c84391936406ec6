//! Runtime value model.
//!
//! Every copyable datum is a [`Value`]: a tagged variant carrying its payload
//! and enough type information to reconstruct its [`Type`]. Pointers share
//! their pointee through `Rc<RefCell<_>>`, so two pointers can alias the same
//! storage and graphs may contain cycles.

mod callable;
mod composite;
mod convert;
mod pointer;
pub(crate) mod time;
mod types;

use std::fmt;

pub use callable::{Callable, CallableBody};
pub use composite::{MapValue, SequenceValue, StructValue};
pub use pointer::Pointer;
pub(crate) use pointer::terminal_cell;
pub use time::Timestamp;
pub use types::{
    ComplexKind, FieldDescriptor, FloatKind, FuncType, IntKind, MethodBody, MethodDescriptor,
    SelfCopy, StructType, StructTypeBuilder, Type, TypeRef, UintKind,
};

/// Coarse classification used to dispatch copy and merge behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// No value at all.
    Invalid,
    /// `bool`.
    Bool,
    /// Signed integer of any width.
    Integer,
    /// Unsigned integer of any width.
    Unsigned,
    /// Floating point of any width.
    Float,
    /// Complex number of any width.
    Complex,
    /// String.
    String,
    /// Struct.
    Struct,
    /// Slice or array.
    Sequence,
    /// Map.
    AssociativeMap,
    /// Pointer.
    PointerLike,
    /// Function.
    Callable,
    /// Dynamic wrapper.
    InterfaceLike,
}

impl Kind {
    /// Numeric kinds convert freely among themselves.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Unsigned | Self::Float | Self::Complex
        )
    }

    /// Kinds holding a single scalar.
    #[must_use]
    pub const fn is_primitive(self) -> bool {
        self.is_numeric() || matches!(self, Self::Bool | Self::String)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Invalid => "invalid",
            Self::Bool => "bool",
            Self::Integer => "int",
            Self::Unsigned => "uint",
            Self::Float => "float",
            Self::Complex => "complex",
            Self::String => "string",
            Self::Struct => "struct",
            Self::Sequence => "slice",
            Self::AssociativeMap => "map",
            Self::PointerLike => "ptr",
            Self::Callable => "func",
            Self::InterfaceLike => "interface",
        };
        f.write_str(name)
    }
}

/// A dynamically typed value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Invalid,
    /// Boolean.
    Bool(bool),
    /// Signed integer with its width.
    Int(i64, IntKind),
    /// Unsigned integer with its width.
    Uint(u64, UintKind),
    /// Floating point with its width.
    Float(f64, FloatKind),
    /// Complex number: real part, imaginary part, width.
    Complex(f64, f64, ComplexKind),
    /// String.
    String(String),
    /// Struct instance.
    Struct(StructValue),
    /// Slice or array.
    Sequence(SequenceValue),
    /// Map.
    Map(MapValue),
    /// Pointer.
    Pointer(Pointer),
    /// Function.
    Callable(Callable),
    /// Dynamic wrapper; `None` is a nil interface.
    Interface(Option<Box<Value>>),
}

impl Value {
    /// Wrap `value` in a dynamic interface.
    #[must_use]
    pub fn interface(value: Self) -> Self {
        match value {
            Self::Invalid => Self::Interface(None),
            iface @ Self::Interface(_) => iface,
            other => Self::Interface(Some(Box::new(other))),
        }
    }

    /// A pointer to fresh storage holding `value`.
    #[must_use]
    pub fn pointer_to(value: Self) -> Self {
        Self::Pointer(Pointer::new(value))
    }

    /// Kind classification.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Invalid => Kind::Invalid,
            Self::Bool(_) => Kind::Bool,
            Self::Int(..) => Kind::Integer,
            Self::Uint(..) => Kind::Unsigned,
            Self::Float(..) => Kind::Float,
            Self::Complex(..) => Kind::Complex,
            Self::String(_) => Kind::String,
            Self::Struct(_) => Kind::Struct,
            Self::Sequence(_) => Kind::Sequence,
            Self::Map(_) => Kind::AssociativeMap,
            Self::Pointer(_) => Kind::PointerLike,
            Self::Callable(_) => Kind::Callable,
            Self::Interface(_) => Kind::InterfaceLike,
        }
    }

    /// Static type. [`Value::Invalid`] reports the interface type.
    #[must_use]
    pub fn type_of(&self) -> Type {
        match self {
            Self::Invalid | Self::Interface(_) => Type::Interface,
            Self::Bool(_) => Type::Bool,
            Self::Int(_, kind) => Type::Int(*kind),
            Self::Uint(_, kind) => Type::Uint(*kind),
            Self::Float(_, kind) => Type::Float(*kind),
            Self::Complex(_, _, kind) => Type::Complex(*kind),
            Self::String(_) => Type::String,
            Self::Struct(sv) => Type::Struct(sv.struct_type().clone()),
            Self::Sequence(seq) => seq.type_of(),
            Self::Map(map) => map.type_of(),
            Self::Pointer(ptr) => Type::Pointer(ptr.pointee().clone()),
            Self::Callable(func) => Type::Func(func.signature().clone()),
        }
    }

    /// Returns `true` for anything other than [`Value::Invalid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }

    /// Kinds that have a nil state.
    #[must_use]
    pub const fn is_nilable(&self) -> bool {
        match self {
            Self::Sequence(seq) => !seq.is_array(),
            Self::Map(_) | Self::Pointer(_) | Self::Callable(_) | Self::Interface(_) => true,
            _ => false,
        }
    }

    /// Whether the value is nil. Non-nilable values are never nil except
    /// [`Value::Invalid`]; empty slices and maps count as nil.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        match self {
            Self::Invalid => true,
            Self::Sequence(seq) => !seq.is_array() && seq.is_empty(),
            Self::Map(map) => map.is_empty(),
            Self::Pointer(ptr) => ptr.is_nil(),
            Self::Callable(func) => func.is_nil(),
            Self::Interface(inner) => inner.is_none(),
            _ => false,
        }
    }

    /// Whether a zero test is meaningful.
    #[must_use]
    pub const fn is_zeroable(&self) -> bool {
        self.is_valid()
    }

    /// Whether the value equals the zero value of its type.
    ///
    /// Structs are zero when every field is zero; arrays when every element
    /// is zero. Pointers are zero only when nil, so cycles are never entered.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Invalid => true,
            Self::Bool(b) => !b,
            Self::Int(v, _) => *v == 0,
            Self::Uint(v, _) => *v == 0,
            Self::Float(v, _) => *v == 0.0,
            Self::Complex(re, im, _) => *re == 0.0 && *im == 0.0,
            Self::String(s) => s.is_empty(),
            Self::Struct(sv) => sv.fields().iter().all(Self::is_zero),
            Self::Sequence(seq) if seq.is_array() => seq.items().iter().all(Self::is_zero),
            Self::Sequence(seq) => seq.is_empty(),
            Self::Map(map) => map.is_empty(),
            Self::Pointer(ptr) => ptr.is_nil(),
            Self::Callable(func) => func.is_nil(),
            Self::Interface(inner) => inner.is_none(),
        }
    }

    /// Whether writes through this value reach shared storage.
    #[must_use]
    pub fn can_address(&self) -> bool {
        matches!(self, Self::Pointer(ptr) if !ptr.is_nil())
    }

    /// Replace the value with the zero value of its type.
    pub fn set_zero(&mut self) {
        *self = self.type_of().zero();
    }

    /// Reset nilable values to nil; leaves other kinds untouched.
    pub fn set_nil(&mut self) {
        if self.is_nilable() {
            self.set_zero();
        }
    }

    /// Payload of an interface, unwrapped through any nesting.
    ///
    /// Returns `None` for a nil interface and `self` for non-interface kinds.
    #[must_use]
    pub fn dynamic(&self) -> Option<&Self> {
        match self {
            Self::Interface(None) | Self::Invalid => None,
            Self::Interface(Some(inner)) => inner.dynamic(),
            other => Some(other),
        }
    }

    /// Mutable counterpart of [`Value::dynamic`]. A nil interface yields
    /// itself so the caller can fill it.
    pub fn dynamic_mut(&mut self) -> &mut Self {
        match self {
            Self::Interface(Some(inner)) => inner.dynamic_mut(),
            other => other,
        }
    }

    /// Follow one level of pointer or interface indirection.
    ///
    /// Returns `None` when the pointer or interface is nil or its storage is
    /// being written.
    #[must_use]
    pub fn indirect(&self) -> Option<Self> {
        match self {
            Self::Pointer(ptr) => ptr.load(),
            Self::Interface(inner) => inner.as_deref().cloned(),
            other => Some(other.clone()),
        }
    }

    /// Follow pointers and interfaces until a concrete value is reached.
    ///
    /// Returns `None` when a nil link is met.
    #[must_use]
    pub fn indirect_recursive(&self) -> Option<Self> {
        let mut current = self.clone();
        while matches!(current, Self::Pointer(_) | Self::Interface(_)) {
            current = current.indirect()?;
        }
        Some(current)
    }

    /// Store `self` into a location of type `to`, wrapping into an interface
    /// when `to` is the interface type. `self` must be assignable to `to`.
    #[must_use]
    pub(crate) fn assign_into(&self, to: &Type) -> Self {
        if matches!(to, Type::Interface) {
            Self::interface(self.clone())
        } else {
            self.clone()
        }
    }

    /// Store `self` into a location of type `to`, converting when needed.
    pub(crate) fn fit(&self, to: &Type) -> crate::MorphResult<Self> {
        if self.type_of().assignable_to(to) {
            Ok(self.assign_into(to))
        } else {
            self.try_convert(to)
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => f.write_str("<invalid>"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v, _) => write!(f, "{v}"),
            Self::Uint(v, _) => write!(f, "{v}"),
            Self::Float(v, _) => write!(f, "{v}"),
            Self::Complex(re, im, _) => write!(f, "({re}{im:+}i)"),
            Self::String(s) => f.write_str(s),
            Self::Struct(sv) => {
                write!(f, "{}{{", sv.struct_type().name())?;
                for (index, (field, value)) in
                    sv.struct_type().fields().iter().zip(sv.fields()).enumerate()
                {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {value}", field.name())?;
                }
                f.write_str("}")
            }
            Self::Sequence(seq) => {
                f.write_str("[")?;
                for (index, item) in seq.items().iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("map[")?;
                for (index, (key, value)) in map.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                f.write_str("]")
            }
            Self::Pointer(ptr) => match ptr.addr() {
                Some(addr) => write!(f, "{addr:#x}"),
                None => f.write_str("<nil>"),
            },
            Self::Callable(func) => write!(f, "{}", func.signature()),
            Self::Interface(None) => f.write_str("<nil>"),
            Self::Interface(Some(inner)) => write!(f, "{inner}"),
        }
    }
}
