//! Static type descriptors for reflected values.
//!
//! A [`Type`] is the shape half of a [`Value`]: it records widths for numeric
//! kinds, element and key types for containers, and the nominal
//! [`StructType`] table (fields, methods, self-copy capability) for structs.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::{Kind, StructValue, Value};
use crate::error::guarded;
use crate::{MorphError, MorphResult, Reflect};

/// Width of a signed integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntKind {
    /// 8 bits.
    I8,
    /// 16 bits.
    I16,
    /// 32 bits.
    I32,
    /// 64 bits.
    I64,
}

impl IntKind {
    /// Truncate `v` to this width, wrapping like an `as` cast.
    #[must_use]
    pub const fn wrap(self, v: i64) -> i64 {
        match self {
            Self::I8 => v as i8 as i64,
            Self::I16 => v as i16 as i64,
            Self::I32 => v as i32 as i64,
            Self::I64 => v,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
        }
    }
}

/// Width of an unsigned integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UintKind {
    /// 8 bits.
    U8,
    /// 16 bits.
    U16,
    /// 32 bits.
    U32,
    /// 64 bits.
    U64,
}

impl UintKind {
    /// Truncate `v` to this width, wrapping like an `as` cast.
    #[must_use]
    pub const fn wrap(self, v: u64) -> u64 {
        match self {
            Self::U8 => v as u8 as u64,
            Self::U16 => v as u16 as u64,
            Self::U32 => v as u32 as u64,
            Self::U64 => v,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
        }
    }
}

/// Width of a floating point number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FloatKind {
    /// Single precision.
    F32,
    /// Double precision.
    F64,
}

impl FloatKind {
    /// Round `v` to this precision.
    #[must_use]
    pub fn round(self, v: f64) -> f64 {
        match self {
            Self::F32 => f64::from(v as f32),
            Self::F64 => v,
        }
    }
}

/// Width of a complex number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComplexKind {
    /// Two single precision parts.
    C64,
    /// Two double precision parts.
    C128,
}

impl ComplexKind {
    /// Precision of each part.
    #[must_use]
    pub const fn part(self) -> FloatKind {
        match self {
            Self::C64 => FloatKind::F32,
            Self::C128 => FloatKind::F64,
        }
    }
}

/// Reference to an element, key or pointee type.
///
/// `Lazy` defers construction so self-referential shapes such as
/// `Node { next: Option<Box<Node>> }` can be described.
#[derive(Clone)]
pub enum TypeRef {
    /// An already built type.
    Eager(Rc<Type>),
    /// A type produced on demand.
    Lazy(fn() -> Type),
}

impl TypeRef {
    /// Produce the referenced type.
    #[must_use]
    pub fn resolve(&self) -> Type {
        match self {
            Self::Eager(ty) => Type::clone(ty),
            Self::Lazy(build) => build(),
        }
    }
}

impl From<Type> for TypeRef {
    fn from(ty: Type) -> Self {
        Self::Eager(Rc::new(ty))
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Lazy(a), Self::Lazy(b)) if std::ptr::fn_addr_eq(*a, *b) => true,
            _ => self.resolve() == other.resolve(),
        }
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resolve())
    }
}

/// Static type of a [`Value`].
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    /// `bool`.
    Bool,
    /// Signed integer.
    Int(IntKind),
    /// Unsigned integer.
    Uint(UintKind),
    /// Floating point.
    Float(FloatKind),
    /// Complex number.
    Complex(ComplexKind),
    /// UTF-8 string.
    String,
    /// Nominal struct.
    Struct(Rc<StructType>),
    /// Growable sequence.
    Slice(TypeRef),
    /// Fixed-length sequence.
    Array(TypeRef, usize),
    /// Associative map from key type to element type.
    Map(TypeRef, TypeRef),
    /// Nilable pointer.
    Pointer(TypeRef),
    /// Callable.
    Func(Rc<FuncType>),
    /// Dynamic wrapper able to hold any value.
    Interface,
}

impl Type {
    /// Slice of `elem`.
    #[must_use]
    pub fn slice_of(elem: impl Into<TypeRef>) -> Self {
        Self::Slice(elem.into())
    }

    /// Array of `len` elements of `elem`.
    #[must_use]
    pub fn array_of(elem: impl Into<TypeRef>, len: usize) -> Self {
        Self::Array(elem.into(), len)
    }

    /// Map from `key` to `elem`.
    #[must_use]
    pub fn map_of(key: impl Into<TypeRef>, elem: impl Into<TypeRef>) -> Self {
        Self::Map(key.into(), elem.into())
    }

    /// Pointer to `pointee`.
    #[must_use]
    pub fn pointer_to(pointee: impl Into<TypeRef>) -> Self {
        Self::Pointer(pointee.into())
    }

    /// Kind classification of this type.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Bool => Kind::Bool,
            Self::Int(_) => Kind::Integer,
            Self::Uint(_) => Kind::Unsigned,
            Self::Float(_) => Kind::Float,
            Self::Complex(_) => Kind::Complex,
            Self::String => Kind::String,
            Self::Struct(_) => Kind::Struct,
            Self::Slice(_) | Self::Array(..) => Kind::Sequence,
            Self::Map(..) => Kind::AssociativeMap,
            Self::Pointer(_) => Kind::PointerLike,
            Self::Func(_) => Kind::Callable,
            Self::Interface => Kind::InterfaceLike,
        }
    }

    /// Returns `true` when values of this type can be nil.
    #[must_use]
    pub const fn is_nilable(&self) -> bool {
        matches!(
            self,
            Self::Slice(_) | Self::Map(..) | Self::Pointer(_) | Self::Func(_) | Self::Interface
        )
    }

    /// Element type of a sequence or map, or the pointee of a pointer.
    #[must_use]
    pub fn elem(&self) -> Option<Type> {
        match self {
            Self::Slice(elem) | Self::Array(elem, _) | Self::Map(_, elem) | Self::Pointer(elem) => {
                Some(elem.resolve())
            }
            _ => None,
        }
    }

    /// Key type of a map.
    #[must_use]
    pub fn key(&self) -> Option<Type> {
        match self {
            Self::Map(key, _) => Some(key.resolve()),
            _ => None,
        }
    }

    /// Follow pointer types until a non-pointer type is reached.
    #[must_use]
    pub fn indirect_recursive(&self) -> Self {
        let mut ty = self.clone();
        while let Self::Pointer(pointee) = &ty {
            ty = pointee.resolve();
        }
        ty
    }

    /// Struct table for struct types.
    #[must_use]
    pub const fn as_struct(&self) -> Option<&Rc<StructType>> {
        match self {
            Self::Struct(st) => Some(st),
            _ => None,
        }
    }

    /// Returns `true` when a value of this type may be stored in a location
    /// of type `to` without conversion.
    #[must_use]
    pub fn assignable_to(&self, to: &Self) -> bool {
        matches!(to, Self::Interface) || self == to
    }

    /// Zero value of this type.
    #[must_use]
    pub fn zero(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Int(kind) => Value::Int(0, *kind),
            Self::Uint(kind) => Value::Uint(0, *kind),
            Self::Float(kind) => Value::Float(0.0, *kind),
            Self::Complex(kind) => Value::Complex(0.0, 0.0, *kind),
            Self::String => Value::String(String::new()),
            Self::Struct(st) => Value::Struct(StructValue::zero(Rc::clone(st))),
            Self::Slice(elem) => Value::Sequence(super::SequenceValue::slice(elem.clone(), Vec::new())),
            Self::Array(elem, len) => {
                let zero = elem.resolve().zero();
                Value::Sequence(super::SequenceValue::array(elem.clone(), vec![zero; *len]))
            }
            Self::Map(key, elem) => Value::Map(super::MapValue::new(key.clone(), elem.clone())),
            Self::Pointer(pointee) => Value::Pointer(super::Pointer::nil(pointee.clone())),
            Self::Func(func) => Value::Callable(super::Callable::nil(Rc::clone(func))),
            Self::Interface => Value::Interface(None),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int(kind) => f.write_str(kind.name()),
            Self::Uint(kind) => f.write_str(kind.name()),
            Self::Float(FloatKind::F32) => f.write_str("f32"),
            Self::Float(FloatKind::F64) => f.write_str("f64"),
            Self::Complex(ComplexKind::C64) => f.write_str("complex64"),
            Self::Complex(ComplexKind::C128) => f.write_str("complex128"),
            Self::String => f.write_str("string"),
            Self::Struct(st) => f.write_str(st.name()),
            Self::Slice(elem) => write!(f, "[]{}", elem.resolve()),
            Self::Array(elem, len) => write!(f, "[{len}]{}", elem.resolve()),
            Self::Map(key, elem) => write!(f, "map[{}]{}", key.resolve(), elem.resolve()),
            Self::Pointer(pointee) => write!(f, "*{}", pointee.resolve()),
            Self::Func(func) => write!(f, "{func}"),
            Self::Interface => f.write_str("interface{}"),
        }
    }
}

/// Signature of a callable.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FuncType {
    /// Parameter types.
    pub params: Vec<Type>,
    /// Return types.
    pub returns: Vec<Type>,
}

impl FuncType {
    /// Build a signature.
    #[must_use]
    pub const fn new(params: Vec<Type>, returns: Vec<Type>) -> Self {
        Self { params, returns }
    }

    /// Zero parameters and exactly one return value.
    #[must_use]
    pub fn is_getter(&self) -> bool {
        self.params.is_empty() && self.returns.len() == 1
    }

    /// Exactly one parameter.
    #[must_use]
    pub fn accepts_one(&self) -> bool {
        self.params.len() == 1
    }
}

impl fmt::Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        let returns: Vec<String> = self.returns.iter().map(ToString::to_string).collect();
        write!(f, "func({})", params.join(", "))?;
        match returns.len() {
            0 => Ok(()),
            1 => write!(f, " {}", returns.join("")),
            _ => write!(f, " ({})", returns.join(", ")),
        }
    }
}

/// One field of a [`StructType`].
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    name: String,
    ty: Type,
    visible: bool,
    embedded: bool,
    tags: Vec<(String, String)>,
}

impl FieldDescriptor {
    /// A visible, non-embedded field.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            visible: true,
            embedded: false,
            tags: Vec::new(),
        }
    }

    /// Mark the field as private.
    #[must_use]
    pub fn private(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Mark the field as embedded, promoting its own fields.
    #[must_use]
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    /// Attach a tag.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    #[must_use]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Whether the field is exported.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the field is embedded.
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        self.embedded
    }

    /// Look up a tag value.
    #[must_use]
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Body of a method: receives the receiver and the arguments.
pub type MethodBody = Rc<dyn Fn(&mut StructValue, &[Value]) -> Result<Vec<Value>, String>>;

/// Body of a self-copy capability.
pub type SelfCopy = Rc<dyn Fn(&Value) -> Result<Value, String>>;

/// One method of a [`StructType`].
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    signature: FuncType,
    visible: bool,
    body: MethodBody,
}

impl MethodDescriptor {
    /// Build a method from an untyped body.
    #[must_use]
    pub fn new(name: impl Into<String>, signature: FuncType, body: MethodBody) -> Self {
        Self {
            name: name.into(),
            signature,
            visible: true,
            body,
        }
    }

    /// A zero-argument method returning one value computed from the receiver.
    #[must_use]
    pub fn getter<S, R>(name: impl Into<String>, get: impl Fn(&S) -> R + 'static) -> Self
    where
        S: Reflect,
        R: Reflect,
    {
        let body: MethodBody = Rc::new(move |receiver, _args| {
            let this = S::from_value(&Value::Struct(receiver.clone())).map_err(|e| e.to_string())?;
            Ok(vec![get(&this).to_value()])
        });
        Self::new(name, FuncType::new(Vec::new(), vec![R::reflect_type()]), body)
    }

    /// A one-argument method mutating the receiver.
    #[must_use]
    pub fn setter<S, A>(name: impl Into<String>, set: impl Fn(&mut S, A) + 'static) -> Self
    where
        S: Reflect,
        A: Reflect,
    {
        let body: MethodBody = Rc::new(move |receiver, args| {
            let mut this =
                S::from_value(&Value::Struct(receiver.clone())).map_err(|e| e.to_string())?;
            let arg = args
                .first()
                .ok_or_else(|| String::from("missing argument"))
                .and_then(|a| A::from_value(a).map_err(|e| e.to_string()))?;
            set(&mut this, arg);
            if let Value::Struct(updated) = this.to_value() {
                *receiver = updated;
            }
            Ok(Vec::new())
        });
        Self::new(name, FuncType::new(vec![A::reflect_type()], Vec::new()), body)
    }

    /// Mark the method as private.
    #[must_use]
    pub fn private(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signature.
    #[must_use]
    pub const fn signature(&self) -> &FuncType {
        &self.signature
    }

    /// Whether the method is exported.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Invoke the method, recovering any panic.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::CallFailed`] when the arity is wrong, the body
    /// reports a failure, or the body panics.
    pub fn invoke(&self, receiver: &mut StructValue, args: &[Value]) -> MorphResult<Vec<Value>> {
        if args.len() != self.signature.params.len() {
            return Err(MorphError::call_failed(
                self.name.as_str(),
                format!(
                    "expected {} argument(s), got {}",
                    self.signature.params.len(),
                    args.len()
                ),
            ));
        }
        let out = guarded(&self.name, || (self.body)(receiver, args))?;
        if out.len() == self.signature.returns.len() {
            Ok(out)
        } else {
            Err(MorphError::call_failed(
                self.name.as_str(),
                format!("returned {} value(s)", out.len()),
            ))
        }
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("signature", &self.signature.to_string())
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}

/// Nominal struct table: fields, methods and the optional self-copy
/// capability.
///
/// Two tables describe the same type when their identities match. The
/// identity defaults to the display name; derived tables use the full type
/// path including generic arguments.
pub struct StructType {
    name: String,
    identity: String,
    fields: Vec<FieldDescriptor>,
    methods: Vec<MethodDescriptor>,
    self_copy: Option<SelfCopy>,
}

impl StructType {
    /// Start describing a struct called `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> StructTypeBuilder {
        let name = name.into();
        StructTypeBuilder {
            inner: Self {
                identity: name.clone(),
                name,
                fields: Vec::new(),
                methods: Vec::new(),
                self_copy: None,
            },
        }
    }

    /// Return the table registered under `identity` on this thread, building
    /// it with `build` on first use.
    ///
    /// `build` runs without the cache borrowed, so it may ask for other
    /// tables.
    #[must_use]
    pub fn cached<F>(identity: &'static str, build: F) -> Rc<Self>
    where
        F: FnOnce() -> Rc<Self>,
    {
        thread_local! {
            static TABLES: RefCell<HashMap<&'static str, Rc<StructType>>> =
                RefCell::new(HashMap::new());
        }
        if let Some(hit) = TABLES.with_borrow(|tables| tables.get(identity).cloned()) {
            return hit;
        }
        let built = build();
        TABLES.with_borrow_mut(|tables| Rc::clone(tables.entry(identity).or_insert(built)))
    }

    /// Type name, for display.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity compared by equality.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Declared fields in order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Declared methods.
    #[must_use]
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Self-copy capability, if any.
    #[must_use]
    pub const fn self_copy(&self) -> Option<&SelfCopy> {
        self.self_copy.as_ref()
    }

    /// Method called `name`.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Index path to the field called `name`.
    ///
    /// Direct fields win; otherwise fields promoted from embedded structs are
    /// searched breadth first, shallowest match first.
    #[must_use]
    pub fn field_path(&self, name: &str) -> Option<Vec<usize>> {
        if let Some(index) = self.fields.iter().position(|f| f.name == name) {
            return Some(vec![index]);
        }
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.embedded)
            .filter_map(|(index, f)| {
                let inner = f.ty.as_struct()?;
                let mut path = inner.field_path(name)?;
                path.insert(0, index);
                Some(path)
            })
            .min_by_key(Vec::len)
    }

    /// Descriptor of the field at `path`.
    #[must_use]
    pub fn field_at(&self, path: &[usize]) -> Option<FieldDescriptor> {
        let (first, rest) = path.split_first()?;
        let field = self.fields.get(*first)?;
        if rest.is_empty() {
            return Some(field.clone());
        }
        field.ty.as_struct()?.field_at(rest)
    }

    /// Whether this is the well-known timestamp type.
    #[must_use]
    pub fn is_timestamp(&self) -> bool {
        self.identity == super::time::TIMESTAMP_IDENTITY
    }
}

impl PartialEq for StructType {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || self.identity == other.identity
    }
}

impl fmt::Debug for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields.iter().map(|fd| fd.name.as_str()).collect();
        f.debug_struct("StructType")
            .field("name", &self.name)
            .field("identity", &self.identity)
            .field("fields", &fields)
            .field("methods", &self.methods.len())
            .field("self_copy", &self.self_copy.is_some())
            .finish()
    }
}

/// Builder for [`StructType`].
pub struct StructTypeBuilder {
    inner: StructType,
}

impl StructTypeBuilder {
    /// Set the identity used for equality, keeping the display name.
    #[must_use]
    pub fn identity(mut self, identity: impl Into<String>) -> Self {
        self.inner.identity = identity.into();
        self
    }

    /// Append a field.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.inner.fields.push(field);
        self
    }

    /// Append a method.
    #[must_use]
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.inner.methods.push(method);
        self
    }

    /// Append several methods.
    #[must_use]
    pub fn methods(mut self, methods: impl IntoIterator<Item = MethodDescriptor>) -> Self {
        self.inner.methods.extend(methods);
        self
    }

    /// Register a self-copy capability.
    #[must_use]
    pub fn self_copy(mut self, copy: SelfCopy) -> Self {
        self.inner.self_copy = Some(copy);
        self
    }

    /// Register a self-copy capability backed by [`Clone`].
    #[must_use]
    pub fn cloneable<S: Reflect + Clone>(self) -> Self {
        self.self_copy(Rc::new(|value: &Value| {
            let this = S::from_value(value).map_err(|e| e.to_string())?;
            Ok(this.clone().to_value())
        }))
    }

    /// Finish the table.
    #[must_use]
    pub fn build(self) -> Rc<StructType> {
        Rc::new(self.inner)
    }
}

impl fmt::Debug for StructTypeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StructTypeBuilder").field(&self.inner).finish()
    }
}
