//! Shared, nilable references.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use super::{Type, TypeRef, Value};
use crate::{MorphError, MorphResult};

/// Storage shared by every pointer aliasing the same value.
pub type Cell = Rc<RefCell<Value>>;

/// A nilable pointer to shared storage.
#[derive(Clone)]
pub struct Pointer {
    pointee: TypeRef,
    cell: Option<Cell>,
}

impl Pointer {
    /// Allocate storage for `value`.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self {
            pointee: value.type_of().into(),
            cell: Some(Rc::new(RefCell::new(value))),
        }
    }

    /// Allocate storage for `value`, declaring the pointee type explicitly.
    #[must_use]
    pub fn with_type(pointee: TypeRef, value: Value) -> Self {
        Self {
            pointee,
            cell: Some(Rc::new(RefCell::new(value))),
        }
    }

    /// A nil pointer to `pointee`.
    #[must_use]
    pub const fn nil(pointee: TypeRef) -> Self {
        Self {
            pointee,
            cell: None,
        }
    }

    /// Pointee type reference.
    #[must_use]
    pub const fn pointee(&self) -> &TypeRef {
        &self.pointee
    }

    /// Resolved pointee type.
    #[must_use]
    pub fn pointee_type(&self) -> Type {
        self.pointee.resolve()
    }

    /// Whether the pointer is nil.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        self.cell.is_none()
    }

    /// Backing storage.
    #[must_use]
    pub const fn cell(&self) -> Option<&Cell> {
        self.cell.as_ref()
    }

    /// Address of the storage, used for identity and cycle tracking.
    #[must_use]
    pub fn addr(&self) -> Option<usize> {
        self.cell.as_ref().map(|cell| Rc::as_ptr(cell).addr())
    }

    /// Whether both pointers share storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.cell, &other.cell) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Snapshot of the pointee. `None` when nil or when the storage is
    /// currently borrowed for writing.
    #[must_use]
    pub fn load(&self) -> Option<Value> {
        self.cell
            .as_ref()
            .and_then(|cell| cell.try_borrow().ok().map(|v| v.clone()))
    }
}

impl fmt::Debug for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.addr() {
            Some(addr) => write!(f, "Pointer({addr:#x} -> {})", self.pointee_type()),
            None => write!(f, "Pointer(nil -> {})", self.pointee_type()),
        }
    }
}

/// Follow `to` through pointers to the innermost non-pointer storage.
///
/// Nil pointers met after the first hop are allocated with the zero value of
/// their pointee.
///
/// # Errors
///
/// Returns [`MorphError::Unaddressable`] when `to` is not a non-nil pointer,
/// when the chain loops back on itself, or when a link is already borrowed.
pub(crate) fn terminal_cell(to: &Value) -> MorphResult<Cell> {
    let unaddressable = || MorphError::Unaddressable {
        ty: to.type_of().to_string(),
    };
    let Value::Pointer(ptr) = to else {
        return Err(unaddressable());
    };
    let mut cell = ptr.cell().cloned().ok_or_else(unaddressable)?;
    let mut visited = HashSet::new();
    loop {
        if !visited.insert(Rc::as_ptr(&cell).addr()) {
            return Err(unaddressable());
        }
        let next = {
            let mut guard = cell.try_borrow_mut().map_err(|_| unaddressable())?;
            match &mut *guard {
                Value::Pointer(inner) if inner.is_nil() => {
                    let pointee = inner.pointee().clone();
                    let zero = pointee.resolve().zero();
                    let allocated = Pointer::with_type(pointee, zero);
                    let next = allocated.cell().cloned();
                    *inner = allocated;
                    next
                }
                Value::Pointer(inner) => inner.cell().cloned(),
                _ => None,
            }
        };
        match next {
            Some(next) => cell = next,
            None => return Ok(cell),
        }
    }
}
