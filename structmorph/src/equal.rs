//! Cycle-safe structural equality.
//!
//! Pointers are compared by following them. Every pair of storages entered is
//! recorded, and meeting a recorded pair again counts as equal, so comparing
//! two cyclic graphs terminates.

use std::collections::HashSet;

use crate::value::{Pointer, Value};

/// Pairs of storage addresses already entered during one comparison.
#[derive(Debug, Default)]
pub struct Seen {
    pairs: HashSet<(usize, usize)>,
}

impl Seen {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Structural equality of two values.
///
/// Values of different types are unequal. Interfaces compare their payloads,
/// structs compare every field, sequences and maps compare element-wise, and
/// pointers are equal when they share storage or when their pointees are
/// equal. Two callables are equal only when both are nil.
#[must_use]
pub fn equal(a: &Value, b: &Value) -> bool {
    equal_with(a, b, &mut Seen::new())
}

/// [`equal`] sharing a visited set with the caller.
#[must_use]
pub fn equal_with(a: &Value, b: &Value, seen: &mut Seen) -> bool {
    match (a, b) {
        (Value::Interface(_), _) | (_, Value::Interface(_)) => match (a.dynamic(), b.dynamic()) {
            (None, None) => true,
            (Some(x), Some(y)) => equal_with(x, y, seen),
            _ => false,
        },
        (Value::Invalid, Value::Invalid) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x, kx), Value::Int(y, ky)) => kx == ky && x == y,
        (Value::Uint(x, kx), Value::Uint(y, ky)) => kx == ky && x == y,
        (Value::Float(x, kx), Value::Float(y, ky)) => kx == ky && x == y,
        (Value::Complex(xr, xi, kx), Value::Complex(yr, yi, ky)) => {
            kx == ky && xr == yr && xi == yi
        }
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Struct(x), Value::Struct(y)) => {
            x.struct_type() == y.struct_type()
                && x
                    .fields()
                    .iter()
                    .zip(y.fields())
                    .all(|(fx, fy)| equal_with(fx, fy, seen))
        }
        (Value::Sequence(x), Value::Sequence(y)) => {
            x.is_array() == y.is_array()
                && x.elem_type() == y.elem_type()
                && x.len() == y.len()
                && x
                    .items()
                    .iter()
                    .zip(y.items())
                    .all(|(ix, iy)| equal_with(ix, iy, seen))
        }
        (Value::Map(x), Value::Map(y)) => {
            x.type_of() == y.type_of()
                && x.len() == y.len()
                && x.iter().all(|(key, vx)| {
                    y.get(key).is_some_and(|vy| equal_with(vx, vy, seen))
                })
        }
        (Value::Pointer(x), Value::Pointer(y)) => pointers_equal(x, y, seen),
        (Value::Callable(x), Value::Callable(y)) => x.is_nil() && y.is_nil(),
        _ => false,
    }
}

fn pointers_equal(x: &Pointer, y: &Pointer, seen: &mut Seen) -> bool {
    if x.pointee() != y.pointee() {
        return false;
    }
    match (x.cell(), y.cell()) {
        (None, None) => true,
        (Some(_), Some(_)) if x.ptr_eq(y) => true,
        (Some(cx), Some(cy)) => {
            let (Some(ax), Some(ay)) = (x.addr(), y.addr()) else {
                return false;
            };
            if !seen.pairs.insert((ax, ay)) {
                return true;
            }
            let (Ok(vx), Ok(vy)) = (cx.try_borrow(), cy.try_borrow()) else {
                return false;
            };
            equal_with(&vx, &vy, seen)
        }
        _ => false,
    }
}
