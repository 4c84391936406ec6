//! Per-field coercion rules shared by struct and map copies.

use tracing::debug;

use super::Cloner;
use crate::equal::equal;
use crate::held::HeldTarget;
use crate::value::{Kind, Pointer, StructValue, Type, Value};
use crate::{MorphError, MorphResult};

/// Outcome of the nil/zero copy policies for an assignable pair.
enum Decision {
    Copy,
    Keep,
}

impl Cloner {
    /// Write `from` into `held`, converting as needed.
    pub(super) fn coerce(
        &self,
        from_name: &str,
        from: &Value,
        held: &mut dyn HeldTarget,
    ) -> MorphResult<()> {
        let to_ty = held.target_type();
        if let Value::Callable(func) = from {
            if to_ty.kind() != Kind::Callable {
                if func.is_nil() || !func.signature().is_getter() {
                    debug!(field = from_name, "callable source is not a getter");
                    return Ok(());
                }
                let produced = func.call(&[])?.into_iter().next().unwrap_or_default();
                return self.assign(from_name, &produced, held);
            }
        }
        if to_ty.kind() == Kind::Callable && from.kind() != Kind::Callable {
            return Self::feed_callable(from_name, from, held);
        }
        if let Type::Pointer(pointee) = &to_ty {
            if from.kind() != Kind::PointerLike {
                let pointee_ty = pointee.resolve();
                let inner = self.fill(from_name, from, &pointee_ty, held.name())?;
                return held.set(Value::Pointer(Pointer::with_type(pointee.clone(), inner)));
            }
            return self.assign(from_name, from, held);
        }
        self.assign(from_name, from, held)
    }

    /// Call a one-argument callable held by the destination with `from`.
    fn feed_callable(from_name: &str, from: &Value, held: &dyn HeldTarget) -> MorphResult<()> {
        let Some(Value::Callable(func)) = held.current().and_then(Value::dynamic) else {
            return Ok(());
        };
        let Some(param) = func.signature().params.first().filter(|_| func.signature().accepts_one())
        else {
            return Ok(());
        };
        if func.is_nil() {
            return Ok(());
        }
        let arg = from.fit(param).map_err(|_| {
            MorphError::incompatible(from_name, &from.type_of(), held.name(), param)
        })?;
        func.call(&[arg]).map(drop)
    }

    /// Produce a value of type `to` from `from`, recursing into structs.
    fn fill(&self, from_name: &str, from: &Value, to: &Type, to_name: &str) -> MorphResult<Value> {
        let from = from.dynamic().cloned().unwrap_or_default();
        if !from.is_valid() {
            return Ok(to.zero());
        }
        if let (Value::Struct(src), Type::Struct(st)) = (&from, to) {
            if src.struct_type() != st {
                let mut filled = StructValue::zero(st.clone());
                self.copy_struct_fields(src, &mut filled)?;
                return Ok(Value::Struct(filled));
            }
        }
        from.fit(to)
            .map_err(|_| MorphError::incompatible(from_name, &from.type_of(), to_name, to))
    }

    /// Apply the copy policies and the assignable/convertible fallbacks.
    fn assign(&self, from_name: &str, from: &Value, held: &mut dyn HeldTarget) -> MorphResult<()> {
        let to_ty = held.target_type();
        let from_ty = from.type_of();
        let (from, from_ty) = if from_ty == to_ty || from_ty.assignable_to(&to_ty) {
            (from.clone(), from_ty)
        } else {
            match from.kind() {
                Kind::PointerLike | Kind::InterfaceLike => {
                    let inner = from
                        .indirect()
                        .filter(Value::is_valid)
                        .or_else(|| from_ty.elem().map(|t| t.zero()))
                        .unwrap_or_else(|| to_ty.zero());
                    let inner_ty = inner.type_of();
                    (inner, inner_ty)
                }
                _ => (from.clone(), from_ty),
            }
        };
        if self.config.zero_if_equals_from() {
            if let Some(current) = held.current() {
                if current.kind() == from.kind() && equal(&from, current) {
                    debug!(field = held.name(), "equal to source, zeroing");
                    return held.set(to_ty.zero());
                }
            }
        }
        if from_ty.assignable_to(&to_ty) {
            return match self.decide(&from, &to_ty) {
                Decision::Copy => held.set(from.assign_into(&to_ty)),
                Decision::Keep => {
                    debug!(field = held.name(), "nil or zero source kept out");
                    Ok(())
                }
            };
        }
        self.assign_unassignable(from_name, &from, &to_ty, held)
    }

    fn decide(&self, from: &Value, to_ty: &Type) -> Decision {
        if from.kind() != to_ty.kind() || self.config.each_field_always() {
            return Decision::Copy;
        }
        let keep = if from.is_nilable() {
            from.is_nil() && self.config.keep_if_from_is_nil()
        } else {
            from.is_zero() && self.config.keep_if_from_is_zero()
        };
        if keep { Decision::Keep } else { Decision::Copy }
    }

    fn assign_unassignable(
        &self,
        from_name: &str,
        from: &Value,
        to_ty: &Type,
        held: &mut dyn HeldTarget,
    ) -> MorphResult<()> {
        let to_name = held.name().to_owned();
        let incompatible =
            || MorphError::incompatible(from_name, &from.type_of(), &to_name, to_ty);
        match (from, to_ty) {
            (Value::Sequence(src), Type::Slice(elem) | Type::Array(elem, _))
                if src.elem_type() == elem.resolve() =>
            {
                let Value::Sequence(dst) = held.slot()? else {
                    return Err(incompatible());
                };
                for (slot, item) in dst.items_mut().iter_mut().zip(src.items()) {
                    *slot = item.clone();
                }
                Ok(())
            }
            _ if from.kind().is_numeric() && to_ty.kind() == from.kind() => {
                held.set(from.try_convert(to_ty)?)
            }
            (Value::Struct(src), Type::Struct(_)) => match held.slot()? {
                Value::Struct(dst) => self.copy_struct_fields(src, dst),
                _ => Err(incompatible()),
            },
            (Value::Map(src), Type::Struct(_) | Type::Map(..)) => {
                let slot = held.slot()?;
                self.copy_map_to(src, slot)
            }
            _ => Err(incompatible()),
        }
    }
}
