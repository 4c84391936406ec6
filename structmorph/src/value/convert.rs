//! Safe conversions between value types.

use std::rc::Rc;

use super::{IntKind, SequenceValue, StructValue, Type, UintKind, Value};
use crate::{MorphError, MorphResult};

const REPLACEMENT: char = '\u{FFFD}';

fn rune(code: Option<u32>) -> String {
    code.and_then(char::from_u32)
        .unwrap_or(REPLACEMENT)
        .to_string()
}

fn same_layout(from: &StructValue, to: &Type) -> bool {
    let Some(to) = to.as_struct() else {
        return false;
    };
    let from = from.struct_type().fields();
    from.len() == to.fields().len()
        && from
            .iter()
            .zip(to.fields())
            .all(|(a, b)| a.name() == b.name() && a.ty() == b.ty())
}

impl Value {
    /// Convert to `to`, following the usual numeric and string rules.
    ///
    /// * Numbers convert among all numeric widths, truncating or wrapping.
    /// * Integers convert to strings as a single code point.
    /// * Strings convert to and from byte and code-point slices.
    /// * Structs convert when both declare the same field names and types.
    /// * Slices convert to arrays of matching length.
    /// * Anything converts to the interface type.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::ConversionFailed`] for every other pairing.
    pub fn try_convert(&self, to: &Type) -> MorphResult<Self> {
        if matches!(to, Type::Interface) {
            return Ok(Self::interface(self.clone()));
        }
        if let Self::Interface(inner) = self {
            return match inner {
                Some(inner) => inner.try_convert(to),
                None if to.is_nilable() => Ok(to.zero()),
                None => Err(MorphError::conversion(&Type::Interface, to)),
            };
        }
        let from_ty = self.type_of();
        if from_ty == *to {
            return Ok(self.clone());
        }
        let fail = || MorphError::conversion(&from_ty, to);
        let converted = match (self, to) {
            (Self::Int(v, _), Type::Int(kind)) => Self::Int(kind.wrap(*v), *kind),
            (Self::Int(v, _), Type::Uint(kind)) => Self::Uint(kind.wrap(*v as u64), *kind),
            (Self::Uint(v, _), Type::Int(kind)) => Self::Int(kind.wrap(*v as i64), *kind),
            (Self::Uint(v, _), Type::Uint(kind)) => Self::Uint(kind.wrap(*v), *kind),
            (Self::Int(v, _), Type::Float(kind)) => Self::Float(kind.round(*v as f64), *kind),
            (Self::Uint(v, _), Type::Float(kind)) => Self::Float(kind.round(*v as f64), *kind),
            (Self::Float(v, _), Type::Int(kind)) => Self::Int(kind.wrap(*v as i64), *kind),
            (Self::Float(v, _), Type::Uint(kind)) => Self::Uint(kind.wrap(*v as u64), *kind),
            (Self::Float(v, _), Type::Float(kind)) => Self::Float(kind.round(*v), *kind),
            (Self::Complex(re, im, _), Type::Complex(kind)) => {
                Self::Complex(kind.part().round(*re), kind.part().round(*im), *kind)
            }
            (Self::Int(v, _), Type::String) => Self::String(rune(u32::try_from(*v).ok())),
            (Self::Uint(v, _), Type::String) => Self::String(rune(u32::try_from(*v).ok())),
            (Self::String(s), Type::Slice(elem)) => match elem.resolve() {
                Type::Uint(UintKind::U8) => Self::Sequence(SequenceValue::slice(
                    elem.clone(),
                    s.bytes()
                        .map(|b| Self::Uint(u64::from(b), UintKind::U8))
                        .collect(),
                )),
                Type::Int(IntKind::I32) => Self::Sequence(SequenceValue::slice(
                    elem.clone(),
                    s.chars()
                        .map(|c| Self::Int(i64::from(u32::from(c)), IntKind::I32))
                        .collect(),
                )),
                _ => return Err(fail()),
            },
            (Self::Sequence(seq), Type::String) if !seq.is_array() => {
                match seq.elem_type() {
                    Type::Uint(UintKind::U8) => {
                        let bytes: Vec<u8> = seq
                            .items()
                            .iter()
                            .filter_map(|item| match item {
                                Self::Uint(b, _) => u8::try_from(*b).ok(),
                                _ => None,
                            })
                            .collect();
                        Self::String(String::from_utf8_lossy(&bytes).into_owned())
                    }
                    Type::Int(IntKind::I32) => Self::String(
                        seq.items()
                            .iter()
                            .map(|item| match item {
                                Self::Int(c, _) => rune(u32::try_from(*c).ok()),
                                _ => REPLACEMENT.to_string(),
                            })
                            .collect(),
                    ),
                    _ => return Err(fail()),
                }
            }
            (Self::Sequence(seq), Type::Array(elem, len))
                if !seq.is_array() && seq.len() == *len && seq.elem_type() == elem.resolve() =>
            {
                Self::Sequence(SequenceValue::array(elem.clone(), seq.items().to_vec()))
            }
            (Self::Struct(sv), Type::Struct(st)) if same_layout(sv, to) => {
                Self::Struct(StructValue::new(Rc::clone(st), sv.fields().to_vec()))
            }
            _ => return Err(fail()),
        };
        Ok(converted)
    }
}
