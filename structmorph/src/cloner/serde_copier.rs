//! Copier that round-trips through a JSON document.
//!
//! Only exported fields travel; callables never do. Decoding writes into the
//! existing destination, so fields absent from the document keep their value.

use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value as Json;
use tracing::debug;

use super::Copier;
use crate::result_ext::MorphResultExt;
use crate::value::{
    FloatKind, IntKind, MapValue, Pointer, SequenceValue, Type, Value, terminal_cell,
};
use crate::{MorphError, MorphResult};

const MAX_DEPTH: usize = 128;

/// Copier that serialises the source and decodes the document into the
/// destination.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerdeCopier;

struct Exported<'a> {
    value: &'a Value,
    depth: usize,
}

impl Exported<'_> {
    const fn nested<'b>(&self, value: &'b Value) -> Exported<'b> {
        Exported {
            value,
            depth: self.depth + 1,
        }
    }
}

impl Serialize for Exported<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.depth > MAX_DEPTH {
            return Err(S::Error::custom("value graph nests too deeply"));
        }
        match self.value {
            Value::Invalid | Value::Callable(_) | Value::Interface(None) => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(v, _) => serializer.serialize_i64(*v),
            Value::Uint(v, _) => serializer.serialize_u64(*v),
            Value::Float(v, _) => serializer.serialize_f64(*v),
            Value::Complex(re, im, _) => [re, im].serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Struct(sv) => {
                let exported: Vec<_> = sv
                    .struct_type()
                    .fields()
                    .iter()
                    .zip(sv.fields())
                    .filter(|(field, value)| {
                        field.is_visible() && !matches!(value, Value::Callable(_))
                    })
                    .collect();
                let mut map = serializer.serialize_map(Some(exported.len()))?;
                for (field, value) in exported {
                    map.serialize_entry(field.name(), &self.nested(value))?;
                }
                map.end()
            }
            Value::Sequence(seq) => {
                let mut out = serializer.serialize_seq(Some(seq.len()))?;
                for item in seq.items() {
                    out.serialize_element(&self.nested(item))?;
                }
                out.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    let key = object_key(key)
                        .ok_or_else(|| S::Error::custom(format!("unsupported map key {key}")))?;
                    out.serialize_entry(&key, &self.nested(value))?;
                }
                out.end()
            }
            Value::Pointer(ptr) => match ptr.load() {
                Some(inner) => self.nested(&inner).serialize(serializer),
                None => serializer.serialize_none(),
            },
            Value::Interface(Some(inner)) => self.nested(inner).serialize(serializer),
        }
    }
}

/// JSON object key for a map key: strings verbatim, integers in decimal.
fn object_key(key: &Value) -> Option<String> {
    match key.dynamic()? {
        Value::String(s) => Some(s.clone()),
        Value::Int(v, _) => Some(v.to_string()),
        Value::Uint(v, _) => Some(v.to_string()),
        _ => None,
    }
}

fn mismatch(json: &Json, to: &Type) -> MorphError {
    let from = match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    };
    MorphError::ConversionFailed {
        from: format!("json {from}"),
        to: to.to_string(),
    }
}

/// Build a value of type `to` from `json`.
fn decode(json: &Json, to: &Type) -> MorphResult<Value> {
    let mut out = to.zero();
    decode_into(json, &mut out)?;
    Ok(out)
}

/// Decode `json` into an untyped value.
fn decode_dynamic(json: &Json) -> Value {
    match json {
        Json::Null => Value::Interface(None),
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => n.as_i64().map_or_else(
            || Value::Float(n.as_f64().unwrap_or_default(), FloatKind::F64),
            |v| Value::Int(v, IntKind::I64),
        ),
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::Sequence(SequenceValue::slice(
            Type::Interface.into(),
            items.iter().map(|i| Value::interface(decode_dynamic(i))).collect(),
        )),
        Json::Object(entries) => {
            let mut map = MapValue::new(Type::String.into(), Type::Interface.into());
            for (k, v) in entries {
                map.insert(Value::String(k.clone()), Value::interface(decode_dynamic(v)));
            }
            Value::Map(map)
        }
    }
}

fn decode_key(key: &str, to: &Type) -> MorphResult<Value> {
    let fail = || MorphError::ConversionFailed {
        from: format!("json key {key:?}"),
        to: to.to_string(),
    };
    match to {
        Type::String | Type::Interface => Ok(Value::String(key.to_owned()).fit(to)?),
        Type::Int(kind) => key
            .parse::<i64>()
            .map(|v| Value::Int(kind.wrap(v), *kind))
            .map_err(|_| fail()),
        Type::Uint(kind) => key
            .parse::<u64>()
            .map(|v| Value::Uint(kind.wrap(v), *kind))
            .map_err(|_| fail()),
        _ => Err(fail()),
    }
}

/// Decode `json` over the existing content of `to`.
///
/// `null` leaves non-nilable destinations untouched.
fn decode_into(json: &Json, to: &mut Value) -> MorphResult<()> {
    let ty = to.type_of();
    let fail = || mismatch(json, &ty);
    if json.is_null() && !matches!(to, Value::Pointer(_) | Value::Interface(_) | Value::Invalid) {
        return Ok(());
    }
    match to {
        Value::Callable(_) => {}
        Value::Invalid | Value::Interface(_) => *to = Value::interface(decode_dynamic(json)),
        Value::Bool(b) => *b = json.as_bool().ok_or_else(fail)?,
        Value::Int(v, kind) => *v = kind.wrap(json.as_i64().ok_or_else(fail)?),
        Value::Uint(v, kind) => *v = kind.wrap(json.as_u64().ok_or_else(fail)?),
        Value::Float(v, kind) => *v = kind.round(json.as_f64().ok_or_else(fail)?),
        Value::Complex(re, im, kind) => {
            let part = |index: usize| {
                json.get(index)
                    .and_then(Json::as_f64)
                    .map(|p| kind.part().round(p))
                    .ok_or_else(fail)
            };
            let (r, i) = (part(0)?, part(1)?);
            *re = r;
            *im = i;
        }
        Value::String(s) => json.as_str().ok_or_else(fail)?.clone_into(s),
        Value::Struct(sv) => {
            let object = json.as_object().ok_or_else(fail)?;
            let visible: Vec<(usize, String)> = sv
                .struct_type()
                .fields()
                .iter()
                .enumerate()
                .filter(|(_, field)| field.is_visible())
                .map(|(index, field)| (index, field.name().to_owned()))
                .collect();
            for (index, name) in visible {
                if let (Some(item), Some(slot)) = (object.get(&name), sv.at_path_mut(&[index])) {
                    decode_into(item, slot)?;
                }
            }
        }
        Value::Sequence(seq) => {
            let items = json.as_array().ok_or_else(fail)?;
            if seq.is_array() {
                for (slot, item) in seq.items_mut().iter_mut().zip(items) {
                    decode_into(item, slot)?;
                }
            } else {
                let elem = seq.elem_type();
                let decoded = items
                    .iter()
                    .map(|item| decode(item, &elem))
                    .collect::<MorphResult<Vec<_>>>()?;
                *seq = SequenceValue::slice(elem.into(), decoded);
            }
        }
        Value::Map(map) => {
            let object = json.as_object().ok_or_else(fail)?;
            let (key_ty, elem_ty) = (map.key_type(), map.elem_type());
            for (k, v) in object {
                let key = decode_key(k, &key_ty)?;
                match map.get_mut(&key) {
                    Some(existing) => decode_into(v, existing)?,
                    None => {
                        map.insert(key, decode(v, &elem_ty)?);
                    }
                }
            }
        }
        Value::Pointer(ptr) => {
            if json.is_null() {
                *ptr = Pointer::nil(ptr.pointee().clone());
                return Ok(());
            }
            match ptr.cell().cloned() {
                Some(cell) => {
                    let mut guard = cell.try_borrow_mut().map_err(|_| MorphError::Unaddressable {
                        ty: ty.to_string(),
                    })?;
                    decode_into(json, &mut guard)?;
                }
                None => {
                    let pointee = ptr.pointee().clone();
                    let inner = decode(json, &pointee.resolve())?;
                    *ptr = Pointer::with_type(pointee, inner);
                }
            }
        }
    }
    Ok(())
}

impl Copier for SerdeCopier {
    fn copy(&self, from: &Value, to: &Value) -> MorphResult<()> {
        let document = serde_json::to_value(Exported {
            value: from,
            depth: 0,
        })
        .into_morph()?;
        let cell = terminal_cell(to)?;
        let mut guard = cell.try_borrow_mut().map_err(|_| MorphError::Unaddressable {
            ty: to.type_of().to_string(),
        })?;
        debug!(from = %from.type_of(), to = %guard.type_of(), "copying through serialisation");
        decode_into(&document, &mut guard)
    }
}
