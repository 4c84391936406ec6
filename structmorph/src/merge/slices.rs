//! Set-like accumulation of sequences.

use tracing::debug;

use super::Merger;
use crate::equal::equal;
use crate::value::{SequenceValue, Value};
use crate::{MorphError, MorphResult};

impl Merger {
    pub(super) fn merge_slice_to(from: &SequenceValue, to: &mut Value) -> MorphResult<()> {
        match to {
            Value::Sequence(dst) => merge_sequences(from, dst),
            Value::Invalid | Value::Interface(None) => {
                *to = Value::interface(Value::Sequence(from.clone()));
                Ok(())
            }
            other => Err(MorphError::unsupported(&from.type_of(), &other.type_of())),
        }
    }
}

/// Append every element of `from` that `to` does not already hold.
///
/// Existing elements are never replaced or reordered.
pub(super) fn merge_sequences(from: &SequenceValue, to: &mut SequenceValue) -> MorphResult<()> {
    let elem = to.elem_type();
    for item in from.items() {
        let candidate = item
            .fit(&elem)
            .map_err(|_| MorphError::conversion(&item.type_of(), &elem))?;
        if to.items().iter().any(|existing| equal(existing, &candidate)) {
            continue;
        }
        debug!(item = %candidate, "appending");
        to.push(candidate)
            .map_err(|_| MorphError::unsupported(&from.type_of(), &to.type_of()))?;
    }
    Ok(())
}
