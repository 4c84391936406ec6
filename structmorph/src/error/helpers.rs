//! Helpers for turning panics raised by user callbacks into errors.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use super::MorphError;
use crate::MorphResult;

/// Render a panic payload as text.
#[must_use]
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_owned()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        String::from("non-string panic payload")
    }
}

/// Run `f`, converting both a returned failure and a panic into
/// [`MorphError::CallFailed`] attributed to `name`.
pub(crate) fn guarded<T>(
    name: &str,
    f: impl FnOnce() -> Result<T, String>,
) -> MorphResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(message)) => Err(MorphError::call_failed(name, message)),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(callee = name, panic = %message, "recovered panic in user callback");
            Err(MorphError::call_failed(name, message))
        }
    }
}
