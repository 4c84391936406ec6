//! First-class functions.

use std::fmt;
use std::rc::Rc;

use super::{FuncType, Value};
use crate::error::guarded;
use crate::{MorphError, MorphResult};

/// Body of a callable.
pub type CallableBody = Rc<dyn Fn(&[Value]) -> Result<Vec<Value>, String>>;

/// A function value with a signature; nil when it has no body.
#[derive(Clone)]
pub struct Callable {
    signature: Rc<FuncType>,
    body: Option<CallableBody>,
}

impl Callable {
    /// Wrap `body` under `signature`.
    #[must_use]
    pub fn new(signature: FuncType, body: CallableBody) -> Self {
        Self {
            signature: Rc::new(signature),
            body: Some(body),
        }
    }

    /// A nil function of the given signature.
    #[must_use]
    pub const fn nil(signature: Rc<FuncType>) -> Self {
        Self {
            signature,
            body: None,
        }
    }

    /// Signature.
    #[must_use]
    pub const fn signature(&self) -> &Rc<FuncType> {
        &self.signature
    }

    /// Whether the function is nil.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        self.body.is_none()
    }

    /// Whether both values share one body.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.body, &other.body) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Invoke the function, recovering any panic.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::CallFailed`] when the function is nil, the arity
    /// or return count is wrong, the body fails, or the body panics.
    pub fn call(&self, args: &[Value]) -> MorphResult<Vec<Value>> {
        let name = self.signature.to_string();
        let body = self
            .body
            .as_ref()
            .ok_or_else(|| MorphError::call_failed(name.as_str(), "nil function"))?;
        if args.len() != self.signature.params.len() {
            return Err(MorphError::call_failed(
                name,
                format!("expected {} argument(s), got {}", self.signature.params.len(), args.len()),
            ));
        }
        let out = guarded(&name, || body(args))?;
        if out.len() == self.signature.returns.len() {
            Ok(out)
        } else {
            Err(MorphError::call_failed(name, format!("returned {} value(s)", out.len())))
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("signature", &self.signature.to_string())
            .field("nil", &self.is_nil())
            .finish()
    }
}
