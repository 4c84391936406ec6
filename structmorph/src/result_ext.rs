//! Extensions for mapping errors to `MorphResult` concisely.
//!
//! These helpers reduce repetitive `.map_err(|e| MorphError::…(e))` patterns
//! when converting external error types into the crate's
//! `MorphResult<T>` alias.
//!
//! # Examples
//!
//! ```
//! use structmorph::{MorphResult, MorphResultExt};
//!
//! fn serialize() -> MorphResult<serde_json::Value> {
//!     // serde_json::Error implements Into<MorphError>
//!     serde_json::to_value(&42).into_morph()
//! }
//! # serialize().unwrap();
//! ```

use crate::{MorphError, MorphResult};

/// Generic extension for mapping any `Result<T, E>` with `E: Into<MorphError>`
/// into a `MorphResult<T>`.
pub trait MorphResultExt<T, E> {
    /// Convert `Result<T, E>` into `MorphResult<T>` using `Into<MorphError>`.
    ///
    /// # Errors
    ///
    /// Propagates the original error after conversion into [`MorphError`].
    fn into_morph(self) -> MorphResult<T>;
}

impl<T, E> MorphResultExt<T, E> for Result<T, E>
where
    E: Into<MorphError>,
{
    fn into_morph(self) -> MorphResult<T> {
        self.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    //! Tests for result extension helpers.

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn into_morph_maps_serde_errors() {
        let result: Result<u8, serde_json::Error> = serde_json::from_str("not json");
        let mapped = result.into_morph();
        assert!(matches!(mapped, Err(MorphError::Serde(_))));
    }

    #[rstest]
    fn into_morph_passes_values_through() {
        let result: Result<u8, serde_json::Error> = serde_json::from_str("7");
        assert!(matches!(result.into_morph(), Ok(7)));
    }
}
