//! Crate path resolution for dependency aliasing support.
//!
//! Converts the optional `#[morph(crate = "...")]` attribute value into a
//! `TokenStream` that replaces hardcoded `structmorph::` paths in generated
//! code.

use proc_macro2::TokenStream;
use quote::quote;

/// Resolve the crate path from the parsed struct attribute.
///
/// Defaults to `::structmorph` when no override is present.
///
/// # Examples
///
/// ```rust,ignore
/// let path: syn::Path = syn::parse_str("my_alias").unwrap();
/// let aliased = resolve(Some(&path));
/// assert_eq!(aliased.to_string(), "my_alias");
/// ```
pub(crate) fn resolve(crate_path: Option<&syn::Path>) -> TokenStream {
    crate_path.map_or_else(|| quote! { ::structmorph }, |path| quote! { #path })
}

#[cfg(test)]
mod tests {
    //! Unit tests for crate path resolution with default and custom paths.

    use super::*;
    use anyhow::Result;
    use rstest::rstest;

    #[rstest]
    #[case::default(None, ":: structmorph")]
    #[case::custom(Some("my_alias"), "my_alias")]
    #[case::nested(Some("my_ns::structmorph"), "my_ns :: structmorph")]
    fn resolve_produces_expected_tokens(
        #[case] input: Option<&str>,
        #[case] expected: &str,
    ) -> Result<()> {
        let parsed = input.map(syn::parse_str::<syn::Path>).transpose()?;
        let tokens = resolve(parsed.as_ref());
        assert_eq!(tokens.to_string(), expected);
        Ok(())
    }
}
