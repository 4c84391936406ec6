//! Literal parsing helpers for derive attributes.

use syn::{Lit, LitStr, Token};

/// Parses a string literal from `key = "..."`.
///
/// # Examples
///
/// ```rust,ignore
/// use syn::Attribute;
/// let attr: Attribute = syn::parse_quote!(#[morph(rename = "nickName")]);
/// attr.parse_nested_meta(|meta| {
///     let s = lit_str(&meta, "rename")?;
///     assert_eq!(s.value(), "nickName");
///     Ok(())
/// }).unwrap();
/// ```
pub(crate) fn lit_str(meta: &syn::meta::ParseNestedMeta, key: &str) -> Result<LitStr, syn::Error> {
    let literal = meta.value()?.parse::<Lit>()?;
    match literal {
        Lit::Str(s) => Ok(s),
        other => Err(syn::Error::new(
            other.span(),
            format!("{key} must be a string"),
        )),
    }
}

/// Parses a flag written either bare (`embed`) or as `embed = true`.
pub(crate) fn flag(meta: &syn::meta::ParseNestedMeta) -> Result<bool, syn::Error> {
    if meta.input.peek(Token![=]) {
        Ok(meta.value()?.parse::<syn::LitBool>()?.value)
    } else {
        Ok(true)
    }
}
