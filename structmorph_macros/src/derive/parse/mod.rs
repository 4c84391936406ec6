//! Parsing utilities for the `Reflect` derive macro.
//!
//! Struct and field metadata live in `#[morph(...)]` attributes. Unknown
//! keys are consumed and ignored so older macro versions keep accepting
//! input written for newer ones.

use syn::meta::ParseNestedMeta;
use syn::parenthesized;
use syn::{Attribute, Token};

mod input;
mod literals;
mod rename;
#[cfg(test)]
mod tests;

pub(crate) use input::{ReflectField, ReflectInput, parse_input};
use literals::{flag, lit_str};
pub(crate) use rename::RenameAll;

/// Struct-level attributes recognised by `#[derive(Reflect)]`.
#[derive(Default, Clone)]
pub(crate) struct StructAttrs {
    /// Nominal type name; defaults to the struct identifier.
    pub name: Option<String>,
    pub rename_all: Option<RenameAll>,
    /// Function returning extra method descriptors.
    pub methods: Option<syn::Path>,
    pub cloneable: bool,
    /// Overrides the generated crate path for dependency aliasing.
    pub crate_path: Option<syn::Path>,
}

/// Field-level attributes recognised by `#[derive(Reflect)]`.
///
/// - `rename` replaces the computed field name.
/// - `embed` marks a nested struct whose fields are promoted.
/// - `skip` omits the field from the type table.
/// - `private` marks the field as unexported.
/// - `tags` holds every `tag(key = "value")` pair in declaration order.
#[derive(Default, Clone)]
pub(crate) struct FieldAttrs {
    pub rename: Option<String>,
    pub embed: bool,
    pub skip: bool,
    pub private: bool,
    pub tags: Vec<(String, String)>,
}

/// Iterate all `#[morph(...)]` attributes once and apply a callback.
fn parse_morph<F>(attrs: &[Attribute], mut f: F) -> syn::Result<()>
where
    F: FnMut(&ParseNestedMeta) -> syn::Result<()>,
{
    for attr in attrs.iter().filter(|a| a.path().is_ident("morph")) {
        attr.parse_nested_meta(|meta| f(&meta))?;
    }
    Ok(())
}

/// Consumes an unrecognised key-value or list without recording it.
fn discard_unknown(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<proc_macro2::TokenStream>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        parenthesized!(content in meta.input);
        content.parse::<proc_macro2::TokenStream>()?;
    }
    Ok(())
}

/// Extracts `#[morph(...)]` metadata applied to a struct.
pub(crate) fn parse_struct_attrs(attrs: &[Attribute]) -> syn::Result<StructAttrs> {
    let mut out = StructAttrs::default();
    parse_morph(attrs, |meta| {
        match meta.path.get_ident().map(ToString::to_string).as_deref() {
            Some("name") => {
                out.name = Some(lit_str(meta, "name")?.value());
                Ok(())
            }
            Some("rename_all") => {
                let value = lit_str(meta, "rename_all")?;
                out.rename_all = Some(RenameAll::parse(&value)?);
                Ok(())
            }
            Some("methods") => {
                out.methods = Some(meta.value()?.parse::<syn::Path>()?);
                Ok(())
            }
            Some("cloneable") => {
                out.cloneable = flag(meta)?;
                Ok(())
            }
            Some("crate") => {
                let s = lit_str(meta, "crate")?;
                let path: syn::Path =
                    syn::parse_str(&s.value()).map_err(|e| syn::Error::new(s.span(), e))?;
                out.crate_path = Some(path);
                Ok(())
            }
            _ => discard_unknown(meta),
        }
    })?;
    Ok(out)
}

fn parse_tags(meta: &ParseNestedMeta, tags: &mut Vec<(String, String)>) -> syn::Result<()> {
    meta.parse_nested_meta(|nested| {
        let Some(key) = nested.path.get_ident().map(ToString::to_string) else {
            return Err(nested.error("tag keys must be plain identifiers"));
        };
        let value = lit_str(&nested, &key)?.value();
        tags.push((key, value));
        Ok(())
    })
}

/// Parses field-level `#[morph(...)]` attributes.
///
/// `skip` cannot be combined with `embed`, since a skipped field has no
/// fields to promote.
pub(crate) fn parse_field_attrs(field: &syn::Field) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    parse_morph(&field.attrs, |meta| {
        match meta.path.get_ident().map(ToString::to_string).as_deref() {
            Some("rename") => {
                out.rename = Some(lit_str(meta, "rename")?.value());
                Ok(())
            }
            Some("embed") => {
                out.embed = flag(meta)?;
                Ok(())
            }
            Some("skip") => {
                out.skip = flag(meta)?;
                Ok(())
            }
            Some("private") => {
                out.private = flag(meta)?;
                Ok(())
            }
            Some("tag") => parse_tags(meta, &mut out.tags),
            _ => discard_unknown(meta),
        }
    })?;
    if out.skip && out.embed {
        return Err(syn::Error::new_spanned(
            field,
            "`skip` and `embed` cannot be combined",
        ));
    }
    Ok(out)
}
