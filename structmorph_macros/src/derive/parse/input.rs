//! Input parsing for the `Reflect` derive macro.
//!
//! This module gathers the struct identifier, fields, and relevant attribute
//! metadata in one pass so macro expansion can fail fast with useful errors.

use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Generics, Ident, Type};

use super::{FieldAttrs, StructAttrs, parse_field_attrs, parse_struct_attrs};

/// One named field together with its resolved name.
pub(crate) struct ReflectField {
    pub ident: Ident,
    pub ty: Type,
    /// Name recorded in the type table.
    pub name: String,
    pub attrs: FieldAttrs,
}

/// Everything the generator needs from the user's struct.
pub(crate) struct ReflectInput {
    pub ident: Ident,
    pub generics: Generics,
    pub attrs: StructAttrs,
    pub fields: Vec<ReflectField>,
}

impl ReflectInput {
    /// Display name; equality uses the full type path instead.
    pub(crate) fn type_name(&self) -> String {
        self.attrs
            .name
            .clone()
            .unwrap_or_else(|| self.ident.unraw().to_string())
    }
}

/// Gathers information from the user-provided struct.
///
/// Only structs with named fields are accepted. Field names are resolved
/// here: an explicit `rename` wins, otherwise the struct's `rename_all`
/// rule (`PascalCase` by default) is applied to the identifier.
pub(crate) fn parse_input(input: &DeriveInput) -> Result<ReflectInput, syn::Error> {
    let ident = input.ident.clone();
    let attrs = parse_struct_attrs(&input.attrs)?;
    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    data.struct_token,
                    "Reflect requires named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "Reflect can only be derived for structs",
            ));
        }
    };

    let rule = attrs.rename_all.unwrap_or_default();
    let mut fields = Vec::with_capacity(named.len());
    for field in named {
        let Some(field_ident) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let field_attrs = parse_field_attrs(field)?;
        let name = field_attrs
            .rename
            .clone()
            .unwrap_or_else(|| rule.apply(&field_ident.unraw().to_string()));
        fields.push(ReflectField {
            ident: field_ident,
            ty: field.ty.clone(),
            name,
            attrs: field_attrs,
        });
    }
    Ok(ReflectInput {
        ident,
        generics: input.generics.clone(),
        attrs,
        fields,
    })
}
