//! Procedural macros for `structmorph`.
//!
//! The [`Reflect`](macro@Reflect) derive lowers a struct with named fields
//! into the dynamic value model: it emits the struct's type table (fields,
//! methods and the optional self-copy capability) together with the
//! `to_value` / `from_value` bridge.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod derive;

/// Derive `structmorph::Reflect` for a struct with named fields.
///
/// Field names default to `PascalCase` so that `nick_name` is seen as
/// `NickName` by the cloner and the merger.
///
/// Struct attributes, written `#[morph(...)]`:
///
/// - `rename_all = "..."` selects another case style for field names.
/// - `name = "..."` overrides the nominal type name.
/// - `methods = path` names a `fn() -> Vec<MethodDescriptor>` whose methods
///   are attached to the type.
/// - `cloneable` registers a self-copy capability backed by `Clone`.
/// - `crate = "..."` points generated code at an aliased dependency.
///
/// Field attributes:
///
/// - `rename = "..."` sets the field name verbatim.
/// - `embed` promotes the fields of a nested struct.
/// - `skip` leaves the field out; it is rebuilt with `Default`.
/// - `private` hides the field from copies unless the visibility override
///   is enabled.
/// - `tag(key = "value", ...)` attaches tags.
#[proc_macro_derive(Reflect, attributes(morph))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
