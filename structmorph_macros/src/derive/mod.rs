//! Expansion of `#[derive(Reflect)]`.
//!
//! Parsing gathers the struct and its `#[morph(...)]` metadata up front so
//! invalid input fails before any tokens are generated.

use proc_macro2::TokenStream;
use syn::DeriveInput;

mod crate_path;
mod generate;
mod parse;

/// Parse `input` and generate the `Reflect` implementation.
pub(crate) fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let parsed = parse::parse_input(input)?;
    Ok(generate::generate_reflect_impl(&parsed))
}
