//! Token generation for `#[derive(Reflect)]`.
//!
//! Two items are emitted: a hidden inherent function returning the struct's
//! type table, built once per thread and identified by the full type path,
//! and the `Reflect` implementation that lowers fields in declaration order
//! and raises them back by name.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{GenericParam, Generics, parse_quote};

use super::crate_path;
use super::parse::{ReflectField, ReflectInput};


/// Add a `Reflect` bound to every type parameter.
fn with_reflect_bounds(generics: &Generics, krate: &TokenStream) -> Generics {
    let mut bounded = generics.clone();
    for param in &mut bounded.params {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!(#krate::Reflect));
        }
    }
    bounded
}

fn field_descriptor(field: &ReflectField, krate: &TokenStream) -> TokenStream {
    let name = &field.name;
    let ty = &field.ty;
    let mut tokens = quote! {
        #krate::FieldDescriptor::new(#name, <#ty as #krate::Reflect>::reflect_type())
    };
    if field.attrs.private {
        tokens.extend(quote! { .private() });
    }
    if field.attrs.embed {
        tokens.extend(quote! { .embedded() });
    }
    for (key, value) in &field.attrs.tags {
        tokens.extend(quote! { .tag(#key, #value) });
    }
    tokens
}

fn raise_field(field: &ReflectField, krate: &TokenStream) -> TokenStream {
    let member = &field.ident;
    if field.attrs.skip {
        return quote! { #member: ::core::default::Default::default() };
    }
    let name = &field.name;
    quote! { #member: #krate::reflect::field_from(owner, #name)? }
}

/// Generate the complete derive output for `input`.
pub(crate) fn generate_reflect_impl(input: &ReflectInput) -> TokenStream {
    let krate = crate_path::resolve(input.attrs.crate_path.as_ref());
    let ident = &input.ident;
    let type_name = input.type_name();
    let generics = with_reflect_bounds(&input.generics, &krate);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let reflected: Vec<&ReflectField> = input.fields.iter().filter(|f| !f.attrs.skip).collect();
    let descriptors = reflected.iter().map(|f| field_descriptor(f, &krate));
    let lowered = reflected.iter().map(|f| {
        let member = &f.ident;
        quote! { #krate::Reflect::to_value(&self.#member) }
    });
    let raised = input.fields.iter().map(|f| raise_field(f, &krate));
    let owner = if reflected.is_empty() {
        quote! { _owner }
    } else {
        quote! { owner }
    };
    let methods = input
        .attrs
        .methods
        .as_ref()
        .map(|path| quote! { .methods(#path()) });
    let cloneable = input
        .attrs
        .cloneable
        .then(|| quote! { .cloneable::<Self>() });

    quote! {
        #[automatically_derived]
        impl #impl_generics #ident #ty_generics #where_clause {
            #[doc(hidden)]
            #[must_use]
            pub fn __structmorph_struct_type() -> ::std::rc::Rc<#krate::StructType> {
                let identity = ::core::any::type_name::<Self>();
                #krate::StructType::cached(identity, || {
                    #krate::StructType::builder(#type_name)
                        .identity(identity)
                        #( .field(#descriptors) )*
                        #methods
                        #cloneable
                        .build()
                })
            }
        }

        #[automatically_derived]
        impl #impl_generics #krate::Reflect for #ident #ty_generics #where_clause {
            fn reflect_type() -> #krate::Type {
                #krate::Type::Struct(Self::__structmorph_struct_type())
            }

            fn to_value(&self) -> #krate::Value {
                #krate::Value::Struct(#krate::StructValue::new(
                    Self::__structmorph_struct_type(),
                    ::std::vec![#( #lowered ),*],
                ))
            }

            fn from_value(value: &#krate::Value) -> #krate::MorphResult<Self> {
                let concrete = #krate::reflect::concrete(value)?;
                let #krate::Value::Struct(#owner) = concrete.as_ref() else {
                    return ::core::result::Result::Err(#krate::MorphError::conversion(
                        &value.type_of(),
                        &<Self as #krate::Reflect>::reflect_type(),
                    ));
                };
                ::core::result::Result::Ok(Self { #( #raised ),* })
            }
        }
    }
}
