//! Derive macro for the `SszType` and `SszValue` traits from `strata-dynssz`.
//!
//! # Examples
//!
//! ```ignore
//! use strata_dynssz::SszReflect;
//!
//! #[derive(SszReflect)]
//! struct BeaconBlockBody {
//!     #[ssz(size = "96")]
//!     randao_reveal: Vec<u8>,
//!     #[ssz(max = "16", dyn_max = "MAX_PROPOSER_SLASHINGS")]
//!     proposer_slashings: Vec<ProposerSlashing>,
//! }
//! ```
//!
//! A struct with a hand written or generated `HashRoot` impl is marked with
//! `#[ssz(hash_root)]` so the engine can use it when the spec allows.

// The strata-dynssz dev-dependency is used in tests
#[cfg(test)]
use strata_dynssz as _;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, LitStr, parse_macro_input};

/// Derives `SszType` and `SszValue` for structs.
///
/// Fields are described and viewed in declaration order.  Every field type
/// must implement both traits.
///
/// Field attributes, each a comma separated list with one entry per
/// dimension:
/// - `size`: static sizes, `?` for a dynamic dimension
/// - `max`: static maximum sizes
/// - `dyn_size`: spec dependent sizes, literals or expressions over spec names
/// - `dyn_max`: spec dependent maximum sizes
///
/// The struct attribute `#[ssz(hash_root)]` declares a precompiled
/// `HashRoot` impl.
#[proc_macro_derive(SszReflect, attributes(ssz))]
pub fn derive_ssz_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Struct(data_struct) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "SszReflect derive macro only supports structs",
        ));
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let hash_root = struct_hash_root(&input.attrs)?;

    let mut descs = Vec::new();
    let mut views = Vec::new();
    for (i, field) in data_struct.fields.iter().enumerate() {
        let (field_name, access) = match &field.ident {
            Some(ident) => (ident.to_string(), quote! { #ident }),
            None => {
                let index = syn::Index::from(i);
                (i.to_string(), quote! { #index })
            }
        };
        let ty = &field.ty;
        let tags = field_tags(&field.attrs)?;

        descs.push(quote! {
            ::strata_dynssz::FieldDesc::new(
                #field_name,
                <#ty as ::strata_dynssz::SszType>::type_desc(),
                ::strata_dynssz::FieldTags::new() #tags,
            )
        });
        views.push(quote! {
            &self.#access as &dyn ::strata_dynssz::SszValue
        });
    }

    let as_hash_root = hash_root.then(|| {
        quote! {
            fn as_hash_root(&self) -> ::core::option::Option<&dyn ::strata_dynssz::HashRoot> {
                ::core::option::Option::Some(self as &dyn ::strata_dynssz::HashRoot)
            }
        }
    });

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::strata_dynssz::SszType for #name #ty_generics #where_clause {
            fn type_desc() -> ::strata_dynssz::TypeDesc {
                ::strata_dynssz::TypeDesc::container(
                    ::core::any::type_name::<Self>(),
                    ::std::vec![#(#descs),*],
                )
                .with_hash_root(#hash_root)
            }
        }

        #[automatically_derived]
        impl #impl_generics ::strata_dynssz::SszValue for #name #ty_generics #where_clause {
            fn view(&self) -> ::strata_dynssz::ValueView<'_> {
                ::strata_dynssz::ValueView::Fields(::std::vec![#(#views),*])
            }

            #as_hash_root
        }
    })
}

/// Reads `#[ssz(hash_root)]` off the struct.
fn struct_hash_root(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut hash_root = false;
    for attr in attrs.iter().filter(|a| a.path().is_ident("ssz")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("hash_root") {
                hash_root = true;
                Ok(())
            } else {
                Err(meta.error("unsupported ssz struct attribute"))
            }
        })?;
    }
    Ok(hash_root)
}

/// Turns a field's `#[ssz(...)]` attributes into `FieldTags` builder calls.
fn field_tags(attrs: &[Attribute]) -> syn::Result<TokenStream2> {
    let mut calls = TokenStream2::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident("ssz")) {
        attr.parse_nested_meta(|meta| {
            let setter = if meta.path.is_ident("size") {
                quote! { with_ssz_size }
            } else if meta.path.is_ident("max") {
                quote! { with_ssz_max }
            } else if meta.path.is_ident("dyn_size") {
                quote! { with_dyn_size }
            } else if meta.path.is_ident("dyn_max") {
                quote! { with_dyn_max }
            } else {
                return Err(meta.error("unsupported ssz field attribute"));
            };
            let value: LitStr = meta.value()?.parse()?;
            calls.extend(quote! { .#setter(#value) });
            Ok(())
        })?;
    }
    Ok(calls)
}
