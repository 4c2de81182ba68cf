use crate::fields;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput};

pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = generate_injectable_impl(&input).unwrap_or_else(syn::Error::into_compile_error);
    TokenStream::from(expanded)
}

fn generate_injectable_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            struct_name,
            "#[derive(Injectable)] can only be applied to structs",
        ));
    };
    let construct = fields::construct(&data.fields)?;

    Ok(quote! {
        impl #impl_generics ::rapidfast::di::Injectable for #struct_name #ty_generics #where_clause {
            fn inject(
                container: &::rapidfast::di::Container
            ) -> ::rapidfast::Result<Self> {
                let _ = container;
                Ok(#construct)
            }

            fn decorate(store: &::rapidfast::metadata::MetadataStore) {
                store.define(
                    ::rapidfast::metadata::keys::INJECTABLE,
                    true,
                    ::rapidfast::metadata::ClassId::of::<Self>(),
                    None,
                );
            }
        }
    })
}
