use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Expr, Fields, GenericArgument, PathArguments, Type};

/// Builds the `Self { .. }` expression that resolves every field from
/// `container`.
pub fn construct(fields: &Fields) -> syn::Result<TokenStream2> {
    match fields {
        Fields::Unit => Ok(quote!(Self)),
        Fields::Named(named) => {
            let inits = named
                .named
                .iter()
                .map(|field| {
                    let name = &field.ident;
                    let value = resolve_field(&field.ty, &field.attrs)?;
                    Ok(quote!(#name: #value))
                })
                .collect::<syn::Result<Vec<_>>>()?;
            Ok(quote!(Self { #(#inits),* }))
        }
        Fields::Unnamed(unnamed) => {
            let inits = unnamed
                .unnamed
                .iter()
                .map(|field| resolve_field(&field.ty, &field.attrs))
                .collect::<syn::Result<Vec<_>>>()?;
            Ok(quote!(Self(#(#inits),*)))
        }
    }
}

/// Removes `#[inject]` so the struct can be re-emitted by an attribute macro.
pub fn strip_inject(fields: &mut Fields) {
    for field in fields.iter_mut() {
        field.attrs.retain(|attr| !attr.path().is_ident("inject"));
    }
}

fn resolve_field(ty: &Type, attrs: &[Attribute]) -> syn::Result<TokenStream2> {
    let token = inject_token(attrs)?;
    let inner = arc_inner(ty);

    Ok(match (inner, token) {
        (Some(Type::TraitObject(object)), Some(token)) => quote! {
            container.get::<::std::sync::Arc<#object>>(#token)?.as_ref().clone()
        },
        (Some(inner), Some(token)) => quote! {
            container.get::<#inner>(#token)?
        },
        (Some(Type::TraitObject(object)), None) => quote! {
            container.resolve_dyn::<#object>()?
        },
        (Some(inner), None) => quote! {
            container.resolve::<#inner>()?
        },
        (None, Some(token)) => quote! {
            container.get::<#ty>(#token)?.as_ref().clone()
        },
        (None, None) => quote! {
            ::core::default::Default::default()
        },
    })
}

fn inject_token(attrs: &[Attribute]) -> syn::Result<Option<Expr>> {
    match attrs.iter().find(|attr| attr.path().is_ident("inject")) {
        Some(attr) => attr.parse_args::<Expr>().map(Some),
        None => Ok(None),
    }
}

/// `T` for `Arc<T>`.
fn arc_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first()? {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}
