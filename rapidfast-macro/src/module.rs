use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, Attribute, Expr, ItemStruct, Path, Token,
};

/// One entry of a module list, with any `#[cfg]` attributes in front of it.
struct ModuleItem<T> {
    attrs: Vec<Attribute>,
    value: T,
}

impl<T: Parse> Parse for ModuleItem<T> {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let value = input.parse()?;
        Ok(ModuleItem { attrs, value })
    }
}

#[derive(Default)]
struct ModuleArgs {
    imports: Vec<ModuleItem<Path>>,
    controllers: Vec<ModuleItem<Path>>,
    providers: Vec<ModuleItem<Expr>>,
    exports: Vec<ModuleItem<Expr>>,
}

impl Parse for ModuleArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = ModuleArgs::default();

        while !input.is_empty() {
            let name: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            // Parse array: [Item1, Item2, ...]
            let content;
            syn::bracketed!(content in input);

            if name == "imports" {
                let items = content.parse_terminated(ModuleItem::<Path>::parse, Token![,])?;
                args.imports = items.into_iter().collect();
            } else if name == "controllers" {
                let items = content.parse_terminated(ModuleItem::<Path>::parse, Token![,])?;
                args.controllers = items.into_iter().collect();
            } else if name == "providers" {
                let items = content.parse_terminated(ModuleItem::<Expr>::parse, Token![,])?;
                args.providers = items.into_iter().collect();
            } else if name == "exports" {
                let items = content.parse_terminated(ModuleItem::<Expr>::parse, Token![,])?;
                args.exports = items.into_iter().collect();
            } else {
                return Err(syn::Error::new(
                    name.span(),
                    "expected `imports`, `controllers`, `providers` or `exports`",
                ));
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(args)
    }
}

pub fn module_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ModuleArgs);
    let input = parse_macro_input!(item as ItemStruct);
    let expanded = generate_module_impl(&args, &input);

    TokenStream::from(expanded)
}

fn generate_module_impl(args: &ModuleArgs, input: &ItemStruct) -> TokenStream2 {
    let module_name = &input.ident;

    let imports = args.imports.iter().map(|item| {
        let (attrs, path) = (&item.attrs, &item.value);
        quote! {
            #(#attrs)*
            metadata.imports.push(::rapidfast::metadata::ClassRef::module::<#path>());
        }
    });

    let controllers = args.controllers.iter().map(|item| {
        let (attrs, path) = (&item.attrs, &item.value);
        quote! {
            #(#attrs)*
            metadata.controllers.push(::rapidfast::metadata::ClassRef::controller::<#path>());
        }
    });

    // A bare type is a class provider; anything else converts into a Provider.
    let providers = args.providers.iter().map(|item| {
        let attrs = &item.attrs;
        let provider = match &item.value {
            Expr::Path(path) if path.qself.is_none() => {
                quote!(::rapidfast::di::Provider::class::<#path>())
            }
            other => quote!(::core::convert::Into::<::rapidfast::di::Provider>::into(#other)),
        };
        quote! {
            #(#attrs)*
            metadata.providers.push(#provider);
        }
    });

    let exports = args.exports.iter().map(|item| {
        let attrs = &item.attrs;
        let token = match &item.value {
            Expr::Path(path) if path.qself.is_none() => {
                quote!(::rapidfast::di::Token::of_dyn::<#path>())
            }
            other => quote!(::core::convert::Into::<::rapidfast::di::Token>::into(#other)),
        };
        quote! {
            #(#attrs)*
            metadata.exports.push(#token);
        }
    });

    quote! {
        #input

        impl ::rapidfast::module::Module for #module_name {
            fn decorate(store: &::rapidfast::metadata::MetadataStore) {
                #[allow(unused_mut)]
                let mut metadata = ::rapidfast::module::ModuleMetadata::default();
                #(#imports)*
                #(#controllers)*
                #(#providers)*
                #(#exports)*
                store.define(
                    ::rapidfast::metadata::keys::MODULE,
                    metadata,
                    ::rapidfast::metadata::ClassId::of::<Self>(),
                    None,
                );
            }
        }
    }
}
