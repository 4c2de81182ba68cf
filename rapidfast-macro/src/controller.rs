use crate::{fields, swagger};
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    bracketed,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
    Attribute, Expr, FnArg, ImplItem, ImplItemFn, ItemImpl, ItemStruct, LitStr, Token, Type,
};

const HTTP_METHODS: [&str; 7] = ["get", "post", "put", "delete", "patch", "options", "head"];
const PARAM_ATTRIBUTES: [&str; 6] = ["param", "query", "body", "headers", "req", "res"];

struct ControllerArgs {
    path: String,
    tags: Vec<String>,
    description: Option<String>,
}

impl Parse for ControllerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = ControllerArgs {
            path: String::new(),
            tags: Vec::new(),
            description: None,
        };

        if input.peek(LitStr) {
            args.path = input.parse::<LitStr>()?.value();
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        while !input.is_empty() {
            let name: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            if name == "path" {
                args.path = input.parse::<LitStr>()?.value();
            } else if name == "tags" {
                let content;
                bracketed!(content in input);
                let tags = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
                args.tags = tags.iter().map(LitStr::value).collect();
            } else if name == "description" {
                args.description = Some(input.parse::<LitStr>()?.value());
            } else {
                return Err(syn::Error::new(
                    name.span(),
                    "expected `path`, `tags` or `description`",
                ));
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(args)
    }
}

pub fn controller_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ControllerArgs);
    let input = parse_macro_input!(item as ItemStruct);
    let expanded = generate_controller_impl(&args, input).unwrap_or_else(syn::Error::into_compile_error);
    TokenStream::from(expanded)
}

fn generate_controller_impl(args: &ControllerArgs, mut input: ItemStruct) -> syn::Result<TokenStream2> {
    let construct = fields::construct(&input.fields)?;
    fields::strip_inject(&mut input.fields);

    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let prefix = &args.path;

    let tags = (!args.tags.is_empty()).then(|| {
        let tags = &args.tags;
        quote! {
            store.define(
                ::rapidfast::metadata::keys::SWAGGER_TAGS,
                vec![#(#tags.to_string()),*],
                class,
                None,
            );
        }
    });
    let description = args.description.as_ref().map(|description| {
        quote! {
            store.define(
                ::rapidfast::metadata::keys::SWAGGER_DESCRIPTION,
                #description.to_string(),
                class,
                None,
            );
        }
    });

    Ok(quote! {
        #input

        impl #impl_generics ::rapidfast::di::Injectable for #struct_name #ty_generics #where_clause {
            fn inject(container: &::rapidfast::di::Container) -> ::rapidfast::Result<Self> {
                let _ = container;
                Ok(#construct)
            }

            fn decorate(store: &::rapidfast::metadata::MetadataStore) {
                let class = ::rapidfast::metadata::ClassId::of::<Self>();
                store.define(::rapidfast::metadata::keys::CONTROLLER, true, class, None);
                store.define(::rapidfast::metadata::keys::PREFIX, #prefix.to_string(), class, None);
                #tags
                #description
                <Self as ::rapidfast::controller::Controller>::decorate_routes(store);
            }
        }
    })
}

/// `#[get("/path", middleware = [Auth, RequireHeader::new("x-key")])]`
struct RouteArgs {
    path: String,
    middleware: Vec<Expr>,
}

impl Parse for RouteArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = RouteArgs {
            path: String::new(),
            middleware: Vec::new(),
        };
        if input.peek(LitStr) {
            args.path = input.parse::<LitStr>()?.value();
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        while !input.is_empty() {
            let name: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            if name == "path" {
                args.path = input.parse::<LitStr>()?.value();
            } else if name == "middleware" {
                let content;
                bracketed!(content in input);
                let items = Punctuated::<Expr, Token![,]>::parse_terminated(&content)?;
                args.middleware = items.into_iter().collect();
            } else {
                return Err(syn::Error::new(name.span(), "expected `path` or `middleware`"));
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(args)
    }
}

/// `#[param("id", pipe = ParseIntPipe)]`
struct ParamArgs {
    name: Option<String>,
    pipe: Option<Expr>,
}

impl Parse for ParamArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = ParamArgs { name: None, pipe: None };
        if input.peek(LitStr) {
            args.name = Some(input.parse::<LitStr>()?.value());
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        while !input.is_empty() {
            let name: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            if name == "pipe" {
                args.pipe = Some(input.parse()?);
            } else if name == "name" {
                args.name = Some(input.parse::<LitStr>()?.value());
            } else {
                return Err(syn::Error::new(name.span(), "expected `name` or `pipe`"));
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(args)
    }
}

enum ArgSource {
    /// `args[position]` of the extracted parameters.
    Extracted { position: usize, kind: String },
    Request,
    Response,
    Next,
}

struct RouteInfo {
    method: String,
    args: RouteArgs,
    fn_name: syn::Ident,
    is_async: bool,
    has_receiver: bool,
    sources: Vec<(ArgSource, Type)>,
    params: Vec<TokenStream2>,
    docs: TokenStream2,
}

pub fn routes_attribute(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemImpl);
    let expanded = generate_routes_impl(input).unwrap_or_else(syn::Error::into_compile_error);
    TokenStream::from(expanded)
}

fn generate_routes_impl(mut input: ItemImpl) -> syn::Result<TokenStream2> {
    let mut routes = Vec::new();

    for item in input.items.iter_mut() {
        if let ImplItem::Fn(method) = item {
            if let Some(route) = extract_route_info(method)? {
                routes.push(route);
            }
            clean_method(method);
        }
    }

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    let descriptors = routes.iter().map(|route| {
        let method = format_ident!("{}", capitalize(&route.method));
        let path = &route.args.path;
        let name = route.fn_name.to_string();
        let middleware = route.args.middleware.iter().map(|expr| {
            let value = construct_expr(expr);
            quote!(.with_middleware(::std::sync::Arc::new(#value)))
        });
        quote! {
            ::rapidfast::router::RouteDescriptor::new(
                ::rapidfast::router::HttpMethod::#method,
                #path,
                #name,
            )
            #(#middleware)*
        }
    });

    let per_method = routes.iter().map(|route| {
        let name = route.fn_name.to_string();
        let params = &route.params;
        let docs = &route.docs;
        let params = (!params.is_empty()).then(|| {
            quote! {
                store.define(
                    ::rapidfast::metadata::keys::PARAMS,
                    vec![#(#params),*],
                    class,
                    Some(#name),
                );
            }
        });
        quote! {
            #params
            #docs
        }
    });

    let arms = routes.iter().map(|route| bind_arm(route, self_ty));

    let decorate_routes = quote! {
        fn decorate_routes(store: &::rapidfast::metadata::MetadataStore) {
            let class = ::rapidfast::metadata::ClassId::of::<Self>();
            store.define(
                ::rapidfast::metadata::keys::ROUTES,
                vec![#(#descriptors),*],
                class,
                None,
            );
            #(#per_method)*
        }
    };

    Ok(quote! {
        #input

        impl #impl_generics ::rapidfast::controller::Controller for #self_ty #where_clause {
            fn bind_method(
                self: ::std::sync::Arc<Self>,
                method_name: &str,
            ) -> ::core::option::Option<::rapidfast::router::BoundHandler> {
                match method_name {
                    #(#arms)*
                    _ => {
                        let _ = self;
                        None
                    }
                }
            }

            #decorate_routes
        }
    })
}

fn bind_arm(route: &RouteInfo, self_ty: &Type) -> TokenStream2 {
    let name = route.fn_name.to_string();
    let fn_name = &route.fn_name;

    let mut lets = Vec::new();
    let mut call_args = Vec::new();
    for (i, (source, ty)) in route.sources.iter().enumerate() {
        let var = format_ident!("__arg{}", i);
        let value = match source {
            ArgSource::Extracted { position, kind } if kind == "req" => {
                quote!(call.take_request(#position)?)
            }
            ArgSource::Extracted { position, kind } if kind == "res" => {
                quote!(call.take_response(#position)?)
            }
            ArgSource::Extracted { position, .. } => quote!(call.take_value::<#ty>(#position)?),
            ArgSource::Request => quote!(call.request.clone()),
            ArgSource::Response => quote!(call.response.clone()),
            ArgSource::Next => quote!(call.next.clone()),
        };
        lets.push(quote!(let #var: #ty = #value;));
        call_args.push(var);
    }

    let invoke = if route.has_receiver {
        quote!(this.#fn_name(#(#call_args),*))
    } else {
        quote!(<#self_ty>::#fn_name(#(#call_args),*))
    };
    let invoke = if route.is_async {
        quote!(#invoke.await)
    } else {
        invoke
    };

    quote! {
        #name => {
            let this = self;
            let handler: ::rapidfast::router::BoundHandler = ::std::sync::Arc::new(
                move |call: ::rapidfast::router::HandlerCall| -> ::rapidfast::router::HandlerFuture {
                    let this = this.clone();
                    Box::pin(async move {
                        #[allow(unused_mut, unused_variables)]
                        let mut call = call;
                        let _ = &this;
                        #(#lets)*
                        ::rapidfast::router::IntoReply::into_reply(#invoke)
                    })
                },
            );
            Some(handler)
        }
    }
}

fn extract_route_info(method: &ImplItemFn) -> syn::Result<Option<RouteInfo>> {
    let mut route = None;
    for attr in &method.attrs {
        let Some(ident) = attr.path().get_ident() else {
            continue;
        };
        let name = ident.to_string();
        if !HTTP_METHODS.contains(&name.as_str()) {
            continue;
        }
        if route.is_some() {
            return Err(syn::Error::new_spanned(attr, "a route method takes one HTTP method attribute"));
        }
        let args = match &attr.meta {
            syn::Meta::Path(_) => RouteArgs {
                path: String::new(),
                middleware: Vec::new(),
            },
            _ => attr.parse_args::<RouteArgs>()?,
        };
        route = Some((name, args));
    }
    let Some((http_method, args)) = route else {
        return Ok(None);
    };

    let fn_name = method.sig.ident.clone();
    let method_name = fn_name.to_string();
    let mut sources = Vec::new();
    let mut params = Vec::new();
    let mut has_receiver = false;
    let mut index = 0usize;

    for input in &method.sig.inputs {
        let pat_type = match input {
            FnArg::Receiver(_) => {
                has_receiver = true;
                continue;
            }
            FnArg::Typed(pat_type) => pat_type,
        };
        let ty = (*pat_type.ty).clone();

        match param_attr(&pat_type.attrs) {
            Some(attr) => {
                let kind = attr
                    .path()
                    .get_ident()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                let args = match &attr.meta {
                    syn::Meta::Path(_) => ParamArgs { name: None, pipe: None },
                    _ => attr.parse_args::<ParamArgs>()?,
                };
                params.push(param_descriptor(index, &kind, &args));
                sources.push((
                    ArgSource::Extracted {
                        position: params.len() - 1,
                        kind,
                    },
                    ty,
                ));
            }
            None => {
                let source = match last_ident(&ty).as_deref() {
                    Some("HttpRequest") => ArgSource::Request,
                    Some("HttpResponse") => ArgSource::Response,
                    Some("Next") => ArgSource::Next,
                    _ => {
                        return Err(syn::Error::new_spanned(
                            pat_type,
                            format!(
                                "argument of `{method_name}` needs one of #[param], #[query], #[body], #[headers], #[req], #[res]"
                            ),
                        ))
                    }
                };
                sources.push((source, ty));
            }
        }
        index += 1;
    }

    let docs = swagger::decorate(&method.attrs, &method_name)?;

    Ok(Some(RouteInfo {
        method: http_method,
        args,
        fn_name,
        is_async: method.sig.asyncness.is_some(),
        has_receiver,
        sources,
        params,
        docs,
    }))
}

fn param_descriptor(index: usize, kind: &str, args: &ParamArgs) -> TokenStream2 {
    let variant = match kind {
        "param" => "Param",
        "query" => "Query",
        "body" => "Body",
        "headers" => "Headers",
        "req" => "Request",
        _ => "Response",
    };
    let variant = syn::Ident::new(variant, Span::call_site());
    let named = args.name.as_ref().map(|name| quote!(.named(#name)));
    let transform = args.pipe.as_ref().map(|pipe| {
        let value = construct_expr(pipe);
        quote!(.with_transform(::std::sync::Arc::new(#value)))
    });
    quote! {
        ::rapidfast::router::ParamDescriptor::new(#index, ::rapidfast::router::ParamKind::#variant)
            #named
            #transform
    }
}

/// A bare type path means "the default instance of that type".
fn construct_expr(expr: &Expr) -> TokenStream2 {
    match expr {
        Expr::Path(path) if path.qself.is_none() => {
            quote!(<#path as ::core::default::Default>::default())
        }
        other => quote!(#other),
    }
}

fn param_attr(attrs: &[Attribute]) -> Option<&Attribute> {
    attrs.iter().find(|attr| is_param_attr(attr))
}

fn clean_method(method: &mut ImplItemFn) {
    method
        .attrs
        .retain(|attr| !is_http_method_attr(attr) && !swagger::is_swagger_attr(attr));
    for input in method.sig.inputs.iter_mut() {
        if let FnArg::Typed(pat_type) = input {
            pat_type.attrs.retain(|attr| !is_param_attr(attr));
        }
    }
}

fn is_http_method_attr(attr: &Attribute) -> bool {
    attr.path()
        .get_ident()
        .is_some_and(|ident| HTTP_METHODS.contains(&ident.to_string().as_str()))
}

fn is_param_attr(attr: &Attribute) -> bool {
    attr.path()
        .get_ident()
        .is_some_and(|ident| PARAM_ATTRIBUTES.contains(&ident.to_string().as_str()))
}

fn last_ident(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => type_path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
