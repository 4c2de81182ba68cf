//! OpenAPI attributes on route methods, parsed with darling.

use darling::{ast::NestedMeta, FromMeta};
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Meta};

pub const ATTRIBUTES: [&str; 4] = ["api_operation", "api_param", "api_body", "api_response"];

#[derive(Debug, Default, FromMeta)]
struct OperationArgs {
    summary: Option<String>,
    description: Option<String>,
    operation_id: Option<String>,
    #[darling(default)]
    deprecated: bool,
}

#[derive(Debug, FromMeta)]
struct ParamArgs {
    name: String,
    location: Option<String>,
    description: Option<String>,
    required: Option<bool>,
    schema: Option<String>,
}

#[derive(Debug, Default, FromMeta)]
struct BodyArgs {
    description: Option<String>,
    required: Option<bool>,
    content_type: Option<String>,
    schema: Option<String>,
}

#[derive(Debug, FromMeta)]
struct ResponseArgs {
    status: u16,
    description: Option<String>,
    schema: Option<String>,
    #[darling(default)]
    is_array: bool,
}

pub fn is_swagger_attr(attr: &Attribute) -> bool {
    ATTRIBUTES.iter().any(|name| attr.path().is_ident(name))
}

/// Statements that write the documentation of `method_name` into `store`.
pub fn decorate(attrs: &[Attribute], method_name: &str) -> syn::Result<TokenStream2> {
    let mut statements = Vec::new();
    let member = quote!(::core::option::Option::Some(#method_name));

    for attr in attrs.iter().filter(|attr| is_swagger_attr(attr)) {
        let items = nested(attr)?;
        let statement = if attr.path().is_ident("api_operation") {
            let args = parse::<OperationArgs>(attr, &items)?;
            let summary = opt_string(&args.summary);
            let description = opt_string(&args.description);
            let operation_id = opt_string(&args.operation_id);
            let deprecated = args.deprecated;
            quote! {
                store.define(
                    ::rapidfast::metadata::keys::SWAGGER_OPERATION,
                    ::rapidfast::swagger::ApiOperation {
                        summary: #summary,
                        description: #description,
                        operation_id: #operation_id,
                        deprecated: #deprecated,
                    },
                    class,
                    #member,
                );
            }
        } else if attr.path().is_ident("api_param") {
            let args = parse::<ParamArgs>(attr, &items)?;
            let name = &args.name;
            let location = location(attr, args.location.as_deref())?;
            let description = opt_string(&args.description);
            let required = args.required.unwrap_or(true);
            let schema = opt_schema(&args.schema);
            quote! {
                store.append(
                    ::rapidfast::metadata::keys::SWAGGER_PARAMS,
                    ::rapidfast::swagger::ApiParam {
                        name: #name.to_string(),
                        location: #location,
                        description: #description,
                        required: #required,
                        schema: #schema,
                    },
                    class,
                    #member,
                );
            }
        } else if attr.path().is_ident("api_body") {
            let args = parse::<BodyArgs>(attr, &items)?;
            let description = opt_string(&args.description);
            let required = args.required.unwrap_or(true);
            let content_type = args
                .content_type
                .unwrap_or_else(|| "application/json".to_string());
            let schema = opt_schema(&args.schema);
            quote! {
                store.define(
                    ::rapidfast::metadata::keys::SWAGGER_BODY,
                    ::rapidfast::swagger::ApiBody {
                        description: #description,
                        required: #required,
                        content_type: #content_type.to_string(),
                        schema: #schema,
                    },
                    class,
                    #member,
                );
            }
        } else {
            let args = parse::<ResponseArgs>(attr, &items)?;
            let status = args.status;
            let description = opt_string(&args.description);
            let schema = opt_schema(&args.schema);
            let is_array = args.is_array;
            quote! {
                store.append(
                    ::rapidfast::metadata::keys::SWAGGER_RESPONSES,
                    ::rapidfast::swagger::ApiResponse {
                        status: #status,
                        description: #description,
                        schema: #schema,
                        is_array: #is_array,
                    },
                    class,
                    #member,
                );
            }
        };
        statements.push(statement);
    }

    Ok(quote!(#(#statements)*))
}

fn nested(attr: &Attribute) -> syn::Result<Vec<NestedMeta>> {
    match &attr.meta {
        Meta::Path(_) => Ok(Vec::new()),
        Meta::List(list) => NestedMeta::parse_meta_list(list.tokens.clone()),
        Meta::NameValue(_) => Err(syn::Error::new_spanned(attr, "expected a parenthesized list")),
    }
}

fn parse<T: FromMeta>(attr: &Attribute, items: &[NestedMeta]) -> syn::Result<T> {
    T::from_list(items).map_err(|err| syn::Error::new_spanned(attr, err.to_string()))
}

fn location(attr: &Attribute, location: Option<&str>) -> syn::Result<TokenStream2> {
    let variant = match location.unwrap_or("path") {
        "path" => quote!(Path),
        "query" => quote!(Query),
        "header" => quote!(Header),
        "cookie" => quote!(Cookie),
        other => {
            return Err(syn::Error::new_spanned(
                attr,
                format!("unknown parameter location `{other}`, expected path, query, header or cookie"),
            ))
        }
    };
    Ok(quote!(::rapidfast::swagger::ParameterLocation::#variant))
}

fn opt_string(value: &Option<String>) -> TokenStream2 {
    match value {
        Some(text) => quote!(::core::option::Option::Some(#text.to_string())),
        None => quote!(::core::option::Option::None),
    }
}

fn opt_schema(type_name: &Option<String>) -> TokenStream2 {
    match type_name {
        Some(name) => quote!(::core::option::Option::Some(::rapidfast::swagger::schema_for(#name))),
        None => quote!(::core::option::Option::None),
    }
}
