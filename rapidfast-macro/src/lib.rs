use proc_macro::TokenStream;

mod controller;
mod fields;
mod http_methods;
mod injectable;
mod module;
mod swagger;

/// Derive macro for making a struct injectable into the DI container
///
/// `Arc<T>` fields are resolved as `T`, `Arc<dyn Trait>` fields through the
/// trait binding, and `#[inject(token)]` resolves a field from a named or
/// symbol token. Any other field is `Default::default()`.
///
/// # Example
/// ```ignore
/// use rapidfast::prelude::*;
///
/// #[derive(Injectable)]
/// pub struct UserService {
///     repository: Arc<dyn Repository<User>>,
///     #[inject("GREETING")]
///     greeting: Arc<String>,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input)
}

/// Attribute macro for defining a controller with automatic DI registration
///
/// # Example
/// ```ignore
/// #[controller("/users")]
/// pub struct UserController {
///     users: Arc<UserService>,
/// }
///
/// #[controller(path = "/pets", tags = ["Pets"], description = "Pet store")]
/// pub struct PetController;
/// ```
#[proc_macro_attribute]
pub fn controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller::controller_attribute(attr, item)
}

/// Attribute macro for defining routes in an impl block
///
/// # Example
/// ```ignore
/// #[routes]
/// impl UserController {
///     #[get("/:id")]
///     async fn find_one(&self, #[param("id", pipe = ParseIntPipe)] id: i64) -> Result<Value, HttpException> {
///         // ...
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn routes(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller::routes_attribute(attr, item)
}

/// Attribute macro for defining a module with providers and controllers
///
/// # Example
/// ```ignore
/// #[module(
///     imports = [DatabaseModule],
///     controllers = [UserController],
///     providers = [UserService, Provider::provide("GREETING").use_value("hi".to_string())],
///     exports = [UserService],
/// )]
/// pub struct UserModule;
/// ```
#[proc_macro_attribute]
pub fn module(attr: TokenStream, item: TokenStream) -> TokenStream {
    module::module_attribute(attr, item)
}

/// HTTP GET method attribute for controller methods
#[proc_macro_attribute]
pub fn get(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("get", attr, item)
}

/// HTTP POST method attribute for controller methods
#[proc_macro_attribute]
pub fn post(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("post", attr, item)
}

/// HTTP PUT method attribute for controller methods
#[proc_macro_attribute]
pub fn put(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("put", attr, item)
}

/// HTTP DELETE method attribute for controller methods
#[proc_macro_attribute]
pub fn delete(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("delete", attr, item)
}

/// HTTP PATCH method attribute for controller methods
#[proc_macro_attribute]
pub fn patch(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("patch", attr, item)
}

/// HTTP OPTIONS method attribute for controller methods
#[proc_macro_attribute]
pub fn options(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("options", attr, item)
}

/// HTTP HEAD method attribute for controller methods
#[proc_macro_attribute]
pub fn head(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("head", attr, item)
}

/// Summary and description of a route in the OpenAPI document
///
/// `#[api_operation(summary = "...", description = "...", operation_id = "...", deprecated)]`
#[proc_macro_attribute]
pub fn api_operation(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("api_operation", attr, item)
}

/// A documented parameter
///
/// `#[api_param(name = "id", location = "query", description = "...", required = false, schema = "integer")]`
#[proc_macro_attribute]
pub fn api_param(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("api_param", attr, item)
}

/// A documented request body
///
/// `#[api_body(description = "...", schema = "CreateUserDto", required = true)]`
#[proc_macro_attribute]
pub fn api_body(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("api_body", attr, item)
}

/// A documented response
///
/// `#[api_response(status = 200, description = "...", schema = "User", is_array)]`
#[proc_macro_attribute]
pub fn api_response(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("api_response", attr, item)
}
