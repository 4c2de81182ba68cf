use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned};

/// Route and documentation attributes only mean something inside an impl
/// block marked `#[routes]`, which consumes them before they expand.
pub fn http_method_attribute(name: &str, _attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as syn::ImplItemFn);

    let message = format!("#[{name}] must be used inside an impl block marked #[routes]");
    let error = syn::Error::new(input.sig.span(), message).to_compile_error();

    TokenStream::from(quote! {
        #error
        #input
    })
}
