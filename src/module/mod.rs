use crate::di::{Provider, Token};
use crate::metadata::{ClassRef, MetadataStore};

mod resolver;

pub use resolver::ModuleResolver;

/// Trait for application modules
///
/// Modules are typically defined using the `#[module]` macro, which
/// implements this trait by writing a [`ModuleMetadata`] into the store.
///
/// # Example
/// ```ignore
/// use rapidfast::module;
///
/// #[module(
///     imports = [SharedModule],
///     controllers = [UserController],
///     providers = [UserService],
/// )]
/// pub struct UserModule;
/// ```
pub trait Module: 'static {
    fn decorate(store: &MetadataStore);
}

/// What a module contributes to the application.
#[derive(Debug, Clone, Default)]
pub struct ModuleMetadata {
    pub imports: Vec<ClassRef>,
    pub controllers: Vec<ClassRef>,
    pub providers: Vec<Provider>,
    /// Recorded for documentation; visibility is not enforced.
    pub exports: Vec<Token>,
}
