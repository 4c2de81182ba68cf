use crate::di::Container;
use crate::error::Result;
use crate::metadata::MetadataStore;

/// Trait for types that can be constructed from the DI container
///
/// This trait is typically implemented automatically via the `#[derive(Injectable)]` macro,
/// which also marks the class as injectable in the metadata store.
///
/// # Example
/// ```
/// use rapidfast::DeriveInjectable as Injectable;
/// use std::sync::Arc;
///
/// trait UserRepository: Send + Sync {}
///
/// #[derive(Injectable)]
/// pub struct UserService {
///     // resolved through `Container::resolve_dyn`
///     repository: Arc<dyn UserRepository>,
/// }
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Create an instance by resolving dependencies from the container
    ///
    /// # Errors
    /// Returns an error if any required dependency is not found in the container.
    fn inject(container: &Container) -> Result<Self>;

    /// Writes this class's metadata. Runs once per store.
    fn decorate(_store: &MetadataStore) {}
}
