use crate::di::Injectable;
use crate::metadata::MetadataStore;
use crate::router::BoundHandler;
use std::sync::Arc;

/// A class whose methods serve HTTP routes.
///
/// Implemented by `#[routes]` on the controller's impl block; the
/// `#[controller]` attribute supplies the [`Injectable`] half and the
/// route prefix.
pub trait Controller: Injectable {
    /// Returns the handler bound to `self` for `method_name`, if the
    /// controller has a route method of that name.
    fn bind_method(self: Arc<Self>, method_name: &str) -> Option<BoundHandler>;

    /// Writes route, parameter and OpenAPI metadata for the methods.
    fn decorate_routes(_store: &MetadataStore) {}
}
