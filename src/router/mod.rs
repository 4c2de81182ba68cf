//! Turning controller route metadata into live HTTP routes.

mod axum_router;
mod binder;
mod handler;
mod params;

pub use axum_router::AxumRouter;
pub use binder::{BoundRoute, Endpoint, HttpRouter, RouteBinder};
pub use handler::{BoundHandler, HandlerCall, HandlerFuture, HandlerResult, IntoReply};
pub use params::{extract_params, ParamDescriptor, ParamKind, ParamValue};

use crate::middleware::Middleware;
use std::fmt;
use std::sync::Arc;
use strum_macros::{AsRefStr, Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    /// Lowercase form, as used for OpenAPI path item keys.
    pub fn as_lower(&self) -> String {
        self.as_ref().to_ascii_lowercase()
    }
}

/// One route declared on a controller method.
#[derive(Clone)]
pub struct RouteDescriptor {
    pub method: HttpMethod,
    pub path: String,
    pub method_name: String,
    pub middleware: Vec<Arc<dyn Middleware>>,
}

impl RouteDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            method_name: method_name.into(),
            middleware: Vec::new(),
        }
    }

    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("method_name", &self.method_name)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

/// Collapses repeated slashes and drops a trailing one; empty becomes `/`.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len());
    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

/// Joins a controller prefix and a route path into one normalized path.
pub fn join_paths(prefix: &str, path: &str) -> String {
    normalize_path(&format!("/{prefix}/{path}"))
}

/// Rewrites `:name` segments to `{name}` and `*rest` to `{*rest}` for axum.
pub fn to_axum_path(path: &str) -> String {
    rewrite_segments(path, |name| format!("{{{name}}}"), |name| format!("{{*{name}}}"))
}

/// Rewrites `:name` and `*name` segments to the OpenAPI `{name}` form.
pub fn to_openapi_path(path: &str) -> String {
    rewrite_segments(path, |name| format!("{{{name}}}"), |name| format!("{{{name}}}"))
}

/// Names of the `:name` and `*name` segments in `path`.
pub fn path_parameters(path: &str) -> Vec<String> {
    path.split('/')
        .filter_map(|segment| segment.strip_prefix(':').or_else(|| segment.strip_prefix('*')))
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

fn rewrite_segments(
    path: &str,
    param: impl Fn(&str) -> String,
    wildcard: impl Fn(&str) -> String,
) -> String {
    path.split('/')
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':').filter(|name| !name.is_empty()) {
                param(name)
            } else if let Some(name) = segment.strip_prefix('*').filter(|name| !name.is_empty()) {
                wildcard(name)
            } else {
                segment.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("//users///:id/"), "/users/:id");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("users"), "/users");
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/users", "/:id"), "/users/:id");
        assert_eq!(join_paths("/users", "/"), "/users");
        assert_eq!(join_paths("users", "list"), "/users/list");
        assert_eq!(join_paths("", "/health"), "/health");
        assert_eq!(join_paths("/api/", "//v1//items/"), "/api/v1/items");
    }

    #[test]
    fn test_path_rewrites() {
        assert_eq!(to_axum_path("/users/:id/posts/:postId"), "/users/{id}/posts/{postId}");
        assert_eq!(to_axum_path("/files/*path"), "/files/{*path}");
        assert_eq!(to_openapi_path("/files/*path"), "/files/{path}");
        assert_eq!(to_openapi_path("/"), "/");
        assert_eq!(path_parameters("/users/:id/posts/:postId"), ["id", "postId"]);
    }

    #[test]
    fn test_http_method_strings() {
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
        assert_eq!("patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert_eq!(HttpMethod::Options.as_lower(), "options");
    }
}
