use crate::http::{HttpRequest, DEFAULT_BODY_LIMIT};
use crate::router::{to_axum_path, Endpoint, HttpMethod, HttpRouter};
use axum::{
    extract::{Path, Request},
    response::Response,
    routing::{on, MethodFilter},
    Router,
};
use std::collections::HashMap;
use std::sync::Arc;

impl HttpMethod {
    pub fn method_filter(&self) -> MethodFilter {
        match self {
            HttpMethod::Get => MethodFilter::GET,
            HttpMethod::Post => MethodFilter::POST,
            HttpMethod::Put => MethodFilter::PUT,
            HttpMethod::Delete => MethodFilter::DELETE,
            HttpMethod::Patch => MethodFilter::PATCH,
            HttpMethod::Options => MethodFilter::OPTIONS,
            HttpMethod::Head => MethodFilter::HEAD,
        }
    }
}

/// [`HttpRouter`] backed by an `axum::Router`.
#[derive(Clone)]
pub struct AxumRouter {
    router: Router,
    body_limit: usize,
}

impl AxumRouter {
    pub fn new() -> Self {
        Self::with_body_limit(DEFAULT_BODY_LIMIT)
    }

    pub fn with_body_limit(body_limit: usize) -> Self {
        Self {
            router: Router::new(),
            body_limit,
        }
    }

    /// A snapshot of the routes added so far.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

impl Default for AxumRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpRouter for AxumRouter {
    fn add_route(&mut self, method: HttpMethod, path: &str, endpoint: Arc<Endpoint>) {
        let body_limit = self.body_limit;
        let handler = move |params: Option<Path<HashMap<String, String>>>, request: Request| {
            let endpoint = endpoint.clone();
            async move { dispatch(endpoint, params, request, body_limit).await }
        };

        let router = std::mem::replace(&mut self.router, Router::new());
        self.router = router.route(&to_axum_path(path), on(method.method_filter(), handler));
    }
}

async fn dispatch(
    endpoint: Arc<Endpoint>,
    params: Option<Path<HashMap<String, String>>>,
    request: Request,
    body_limit: usize,
) -> Response {
    let params = params.map(|Path(params)| params).unwrap_or_default();
    match HttpRequest::from_axum(request, params, body_limit).await {
        Ok(request) => endpoint.handle(request).await,
        Err(exception) => endpoint.reject(exception),
    }
}
