use crate::error::BoxError;
use crate::http::{HttpRequest, HttpResponse};
use async_trait::async_trait;

pub type MiddlewareResult = Result<(), BoxError>;

/// Rejections middleware can raise without building an `HttpException`.
#[derive(Debug, thiserror::Error)]
pub enum MiddlewareError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// Runs before a route handler, in declaration order.
///
/// Returning an error skips the handler and goes to the exception filter.
/// Sending on `response` also stops the chain; the sent response is used
/// as-is.
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn handle(&self, request: &HttpRequest, response: &HttpResponse) -> MiddlewareResult;
}

/// Requires a header to be present, optionally with an exact value.
#[derive(Debug, Clone)]
pub struct RequireHeader {
    name: &'static str,
    value: Option<String>,
}

impl RequireHeader {
    pub fn new(name: &'static str) -> Self {
        Self { name, value: None }
    }

    pub fn with_value(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: Some(value.into()),
        }
    }
}

#[async_trait]
impl Middleware for RequireHeader {
    async fn handle(&self, request: &HttpRequest, _response: &HttpResponse) -> MiddlewareResult {
        match (request.header(self.name), &self.value) {
            (None, _) => Err(MiddlewareError::Unauthorized(format!("Missing {} header", self.name)).into()),
            (Some(actual), Some(expected)) if actual != expected => {
                Err(MiddlewareError::Forbidden(format!("Invalid {} header", self.name)).into())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[tokio::test]
    async fn test_require_header() {
        let guard = RequireHeader::with_value("x-api-key", "secret");
        let response = HttpResponse::new();

        let missing = HttpRequest::builder(Method::GET, "/").build();
        let err = guard.handle(&missing, &response).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<MiddlewareError>(), Some(MiddlewareError::Unauthorized(_))));

        let wrong = HttpRequest::builder(Method::GET, "/").header("x-api-key", "nope").build();
        let err = guard.handle(&wrong, &response).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<MiddlewareError>(), Some(MiddlewareError::Forbidden(_))));

        let ok = HttpRequest::builder(Method::GET, "/").header("x-api-key", "secret").build();
        assert!(guard.handle(&ok, &response).await.is_ok());
    }
}
