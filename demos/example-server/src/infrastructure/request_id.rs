use rapidfast::axum::http::{HeaderName, HeaderValue};
use rapidfast::prelude::*;
use uuid::Uuid;

/// Tags every response with an `x-request-id`, reusing the caller's id
/// when one was sent.
#[derive(Debug, Default)]
pub struct RequestId;

#[async_trait]
impl Middleware for RequestId {
    async fn handle(&self, request: &HttpRequest, response: &HttpResponse) -> MiddlewareResult {
        let id = request
            .header("x-request-id")
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        response.header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_str(&id)?,
        );
        Ok(())
    }
}
