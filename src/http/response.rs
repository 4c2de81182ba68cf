use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A response a handler or middleware may write to directly.
///
/// Once something has been sent, the framework leaves the response alone
/// and ignores the handler's return value.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    state: Arc<Mutex<ResponseState>>,
}

#[derive(Debug, Default)]
struct ResponseState {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Option<Bytes>,
    sent: bool,
}

impl HttpResponse {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ResponseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Status used for whatever is sent next, including a JSON return value.
    pub fn status(&self, status: StatusCode) -> &Self {
        self.lock().status = Some(status);
        self
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        self.lock().status
    }

    pub fn header(&self, name: HeaderName, value: HeaderValue) -> &Self {
        self.lock().headers.insert(name, value);
        self
    }

    /// Serializes `body` and sends it.
    pub fn json<T: Serialize + ?Sized>(&self, body: &T) -> serde_json::Result<()> {
        let bytes = serde_json::to_vec(body)?;
        self.send_with_type(Bytes::from(bytes), "application/json");
        Ok(())
    }

    pub fn send(&self, body: impl Into<Bytes>) {
        self.send_with_type(body.into(), "text/plain; charset=utf-8");
    }

    /// Ends the response without a body.
    pub fn end(&self) {
        self.lock().sent = true;
    }

    pub fn headers_sent(&self) -> bool {
        self.lock().sent
    }

    fn send_with_type(&self, body: Bytes, content_type: &'static str) {
        let mut state = self.lock();
        state
            .headers
            .entry(header::CONTENT_TYPE)
            .or_insert(HeaderValue::from_static(content_type));
        state.body = Some(body);
        state.sent = true;
    }

    /// Converts whatever was written so far into a response.
    pub(crate) fn into_response(self) -> Response {
        let mut state = self.lock();
        let status = state.status.unwrap_or(StatusCode::OK);
        let body = state.body.take().map(Body::from).unwrap_or_else(Body::empty);
        let headers = std::mem::take(&mut state.headers);
        drop(state);
        finish(status, headers, body)
    }

    /// Copies the headers written so far onto an error response. Its own
    /// content headers are kept.
    pub(crate) fn apply_headers(&self, mut response: Response) -> Response {
        let mut headers = std::mem::take(&mut self.lock().headers);
        headers.remove(header::CONTENT_TYPE);
        headers.remove(header::CONTENT_LENGTH);
        response.headers_mut().extend(headers);
        response
    }

    /// Builds the response for a handler's return value.
    ///
    /// `Some` becomes JSON with the configured status (200 by default);
    /// `None` becomes an empty 204.
    pub(crate) fn reply(self, value: Option<serde_json::Value>) -> Response {
        let mut state = self.lock();
        let headers = std::mem::take(&mut state.headers);
        let status = state.status;
        drop(state);
        match value {
            Some(value) => {
                let mut response = (
                    status.unwrap_or(StatusCode::OK),
                    axum::Json(value),
                )
                    .into_response();
                response.headers_mut().extend(headers);
                response
            }
            None => finish(StatusCode::NO_CONTENT, headers, Body::empty()),
        }
    }
}

fn finish(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_marks_sent() {
        let response = HttpResponse::new();
        assert!(!response.headers_sent());
        response.status(StatusCode::CREATED).json(&json!({"ok": true})).unwrap();
        assert!(response.headers_sent());

        let response = response.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_reply_none_is_no_content() {
        let response = HttpResponse::new();
        response.header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("42"),
        );
        let response = response.reply(None);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["x-request-id"], "42");
    }

    #[test]
    fn test_reply_uses_configured_status() {
        let response = HttpResponse::new();
        response.status(StatusCode::ACCEPTED);
        assert_eq!(response.reply(Some(json!([]))).status(), StatusCode::ACCEPTED);
    }
}
