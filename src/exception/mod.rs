use crate::error::BoxError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::fmt;

pub mod http;

pub use http::HttpExceptionFilter;

/// The ExceptionFilter trait
///
/// Filters turn errors raised while handling a request into a response.
/// They must return a valid Response.
pub trait ExceptionFilter: Send + Sync + 'static {
    /// Catch an exception and return a response
    fn catch(&self, error: BoxError) -> Response;
}

/// An error that carries its own HTTP status.
///
/// `message` is usually a string but may be any JSON value.
#[derive(Debug, Clone)]
pub struct HttpException {
    status: StatusCode,
    message: Value,
    errors: Option<Value>,
}

impl HttpException {
    pub fn new(message: impl Into<Value>, status: StatusCode) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
        }
    }

    /// Attach per-field details, serialized under `errors`.
    pub fn with_errors(mut self, errors: impl Into<Value>) -> Self {
        self.errors = Some(errors.into());
        self
    }

    pub fn bad_request(message: impl Into<Value>) -> Self {
        Self::new(message, StatusCode::BAD_REQUEST)
    }

    pub fn unauthorized(message: impl Into<Value>) -> Self {
        Self::new(message, StatusCode::UNAUTHORIZED)
    }

    pub fn forbidden(message: impl Into<Value>) -> Self {
        Self::new(message, StatusCode::FORBIDDEN)
    }

    pub fn not_found(message: impl Into<Value>) -> Self {
        Self::new(message, StatusCode::NOT_FOUND)
    }

    pub fn conflict(message: impl Into<Value>) -> Self {
        Self::new(message, StatusCode::CONFLICT)
    }

    pub fn unprocessable(message: impl Into<Value>) -> Self {
        Self::new(message, StatusCode::UNPROCESSABLE_ENTITY)
    }

    pub fn internal_server_error(message: impl Into<Value>) -> Self {
        Self::new(message, StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &Value {
        &self.message
    }

    pub fn errors(&self) -> Option<&Value> {
        self.errors.as_ref()
    }

    /// The JSON body sent to the client.
    pub fn body(&self) -> Value {
        let mut body = json!({
            "statusCode": self.status.as_u16(),
            "message": self.message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        if let Some(errors) = &self.errors {
            body["errors"] = errors.clone();
        }
        body
    }
}

impl fmt::Display for HttpException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Value::String(message) => f.write_str(message),
            other => write!(f, "{other}"),
        }
    }
}

impl std::error::Error for HttpException {}

impl IntoResponse for HttpException {
    fn into_response(self) -> Response {
        (self.status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_carries_status_and_message() {
        let body = HttpException::not_found("User 7 not found").body();
        assert_eq!(body["statusCode"], 404);
        assert_eq!(body["message"], "User 7 not found");
        assert!(body["timestamp"].is_string());
        assert!(body.get("errors").is_none());
    }

    #[test]
    fn errors_and_structured_messages() {
        let exception = HttpException::bad_request(json!({"field": "email"}))
            .with_errors(json!([{"field": "email", "error": "required"}]));
        let body = exception.body();
        assert_eq!(body["message"]["field"], "email");
        assert_eq!(body["errors"][0]["error"], "required");
        assert_eq!(exception.to_string(), r#"{"field":"email"}"#);
    }
}
