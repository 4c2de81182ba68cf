use crate::error::{BoxError, RapidError};
use crate::exception::{ExceptionFilter, HttpException};
use crate::middleware::MiddlewareError;
use crate::pipe::PipeError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// The default exception filter.
///
/// Known error types keep their status; anything else becomes a 500 whose
/// details are only exposed in development.
#[derive(Debug, Default, Clone)]
pub struct HttpExceptionFilter {
    development: bool,
}

impl HttpExceptionFilter {
    pub fn new(development: bool) -> Self {
        Self { development }
    }

    fn known(error: &BoxError) -> Option<HttpException> {
        if let Some(exception) = error.downcast_ref::<HttpException>() {
            return Some(exception.clone());
        }
        if let Some(pipe_error) = error.downcast_ref::<PipeError>() {
            return Some(match pipe_error {
                PipeError::Invalid { message, errors } => {
                    HttpException::bad_request(message.as_str()).with_errors(errors.clone())
                }
                other => HttpException::bad_request(other.to_string()),
            });
        }
        if let Some(middleware_error) = error.downcast_ref::<MiddlewareError>() {
            return Some(match middleware_error {
                MiddlewareError::Unauthorized(message) => HttpException::unauthorized(message.as_str()),
                MiddlewareError::Forbidden(message) => HttpException::forbidden(message.as_str()),
            });
        }
        None
    }
}

impl ExceptionFilter for HttpExceptionFilter {
    fn catch(&self, error: BoxError) -> Response {
        if let Some(exception) = Self::known(&error) {
            if exception.status().is_server_error() {
                tracing::error!(status = exception.status().as_u16(), error = %exception, "Request failed");
            } else {
                tracing::debug!(status = exception.status().as_u16(), error = %exception, "Request rejected");
            }
            return exception.into_response();
        }

        tracing::error!(error = %error, "Unhandled error");

        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let message = match error.downcast_ref::<RapidError>() {
            Some(rapid_error) if self.development => rapid_error.to_string(),
            _ => "Internal Server Error".to_string(),
        };
        let mut body = json!({
            "statusCode": status.as_u16(),
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        if self.development {
            body["error"] = json!(error.to_string());
            body["detail"] = json!(format!("{error:?}"));
        }

        (status, Json(body)).into_response()
    }
}
