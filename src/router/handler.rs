use crate::error::BoxError;
use crate::exception::HttpException;
use crate::http::{HttpRequest, HttpResponse, Next};
use crate::router::ParamValue;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// What a handler produced: a JSON value, or nothing (204).
pub type HandlerResult = Result<Option<Value>, BoxError>;
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;

/// A controller method bound to its controller instance.
pub type BoundHandler = Arc<dyn Fn(HandlerCall) -> HandlerFuture + Send + Sync>;

/// Everything a bound handler is invoked with.
///
/// `args` holds the extracted parameters in ascending index order; it is
/// `None` when the method declared none.
pub struct HandlerCall {
    pub request: HttpRequest,
    pub response: HttpResponse,
    pub next: Next,
    pub args: Option<Vec<ParamValue>>,
}

impl HandlerCall {
    pub fn new(request: HttpRequest, response: HttpResponse, next: Next) -> Self {
        Self {
            request,
            response,
            next,
            args: None,
        }
    }

    pub fn with_args(mut self, args: Vec<ParamValue>) -> Self {
        self.args = Some(args);
        self
    }

    /// Takes the extracted argument at `position` and deserializes it.
    ///
    /// Strings that do not fit `T` directly are retried as JSON text, so a
    /// route param `"42"` can land in a `u32`.
    pub fn take_value<T: DeserializeOwned>(&mut self, position: usize) -> Result<T, BoxError> {
        match self.take(position)? {
            ParamValue::Value(Value::String(text)) => {
                serde_json::from_value(Value::String(text.clone()))
                    .or_else(|_| serde_json::from_str(&text))
                    .map_err(|err| invalid_argument(position, err))
            }
            ParamValue::Value(value) => {
                serde_json::from_value(value).map_err(|err| invalid_argument(position, err))
            }
            ParamValue::Request(_) | ParamValue::Response(_) => {
                Err(format!("Argument {position} is not a value").into())
            }
        }
    }

    pub fn take_request(&mut self, position: usize) -> Result<HttpRequest, BoxError> {
        match self.take(position)? {
            ParamValue::Request(request) => Ok(request),
            _ => Ok(self.request.clone()),
        }
    }

    pub fn take_response(&mut self, position: usize) -> Result<HttpResponse, BoxError> {
        match self.take(position)? {
            ParamValue::Response(response) => Ok(response),
            _ => Ok(self.response.clone()),
        }
    }

    fn take(&mut self, position: usize) -> Result<ParamValue, BoxError> {
        let slot = self
            .args
            .as_mut()
            .and_then(|args| args.get_mut(position))
            .ok_or_else(|| -> BoxError { format!("Missing argument {position}").into() })?;
        Ok(std::mem::replace(slot, ParamValue::Value(Value::Null)))
    }
}

fn invalid_argument(position: usize, err: serde_json::Error) -> BoxError {
    HttpException::bad_request(format!("Invalid value for argument {position}: {err}")).into()
}

/// Converts a controller method's return value into a [`HandlerResult`].
pub trait IntoReply {
    fn into_reply(self) -> HandlerResult;
}

impl IntoReply for () {
    fn into_reply(self) -> HandlerResult {
        Ok(None)
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> HandlerResult {
        Ok(Some(self))
    }
}

impl<T: Serialize> IntoReply for Json<T> {
    fn into_reply(self) -> HandlerResult {
        Ok(Some(serde_json::to_value(self.0)?))
    }
}

impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> HandlerResult {
        match self {
            Some(value) => value.into_reply(),
            None => Ok(None),
        }
    }
}

impl<T: IntoReply, E: Into<BoxError>> IntoReply for Result<T, E> {
    fn into_reply(self) -> HandlerResult {
        self.map_err(Into::<BoxError>::into)?.into_reply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::json;

    fn call() -> HandlerCall {
        HandlerCall::new(
            HttpRequest::builder(Method::GET, "/").build(),
            HttpResponse::new(),
            Next::new(),
        )
    }

    #[test]
    fn test_take_value_deserializes() {
        let mut call = call().with_args(vec![
            ParamValue::Value(json!(5)),
            ParamValue::Value(json!("x")),
            ParamValue::Value(json!("42")),
        ]);
        assert_eq!(call.take_value::<u32>(0).unwrap(), 5);
        assert_eq!(call.take_value::<String>(1).unwrap(), "x");
        assert_eq!(call.take_value::<u32>(2).unwrap(), 42);
        assert!(call.take_value::<u32>(3).is_err());
    }

    #[test]
    fn test_type_mismatch_is_bad_request() {
        let mut call = call().with_args(vec![ParamValue::Value(json!("abc"))]);
        let err = call.take_value::<u32>(0).unwrap_err();
        let exception = err.downcast_ref::<HttpException>().unwrap();
        assert_eq!(exception.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_into_reply() {
        assert_eq!(().into_reply().unwrap(), None);
        assert_eq!(Json(vec![1, 2]).into_reply().unwrap(), Some(json!([1, 2])));
        assert_eq!(None::<Value>.into_reply().unwrap(), None);
        let failed: Result<Json<u8>, HttpException> = Err(HttpException::not_found("gone"));
        assert!(failed.into_reply().is_err());
    }
}
