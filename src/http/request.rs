use crate::exception::HttpException;
use axum::{
    body::{to_bytes, Body},
    extract::Query,
    http::{header, HeaderMap, Method, Request, Uri},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Request bodies above this size are rejected with 413.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// An incoming request with its body already parsed.
///
/// Cheap to clone; all clones share the same data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    inner: Arc<RequestParts>,
}

#[derive(Debug)]
struct RequestParts {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: HashMap<String, String>,
    query: HashMap<String, String>,
    body: Value,
}

impl HttpRequest {
    pub fn builder(method: Method, uri: &str) -> HttpRequestBuilder {
        HttpRequestBuilder {
            method,
            uri: uri.parse().unwrap_or_else(|_| Uri::from_static("/")),
            headers: HeaderMap::new(),
            params: HashMap::new(),
            body: Value::Null,
        }
    }

    /// Reads an axum request. JSON bodies are parsed; a body that claims to
    /// be JSON but is not fails with 400.
    pub async fn from_axum(
        request: Request<Body>,
        params: HashMap<String, String>,
        body_limit: usize,
    ) -> Result<Self, HttpException> {
        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, body_limit).await.map_err(|_| {
            HttpException::new(
                "Request body too large",
                axum::http::StatusCode::PAYLOAD_TOO_LARGE,
            )
        })?;

        let body = if bytes.is_empty() {
            Value::Null
        } else if is_json(&parts.headers) {
            serde_json::from_slice(&bytes)
                .map_err(|err| HttpException::bad_request(format!("Invalid JSON body: {err}")))?
        } else {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        };

        Ok(Self::from_parts(parts.method, parts.uri, parts.headers, params, body))
    }

    fn from_parts(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        params: HashMap<String, String>,
        body: Value,
    ) -> Self {
        let query = parse_query(&uri);
        Self {
            inner: Arc::new(RequestParts {
                method,
                uri,
                headers,
                params,
                query,
                body,
            }),
        }
    }

    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    pub fn uri(&self) -> &Uri {
        &self.inner.uri
    }

    pub fn path(&self) -> &str {
        self.inner.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.inner.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.inner.params.get(name).map(String::as_str)
    }

    pub fn query(&self) -> &HashMap<String, String> {
        &self.inner.query
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.inner.query.get(name).map(String::as_str)
    }

    pub fn body(&self) -> &Value {
        &self.inner.body
    }

    /// Deserializes the body, failing with 400.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpException> {
        serde_json::from_value(self.inner.body.clone())
            .map_err(|err| HttpException::bad_request(format!("Invalid request body: {err}")))
    }

    pub(crate) fn params_value(&self) -> Value {
        string_map(&self.inner.params)
    }

    pub(crate) fn query_value(&self) -> Value {
        string_map(&self.inner.query)
    }

    /// Headers as a JSON object; repeated headers are joined with `", "`.
    pub(crate) fn headers_value(&self) -> Value {
        let mut map = Map::new();
        for name in self.inner.headers.keys() {
            let joined = self
                .inner
                .headers
                .get_all(name)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .collect::<Vec<_>>()
                .join(", ");
            map.insert(name.as_str().to_owned(), Value::String(joined));
        }
        Value::Object(map)
    }
}

/// Builds requests without going through a server, mainly for tests.
pub struct HttpRequestBuilder {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: HashMap<String, String>,
    body: Value,
}

impl HttpRequestBuilder {
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = value.parse() {
            self.headers.append(name, value);
        }
        self
    }

    pub fn param(mut self, name: &str, value: &str) -> Self {
        self.params.insert(name.to_owned(), value.to_owned());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    pub fn build(self) -> HttpRequest {
        HttpRequest::from_parts(self.method, self.uri, self.headers, self.params, self.body)
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/json") || value.contains("+json"))
        .unwrap_or(false)
}

// Later occurrences of a key win.
fn parse_query(uri: &Uri) -> HashMap<String, String> {
    Query::<HashMap<String, String>>::try_from_uri(uri)
        .map(|Query(query)| query)
        .unwrap_or_default()
}

fn string_map(map: &HashMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_axum_parses_json_and_query() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/users?role=admin&page=2")
            .header("content-type", "application/json")
            .header("x-trace", "a")
            .header("x-trace", "b")
            .body(Body::from(r#"{"name":"Ada"}"#))
            .unwrap();
        let params = HashMap::from([("id".to_string(), "7".to_string())]);

        let request = HttpRequest::from_axum(request, params, DEFAULT_BODY_LIMIT)
            .await
            .unwrap();

        assert_eq!(request.body()["name"], "Ada");
        assert_eq!(request.query_param("role"), Some("admin"));
        assert_eq!(request.param("id"), Some("7"));
        assert_eq!(request.headers_value()["x-trace"], "a, b");
    }

    #[tokio::test]
    async fn test_invalid_json_is_bad_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/users")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let err = HttpRequest::from_axum(request, HashMap::new(), DEFAULT_BODY_LIMIT)
            .await
            .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_empty_body_is_null() {
        let request = HttpRequest::builder(Method::GET, "/health").build();
        assert!(request.body().is_null());
        assert!(request.query().is_empty());
    }
}
