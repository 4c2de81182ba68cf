#![allow(dead_code)]

use rapidfast::axum::body::{to_bytes, Body};
use rapidfast::axum::http::{Request, StatusCode};
use rapidfast::axum::Router;
use rapidfast::{AppConfig, Application, ClassRef};
use serde_json::Value;
use tower::ServiceExt;

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..AppConfig::default()
    }
}

pub fn app_with(modules: &[ClassRef]) -> Application {
    let mut app = Application::builder()
        .config(test_config())
        .build()
        .unwrap();
    app.initialize(modules).unwrap();
    app
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: rapidfast::axum::http::HeaderMap,
    pub body: Value,
}

pub async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
    send_with_headers(router, method, uri, body, &[]).await
}

pub async fn send_with_headers(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    TestResponse { status, headers, body }
}
