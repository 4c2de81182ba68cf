//! OpenAPI document generation and the Swagger UI endpoints.

mod assembler;
pub mod metadata;
pub mod spec;

pub use assembler::{SwaggerAssembler, SwaggerInfo};
pub use metadata::{schema_for, ApiBody, ApiOperation, ApiParam, ApiResponse};
pub use spec::{OpenApiDocument, ParameterLocation};

use axum::{
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// Routes serving the UI shell at `ui_path` and the raw document at
/// `json_path`.
pub fn routes(document: Arc<OpenApiDocument>, ui_path: &str, json_path: &str) -> Router {
    let html = Arc::new(ui_html(&document.info.title, json_path));
    let spec = document.clone();

    Router::new()
        .route(
            ui_path,
            get(move || {
                let html = html.clone();
                async move { Html(html.as_ref().clone()) }
            }),
        )
        .route(
            json_path,
            get(move || {
                let spec = spec.clone();
                async move { Json(spec.as_ref().clone()).into_response() }
            }),
        )
}

/// Minimal page that loads Swagger UI from a CDN and points it at the
/// JSON document.
pub fn ui_html(title: &str, json_path: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5.10.0/swagger-ui.css">
    <style>
        body {{
            margin: 0;
            padding: 0;
        }}
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5.10.0/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {{
            SwaggerUIBundle({{
                url: '{json_path}',
                dom_id: '#swagger-ui',
                deepLinking: true,
            }});
        }};
    </script>
</body>
</html>"#,
        title = escape_html(title),
        json_path = json_path.replace('\'', "%27"),
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_html_points_at_json() {
        let html = ui_html("Pets <API>", "/swagger.json");
        assert!(html.contains("url: '/swagger.json'"));
        assert!(html.contains("<title>Pets &lt;API&gt;</title>"));
    }
}
