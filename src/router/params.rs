use crate::error::BoxError;
use crate::http::{HttpRequest, HttpResponse};
use crate::pipe::Pipe;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use strum_macros::{AsRefStr, Display, EnumString};

/// Where a handler argument comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ParamKind {
    Param,
    Query,
    Body,
    Headers,
    Request,
    Response,
}

/// Declares how argument `index` of a controller method is produced.
#[derive(Clone)]
pub struct ParamDescriptor {
    pub index: usize,
    pub kind: ParamKind,
    pub name: Option<String>,
    pub transform: Option<Arc<dyn Pipe>>,
}

impl ParamDescriptor {
    pub fn new(index: usize, kind: ParamKind) -> Self {
        Self {
            index,
            kind,
            name: None,
            transform: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_transform(mut self, transform: Arc<dyn Pipe>) -> Self {
        self.transform = Some(transform);
        self
    }
}

impl fmt::Debug for ParamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamDescriptor")
            .field("index", &self.index)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// An extracted argument.
#[derive(Debug, Clone)]
pub enum ParamValue {
    Value(Value),
    Request(HttpRequest),
    Response(HttpResponse),
}

impl ParamValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ParamValue::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// Produces the argument list for a handler, ordered by descriptor index.
///
/// The first failing transform aborts extraction with its error.
pub async fn extract_params(
    descriptors: &[ParamDescriptor],
    request: &HttpRequest,
    response: &HttpResponse,
) -> Result<Vec<ParamValue>, BoxError> {
    let mut ordered: Vec<&ParamDescriptor> = descriptors.iter().collect();
    ordered.sort_by_key(|descriptor| descriptor.index);

    let mut args = Vec::with_capacity(ordered.len());
    for descriptor in ordered {
        let value = match descriptor.kind {
            ParamKind::Request => {
                args.push(ParamValue::Request(request.clone()));
                continue;
            }
            ParamKind::Response => {
                args.push(ParamValue::Response(response.clone()));
                continue;
            }
            ParamKind::Param => pick(request.params_value(), descriptor.name.as_deref()),
            ParamKind::Query => pick(request.query_value(), descriptor.name.as_deref()),
            ParamKind::Body => pick(request.body().clone(), descriptor.name.as_deref()),
            ParamKind::Headers => {
                let name = descriptor.name.as_deref().map(str::to_ascii_lowercase);
                pick(request.headers_value(), name.as_deref())
            }
        };

        let value = match &descriptor.transform {
            Some(pipe) => pipe.transform(value).await?,
            None => value,
        };
        args.push(ParamValue::Value(value));
    }
    Ok(args)
}

// Whole source without a name, the named field (or null) with one.
fn pick(source: Value, name: Option<&str>) -> Value {
    match name {
        None => source,
        Some(name) => source.get(name).cloned().unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipe::ParseIntPipe;
    use axum::http::Method;
    use serde_json::json;

    fn request() -> HttpRequest {
        HttpRequest::builder(Method::POST, "/users/42?verbose=true")
            .param("id", "42")
            .header("x-tenant", "acme")
            .body(json!({"name": "Ada", "age": 36}))
            .build()
    }

    #[tokio::test]
    async fn test_arguments_follow_index_order() {
        let descriptors = vec![
            ParamDescriptor::new(2, ParamKind::Body),
            ParamDescriptor::new(0, ParamKind::Param).named("id"),
            ParamDescriptor::new(1, ParamKind::Query).named("verbose"),
        ];
        let args = extract_params(&descriptors, &request(), &HttpResponse::new())
            .await
            .unwrap();

        assert_eq!(args.len(), 3);
        assert_eq!(args[0].as_value(), Some(&json!("42")));
        assert_eq!(args[1].as_value(), Some(&json!("true")));
        assert_eq!(args[2].as_value().unwrap()["name"], "Ada");
    }

    #[tokio::test]
    async fn test_names_select_fields() {
        let descriptors = vec![
            ParamDescriptor::new(0, ParamKind::Headers).named("X-Tenant"),
            ParamDescriptor::new(1, ParamKind::Body).named("age"),
            ParamDescriptor::new(2, ParamKind::Param).named("missing"),
            ParamDescriptor::new(3, ParamKind::Request),
        ];
        let args = extract_params(&descriptors, &request(), &HttpResponse::new())
            .await
            .unwrap();

        assert_eq!(args[0].as_value(), Some(&json!("acme")));
        assert_eq!(args[1].as_value(), Some(&json!(36)));
        assert_eq!(args[2].as_value(), Some(&Value::Null));
        assert!(matches!(args[3], ParamValue::Request(_)));
    }

    #[tokio::test]
    async fn test_transform_applies_and_fails() {
        let parse: Arc<dyn Pipe> = Arc::new(ParseIntPipe);
        let ok = vec![ParamDescriptor::new(0, ParamKind::Param)
            .named("id")
            .with_transform(parse.clone())];
        let args = extract_params(&ok, &request(), &HttpResponse::new()).await.unwrap();
        assert_eq!(args[0].as_value(), Some(&json!(42)));

        let bad = vec![ParamDescriptor::new(0, ParamKind::Query)
            .named("verbose")
            .with_transform(parse)];
        assert!(extract_params(&bad, &request(), &HttpResponse::new()).await.is_err());
    }
}
