use async_trait::async_trait;
use serde_json::Value;

pub mod builtins;
mod validation;

pub use builtins::{ParseBoolPipe, ParseFloatPipe, ParseIntPipe, ParseUuidPipe};
pub use validation::ValidationPipe;

pub type PipeResult<T> = Result<T, PipeError>;

#[derive(Debug, thiserror::Error)]
pub enum PipeError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A value that broke one or more rules, each listed in `errors`.
    #[error("{message}: {}", errors.join(", "))]
    Invalid { message: String, errors: Vec<String> },

    #[error("Transformation failed: {0}")]
    Transformation(String),

    #[error("Internal pipe error: {0}")]
    Internal(String),
}

/// The Pipe trait for transformation and validation
///
/// A pipe runs on an extracted route argument before the handler sees it.
/// A failing pipe short-circuits the request with a 400.
#[async_trait]
pub trait Pipe: Send + Sync + 'static {
    async fn transform(&self, value: Value) -> PipeResult<Value>;
}

/// Text form of a scalar argument, as route and query params arrive.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_owned()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
