use crate::pipe::{scalar_text, Pipe, PipeError, PipeResult};
use async_trait::async_trait;
use serde_json::Value;

/// A pipe that parses a string into an integer
#[derive(Debug, Default)]
pub struct ParseIntPipe;

#[async_trait]
impl Pipe for ParseIntPipe {
    async fn transform(&self, value: Value) -> PipeResult<Value> {
        scalar_text(&value)
            .and_then(|text| text.parse::<i64>().ok())
            .map(Value::from)
            .ok_or_else(|| PipeError::Validation("Invalid integer".to_string()))
    }
}

#[derive(Debug, Default)]
pub struct ParseFloatPipe;

#[async_trait]
impl Pipe for ParseFloatPipe {
    async fn transform(&self, value: Value) -> PipeResult<Value> {
        scalar_text(&value)
            .and_then(|text| text.parse::<f64>().ok())
            .filter(|number| number.is_finite())
            .map(Value::from)
            .ok_or_else(|| PipeError::Validation("Invalid number".to_string()))
    }
}

/// Accepts `true`/`false` and `1`/`0`.
#[derive(Debug, Default)]
pub struct ParseBoolPipe;

#[async_trait]
impl Pipe for ParseBoolPipe {
    async fn transform(&self, value: Value) -> PipeResult<Value> {
        match scalar_text(&value).as_deref() {
            Some("true") | Some("1") => Ok(Value::Bool(true)),
            Some("false") | Some("0") => Ok(Value::Bool(false)),
            _ => Err(PipeError::Validation("Invalid boolean".to_string())),
        }
    }
}

/// Validates a UUID and normalizes it to lowercase hyphenated form.
#[derive(Debug, Default)]
pub struct ParseUuidPipe;

#[async_trait]
impl Pipe for ParseUuidPipe {
    async fn transform(&self, value: Value) -> PipeResult<Value> {
        scalar_text(&value)
            .and_then(|text| uuid::Uuid::parse_str(&text).ok())
            .map(|id| Value::String(id.hyphenated().to_string()))
            .ok_or_else(|| PipeError::Validation("Invalid UUID".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_parse_int() {
        assert_eq!(ParseIntPipe.transform(json!("42")).await.unwrap(), json!(42));
        assert_eq!(ParseIntPipe.transform(json!(7)).await.unwrap(), json!(7));
        assert!(matches!(
            ParseIntPipe.transform(json!("abc")).await,
            Err(PipeError::Validation(_))
        ));
        assert!(ParseIntPipe.transform(Value::Null).await.is_err());
    }

    #[tokio::test]
    async fn test_parse_float_and_bool() {
        assert_eq!(ParseFloatPipe.transform(json!("2.5")).await.unwrap(), json!(2.5));
        assert!(ParseFloatPipe.transform(json!("NaN")).await.is_err());
        assert_eq!(ParseBoolPipe.transform(json!("1")).await.unwrap(), json!(true));
        assert!(ParseBoolPipe.transform(json!("yes")).await.is_err());
    }

    #[tokio::test]
    async fn test_parse_uuid() {
        let id = "67E55044-10B1-426F-9247-BB680E5FE0C8";
        assert_eq!(
            ParseUuidPipe.transform(json!(id)).await.unwrap(),
            json!("67e55044-10b1-426f-9247-bb680e5fe0c8")
        );
        assert!(ParseUuidPipe.transform(json!("not-a-uuid")).await.is_err());
    }
}
