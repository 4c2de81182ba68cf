use crate::pipe::{Pipe, PipeError, PipeResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use validator::{Validate, ValidationErrors};

/// Checks an argument against the `validator` rules of `T`.
///
/// The value must deserialize into `T` and pass `T::validate`; it is then
/// handed to the handler unchanged. Failures carry one `"field: message"`
/// entry per broken rule.
///
/// ```rust,ignore
/// #[derive(Deserialize, Validate)]
/// pub struct CreateUser {
///     #[validate(email)]
///     pub email: String,
/// }
///
/// #[post("/")]
/// async fn create(&self, #[body(pipe = ValidationPipe::<CreateUser>::new())] user: CreateUser) {}
/// ```
pub struct ValidationPipe<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ValidationPipe<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for ValidationPipe<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Pipe for ValidationPipe<T>
where
    T: DeserializeOwned + Validate + 'static,
{
    async fn transform(&self, value: Value) -> PipeResult<Value> {
        let parsed: T = serde_json::from_value(value.clone()).map_err(|err| PipeError::Invalid {
            message: "Validation failed".to_string(),
            errors: vec![err.to_string()],
        })?;

        parsed.validate().map_err(|errors| PipeError::Invalid {
            message: "Validation failed".to_string(),
            errors: describe(&errors),
        })?;

        Ok(value)
    }
}

fn describe(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |err| match &err.message {
                Some(message) => format!("{field}: {message}"),
                None => format!("{field}: failed {}", err.code),
            })
        })
        .collect();
    messages.sort();
    messages
}
