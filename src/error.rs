use thiserror::Error;

pub type Result<T> = std::result::Result<T, RapidError>;

/// Type-erased error used on the request path.
///
/// Handlers, middleware and transforms may fail with anything that converts
/// into this; the exception filter downcasts it back to a known type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum RapidError {
    #[error("Unregistered service: {token}")]
    UnregisteredService { token: String },

    #[error("Dependency not found: {type_name}")]
    DependencyNotFound { type_name: String },

    #[error("Failed to downcast type: {type_name}")]
    DowncastFailed { type_name: String },

    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    #[error("Failed to instantiate {token}: {source}")]
    Instantiation {
        token: String,
        #[source]
        source: BoxError,
    },

    #[error("Module registration failed: {message}")]
    ModuleRegistrationFailed { message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RapidError {
    pub fn unregistered(token: impl ToString) -> Self {
        RapidError::UnregisteredService {
            token: token.to_string(),
        }
    }

    pub fn instantiation(token: impl ToString, source: impl Into<BoxError>) -> Self {
        RapidError::Instantiation {
            token: token.to_string(),
            source: source.into(),
        }
    }
}

#[cfg(feature = "sea-orm-db")]
impl From<sea_orm::DbErr> for RapidError {
    fn from(err: sea_orm::DbErr) -> Self {
        RapidError::Internal(format!("Database error: {}", err))
    }
}

impl axum::response::IntoResponse for RapidError {
    fn into_response(self) -> axum::response::Response {
        use crate::exception::{ExceptionFilter, HttpExceptionFilter};
        HttpExceptionFilter::default().catch(Box::new(self))
    }
}
