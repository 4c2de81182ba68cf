//! # RapidFast
//!
//! A decorator-style REST framework for Rust on top of axum.
//!
//! Modules import modules, providers are resolved by a dependency container,
//! controllers group routes under a prefix, and an OpenAPI document is
//! assembled from the same metadata the routes are bound from.
//!
//! ## Features
//!
//! - **Dependency Injection**: singleton container with class, value and factory providers
//! - **Controllers**: `#[controller]` + `#[routes]` with `#[get]`, `#[post]`, ... handlers
//! - **Parameter injection**: `#[param]`, `#[query]`, `#[body]`, `#[headers]` with pipes
//! - **Modules**: `#[module(imports = [...], controllers = [...], providers = [...])]`
//! - **OpenAPI**: `#[api_operation]`, `#[api_param]`, `#[api_body]`, `#[api_response]`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rapidfast::prelude::*;
//!
//! #[derive(Injectable)]
//! pub struct GreetingService;
//!
//! #[controller("/hello")]
//! pub struct HelloController {
//!     greetings: Arc<GreetingService>,
//! }
//!
//! #[routes]
//! impl HelloController {
//!     #[get("/:name")]
//!     async fn greet(&self, #[param("name")] name: String) -> Value {
//!         json!({ "message": format!("Hello, {name}!") })
//!     }
//! }
//!
//! #[module(controllers = [HelloController], providers = [GreetingService])]
//! pub struct AppModule;
//!
//! #[tokio::main]
//! async fn main() -> rapidfast::Result<()> {
//!     let mut app = Application::builder().build()?;
//!     app.initialize(&[ClassRef::module::<AppModule>()])?;
//!     app.run().await
//! }
//! ```

extern crate self as rapidfast;

pub mod application;
pub mod config;
pub mod controller;
pub mod di;
pub mod error;
pub mod exception;
pub mod http;
pub mod logging;
pub mod metadata;
pub mod middleware;
pub mod module;
pub mod orm;
pub mod pipe;
pub mod router;
pub mod swagger;

// Re-export core types
pub use application::{Application, ApplicationBuilder, shutdown_signal};
pub use config::{AppConfig, ConfigService};
pub use controller::Controller;
pub use di::{Container, ContainerBuilder, Injectable, Provider, Symbol, Token};
pub use error::{BoxError, RapidError, Result};
pub use metadata::{ClassId, ClassRef, MetadataStore};
pub use module::{Module, ModuleMetadata};

// Re-export macros
pub use rapidfast_macro::{
    Injectable as DeriveInjectable, api_body, api_operation, api_param, api_response, controller,
    delete, get, head, module, options, patch, post, put, routes,
};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;
pub use serde_json;

/// Prelude module for convenient imports
///
/// ```
/// use rapidfast::prelude::*;
/// ```
pub mod prelude {
    pub use crate::application::{Application, ApplicationBuilder, shutdown_signal};
    pub use crate::config::{AppConfig, ConfigService};
    pub use crate::controller::Controller;
    pub use crate::di::{Container, ContainerBuilder, FactoryArgs, Injectable, Provider, Symbol, Token};
    pub use crate::error::{BoxError, RapidError, Result};
    pub use crate::exception::{ExceptionFilter, HttpException, HttpExceptionFilter};
    pub use crate::http::{HttpRequest, HttpResponse, Next};
    pub use crate::metadata::{ClassRef, MetadataStore};
    pub use crate::middleware::{Middleware, MiddlewareError, MiddlewareResult, RequireHeader};
    pub use crate::module::Module;
    pub use crate::orm::{Database, Entity, Repository, repository_provider};
    pub use crate::pipe::builtins::*;
    pub use crate::pipe::{Pipe, PipeError, PipeResult, ValidationPipe};
    pub use crate::{
        DeriveInjectable as Injectable, api_body, api_operation, api_param, api_response,
        controller, delete, get, head, module, options, patch, post, put, routes,
    };
    pub use async_trait::async_trait;
    pub use axum::{Json, http::StatusCode};
    pub use serde_json::{Value, json};
    pub use std::sync::Arc;
}
