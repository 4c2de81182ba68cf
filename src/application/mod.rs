//! Application bootstrap
//!
//! Wires the container, module resolver, route binder and OpenAPI document
//! together and runs the axum server.
//!
//! ```rust,ignore
//! let mut app = Application::builder().build()?;
//! app.initialize(&[ClassRef::module::<AppModule>()])?;
//! app.run().await?;
//! ```

use crate::config::AppConfig;
use crate::di::{Container, Provider};
use crate::error::{RapidError, Result};
use crate::exception::{ExceptionFilter, HttpException, HttpExceptionFilter};
use crate::metadata::{ClassRef, MetadataStore};
use crate::module::ModuleResolver;
use crate::router::{normalize_path, AxumRouter, BoundRoute, RouteBinder};
use crate::swagger::{self, OpenApiDocument, SwaggerAssembler};
use axum::{extract::Request, response::Response, Router};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

type RouterLayer = Arc<dyn Fn(Router) -> Router + Send + Sync>;

struct RunningServer {
    address: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

pub struct Application {
    config: AppConfig,
    container: Arc<Container>,
    binder: RouteBinder<AxumRouter>,
    controllers: Vec<ClassRef>,
    document: Arc<OpenApiDocument>,
    layers: Vec<RouterLayer>,
    server: Option<RunningServer>,
}

impl Application {
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    /// Registers the module graph under `modules` and binds its routes.
    ///
    /// May be called more than once; routes and controllers accumulate and
    /// the OpenAPI document is rebuilt from everything bound so far.
    pub fn initialize(&mut self, modules: &[ClassRef]) -> Result<()> {
        let before = self.binder.routes().len();
        let controllers = ModuleResolver::new(&self.container, &mut self.binder).initialize(modules)?;
        for controller in controllers {
            if !self.controllers.contains(&controller) {
                self.controllers.push(controller);
            }
        }

        self.document = Arc::new(
            SwaggerAssembler::new(self.container.store())
                .assemble(&self.controllers, &self.config.swagger_info()),
        );

        tracing::info!(
            routes = self.binder.routes().len() - before,
            controllers = self.controllers.len(),
            "Application initialized"
        );
        Ok(())
    }

    /// The fully layered router, as served by [`Application::listen`].
    pub fn router(&self) -> Router {
        let mut router = self.binder.router().router();

        if self.config.swagger.enabled {
            if let Some(docs) = self.swagger_routes() {
                router = router.merge(docs);
            }
        }

        let filter = self.binder.filter().clone();
        router = router.fallback(move |request: Request| {
            let filter = filter.clone();
            async move {
                let message = format!("Cannot {} {}", request.method(), request.uri().path());
                filter.catch(Box::new(HttpException::not_found(message)))
            }
        });

        for layer in &self.layers {
            router = layer(router);
        }

        let filter = self.binder.filter().clone();
        router = router.layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send>| {
                    panic_response(filter.as_ref(), panic)
                })),
        );

        if self.config.is_development() {
            router = router.layer(TraceLayer::new_for_http());
        }
        router
    }

    // The UI and JSON routes, unless a controller already owns either path.
    fn swagger_routes(&self) -> Option<Router> {
        let ui_path = normalize_path(&self.config.swagger.path);
        let json_path = normalize_path(&self.config.swagger.json_path);

        if ui_path == json_path {
            tracing::error!(path = %ui_path, "Swagger UI and JSON paths are the same, documentation not mounted");
            return None;
        }
        let taken: Vec<&str> = [ui_path.as_str(), json_path.as_str()]
            .into_iter()
            .filter(|path| self.binder.is_path_bound(path))
            .collect();
        if !taken.is_empty() {
            tracing::error!(paths = ?taken, "Swagger paths are bound by a controller, documentation not mounted");
            return None;
        }

        Some(swagger::routes(self.document.clone(), &ui_path, &json_path))
    }

    /// Binds `HOST:PORT` and serves in the background.
    pub async fn listen(&mut self) -> Result<SocketAddr> {
        if let Some(server) = &self.server {
            return Ok(server.address);
        }

        let listener = TcpListener::bind(self.config.address()).await?;
        let address = listener.local_addr()?;
        let router = self.router();
        let (shutdown, signal) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = signal.await;
                })
                .await
        });

        tracing::info!("Application is running on: http://{address}");
        if self.config.swagger.enabled {
            tracing::info!(
                "Swagger documentation available at: http://{address}{}",
                self.config.swagger.path
            );
        }

        self.server = Some(RunningServer {
            address,
            shutdown,
            task,
        });
        Ok(address)
    }

    /// Stops accepting connections and waits for in-flight requests.
    pub async fn close(&mut self) -> Result<()> {
        let Some(server) = self.server.take() else {
            return Ok(());
        };

        tracing::info!("Shutting down application...");
        // the receiver is gone only if the server already stopped
        let _ = server.shutdown.send(());
        server
            .task
            .await
            .map_err(|err| RapidError::Internal(format!("Server task failed: {err}")))??;
        tracing::info!("Application shutdown complete");
        Ok(())
    }

    /// Serves until Ctrl+C or SIGTERM, then shuts down gracefully.
    pub async fn run(mut self) -> Result<()> {
        self.listen().await?;
        shutdown_signal().await;
        self.close().await
    }

    pub fn address(&self) -> Option<SocketAddr> {
        self.server.as_ref().map(|server| server.address)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn store(&self) -> &Arc<MetadataStore> {
        self.container.store()
    }

    pub fn routes(&self) -> &[BoundRoute] {
        self.binder.routes()
    }

    pub fn controllers(&self) -> &[ClassRef] {
        &self.controllers
    }

    pub fn document(&self) -> &OpenApiDocument {
        &self.document
    }
}

fn panic_response(filter: &dyn ExceptionFilter, panic: Box<dyn Any + Send>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "Handler panicked");
    filter.catch(Box::new(RapidError::Internal(format!("Handler panicked: {detail}"))))
}

pub struct ApplicationBuilder {
    config: Option<AppConfig>,
    container: Option<Container>,
    filter: Option<Arc<dyn ExceptionFilter>>,
    providers: Vec<Provider>,
    layers: Vec<RouterLayer>,
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            container: None,
            filter: None,
            providers: Vec::new(),
            layers: Vec::new(),
        }
    }

    /// Uses `config` instead of loading it from files and the environment.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn container(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }

    /// Replaces the global exception filter.
    pub fn exception_filter(mut self, filter: impl ExceptionFilter + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// A provider registered before any module.
    pub fn provider(mut self, provider: impl Into<Provider>) -> Self {
        self.providers.push(provider.into());
        self
    }

    /// Applies `layer` to the router inside the built-in panic and CORS layers.
    pub fn layer<F>(mut self, layer: F) -> Self
    where
        F: Fn(Router) -> Router + Send + Sync + 'static,
    {
        self.layers.push(Arc::new(layer));
        self
    }

    pub fn build(self) -> Result<Application> {
        let config = match self.config {
            Some(config) => config,
            None => AppConfig::load()?,
        };
        let container = self.container.unwrap_or_default();
        container.insert(config.clone());
        for provider in self.providers {
            container.register(provider)?;
        }

        let filter = self
            .filter
            .unwrap_or_else(|| Arc::new(HttpExceptionFilter::new(config.is_development())));
        let store = container.store().clone();
        let document = SwaggerAssembler::new(&store).assemble(&[], &config.swagger_info());
        let binder = RouteBinder::new(AxumRouter::with_body_limit(config.body_limit), store, filter);

        tracing::debug!(environment = %config.environment, "Application created");
        Ok(Application {
            document: Arc::new(document),
            config,
            container: Arc::new(container),
            binder,
            controllers: Vec::new(),
            layers: self.layers,
            server: None,
        })
    }
}

/// Completes on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}
