use crate::error::BoxError;
use crate::exception::{ExceptionFilter, HttpException};
use crate::http::{HttpRequest, HttpResponse, Next, NextOutcome};
use crate::metadata::{keys, ClassRef, Instance, MetadataStore};
use crate::middleware::Middleware;
use crate::router::{
    extract_params, join_paths, AxumRouter, BoundHandler, HandlerCall, HttpMethod, ParamDescriptor,
    RouteDescriptor,
};
use axum::response::Response;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Something routes can be registered on.
pub trait HttpRouter: Send {
    fn add_route(&mut self, method: HttpMethod, path: &str, endpoint: Arc<Endpoint>);
}

/// A route as it was bound, for startup logs and introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundRoute {
    pub method: HttpMethod,
    pub path: String,
    pub controller: &'static str,
    pub method_name: String,
}

/// A bound handler wrapped with its middleware chain and parameter plan.
pub struct Endpoint {
    method: HttpMethod,
    path: String,
    handler: BoundHandler,
    middleware: Vec<Arc<dyn Middleware>>,
    params: Vec<ParamDescriptor>,
    filter: Arc<dyn ExceptionFilter>,
}

impl Endpoint {
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Runs one request through middleware, extraction and the handler.
    ///
    /// Errors from any stage go to the exception filter. A response the
    /// handler already sent wins over its return value.
    pub async fn handle(&self, request: HttpRequest) -> Response {
        let response = HttpResponse::new();
        let next = Next::new();
        let request_path = request.path().to_string();

        for middleware in &self.middleware {
            if let Err(error) = middleware.handle(&request, &response).await {
                return self.fail(error, &response);
            }
            if response.headers_sent() {
                return response.into_response();
            }
        }

        let mut call = HandlerCall::new(request, response.clone(), next.clone());
        if !self.params.is_empty() {
            match extract_params(&self.params, &call.request, &response).await {
                Ok(args) => call = call.with_args(args),
                Err(error) => return self.fail(error, &response),
            }
        }

        let output = match (self.handler)(call).await {
            Ok(output) => output,
            Err(error) => return self.fail(error, &response),
        };

        if response.headers_sent() {
            return response.into_response();
        }

        match next.take() {
            Some(NextOutcome::Failed(error)) => self.fail(error, &response),
            Some(NextOutcome::Passed) => self.fail(
                Box::new(HttpException::not_found(format!(
                    "Cannot {} {}",
                    self.method, request_path
                ))),
                &response,
            ),
            None => response.reply(output),
        }
    }

    /// Responds to a request that could not be read.
    pub fn reject(&self, exception: HttpException) -> Response {
        self.fail(Box::new(exception), &HttpResponse::new())
    }

    // Headers middleware or the handler already set survive the error.
    fn fail(&self, error: BoxError, response: &HttpResponse) -> Response {
        tracing::debug!(method = %self.method, path = %self.path, error = %error, "Error in route");
        response.apply_headers(self.filter.catch(error))
    }
}

/// Why a route could not be added next to the ones already bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteConflict {
    /// The method is already bound on a path of the same shape.
    Duplicate,
    /// A parameter segment is already bound under another name.
    ParamName { bound: String, requested: String },
}

impl fmt::Display for RouteConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteConflict::Duplicate => f.write_str("route already registered"),
            RouteConflict::ParamName { bound, requested } => {
                write!(f, "segment `{requested}` clashes with `{bound}` bound at the same position")
            }
        }
    }
}

/// Bound paths as the matcher sees them.
///
/// Parameter names are part of the match tree, so `/items/:id` and
/// `/items/:itemId/tags` cannot both be routed even for different methods.
#[derive(Debug, Default)]
struct RouteShapes {
    // shape of the path before a parameter segment -> that segment
    params: HashMap<String, String>,
    methods: HashSet<(HttpMethod, String)>,
    paths: HashSet<String>,
}

impl RouteShapes {
    fn check(&self, method: HttpMethod, path: &str) -> Option<RouteConflict> {
        let mut prefix = String::new();
        for segment in segments(path) {
            if is_param_segment(segment) {
                if let Some(bound) = self.params.get(&prefix).filter(|bound| *bound != segment) {
                    return Some(RouteConflict::ParamName {
                        bound: bound.clone(),
                        requested: segment.to_owned(),
                    });
                }
            }
            push_shape(&mut prefix, segment);
        }
        self.methods
            .contains(&(method, shape_of(path)))
            .then_some(RouteConflict::Duplicate)
    }

    fn insert(&mut self, method: HttpMethod, path: &str) {
        let mut prefix = String::new();
        for segment in segments(path) {
            if is_param_segment(segment) {
                self.params
                    .entry(prefix.clone())
                    .or_insert_with(|| segment.to_owned());
            }
            push_shape(&mut prefix, segment);
        }
        let shape = shape_of(path);
        self.methods.insert((method, shape.clone()));
        self.paths.insert(shape);
    }

    fn contains_path(&self, path: &str) -> bool {
        self.paths.contains(&shape_of(path))
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn is_param_segment(segment: &str) -> bool {
    segment.len() > 1 && (segment.starts_with(':') || segment.starts_with('*'))
}

// `:id` and `:itemId` share the shape `:`.
fn push_shape(shape: &mut String, segment: &str) {
    shape.push('/');
    if is_param_segment(segment) {
        shape.push_str(&segment[..1]);
    } else {
        shape.push_str(segment);
    }
}

fn shape_of(path: &str) -> String {
    let mut shape = String::new();
    for segment in segments(path) {
        push_shape(&mut shape, segment);
    }
    if shape.is_empty() {
        shape.push('/');
    }
    shape
}

/// Binds controller routes onto a router.
///
/// A method is bound at most once per path shape; later duplicates are
/// skipped with a debug log. Routes whose parameter names clash with an
/// already bound path are skipped with an error log.
pub struct RouteBinder<R: HttpRouter = AxumRouter> {
    router: R,
    store: Arc<MetadataStore>,
    filter: Arc<dyn ExceptionFilter>,
    shapes: RouteShapes,
    routes: Vec<BoundRoute>,
}

impl<R: HttpRouter> RouteBinder<R> {
    pub fn new(router: R, store: Arc<MetadataStore>, filter: Arc<dyn ExceptionFilter>) -> Self {
        Self {
            router,
            store,
            filter,
            shapes: RouteShapes::default(),
            routes: Vec::new(),
        }
    }

    /// Binds each route of `controller` under `prefix` and returns how many
    /// were added.
    pub fn bind(
        &mut self,
        controller: &ClassRef,
        prefix: &str,
        routes: &[RouteDescriptor],
        instance: Instance,
    ) -> usize {
        let mut bound = 0;
        for route in routes {
            let full_path = join_paths(prefix, &route.path);

            let Some(handler) = controller.bind_method(instance.clone(), &route.method_name) else {
                tracing::error!(
                    controller = controller.name(),
                    method = %route.method_name,
                    "Route handler not found on controller"
                );
                continue;
            };

            match self.shapes.check(route.method, &full_path) {
                Some(RouteConflict::Duplicate) => {
                    tracing::debug!(method = %route.method, path = %full_path, "Route already registered, skipping");
                    continue;
                }
                Some(conflict) => {
                    tracing::error!(
                        controller = controller.name(),
                        method = %route.method,
                        path = %full_path,
                        error = %conflict,
                        "Route conflicts with a bound route, skipping"
                    );
                    continue;
                }
                None => self.shapes.insert(route.method, &full_path),
            }

            let mut params = self
                .store
                .get::<Vec<ParamDescriptor>>(keys::PARAMS, controller.id(), Some(&route.method_name))
                .map(|params| params.as_ref().clone())
                .unwrap_or_default();
            params.sort_by_key(|param| param.index);

            let endpoint = Arc::new(Endpoint {
                method: route.method,
                path: full_path.clone(),
                handler,
                middleware: route.middleware.clone(),
                params,
                filter: self.filter.clone(),
            });
            self.router.add_route(route.method, &full_path, endpoint);

            tracing::debug!("[{:<7}] {}", route.method.to_string(), full_path);
            self.routes.push(BoundRoute {
                method: route.method,
                path: full_path,
                controller: controller.name(),
                method_name: route.method_name.clone(),
            });
            bound += 1;
        }
        bound
    }

    pub fn routes(&self) -> &[BoundRoute] {
        &self.routes
    }

    /// Whether any method is bound on a path of the same shape as `path`.
    pub fn is_path_bound(&self, path: &str) -> bool {
        self.shapes.contains_path(path)
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn filter(&self) -> &Arc<dyn ExceptionFilter> {
        &self.filter
    }
}
