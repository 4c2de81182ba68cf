use crate::di::{Container, Token};
use crate::error::Result;
use crate::metadata::{keys, ClassRef};
use crate::module::ModuleMetadata;
use crate::router::{HttpRouter, RouteBinder, RouteDescriptor};
use std::collections::HashSet;

/// Walks a module graph, registering providers and binding controllers.
pub struct ModuleResolver<'a, R: HttpRouter> {
    container: &'a Container,
    binder: &'a mut RouteBinder<R>,
}

impl<'a, R: HttpRouter> ModuleResolver<'a, R> {
    pub fn new(container: &'a Container, binder: &'a mut RouteBinder<R>) -> Self {
        Self { container, binder }
    }

    /// Processes every module reachable from `roots` once and returns the
    /// controllers that were bound, in visit order.
    ///
    /// Within a module, providers are registered first, then controllers,
    /// then imports are visited.
    pub fn initialize(&mut self, roots: &[ClassRef]) -> Result<Vec<ClassRef>> {
        let mut visited = HashSet::new();
        let mut controllers = Vec::new();
        for root in roots {
            self.visit(root, &mut visited, &mut controllers)?;
        }
        Ok(controllers)
    }

    fn visit(
        &mut self,
        module: &ClassRef,
        visited: &mut HashSet<ClassRef>,
        controllers: &mut Vec<ClassRef>,
    ) -> Result<()> {
        if !visited.insert(*module) {
            return Ok(());
        }

        let store = self.container.store().clone();
        store.ensure_decorated(module);
        let metadata = match store.get::<ModuleMetadata>(keys::MODULE, module.id(), None) {
            Some(metadata) => metadata,
            None => {
                tracing::warn!(module = module.name(), "Class has no module metadata");
                Default::default()
            }
        };
        tracing::debug!(
            module = module.name(),
            providers = metadata.providers.len(),
            controllers = metadata.controllers.len(),
            imports = metadata.imports.len(),
            "Initializing module"
        );

        for provider in &metadata.providers {
            self.container.register(provider.clone())?;
        }

        for controller in &metadata.controllers {
            store.ensure_decorated(controller);
            let instance = self.container.resolve_token(&Token::Class(*controller))?;
            let prefix = store
                .get::<String>(keys::PREFIX, controller.id(), None)
                .map(|prefix| prefix.as_ref().clone())
                .unwrap_or_default();
            let routes = store
                .get::<Vec<RouteDescriptor>>(keys::ROUTES, controller.id(), None)
                .unwrap_or_default();

            self.binder.bind(controller, &prefix, &routes, instance);
            controllers.push(*controller);
        }

        for import in &metadata.imports {
            self.visit(import, visited, controllers)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Controller;
    use crate::di::{Injectable, Provider};
    use crate::exception::HttpExceptionFilter;
    use crate::metadata::{ClassId, MetadataStore};
    use crate::module::Module;
    use crate::router::{BoundHandler, Endpoint, HandlerCall, HandlerFuture, HttpMethod};
    use std::sync::Arc;

    #[derive(Default)]
    struct PathsOnly(Vec<String>);

    impl HttpRouter for PathsOnly {
        fn add_route(&mut self, method: HttpMethod, path: &str, _endpoint: Arc<Endpoint>) {
            self.0.push(format!("{method} {path}"));
        }
    }

    struct Greeting(String);

    struct HelloController {
        greeting: Arc<Greeting>,
    }

    impl Injectable for HelloController {
        fn inject(container: &Container) -> Result<Self> {
            Ok(Self {
                greeting: container.get::<Greeting>("GREETING")?,
            })
        }

        fn decorate(store: &MetadataStore) {
            let class = ClassId::of::<Self>();
            store.define(keys::CONTROLLER, true, class, None);
            store.define(keys::PREFIX, "/hello".to_string(), class, None);
            store.define(
                keys::ROUTES,
                vec![RouteDescriptor::new(HttpMethod::Get, "/", "greet")],
                class,
                None,
            );
        }
    }

    impl Controller for HelloController {
        fn bind_method(self: Arc<Self>, method_name: &str) -> Option<BoundHandler> {
            (method_name == "greet").then(|| {
                let handler: BoundHandler = Arc::new(move |_call: HandlerCall| -> HandlerFuture {
                    let text = self.greeting.0.clone();
                    Box::pin(async move { Ok::<_, crate::error::BoxError>(Some(serde_json::Value::String(text))) })
                });
                handler
            })
        }
    }

    struct RootModule;
    struct FeatureModule;

    impl Module for RootModule {
        fn decorate(store: &MetadataStore) {
            store.define(
                keys::MODULE,
                ModuleMetadata {
                    imports: vec![ClassRef::module::<FeatureModule>()],
                    providers: vec![Provider::provide("GREETING").use_value(Greeting("hi".into()))],
                    ..Default::default()
                },
                ClassId::of::<Self>(),
                None,
            );
        }
    }

    impl Module for FeatureModule {
        fn decorate(store: &MetadataStore) {
            store.define(
                keys::MODULE,
                ModuleMetadata {
                    imports: vec![ClassRef::module::<RootModule>()],
                    controllers: vec![ClassRef::controller::<HelloController>()],
                    ..Default::default()
                },
                ClassId::of::<Self>(),
                None,
            );
        }
    }

    fn binder(container: &Container) -> RouteBinder<PathsOnly> {
        RouteBinder::new(
            PathsOnly::default(),
            container.store().clone(),
            Arc::new(HttpExceptionFilter::default()),
        )
    }

    #[test]
    fn test_cyclic_imports_visit_each_module_once() {
        let container = Container::new();
        let mut binder = binder(&container);

        let controllers = ModuleResolver::new(&container, &mut binder)
            .initialize(&[ClassRef::module::<RootModule>()])
            .unwrap();

        assert_eq!(controllers, [ClassRef::controller::<HelloController>()]);
        assert_eq!(binder.router().0, ["GET /hello"]);
    }

    #[test]
    fn test_missing_provider_fails_initialize() {
        let container = Container::new();
        let mut binder = binder(&container);

        let result = ModuleResolver::new(&container, &mut binder)
            .initialize(&[ClassRef::module::<FeatureModule>()]);

        assert!(result.is_err());
        assert!(binder.routes().is_empty());
    }
}
