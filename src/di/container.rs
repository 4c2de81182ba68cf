use crate::di::{FactoryArgs, Injectable, Provider, ProviderStrategy, Token};
use crate::error::{RapidError, Result};
use crate::metadata::{keys, ClassRef, Instance, MetadataStore};
use dashmap::DashMap;
use std::any::TypeId;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_CONTAINER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    // Classes currently being constructed on this thread, per container.
    static RESOLVING: RefCell<Vec<(u64, TypeId, &'static str)>> = const { RefCell::new(Vec::new()) };
}

/// Thread-safe singleton registry keyed by [`Token`].
///
/// Every token maps to at most one instance. Classes are constructed on
/// first request when they have a constructor; everything else must be
/// registered through a [`Provider`] first.
pub struct Container {
    id: u64,
    services: DashMap<Token, Instance>,
    store: Arc<MetadataStore>,
}

impl Container {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MetadataStore::new()))
    }

    pub fn with_store(store: Arc<MetadataStore>) -> Self {
        Self {
            id: NEXT_CONTAINER.fetch_add(1, Ordering::Relaxed),
            services: DashMap::new(),
            store,
        }
    }

    pub fn store(&self) -> &Arc<MetadataStore> {
        &self.store
    }

    /// Applies a provider.
    ///
    /// A bare class is only constructed when its token is still empty.
    /// Explicit providers always replace what the token held before.
    pub fn register(&self, provider: impl Into<Provider>) -> Result<()> {
        let provider = provider.into();
        let token = provider.token();
        self.apply(provider).inspect_err(|error| {
            tracing::error!(provider = %token, error = %error, "Error registering provider");
        })
    }

    fn apply(&self, provider: Provider) -> Result<()> {
        match provider {
            Provider::Class(class) => {
                let token = Token::Class(class);
                if !self.services.contains_key(&token) {
                    let instance = self.instantiate(&class)?;
                    self.services.entry(token).or_insert(instance);
                }
            }
            Provider::Explicit { provide, strategy } => {
                let instance = match strategy {
                    ProviderStrategy::UseValue(value) => value,
                    ProviderStrategy::UseClass(class) => self.instantiate(&class)?,
                    ProviderStrategy::UseFactory { inject, factory } => {
                        let deps = inject
                            .into_iter()
                            .map(|dep| self.resolve_token(&dep).map(|instance| (dep, instance)))
                            .collect::<Result<Vec<_>>>()?;
                        factory(FactoryArgs::new(deps))
                            .map_err(|source| RapidError::instantiation(&provide, source))?
                    }
                };
                if self.services.insert(provide.clone(), instance).is_some() {
                    tracing::debug!(token = %provide, "Provider replaced an existing registration");
                }
            }
        }
        Ok(())
    }

    /// Returns the singleton for `token`, constructing it if it is a class
    /// that is not registered yet.
    pub fn resolve_token(&self, token: &Token) -> Result<Instance> {
        if let Some(instance) = self.services.get(token).map(|entry| entry.value().clone()) {
            return Ok(instance);
        }

        match token {
            Token::Class(class) if class.is_constructible() => {
                let instance = self.instantiate(class)?;
                let stored = self
                    .services
                    .entry(token.clone())
                    .or_insert(instance)
                    .value()
                    .clone();
                Ok(stored)
            }
            _ => Err(RapidError::unregistered(token)),
        }
    }

    /// Resolves a concrete injectable, constructing it on first use.
    pub fn resolve<T: Injectable>(&self) -> Result<Arc<T>> {
        let instance = self.resolve_token(&Token::of::<T>())?;
        downcast::<T>(instance)
    }

    /// Resolves a trait object registered with [`Provider::bind`] or a
    /// factory returning `Arc<T>`.
    pub fn resolve_dyn<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let instance = self.resolve_token(&Token::of_dyn::<T>())?;
        downcast::<Arc<T>>(instance).map(|wrapper| wrapper.as_ref().clone())
    }

    /// Resolves whatever is registered under `token` as a `T`.
    pub fn get<T: Send + Sync + 'static>(&self, token: impl Into<Token>) -> Result<Arc<T>> {
        let instance = self.resolve_token(&token.into())?;
        downcast::<T>(instance)
    }

    /// Registers `value` under its own type.
    pub fn insert<T: Send + Sync + 'static>(&self, value: T) {
        self.services.insert(Token::of_dyn::<T>(), Arc::new(value));
    }

    pub fn contains(&self, token: &Token) -> bool {
        self.services.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    fn instantiate(&self, class: &ClassRef) -> Result<Instance> {
        self.store.ensure_decorated(class);
        let class_id = class.id();
        if !self.store.has(keys::INJECTABLE, class_id, None)
            && !self.store.has(keys::CONTROLLER, class_id, None)
        {
            tracing::warn!(class = class.name(), "Class is not marked as injectable");
        }

        let construct = class
            .constructor()
            .ok_or_else(|| RapidError::unregistered(class.name()))?;

        let _guard = ResolutionGuard::enter(self.id, class)?;
        construct(self).inspect_err(|error| {
            tracing::error!(class = class.name(), error = %error, "Failed to instantiate class");
        })
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("services", &self.services.len())
            .finish()
    }
}

fn downcast<T: Send + Sync + 'static>(instance: Instance) -> Result<Arc<T>> {
    instance
        .downcast::<T>()
        .map_err(|_| RapidError::DowncastFailed {
            type_name: std::any::type_name::<T>().to_string(),
        })
}

struct ResolutionGuard;

impl ResolutionGuard {
    fn enter(container: u64, class: &ClassRef) -> Result<Self> {
        let type_id = class.id().type_id();
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            let position = stack
                .iter()
                .position(|(owner, id, _)| *owner == container && *id == type_id);
            if let Some(start) = position {
                let mut cycle: Vec<&str> = stack[start..]
                    .iter()
                    .filter(|(owner, _, _)| *owner == container)
                    .map(|(_, _, name)| *name)
                    .collect();
                cycle.push(class.name());
                return Err(RapidError::CircularDependency {
                    cycle: cycle.join(" -> "),
                });
            }
            stack.push((container, type_id, class.name()));
            Ok(ResolutionGuard)
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLVING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}
