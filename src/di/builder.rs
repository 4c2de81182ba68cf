use crate::di::{Container, Injectable, Provider};
use crate::error::Result;
use crate::metadata::MetadataStore;
use std::sync::Arc;

/// Builder for constructing a dependency injection container
///
/// Providers are applied in the order they were added when `build` runs.
///
/// # Example
/// ```
/// use rapidfast::{ContainerBuilder, Provider};
///
/// let container = ContainerBuilder::new()
///     .value(String::from("postgres://localhost/app"))
///     .provider(Provider::provide("POOL_SIZE").use_value(8usize))
///     .build()
///     .unwrap();
/// assert_eq!(*container.get::<usize>("POOL_SIZE").unwrap(), 8);
/// ```
pub struct ContainerBuilder {
    store: Option<Arc<MetadataStore>>,
    providers: Vec<Provider>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            providers: Vec::new(),
        }
    }

    /// Share an existing metadata store with the container
    pub fn store(mut self, store: Arc<MetadataStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn provider(mut self, provider: impl Into<Provider>) -> Self {
        self.providers.push(provider.into());
        self
    }

    /// Register a value under its own type
    pub fn value<T: Send + Sync + 'static>(self, value: T) -> Self {
        self.provider(Provider::provide(crate::di::Token::of_dyn::<T>()).use_value(value))
    }

    /// Bind a trait to a concrete implementation
    ///
    /// This enables resolving `Arc<dyn Trait>` to the implementation, which is
    /// constructed from the container if it is not registered yet.
    pub fn bind<Trait, Impl, F>(self, caster: F) -> Self
    where
        Trait: ?Sized + Send + Sync + 'static,
        Impl: Injectable,
        F: Fn(Arc<Impl>) -> Arc<Trait> + Send + Sync + 'static,
    {
        self.provider(Provider::bind::<Trait, Impl, F>(caster))
    }

    /// Build the container
    pub fn build(self) -> Result<Container> {
        let container = match self.store {
            Some(store) => Container::with_store(store),
            None => Container::new(),
        };
        for provider in self.providers {
            container.register(provider)?;
        }
        Ok(container)
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
