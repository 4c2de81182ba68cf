//! Repository abstraction over entity storage.
//!
//! Services depend on `Arc<dyn Repository<E>>`; [`Database`] hands out the
//! in-memory implementation and [`repository_provider`] registers it in the
//! container.

use crate::di::{Container, FactoryArgs, Injectable, Provider, Token};
use crate::error::{RapidError, Result};
use crate::metadata::{keys, ClassId, Instance, MetadataStore};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::any::TypeId;
use std::sync::Arc;

mod memory;

pub use memory::MemoryRepository;

/// A persisted record with a string primary key.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Storage name, used in logs.
    const TABLE: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);
}

#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn find(&self) -> Result<Vec<E>>;

    async fn find_one_by(&self, id: &str) -> Result<Option<E>>;

    /// Builds an entity from partial data without persisting it.
    fn create(&self, data: Value) -> Result<E>;

    /// Inserts or replaces by id; an empty id gets a fresh UUID.
    async fn save(&self, entity: E) -> Result<E>;

    /// Merges `patch` into the stored entity. `None` if it does not exist.
    async fn update(&self, id: &str, patch: Value) -> Result<Option<E>>;

    async fn delete(&self, id: &str) -> Result<bool>;

    async fn count(&self) -> Result<usize>;
}

/// Hands out one repository per entity type.
#[derive(Default)]
pub struct Database {
    repositories: DashMap<TypeId, Instance>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_repository<E: Entity>(&self) -> Arc<dyn Repository<E>> {
        let instance = self
            .repositories
            .entry(TypeId::of::<E>())
            .or_insert_with(|| {
                tracing::debug!(table = E::TABLE, "Creating repository");
                let repository: Arc<dyn Repository<E>> = Arc::new(MemoryRepository::<E>::new());
                Arc::new(repository)
            })
            .value()
            .clone();

        match instance.downcast::<Arc<dyn Repository<E>>>() {
            Ok(repository) => repository.as_ref().clone(),
            // keyed by TypeId::of::<E>, so the stored value always matches
            Err(_) => Arc::new(MemoryRepository::<E>::new()),
        }
    }
}

impl Injectable for Database {
    fn inject(_container: &Container) -> Result<Self> {
        Ok(Self::new())
    }

    fn decorate(store: &MetadataStore) {
        store.define(keys::INJECTABLE, true, ClassId::of::<Self>(), None);
    }
}

/// Registers `Arc<dyn Repository<E>>` backed by the container's [`Database`].
pub fn repository_provider<E: Entity>() -> Provider {
    Provider::provide(Token::of_dyn::<dyn Repository<E>>()).use_factory(
        [Token::of::<Database>()],
        |args: &FactoryArgs| Ok::<_, RapidError>(args.get::<Database>(0)?.get_repository::<E>()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Note {
        #[serde(default)]
        id: String,
        text: String,
    }

    impl Entity for Note {
        const TABLE: &'static str = "notes";

        fn id(&self) -> &str {
            &self.id
        }

        fn set_id(&mut self, id: String) {
            self.id = id;
        }
    }

    #[tokio::test]
    async fn test_database_shares_repository_per_entity() {
        let db = Database::new();
        db.get_repository::<Note>()
            .save(Note { id: String::new(), text: "a".into() })
            .await
            .unwrap();
        assert_eq!(db.get_repository::<Note>().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_repository_provider_resolves_through_container() {
        let container = Container::new();
        container.register(repository_provider::<Note>()).unwrap();
        let repository = container.resolve_dyn::<dyn Repository<Note>>().unwrap();
        let saved = repository
            .save(repository.create(serde_json::json!({"text": "hello"})).unwrap())
            .await
            .unwrap();
        assert!(!saved.id.is_empty());
        assert!(container.resolve::<Database>().is_ok());
    }
}
