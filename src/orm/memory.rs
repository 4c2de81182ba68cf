use crate::error::{RapidError, Result};
use crate::orm::{Entity, Repository};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Keeps entities in insertion order in memory.
pub struct MemoryRepository<E: Entity> {
    rows: RwLock<Vec<E>>,
}

impl<E: Entity> MemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }
}

impl<E: Entity> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for MemoryRepository<E> {
    async fn find(&self) -> Result<Vec<E>> {
        Ok(self.rows.read().await.clone())
    }

    async fn find_one_by(&self, id: &str) -> Result<Option<E>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|row| row.id() == id).cloned())
    }

    fn create(&self, data: Value) -> Result<E> {
        serde_json::from_value(data)
            .map_err(|err| RapidError::Internal(format!("Invalid {} data: {err}", E::TABLE)))
    }

    async fn save(&self, mut entity: E) -> Result<E> {
        if entity.id().is_empty() {
            entity.set_id(Uuid::new_v4().to_string());
        }
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|row| row.id() == entity.id()) {
            Some(existing) => *existing = entity.clone(),
            None => rows.push(entity.clone()),
        }
        tracing::trace!(table = E::TABLE, id = entity.id(), "Saved entity");
        Ok(entity)
    }

    async fn update(&self, id: &str, patch: Value) -> Result<Option<E>> {
        let mut rows = self.rows.write().await;
        let Some(existing) = rows.iter_mut().find(|row| row.id() == id) else {
            return Ok(None);
        };

        let mut merged = serde_json::to_value(&*existing)
            .map_err(|err| RapidError::Internal(err.to_string()))?;
        if let (Some(target), Value::Object(changes)) = (merged.as_object_mut(), patch) {
            for (key, value) in changes {
                target.insert(key, value);
            }
        }
        let mut updated: E = serde_json::from_value(merged)
            .map_err(|err| RapidError::Internal(format!("Invalid {} data: {err}", E::TABLE)))?;
        updated.set_id(id.to_string());
        *existing = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        Ok(rows.len() != before)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.rows.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Product {
        #[serde(default)]
        id: String,
        name: String,
        price: f64,
    }

    impl Entity for Product {
        const TABLE: &'static str = "products";

        fn id(&self) -> &str {
            &self.id
        }

        fn set_id(&mut self, id: String) {
            self.id = id;
        }
    }

    #[tokio::test]
    async fn test_crud() {
        let repository = MemoryRepository::<Product>::new();
        let lamp = repository
            .save(repository.create(json!({"name": "Lamp", "price": 20.0})).unwrap())
            .await
            .unwrap();
        let desk = repository
            .save(repository.create(json!({"name": "Desk", "price": 150.0})).unwrap())
            .await
            .unwrap();

        let all = repository.find().await.unwrap();
        assert_eq!(all.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), ["Lamp", "Desk"]);

        let updated = repository
            .update(&lamp.id, json!({"price": 25.0, "id": "ignored"}))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.price, 25.0);
        assert_eq!(updated.id, lamp.id);
        assert_eq!(repository.find_one_by(&lamp.id).await.unwrap(), Some(updated));

        assert!(repository.delete(&desk.id).await.unwrap());
        assert!(!repository.delete(&desk.id).await.unwrap());
        assert_eq!(repository.count().await.unwrap(), 1);
        assert_eq!(repository.update("missing", json!({})).await.unwrap(), None);
    }

    #[test]
    fn test_create_rejects_bad_data() {
        let repository = MemoryRepository::<Product>::new();
        assert!(repository.create(json!({"name": 1})).is_err());
    }
}
