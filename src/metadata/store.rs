use super::{keys, ClassId, ClassRef};
use dashmap::{DashMap, DashSet};
use std::any::{Any, TypeId};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Slot {
    key: String,
    class: TypeId,
    member: Option<String>,
}

impl Slot {
    fn new(key: &str, class: ClassId, member: Option<&str>) -> Self {
        Self {
            key: key.to_owned(),
            class: class.type_id(),
            member: member.map(str::to_owned),
        }
    }
}

/// Key/value metadata attached to classes and their members.
#[derive(Default)]
pub struct MetadataStore {
    entries: DashMap<Slot, Arc<dyn Any + Send + Sync>>,
    decorated: DashSet<TypeId>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `(key, target, member)`, replacing any previous value.
    pub fn define<V>(&self, key: &str, value: V, target: ClassId, member: Option<&str>)
    where
        V: Any + Send + Sync,
    {
        self.entries
            .insert(Slot::new(key, target, member), Arc::new(value));
    }

    /// Returns the value stored under `(key, target, member)` if it has type `V`.
    pub fn get<V>(&self, key: &str, target: ClassId, member: Option<&str>) -> Option<Arc<V>>
    where
        V: Any + Send + Sync,
    {
        let value = self
            .entries
            .get(&Slot::new(key, target, member))
            .map(|entry| entry.value().clone())?;
        value.downcast::<V>().ok()
    }

    pub fn has(&self, key: &str, target: ClassId, member: Option<&str>) -> bool {
        self.entries.contains_key(&Slot::new(key, target, member))
    }

    /// Appends `item` to the list stored under `(key, target, member)`.
    pub fn append<V>(&self, key: &str, item: V, target: ClassId, member: Option<&str>)
    where
        V: Any + Clone + Send + Sync,
    {
        let mut items = self
            .get::<Vec<V>>(key, target, member)
            .map(|existing| existing.as_ref().clone())
            .unwrap_or_default();
        items.push(item);
        self.define(key, items, target, member);
    }

    /// Runs the class's decoration once per store.
    pub fn ensure_decorated(&self, class: &ClassRef) {
        if self.decorated.insert(class.id().type_id()) {
            class.decorate(self);

            let kinds = self.kinds(class.id());
            if kinds.len() > 1 {
                tracing::warn!(class = class.name(), ?kinds, "Class is marked with more than one kind");
            }
        }
    }

    /// The kind markers (injectable, controller, module) defined on `class`.
    pub fn kinds(&self, class: ClassId) -> Vec<&'static str> {
        [keys::INJECTABLE, keys::CONTROLLER, keys::MODULE]
            .into_iter()
            .filter(|key| self.has(key, class, None))
            .collect()
    }

    pub fn is_decorated(&self, class: ClassId) -> bool {
        self.decorated.contains(&class.type_id())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataStore")
            .field("entries", &self.entries.len())
            .field("decorated", &self.decorated.len())
            .finish()
    }
}
