use crate::entity::Entity;
use crate::key::Key;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

pub(crate) type SharedRegistry<S, B> = Arc<RwLock<Registry<S, B>>>;

/// The private key → entity map owned by exactly one factory.
///
/// Only live entities are stored, and each entity sits under at most one key of at
/// most one registry. Removal of a single entry goes through [`Registry::evict`],
/// which refuses to drop an entry that no longer belongs to the caller's entity.
#[derive(Debug)]
pub(crate) struct Registry<S, B> {
    pub(crate) name: Arc<str>,
    entries: FxHashMap<Key, Entity<S, B>>,
}

/// Where an entity is currently registered: a non-owning link plus the slot key.
pub(crate) struct Home<S, B> {
    registry: Weak<RwLock<Registry<S, B>>>,
    key: Key,
}

impl<S, B> Home<S, B> {
    pub(crate) fn new(registry: &SharedRegistry<S, B>, key: Key) -> Self {
        Self { registry: Arc::downgrade(registry), key }
    }

    pub(crate) fn upgrade(&self) -> Option<SharedRegistry<S, B>> {
        self.registry.upgrade()
    }

    pub(crate) fn key(&self) -> &Key {
        &self.key
    }

    pub(crate) fn is_in(&self, registry: &SharedRegistry<S, B>) -> bool {
        std::ptr::eq(self.registry.as_ptr(), Arc::as_ptr(registry))
    }

    pub(crate) fn same_as(&self, other: &Self) -> bool {
        self.registry.ptr_eq(&other.registry) && self.key == other.key
    }
}

impl<S, B> Clone for Home<S, B> {
    fn clone(&self) -> Self {
        Self { registry: Weak::clone(&self.registry), key: self.key.clone() }
    }
}

impl<S, B> Registry<S, B> {
    pub(crate) fn shared(name: Arc<str>, capacity: usize) -> SharedRegistry<S, B> {
        let mut entries = FxHashMap::default();
        entries.reserve(capacity);
        Arc::new(RwLock::new(Self { name, entries }))
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Entity<S, B>> {
        self.entries.get(key)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Stores `entity` under `key`, returning whatever was registered before.
    pub(crate) fn insert(&mut self, key: Key, entity: Entity<S, B>) -> Option<Entity<S, B>> {
        self.entries.insert(key, entity)
    }

    /// Removes the entry at `key` only if it is still `entity` itself.
    pub(crate) fn evict(&mut self, key: &str, entity: &Entity<S, B>) -> bool {
        if self.entries.get(key).is_some_and(|current| Entity::ptr_eq(current, entity)) {
            self.entries.remove(key);
            true
        } else {
            false
        }
    }

    /// Empties the registry, handing every live entity back to the caller.
    pub(crate) fn drain(&mut self) -> Vec<Entity<S, B>> {
        self.entries.drain().map(|(_, entity)| entity).collect()
    }
}

impl<S, B> std::fmt::Debug for Home<S, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Home").field("key", &self.key).finish_non_exhaustive()
    }
}
