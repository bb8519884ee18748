use crate::builder::FactoryBuilder;
use crate::config::{AssignPolicy, FactoryConfig};
use crate::entity::Entity;
use crate::error::KeyedError;
use crate::key::Key;
use crate::registry::{Home, SharedRegistry};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// The configuration routine: runs against an entity's state with the caller's arguments.
pub(crate) type Routine<S, A> = dyn Fn(&mut S, A) + Send + Sync;

/// A factory of keyed entities backed by its own private registry.
///
/// Requesting the same key twice yields the same [`Entity`] (compare with `==` or
/// [`Entity::ptr_eq`]) until that entity is purged or superseded. Every construction
/// call, first or repeated, re-runs the configuration routine, so an existing entity
/// can be reconfigured without losing its identity.
///
/// `KeyedFactory` is a cheap handle: clones share the registry. Independent factories
/// never share keys.
///
/// # Type Parameters
/// * `S`: per-entity state. Bare entities start from `S::default()`.
/// * `A`: the arguments passed to the configuration routine after the key.
/// * `B`: the capability set shared by all entities, see [`FactoryBuilder::base`].
///
/// # Example
/// ```rust
/// use keyed::KeyedFactory;
///
/// #[derive(Debug, Default)]
/// struct Contact {
///     name: String,
/// }
///
/// let contacts = KeyedFactory::new(|c: &mut Contact, name: &str| c.name = name.to_owned());
///
/// let first = contacts.construct("ada", "Ada");
/// let again = contacts.construct("ada", "Ada Lovelace");
///
/// assert_eq!(first, again);
/// assert_eq!(first.read().name, "Ada Lovelace");
///
/// first.purge();
/// assert!(!contacts.loaded("ada"));
/// assert_ne!(contacts.construct("ada", "Ada"), first);
/// ```
pub struct KeyedFactory<S, A = (), B = ()> {
    registry: SharedRegistry<S, B>,
    routine: Arc<Routine<S, A>>,
    base: Arc<B>,
    config: Arc<FactoryConfig>,
}

impl<S, A, B> Clone for KeyedFactory<S, A, B> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            routine: Arc::clone(&self.routine),
            base: Arc::clone(&self.base),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, A> KeyedFactory<S, A> {
    /// Returns a new [`FactoryBuilder`].
    #[must_use]
    pub fn builder() -> FactoryBuilder<S, A> {
        FactoryBuilder::default()
    }

    /// Creates a factory with default settings and no shared capability set.
    pub fn new<F>(routine: F) -> Self
    where
        F: Fn(&mut S, A) + Send + Sync + 'static,
    {
        Self::builder().configure(routine).build()
    }
}

impl<S, A, B> KeyedFactory<S, A, B> {
    pub(crate) fn from_parts(
        registry: SharedRegistry<S, B>,
        routine: Arc<Routine<S, A>>,
        base: Arc<B>,
        config: FactoryConfig,
    ) -> Self {
        Self { registry, routine, base, config: Arc::new(config) }
    }

    /// Returns the factory name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the settings the factory was built with.
    #[must_use]
    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Returns the capability set shared by this factory's entities.
    #[must_use]
    pub fn base(&self) -> &Arc<B> {
        &self.base
    }

    /// Returns `true` if `key` currently names a live entity. Never creates one.
    pub fn loaded(&self, key: impl Into<Key>) -> bool {
        let key = key.into();
        self.registry.read().contains(&key)
    }

    /// Returns the live entity for `key`, if any, without creating or reconfiguring it.
    pub fn peek(&self, key: impl Into<Key>) -> Option<Entity<S, B>> {
        let key = key.into();
        self.registry.read().get(&key).cloned()
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    /// Returns `true` if no entity is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Installs `value` as the entity for `key`, bypassing the configuration routine.
    ///
    /// A live entity already registered under `key` is purged first and returned.
    /// Assigning the entity already registered under `key` changes nothing. If
    /// `value` lives in another slot (another key, or another factory), it is moved
    /// out of it.
    ///
    /// Whether `value.key()` must equal `key` depends on the factory's
    /// [`AssignPolicy`]: `Trust` installs anyway and logs a warning, `Verify` rejects.
    ///
    /// # Errors
    /// * [`KeyedError::Purged`] if `value` has been purged.
    /// * [`KeyedError::KeyMismatch`] under [`AssignPolicy::Verify`] when the keys differ.
    pub fn assign(
        &self,
        key: impl Into<Key>,
        value: Entity<S, B>,
    ) -> Result<Option<Entity<S, B>>, KeyedError> {
        let key = key.into();

        if value.key() != &key {
            match self.config.assign_policy {
                AssignPolicy::Verify => {
                    return Err(KeyedError::KeyMismatch {
                        expected: key,
                        found: value.key().clone(),
                        context: Some(self.config.name.clone().into()),
                    });
                },
                AssignPolicy::Trust => warn!(
                    factory = %self.config.name,
                    key = %key,
                    entity_key = %value.key(),
                    "Assigning entity under a key it does not report"
                ),
            }
        }

        if value.is_purged() {
            return Err(KeyedError::Purged { key: value.key().clone(), context: None });
        }

        if value.lives_outside(&self.registry) {
            value.unlink(false);
        }

        let mut registry = self.registry.write();
        if registry.get(&key).is_some_and(|current| Entity::ptr_eq(current, &value)) {
            return Ok(None);
        }

        if let Some(prior) = value.rebind(Home::new(&self.registry, key.clone()))? {
            if prior.is_in(&self.registry) {
                registry.evict(prior.key(), &value);
            }
        }

        let previous = registry.insert(key.clone(), value);
        if let Some(previous) = &previous {
            previous.freeze();
            debug!(factory = %self.config.name, key = %key, "Entity superseded");
        } else {
            trace!(factory = %self.config.name, key = %key, "Entity assigned");
        }

        Ok(previous)
    }

    /// Purges every live entity and returns how many were purged.
    pub fn purge_all(&self) -> usize {
        let mut registry = self.registry.write();
        let drained = registry.drain();
        for entity in &drained {
            entity.freeze();
        }
        debug!(factory = %self.config.name, count = drained.len(), "Registry purged");
        drained.len()
    }
}

impl<S: Default, A, B> KeyedFactory<S, A, B> {
    /// Returns the entity for `key`, creating it on first sight, then runs the
    /// configuration routine against it with `args`.
    ///
    /// The registry changes only when the key is new. Two calls with the same key
    /// return the same entity unless it was purged or superseded in between.
    pub fn construct(&self, key: impl Into<Key>, args: A) -> Entity<S, B> {
        self.resolve(key.into(), args)
    }

    /// [`KeyedFactory::construct`] with default arguments.
    pub fn fetch(&self, key: impl Into<Key>) -> Entity<S, B>
    where
        A: Default,
    {
        self.resolve(key.into(), A::default())
    }

    /// Resolves every key in order to a live entity.
    ///
    /// Existing entities are returned as they are. Missing ones are created exactly
    /// as [`KeyedFactory::fetch`] would. The result has one element per input key, and
    /// repeated keys yield the same entity.
    pub fn select<I>(&self, keys: I) -> Vec<Entity<S, B>>
    where
        I: IntoIterator,
        I::Item: Into<Key>,
        A: Default,
    {
        let selected: Vec<_> = keys
            .into_iter()
            .map(|key| {
                let key = key.into();
                let existing = self.registry.read().get(&key).cloned();
                existing.unwrap_or_else(|| self.resolve(key, A::default()))
            })
            .collect();

        trace!(factory = %self.config.name, count = selected.len(), "Entities selected");
        selected
    }

    fn resolve(&self, key: Key, mut args: A) -> Entity<S, B> {
        loop {
            let (entity, created) = self.lookup_or_insert(&key);
            match entity.configure(&*self.routine, args) {
                Ok(()) => {
                    trace!(factory = %self.config.name, key = %key, created, "Entity configured");
                    return entity;
                },
                Err(returned) => {
                    trace!(factory = %self.config.name, key = %key, "Entity purged mid-construction");
                    args = returned;
                },
            }
        }
    }

    fn lookup_or_insert(&self, key: &Key) -> (Entity<S, B>, bool) {
        let existing = self.registry.read().get(key).cloned();
        if let Some(entity) = existing {
            return (entity, false);
        }

        let mut registry = self.registry.write();
        if let Some(entity) = registry.get(key) {
            return (entity.clone(), false);
        }

        let entity = Entity::linked(
            key.clone(),
            S::default(),
            Arc::clone(&self.base),
            Some(Home::new(&self.registry, key.clone())),
        );
        registry.insert(key.clone(), entity.clone());
        drop(registry);

        trace!(factory = %self.config.name, key = %key, "Entity created");
        (entity, true)
    }
}

impl<S, A, B> fmt::Debug for KeyedFactory<S, A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedFactory")
            .field("config", &self.config)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
