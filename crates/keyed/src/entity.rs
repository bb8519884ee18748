//! # Entities
//!
//! An [`Entity`] is a shared handle to keyed state. Clones point at the same object,
//! and equality is identity: two handles are equal only if they refer to the same
//! allocation, regardless of state.
//!
//! Purging an entity evicts it from its registry and freezes it. A frozen entity
//! stays readable forever; every mutating entry point returns
//! [`KeyedError::Purged`].

use crate::error::KeyedError;
use crate::key::Key;
use crate::registry::{Home, SharedRegistry};
use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// The surface every keyed entity exposes, whatever its state.
///
/// Capability traits shared across several keyed types can build on it:
///
/// ```rust
/// use keyed::{Entity, Keyed, KeyedFactory};
///
/// trait Labelled: Keyed {
///     fn label(&self) -> String {
///         format!("#{}", self.key())
///     }
/// }
///
/// impl<S> Labelled for Entity<S> {}
///
/// let users = KeyedFactory::new(|name: &mut String, value: String| *name = value);
/// let ada = users.construct("ada", "Ada".to_owned());
/// assert_eq!(ada.label(), "#ada");
/// ```
pub trait Keyed {
    /// The immutable key assigned at creation.
    fn key(&self) -> &Key;

    /// Whether the entity has been purged and frozen.
    fn is_purged(&self) -> bool;
}

// Lock order: registry, then `home`. `state` is never taken while either is held,
// so a configuration routine may purge or assign through its own factory.
struct EntityInner<S, B> {
    key: Key,
    base: Arc<B>,
    frozen: AtomicBool,
    home: Mutex<Option<Home<S, B>>>,
    state: RwLock<S>,
}

/// A keyed, identity-compared handle to entity state.
///
/// `S` is the per-entity state written by the factory's configuration routine, `B`
/// the capability set shared by all entities of a factory.
pub struct Entity<S, B = ()> {
    inner: Arc<EntityInner<S, B>>,
}

impl<S, B> Clone for Entity<S, B> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<S, B> Entity<S, B> {
    /// Creates a detached entity that belongs to no registry yet.
    ///
    /// Detached entities are meant for [`KeyedFactory::assign`](crate::KeyedFactory::assign).
    /// Their key is not checked against the assignment key unless the factory runs
    /// with [`AssignPolicy::Verify`](crate::AssignPolicy::Verify).
    pub fn new(key: impl Into<Key>, state: S, base: Arc<B>) -> Self {
        Self::linked(key.into(), state, base, None)
    }

    pub(crate) fn linked(key: Key, state: S, base: Arc<B>, home: Option<Home<S, B>>) -> Self {
        Self {
            inner: Arc::new(EntityInner {
                key,
                base,
                frozen: AtomicBool::new(false),
                home: Mutex::new(home),
                state: RwLock::new(state),
            }),
        }
    }

    /// Returns the immutable key.
    #[must_use]
    pub fn key(&self) -> &Key {
        &self.inner.key
    }

    /// Returns the capability set shared with the other entities of the factory.
    #[must_use]
    pub fn base(&self) -> &B {
        &self.inner.base
    }

    /// Returns `true` once [`Entity::purge`] has run.
    #[must_use]
    pub fn is_purged(&self) -> bool {
        self.inner.frozen.load(Ordering::Acquire)
    }

    /// Borrows the state for reading. Reads are allowed after a purge.
    ///
    /// The guard holds a read lock; drop it before calling a mutating method on
    /// the same entity.
    #[must_use]
    pub fn read(&self) -> RwLockReadGuard<'_, S> {
        self.inner.state.read()
    }

    /// Runs `f` against the current state.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.state.read())
    }

    /// Mutates the state in place.
    ///
    /// # Errors
    /// Returns [`KeyedError::Purged`] if the entity is frozen; `f` is not called.
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> Result<R, KeyedError> {
        let mut state = self.inner.state.write();
        if self.is_purged() {
            return Err(self.purged());
        }
        Ok(f(&mut state))
    }

    /// Swaps in a new state and returns the old one.
    ///
    /// # Errors
    /// Returns [`KeyedError::Purged`] if the entity is frozen.
    pub fn replace(&self, state: S) -> Result<S, KeyedError> {
        self.update(|current| std::mem::replace(current, state))
    }

    /// Returns `true` if both handles refer to the same entity.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Evicts the entity from its registry and freezes it permanently.
    ///
    /// The registry entry is removed only if it still points at this entity, so a
    /// stale handle cannot evict the entity that superseded it. Purging twice, or
    /// after the owning factory has been dropped, only (re)applies the freeze.
    ///
    /// The freeze guards [`Entity::update`], [`Entity::replace`] and the factory's
    /// configuration routine. It cannot reach interior mutability inside `S`
    /// (`Cell`, `Mutex`, atomics): such fields stay writable through [`Entity::read`].
    /// A mutation already running when the purge lands is allowed to finish.
    pub fn purge(&self) {
        self.unlink(true);
    }

    /// Removes the entity from the registry slot it occupies, optionally freezing it.
    pub(crate) fn unlink(&self, freeze: bool) {
        loop {
            let home = self.inner.home.lock().clone();
            let Some(registry) = home.as_ref().and_then(Home::upgrade) else {
                self.settle(freeze);
                debug!(key = %self.key(), freeze, "Entity unlinked outside of a registry");
                return;
            };

            let mut guard = registry.write();
            let current = self.inner.home.lock().clone();
            let (Some(home), Some(current)) = (home, current) else {
                continue;
            };
            if !current.same_as(&home) {
                continue;
            }

            let evicted = guard.evict(home.key(), self);
            self.settle(freeze);
            debug!(factory = %guard.name, key = %home.key(), evicted, freeze, "Entity unlinked");
            return;
        }
    }

    /// Returns `true` if the entity is registered somewhere other than `registry`.
    pub(crate) fn lives_outside(&self, registry: &SharedRegistry<S, B>) -> bool {
        self.inner.home.lock().as_ref().is_some_and(|home| !home.is_in(registry))
    }

    /// Marks the entity frozen and drops its registry link.
    ///
    /// Returns `false` if it was already frozen.
    pub(crate) fn freeze(&self) -> bool {
        let mut home = self.inner.home.lock();
        *home = None;
        !self.inner.frozen.swap(true, Ordering::AcqRel)
    }

    fn settle(&self, freeze: bool) {
        if freeze {
            self.freeze();
        } else {
            *self.inner.home.lock() = None;
        }
    }

    /// Records a new registry slot and returns the previous one.
    ///
    /// Frozen entities cannot be re-homed.
    pub(crate) fn rebind(&self, home: Home<S, B>) -> Result<Option<Home<S, B>>, KeyedError> {
        let mut current = self.inner.home.lock();
        if self.is_purged() {
            return Err(self.purged());
        }
        Ok(current.replace(home))
    }

    /// Runs the configuration routine, handing `args` back if the entity is frozen.
    pub(crate) fn configure<A>(&self, routine: &dyn Fn(&mut S, A), args: A) -> Result<(), A> {
        let mut state = self.inner.state.write();
        if self.is_purged() {
            return Err(args);
        }
        routine(&mut state, args);
        Ok(())
    }

    fn purged(&self) -> KeyedError {
        KeyedError::Purged { key: self.inner.key.clone(), context: None }
    }
}

impl<S, B> Keyed for Entity<S, B> {
    fn key(&self) -> &Key {
        Self::key(self)
    }

    fn is_purged(&self) -> bool {
        Self::is_purged(self)
    }
}

impl<S, B> PartialEq for Entity<S, B> {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl<S, B> Eq for Entity<S, B> {}

impl<S, B> Hash for Entity<S, B> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.inner), state);
    }
}

impl<S: fmt::Debug, B> fmt::Debug for Entity<S, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("key", &self.inner.key)
            .field("purged", &self.is_purged())
            .field("state", &*self.inner.state.read())
            .finish()
    }
}
