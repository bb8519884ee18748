use crate::config::{AssignPolicy, FactoryConfig};
use crate::factory::{KeyedFactory, Routine};
use crate::registry::Registry;
use private::Sealed;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Builder state before a configuration routine is attached.
#[derive(Debug, Default)]
pub struct NoRoutine;

/// Builder state holding the configuration routine.
pub struct WithRoutine<S, A>(Arc<Routine<S, A>>);

impl<S, A> fmt::Debug for WithRoutine<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WithRoutine(..)")
    }
}

mod private {
    pub trait Sealed {}
}
impl Sealed for NoRoutine {}
impl<S, A> Sealed for WithRoutine<S, A> {}

/// A builder for [`KeyedFactory`].
///
/// The configuration routine is mandatory and must be attached with
/// [`FactoryBuilder::configure`] before [`FactoryBuilder::build`] becomes available.
/// Everything else has a default.
///
/// # Example
/// ```rust
/// use keyed::{AssignPolicy, KeyedFactory};
/// use std::sync::Arc;
///
/// #[derive(Debug)]
/// struct Directory {
///     domain: &'static str,
/// }
///
/// #[derive(Debug, Default)]
/// struct Contact {
///     email: String,
/// }
///
/// let contacts = KeyedFactory::builder()
///     .name("contacts")
///     .assign_policy(AssignPolicy::Verify)
///     .base(Arc::new(Directory { domain: "example.org" }))
///     .configure(|contact: &mut Contact, user: &str| contact.email = user.to_owned())
///     .build();
///
/// let ada = contacts.construct("ada", "ada");
/// assert_eq!(format!("{}@{}", ada.read().email, ada.base().domain), "ada@example.org");
/// ```
#[allow(private_bounds)]
pub struct FactoryBuilder<S, A, B = (), R: Sealed = NoRoutine> {
    config: FactoryConfig,
    base: Arc<B>,
    routine: R,
    _entity: PhantomData<fn(&mut S, A)>,
}

impl<S, A, B: Default> Default for FactoryBuilder<S, A, B> {
    fn default() -> Self {
        Self {
            config: FactoryConfig::default(),
            base: Arc::new(B::default()),
            routine: NoRoutine,
            _entity: PhantomData,
        }
    }
}

impl<S, A, B> FactoryBuilder<S, A, B> {
    /// Attaches the configuration routine.
    ///
    /// The routine runs on every construction call, first sight or not, with the
    /// arguments passed after the key.
    #[must_use = "The builder must be built before it can be used"]
    pub fn configure<F>(self, routine: F) -> FactoryBuilder<S, A, B, WithRoutine<S, A>>
    where
        F: Fn(&mut S, A) + Send + Sync + 'static,
    {
        FactoryBuilder {
            config: self.config,
            base: self.base,
            routine: WithRoutine(Arc::new(routine)),
            _entity: PhantomData,
        }
    }
}

#[allow(private_bounds)]
impl<S, A, B, R: Sealed> FactoryBuilder<S, A, B, R> {
    /// Sets the capability set shared by every entity of the factory.
    ///
    /// Pass the same `Arc` to several builders to share one base across keyed types.
    #[must_use = "The builder must be built before it can be used"]
    pub fn base<C>(self, base: Arc<C>) -> FactoryBuilder<S, A, C, R> {
        FactoryBuilder { config: self.config, base, routine: self.routine, _entity: PhantomData }
    }

    /// Sets the factory name used in tracing fields.
    #[must_use = "The builder must be built before it can be used"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Sets how `assign` treats mismatched keys.
    #[must_use = "The builder must be built before it can be used"]
    pub const fn assign_policy(mut self, policy: AssignPolicy) -> Self {
        self.config.assign_policy = policy;
        self
    }

    /// Reserves room for `capacity` entities up front.
    #[must_use = "The builder must be built before it can be used"]
    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Replaces every configurable setting at once, e.g. with a loaded [`FactoryConfig`].
    #[must_use = "The builder must be built before it can be used"]
    pub fn config(mut self, config: FactoryConfig) -> Self {
        self.config = config;
        self
    }
}

impl<S, A, B> FactoryBuilder<S, A, B, WithRoutine<S, A>> {
    /// Finalizes the factory with a fresh, empty registry.
    #[must_use]
    pub fn build(self) -> KeyedFactory<S, A, B> {
        let registry = Registry::shared(Arc::from(self.config.name.as_str()), self.config.capacity);
        KeyedFactory::from_parts(registry, self.routine.0, self.base, self.config)
    }
}

#[allow(private_bounds)]
impl<S, A, B, R: Sealed + fmt::Debug> fmt::Debug for FactoryBuilder<S, A, B, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryBuilder")
            .field("config", &self.config)
            .field("routine", &self.routine)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_initial_state() {
        let builder = FactoryBuilder::<u32, u32>::default();
        assert_eq!(builder.config, FactoryConfig::default());
    }

    #[test]
    fn test_builder_configuration() {
        let builder = FactoryBuilder::<u32, u32>::default()
            .name("counters")
            .assign_policy(AssignPolicy::Verify)
            .capacity(16)
            .configure(|n, v| *n = v);

        assert_eq!(builder.config.name, "counters");
        assert_eq!(builder.config.assign_policy, AssignPolicy::Verify);
        assert_eq!(builder.config.capacity, 16);
    }

    #[test]
    fn test_config_replaces_individual_settings() {
        let loaded = FactoryConfig {
            name: "loaded".to_owned(),
            assign_policy: AssignPolicy::Verify,
            capacity: 4,
        };
        let builder = FactoryBuilder::<u32, u32>::default().name("ignored").config(loaded.clone());
        assert_eq!(builder.config, loaded);
    }

    #[test]
    fn test_base_swaps_capability_type() {
        let factory = FactoryBuilder::<u32, u32>::default()
            .base(Arc::new("shared"))
            .configure(|n, v| *n = v)
            .build();
        assert_eq!(*factory.construct(1, 5).base(), "shared");
    }
}
