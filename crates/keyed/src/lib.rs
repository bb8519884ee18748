//! Keyed entity factories: identity-mapped entities that can be reconfigured in place.
//!
//! A [`KeyedFactory`] owns a private registry of [`Entity`] handles indexed by [`Key`].
//! Asking for the same key twice returns the same entity, while every construction
//! call re-runs the factory's configuration routine against it. Entities leave the
//! registry only through [`Entity::purge`], [`KeyedFactory::purge_all`], or by being
//! superseded through [`KeyedFactory::assign`]; a purged entity is frozen for good.
//!
//! ## Lifecycle
//!
//! ```text
//! absent ──construct/fetch/select──▶ live ⇄ live (reconfigured)
//!                                     │
//!                      purge / assign │ (superseded)
//!                                     ▼
//!                               purged (frozen, readable)
//! ```
//!
//! A key that was purged can be constructed again, but always yields a new entity.
//!
//! ## Examples
//!
//! ```rust
//! use keyed::prelude::*;
//!
//! #[derive(Debug, Default)]
//! struct Session {
//!     user: String,
//!     hits: u32,
//! }
//!
//! let sessions = KeyedFactory::new(|s: &mut Session, user: String| {
//!     s.user = user;
//!     s.hits += 1;
//! });
//!
//! let a = sessions.construct(7, "ada".to_owned());
//! let b = sessions.construct("7", "ada".to_owned());
//! assert_eq!(a, b);
//! assert_eq!(a.read().hits, 2);
//!
//! let all = sessions.select(["7", "8"]);
//! assert_eq!(all[0], a);
//! assert!(sessions.loaded("8"));
//!
//! a.purge();
//! assert!(a.update(|s| s.hits = 0).is_err());
//! assert_eq!(a.read().hits, 2);
//! # Ok::<(), KeyedError>(())
//! ```

mod builder;
pub mod config;
mod entity;
mod error;
mod factory;
mod key;
mod registry;

pub use builder::{FactoryBuilder, NoRoutine, WithRoutine};
pub use config::{AssignPolicy, FactoryConfig, load_config};
pub use entity::{Entity, Keyed};
pub use error::{KeyedError, KeyedErrorExt};
pub use factory::KeyedFactory;
pub use key::Key;

pub mod prelude {
    pub use crate::config::{AssignPolicy, FactoryConfig};
    pub use crate::entity::{Entity, Keyed};
    pub use crate::error::{KeyedError, KeyedErrorExt};
    pub use crate::factory::KeyedFactory;
    pub use crate::key::Key;
}
