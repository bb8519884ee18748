//! # Factory Configuration
//!
//! [`FactoryConfig`] holds the knobs a factory is built with. It deserializes from any
//! `serde` source, and [`load_config`] layers a TOML file with `KEYED__` environment
//! overrides.

use crate::error::{KeyedError, KeyedErrorExt};
use config::{Config, Environment, File};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_NAME: &str = "keyed";
const DEFAULT_CONFIG_FILE: &str = "keyed";
const ENV_PREFIX: &str = "KEYED";

/// How [`KeyedFactory::assign`](crate::KeyedFactory::assign) treats an entity whose own
/// key differs from the key it is assigned under.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignPolicy {
    /// Install the entity anyway and log a warning. Callers own key consistency.
    #[default]
    Trust,
    /// Reject the assignment with [`KeyedError::KeyMismatch`].
    Verify,
}

/// Settings for a single factory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Name used in tracing fields.
    pub name: String,
    pub assign_policy: AssignPolicy,
    /// Initial registry capacity.
    pub capacity: usize,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self { name: DEFAULT_NAME.to_owned(), assign_policy: AssignPolicy::Trust, capacity: 0 }
    }
}

/// Loads a configuration structure from a file with environment overrides.
///
/// 1. **Base File**: `path`, or `keyed` (any supported extension) in the working
///    directory when `None`. The file is required.
/// 2. **Environment Overrides**: variables prefixed with `KEYED__`, nested with `__`
///    (e.g. `KEYED__FACTORY__ASSIGN_POLICY=verify` maps to `factory.assign_policy`).
///
/// # Errors
/// Returns [`KeyedError::Config`] if the file is missing, a source is malformed, or
/// the merged values do not match `T`.
///
/// # Example
/// ```rust,no_run
/// use keyed::{FactoryConfig, load_config};
///
/// #[derive(serde::Deserialize)]
/// struct ShellConfig {
///     factory: FactoryConfig,
/// }
///
/// let cfg: ShellConfig = load_config(Some("config/keyed.toml"))?;
/// # Ok::<(), keyed::KeyedError>(())
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, KeyedError>
where
    T: DeserializeOwned,
{
    let path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());
    layered(&path, environment())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__").try_parsing(true)
}

fn layered<T>(path: &Path, env: Environment) -> Result<T, KeyedError>
where
    T: DeserializeOwned,
{
    info!("Loading config from {}", path.display());

    Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(env)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = FactoryConfig::default();
        assert_eq!(cfg.name, "keyed");
        assert_eq!(cfg.assign_policy, AssignPolicy::Trust);
        assert_eq!(cfg.capacity, 0);
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let cfg: FactoryConfig =
            serde_json::from_value(serde_json::json!({ "assign_policy": "verify" }))
                .expect("config deserialize");
        assert_eq!(cfg.assign_policy, AssignPolicy::Verify);
        assert_eq!(cfg.name, "keyed");
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let res = serde_json::from_value::<FactoryConfig>(
            serde_json::json!({ "assign_policy": "sometimes" }),
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_environment_overrides_file() {
        #[derive(Deserialize)]
        struct Root {
            factory: FactoryConfig,
        }

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("keyed.toml");
        std::fs::write(&path, "[factory]\nname = \"people\"\ncapacity = 2\n")
            .expect("Failed to write config");

        let vars = [
            ("KEYED__FACTORY__ASSIGN_POLICY", "verify"),
            ("KEYED__FACTORY__CAPACITY", "64"),
            ("OTHER__FACTORY__NAME", "ignored"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();

        let root: Root =
            layered(&path, environment().source(Some(vars))).expect("Config load failed");

        assert_eq!(root.factory.name, "people");
        assert_eq!(root.factory.assign_policy, AssignPolicy::Verify);
        assert_eq!(root.factory.capacity, 64);
    }
}
