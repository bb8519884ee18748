use keyed::{FactoryConfig, load_config};
use keyed_logger::LoggerSettings;
use serde::Deserialize;
use std::path::Path;

/// Everything the shell reads from its configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub factory: FactoryConfig,
    pub logger: LoggerSettings,
}

impl ShellConfig {
    /// Loads `path` with `KEYED__` environment overrides, or falls back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Ok(match path {
            Some(path) => load_config(Some(path))?,
            None => Self::default(),
        })
    }
}
