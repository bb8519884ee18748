use crate::builder::{LoggerBuilder, WithName};
use crate::error::LoggerError;
use crate::{LevelFilter, Logger};
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::rolling::Rotation;

pub(crate) const DEFAULT_MAX_FILES: usize = 10;

/// How often the rolling file appender starts a new file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationPolicy {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<RotationPolicy> for Rotation {
    fn from(policy: RotationPolicy) -> Self {
        match policy {
            RotationPolicy::Minutely => Self::MINUTELY,
            RotationPolicy::Hourly => Self::HOURLY,
            RotationPolicy::Daily => Self::DAILY,
            RotationPolicy::Never => Self::NEVER,
        }
    }
}

/// Logger settings as they appear in a configuration file under `[logger]`.
///
/// ```toml
/// [logger]
/// level = "debug"
/// filter = "keyed=trace"
/// directory = "logs"
/// rotation = "hourly"
/// json = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerSettings {
    pub name: String,
    pub console: bool,
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
    pub filter: Option<String>,
    /// Enables rolling file output when set.
    pub directory: Option<PathBuf>,
    pub rotation: RotationPolicy,
    pub max_files: usize,
    pub json: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            name: "keyed".to_owned(),
            console: true,
            level: "info".to_owned(),
            filter: None,
            directory: None,
            rotation: RotationPolicy::Daily,
            max_files: DEFAULT_MAX_FILES,
            json: false,
        }
    }
}

impl LoggerSettings {
    /// Parses the configured level.
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidConfiguration`] for an unknown level name.
    pub fn level_filter(&self) -> Result<LevelFilter, LoggerError> {
        LevelFilter::from_str(&self.level)
            .map_err(|_| LoggerError::invalid(format!("Unknown log level '{}'", self.level)))
    }

    /// Installs the global subscriber described by these settings.
    ///
    /// # Errors
    /// Same as [`LoggerBuilder::init`], plus an error for an unknown level name.
    pub fn init(&self) -> Result<Logger, LoggerError> {
        let builder = self.apply(Logger::builder().name(&self.name))?;

        match &self.directory {
            Some(directory) => {
                let builder = builder
                    .path(directory)
                    .rotation(self.rotation.into())
                    .max_files(self.max_files);
                if self.json { builder.json().init() } else { builder.init() }
            },
            None => builder.init(),
        }
    }

    fn apply(&self, builder: LoggerBuilder<WithName>) -> Result<LoggerBuilder<WithName>, LoggerError> {
        let builder = builder.console(self.console).level(self.level_filter()?);
        Ok(match &self.filter {
            Some(filter) => builder.env_filter(filter),
            None => builder,
        })
    }
}
