use crate::error::LoggerError;
use crate::settings::DEFAULT_MAX_FILES;
use crate::{LevelFilter, Logger};
use sealed::Stage;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

const LOG_EXTENSION: &str = "log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Output selection collected by [`LoggerBuilder`].
#[derive(Debug)]
pub(crate) struct Outputs {
    pub(crate) stderr: bool,
    pub(crate) directory: Option<PathBuf>,
    pub(crate) level: LevelFilter,
    pub(crate) directives: Option<String>,
    pub(crate) rotation: Rotation,
    pub(crate) keep: usize,
    pub(crate) json: bool,
}

impl Default for Outputs {
    fn default() -> Self {
        Self {
            stderr: true,
            directory: None,
            level: LevelFilter::INFO,
            directives: None,
            rotation: Rotation::DAILY,
            keep: DEFAULT_MAX_FILES,
            json: false,
        }
    }
}

impl Outputs {
    fn check(&self, name: &str) -> Result<(), LoggerError> {
        if name.trim().is_empty() {
            return Err(LoggerError::invalid("Logger name cannot be empty"));
        }
        if self.keep == 0 {
            return Err(LoggerError::invalid("max_files must be greater than zero"));
        }
        if !self.stderr && self.directory.is_none() {
            return Err(LoggerError::invalid("No logging output enabled. Enable console or a log path."));
        }
        Ok(())
    }

    fn filter(&self) -> Result<EnvFilter, LoggerError> {
        let filter = EnvFilter::builder().with_default_directive(self.level.into());
        match &self.directives {
            None => Ok(filter.from_env_lossy()),
            Some(directives) => filter
                .parse(directives)
                .map_err(|e| LoggerError::invalid(format!("Invalid env filter '{directives}': {e}"))),
        }
    }

    fn rolling(&self, directory: &Path, prefix: &str) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
        fs::create_dir_all(directory).map_err(|source| LoggerError::Io {
            source,
            context: Some(format!("Failed to create {}", directory.display()).into()),
        })?;

        let appender = RollingFileAppender::builder()
            .rotation(self.rotation.clone())
            .filename_prefix(prefix)
            .filename_suffix(LOG_EXTENSION)
            .max_log_files(self.keep)
            .build(directory)?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let plain = fmt::layer().with_writer(writer).with_ansi(false);
        let layer = if self.json { plain.json().boxed() } else { plain.boxed() };
        Ok((layer, guard))
    }
}

/// Builder stage: no name given yet.
#[derive(Debug)]
pub struct NoName;
/// Builder stage: named, ready to [`LoggerBuilder::init`].
#[derive(Debug)]
pub struct WithName(String);
/// Builder stage: stderr output only.
#[derive(Debug)]
pub struct NoFile;
/// Builder stage: rolling file output configured.
#[derive(Debug)]
pub struct WithFile;

mod sealed {
    pub trait Stage {}
}
impl Stage for NoName {}
impl Stage for WithName {}
impl Stage for NoFile {}
impl Stage for WithFile {}

/// Staged setup for the process-wide subscriber.
///
/// `init` exists only after [`LoggerBuilder::name`]. Rotation, retention and JSON
/// belong to file output and show up after [`LoggerBuilder::path`].
#[derive(Debug)]
pub struct LoggerBuilder<N: Stage = NoName, F: Stage = NoFile> {
    pub(crate) outputs: Outputs,
    name: N,
    stage: PhantomData<F>,
}

impl LoggerBuilder {
    pub(crate) fn new() -> Self {
        Self { outputs: Outputs::default(), name: NoName, stage: PhantomData }
    }
}

impl<F: Stage> LoggerBuilder<NoName, F> {
    /// Names the logger. The name doubles as the log file prefix.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder { outputs: self.outputs, name: WithName(name.into()), stage: PhantomData }
    }
}

impl LoggerBuilder<WithName, WithFile> {
    /// Number of rotated files retained on disk.
    #[must_use = "A logger builder does nothing until `init` is called."]
    pub const fn max_files(mut self, keep: usize) -> Self {
        self.outputs.keep = keep;
        self
    }

    #[must_use = "A logger builder does nothing until `init` is called."]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.outputs.rotation = rotation;
        self
    }

    /// One JSON object per line in the log files. Stderr stays human-readable.
    #[must_use = "A logger builder does nothing until `init` is called."]
    pub const fn json(mut self) -> Self {
        self.outputs.json = true;
        self
    }
}

impl<F: Stage> LoggerBuilder<WithName, F> {
    #[must_use = "A logger builder does nothing until `init` is called."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.outputs.level = level;
        self
    }

    /// Extra directives such as `keyed=trace,keyed_shell=debug`.
    ///
    /// When none are given, `RUST_LOG` is read on top of the level. Directives that
    /// do not parse make [`LoggerBuilder::init`] fail.
    #[must_use = "A logger builder does nothing until `init` is called."]
    pub fn env_filter(mut self, directives: impl Into<String>) -> Self {
        self.outputs.directives = Some(directives.into());
        self
    }

    /// Compact output on stderr. On by default.
    #[must_use = "A logger builder does nothing until `init` is called."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.outputs.stderr = enabled;
        self
    }

    /// Writes rolling log files into `directory`, creating it on `init`.
    pub fn path(self, directory: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut outputs = self.outputs;
        outputs.directory = Some(directory.into());
        LoggerBuilder { outputs, name: self.name, stage: PhantomData }
    }

    /// Installs the subscriber for the whole process.
    ///
    /// The returned [`Logger`] owns the file writer; file output stops when it drops.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for a blank name, `max_files == 0`,
    ///   unparsable directives, or with both stderr and file output disabled.
    /// * [`LoggerError::Io`] or [`LoggerError::Appender`] if the log directory is unusable.
    /// * [`LoggerError::Subscriber`] if the process already has a global subscriber.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Self { outputs, name: WithName(name), .. } = self;
        outputs.check(&name)?;
        let filter = outputs.filter()?;

        let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
        if outputs.stderr {
            layers.push(fmt::layer().compact().with_writer(io::stderr).boxed());
        }

        let guard = match &outputs.directory {
            Some(directory) => {
                let (layer, guard) = outputs.rolling(directory, &name)?;
                layers.push(layer);
                Some(guard)
            },
            None => None,
        };

        tracing_subscriber::registry().with(layers).with(filter).try_init()?;

        Ok(Logger::with_guard(guard))
    }
}
