//! # Logger
//!
//! Global `tracing` subscriber setup for keyed tools.
//!
//! * Console output goes to stderr, so command results on stdout stay clean.
//! * Optional rolling file output (plain or JSON lines) runs on a non-blocking writer.
//! * [`LoggerBuilder::env_filter`] adds directives such as `"keyed=trace"`; without
//!   them `RUST_LOG` is honoured.
//! * [`LoggerSettings`] is the deserializable form used by configuration files.
//!
//! ## Example
//!
//! ```rust
//! use keyed_logger::{LevelFilter, Logger};
//!
//! let _logger = Logger::builder()
//!     .name("keyed")
//!     .console(true)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .expect("subscriber installed");
//! ```

mod builder;
mod error;
mod settings;

pub use crate::builder::{LoggerBuilder, NoFile, NoName, WithFile, WithName};
pub use crate::error::{LoggerError, LoggerErrorExt};
pub use crate::settings::{LoggerSettings, RotationPolicy};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use tracing_appender::non_blocking::WorkerGuard;

/// Handle to the installed subscriber.
///
/// Holds the file writer's worker guard; buffered lines are flushed when it drops.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`].
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub(crate) const fn with_guard(guard: Option<WorkerGuard>) -> Self {
        Self { guard }
    }

    /// Returns `true` when file output is active.
    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}
