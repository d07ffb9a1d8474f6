//! Process-wide logger bootstrap.
//!
//! The logger is a `tracing-subscriber` registry whose level filter sits
//! behind a reload handle. [`Logger`] owns that handle and is the only way to
//! change the active level: every call to [`Logger::apply`] swaps the filter
//! in place, so re-applying never stacks sinks and the last call wins.
//!
//! Output goes to stderr without ANSI colours. An empty level name turns all
//! output off.

use tracing::level_filters::LevelFilter;
use tracing::{Dispatch, Level};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Registry, reload};

use crate::error::LoggingError;

/// The resolved logging configuration.
///
/// `level` is `None` when logging is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoggerConfig {
    /// Most verbose level that is emitted.
    pub level: Option<Level>,
}

impl LoggerConfig {
    /// A configuration that suppresses all output.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { level: None }
    }

    /// Parses a level name.
    ///
    /// Names are case-insensitive. `fatal` and `panic` are accepted as aliases
    /// of `error`, and `warning` as an alias of `warn`. An empty name disables
    /// logging.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::UnknownLevel`] for any other name.
    pub fn from_level_name(name: &str) -> Result<Self, LoggingError> {
        if name.is_empty() {
            return Ok(Self::disabled());
        }

        let level = match name.to_ascii_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" | "warning" => Level::WARN,
            "error" | "fatal" | "panic" => Level::ERROR,
            _ => {
                return Err(LoggingError::UnknownLevel {
                    level: name.to_owned(),
                });
            }
        };
        Ok(Self { level: Some(level) })
    }

    /// Returns whether any output is emitted.
    #[cfg(test)]
    #[must_use]
    pub(crate) const fn is_enabled(&self) -> bool {
        self.level.is_some()
    }

    fn filter(self) -> LevelFilter {
        LevelFilter::from(self.level)
    }
}

/// Handle to the process logging sink.
///
/// Cloning is cheap; clones share the same sink and reload handle.
#[derive(Clone)]
pub struct Logger {
    handle: reload::Handle<LevelFilter, Registry>,
    dispatch: Dispatch,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

impl Logger {
    /// Builds a logger writing to `make_writer`, initially disabled.
    ///
    /// The logger is not installed; use [`Logger::install`] for the process
    /// logger or [`Logger::dispatch`] to scope it in tests.
    pub fn with_writer<W>(make_writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let (filter, handle) = reload::Layer::new(LevelFilter::OFF);
        let subscriber = tracing_subscriber::registry().with(filter).with(
            tracing_subscriber::fmt::layer()
                .with_writer(make_writer)
                .with_ansi(false),
        );

        Self {
            handle,
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Builds a stderr logger and installs it as the global default.
    ///
    /// If a global default is already set (for example by a test harness),
    /// the existing one is kept and the returned logger only controls its
    /// own, uninstalled sink.
    #[must_use]
    pub fn install() -> Self {
        let logger = Self::with_writer(std::io::stderr);
        if tracing::dispatcher::set_global_default(logger.dispatch.clone()).is_err() {
            tracing::debug!("global logger already installed");
        }
        logger
    }

    /// Builds a logger that discards everything.
    #[must_use]
    pub fn discard() -> Self {
        Self::with_writer(std::io::sink)
    }

    /// Replaces the active configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::ReloadFailed`] if the subscriber behind the
    /// handle has been dropped.
    pub fn apply(&self, config: &LoggerConfig) -> Result<(), LoggingError> {
        self.handle
            .reload(config.filter())
            .map_err(|error| LoggingError::ReloadFailed {
                message: error.to_string(),
            })
    }

    /// The level currently in effect.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn current_level(&self) -> Option<LevelFilter> {
        self.handle.clone_current()
    }

    /// The dispatcher backing this logger.
    #[must_use]
    pub const fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }
}
