//! Semantic error types for the infracost application.
//!
//! This module defines the error hierarchy for infracost, following the principle
//! of using semantic error enums (via `thiserror`) for conditions the caller might
//! inspect or report, while reserving opaque errors (`eyre::Report`) for the
//! application boundary.
//!
//! Two families never reach [`InfracostError`]: [`UpdateError`] and
//! [`EventsError`] belong to background services whose failures are logged at
//! debug level and otherwise swallowed.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while resolving configuration from files, the environment,
/// or command-line flags.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file path was supplied but nothing exists there.
    #[error("config file does not exist at {path}")]
    FileNotFound {
        /// The path that was supplied.
        path: Utf8PathBuf,
    },

    /// The configuration file could not be read or parsed.
    #[error("error parsing config file {path}: {message}")]
    FileParse {
        /// The configuration file path.
        path: Utf8PathBuf,
        /// A description of the parse failure.
        message: String,
    },

    /// The configuration file declares a version this build does not understand.
    #[error("config file {path} has unsupported version '{version}'")]
    UnsupportedVersion {
        /// The configuration file path.
        path: Utf8PathBuf,
        /// The declared version.
        version: String,
    },

    /// The configuration file declares no projects.
    #[error("config file {path} does not define any projects")]
    NoProjects {
        /// The configuration file path.
        path: Utf8PathBuf,
    },

    /// A recognised environment variable holds a value of the wrong type.
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvValue {
        /// The offending environment variable.
        var: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Flags that cannot be combined were set together.
    #[error("--config-file flag cannot be used with the following flags: {flags}")]
    ConflictingFlags {
        /// The conflicting flags, comma separated.
        flags: String,
    },

    /// A developer dotenv override file exists but could not be loaded.
    #[error("failed to load environment overrides from {path}: {message}")]
    DotEnv {
        /// The dotenv file path.
        path: Utf8PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// No per-user configuration directory could be determined.
    #[error("could not determine the infracost config directory; set INFRACOST_CONFIG_DIR")]
    NoConfigDirectory,
}

/// Errors raised while configuring the process-wide logger.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log level name is not recognised.
    #[error(
        "unknown log level '{level}' (expected one of trace, debug, info, warn, error, fatal, panic)"
    )]
    UnknownLevel {
        /// The rejected level name.
        level: String,
    },

    /// The active subscriber could not be reconfigured.
    #[error("failed to reconfigure logger: {message}")]
    ReloadFailed {
        /// A description of the failure.
        message: String,
    },
}

/// Errors raised while loading or creating the persisted installation state.
#[derive(Debug, Error)]
pub enum StateError {
    /// The state file exists but could not be read.
    #[error("failed to read state file {path}: {message}")]
    Unreadable {
        /// The state file path.
        path: Utf8PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// The state file exists but does not contain a valid record.
    #[error("state file {path} is corrupt: {message}")]
    Corrupt {
        /// The state file path.
        path: Utf8PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// A freshly generated state record could not be persisted.
    #[error("failed to write state file {path}: {message}")]
    WriteFailed {
        /// The state file path.
        path: Utf8PathBuf,
        /// A description of the failure.
        message: String,
    },
}

/// Errors raised while loading stored API credentials.
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// The credentials file exists but could not be read.
    #[error("failed to read credentials file {path}: {message}")]
    Unreadable {
        /// The credentials file path.
        path: Utf8PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// The credentials file exists but is not a valid credentials document.
    #[error("credentials file {path} is corrupt: {message}")]
    Corrupt {
        /// The credentials file path.
        path: Utf8PathBuf,
        /// A description of the failure.
        message: String,
    },
}

/// A command failure carrying a short label used for error-category telemetry.
///
/// The label is reported in place of the human-readable message so that
/// reports can be grouped without leaking user-specific detail.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct EventError {
    /// Machine-readable category label.
    pub label: String,
    /// Human-readable message shown to the user.
    pub message: String,
}

impl EventError {
    /// Creates a labeled event error.
    #[must_use]
    pub fn new(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while running a subcommand.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command line could not be parsed.
    #[error("{message}")]
    Usage {
        /// The rendered parser error.
        message: String,
    },

    /// Command output could not be written.
    #[error("failed to write command output: {message}")]
    Output {
        /// A description of the I/O failure.
        message: String,
    },
}

impl From<std::io::Error> for CommandError {
    fn from(error: std::io::Error) -> Self {
        Self::Output {
            message: error.to_string(),
        }
    }
}

/// Errors raised by the background update check.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The release service could not be reached or answered with an error.
    #[error("failed to query latest release: {message}")]
    RequestFailed {
        /// A description of the failure.
        message: String,
    },

    /// A version string could not be parsed as a semantic version.
    #[error("invalid version '{version}': {message}")]
    InvalidVersion {
        /// The rejected version string.
        version: String,
        /// A description of the parse failure.
        message: String,
    },
}

/// Errors raised while sending an error-event report.
#[derive(Debug, Error)]
pub enum EventsError {
    /// The report could not be delivered.
    #[error("unable to send report: {message}")]
    SendFailed {
        /// A description of the failure.
        message: String,
    },
}

/// Top-level error type for the infracost application.
///
/// This enum aggregates all domain-specific errors into a single type that can
/// be used throughout the application. At the application boundary (main.rs),
/// these errors are converted to `eyre::Report` for human-readable reporting.
#[derive(Debug, Error)]
pub enum InfracostError {
    /// An error occurred while resolving configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred while configuring logging.
    #[error(transparent)]
    Logging(#[from] LoggingError),

    /// An error occurred while loading installation state.
    #[error(transparent)]
    State(#[from] StateError),

    /// An error occurred while loading credentials.
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    /// A labeled command failure.
    #[error(transparent)]
    Event(#[from] EventError),

    /// A command failed.
    #[error(transparent)]
    Command(#[from] CommandError),
}

impl InfracostError {
    /// Returns the telemetry label when this is a labeled event error.
    #[must_use]
    pub fn event_label(&self) -> Option<&str> {
        match self {
            Self::Event(event) => Some(event.label.as_str()),
            _ => None,
        }
    }
}

/// A specialised `Result` type for infracost operations.
pub type Result<T> = std::result::Result<T, InfracostError>;
