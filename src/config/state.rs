//! Persisted installation state.
//!
//! The state file holds the installation identifier that correlates
//! anonymous telemetry across invocations. It is created on first run and
//! only ever read afterwards: the identifier is never regenerated once
//! written.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StateError;

/// File name of the state record inside the config directory.
pub const STATE_FILE_NAME: &str = ".state.json";

/// The durable installation record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    /// Stable, globally unique installation identifier.
    pub install_id: String,
}

impl State {
    /// Creates a record with a freshly generated identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            install_id: Uuid::new_v4().to_string(),
        }
    }

    /// Loads the state record from `config_dir`, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Unreadable`] if the directory or file cannot be
    /// read, [`StateError::Corrupt`] if the file exists but does not hold a
    /// valid record, and [`StateError::WriteFailed`] if a new record cannot be
    /// persisted.
    pub fn load_or_create(config_dir: &Utf8Path) -> Result<Self, StateError> {
        let path = config_dir.join(STATE_FILE_NAME);

        Dir::create_ambient_dir_all(config_dir, ambient_authority()).map_err(|error| {
            StateError::WriteFailed {
                path: path.clone(),
                message: format!("failed to create {config_dir}: {error}"),
            }
        })?;
        let dir = Dir::open_ambient_dir(config_dir, ambient_authority()).map_err(|error| {
            StateError::Unreadable {
                path: path.clone(),
                message: format!("failed to open {config_dir}: {error}"),
            }
        })?;

        match dir.read_to_string(STATE_FILE_NAME) {
            Ok(contents) => {
                let state: Self =
                    serde_json::from_str(&contents).map_err(|error| StateError::Corrupt {
                        path: path.clone(),
                        message: error.to_string(),
                    })?;
                if state.install_id.trim().is_empty() {
                    return Err(StateError::Corrupt {
                        path,
                        message: String::from("installId is empty"),
                    });
                }
                Ok(state)
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                let state = Self::generate();
                let contents =
                    serde_json::to_string_pretty(&state).map_err(|err| StateError::WriteFailed {
                        path: path.clone(),
                        message: err.to_string(),
                    })?;
                dir.write(STATE_FILE_NAME, contents)
                    .map_err(|err| StateError::WriteFailed {
                        path: path.clone(),
                        message: err.to_string(),
                    })?;
                tracing::debug!(%path, "created installation state");
                Ok(state)
            }
            Err(error) => Err(StateError::Unreadable {
                path,
                message: error.to_string(),
            }),
        }
    }
}
