//! Stored API credentials.

use std::collections::BTreeMap;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::{Deserialize, Serialize};

use crate::error::CredentialsError;

/// File name of the credentials document inside the config directory.
pub const CREDENTIALS_FILE_NAME: &str = "credentials.yml";

/// API keys keyed by pricing API endpoint.
///
/// The document is written by the registration flow. A missing file simply
/// means no key has been stored yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Credentials {
    api_keys: BTreeMap<String, String>,
}

impl Credentials {
    /// Creates credentials from an endpoint-to-key map.
    #[must_use]
    pub const fn new(api_keys: BTreeMap<String, String>) -> Self {
        Self { api_keys }
    }

    /// Returns the stored API key for `endpoint`, if any.
    #[must_use]
    pub fn api_key_for(&self, endpoint: &str) -> Option<&str> {
        self.api_keys
            .get(endpoint)
            .map(String::as_str)
            .filter(|key| !key.is_empty())
    }

    /// Returns whether no keys are stored.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.api_keys.is_empty()
    }

    /// Loads credentials from `config_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError::Unreadable`] if the file exists but cannot
    /// be read and [`CredentialsError::Corrupt`] if it is not a valid
    /// credentials document.
    pub fn load(config_dir: &Utf8Path) -> Result<Self, CredentialsError> {
        let path = config_dir.join(CREDENTIALS_FILE_NAME);

        let dir = match Dir::open_ambient_dir(config_dir, ambient_authority()) {
            Ok(dir) => dir,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(CredentialsError::Unreadable {
                    path,
                    message: error.to_string(),
                });
            }
        };

        let contents = match dir.read_to_string(CREDENTIALS_FILE_NAME) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(CredentialsError::Unreadable {
                    path,
                    message: error.to_string(),
                });
            }
        };

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&contents).map_err(|error| CredentialsError::Corrupt {
            path,
            message: error.to_string(),
        })
    }
}
