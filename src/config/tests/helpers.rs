//! Shared fixtures and helper functions for config tests.

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use mockable::MockEnv;
use rstest::fixture;
use tempfile::TempDir;

use crate::config::Config;
use crate::logging::Logger;

/// A temporary config directory plus its UTF-8 path.
pub struct ConfigDir {
    _temp: TempDir,
    pub path: Utf8PathBuf,
}

impl ConfigDir {
    /// Writes `contents` to `name` inside the directory and returns its path.
    pub fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path.join(name);
        std::fs::write(&path, contents).expect("writing test file should succeed");
        path
    }
}

/// Fixture providing an empty temporary config directory.
#[fixture]
pub fn config_dir() -> ConfigDir {
    let temp = TempDir::new().expect("temp dir creation should succeed");
    let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
        .expect("temp dir path should be UTF-8");
    ConfigDir { _temp: temp, path }
}

/// Fixture providing a logger that discards its output.
#[fixture]
pub fn logger() -> Logger {
    Logger::discard()
}

/// Creates a `MockEnv` answering from the given variable mappings.
pub fn mock_env(vars: &[(&str, &str)]) -> MockEnv {
    let mappings: HashMap<String, String> = vars
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();
    let mut env = MockEnv::new();
    env.expect_string()
        .returning(move |key| mappings.get(key).cloned());
    env
}

/// Creates a `MockEnv` with no variables set.
pub fn empty_env() -> MockEnv {
    mock_env(&[])
}

/// Creates a default `Config` whose state and credentials live in `dir`.
pub fn config_in(dir: &Utf8Path) -> Config {
    Config {
        config_dir: Some(dir.to_owned()),
        ..Config::default()
    }
}
