//! Scenario state for configuration layering BDD tests.

use std::sync::Arc;

use camino::Utf8PathBuf;
use infracost::config::Config;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use tempfile::TempDir;

/// Convenience alias for step outcomes.
pub type StepResult<T> = Result<T, String>;

/// State shared across configuration layering scenarios.
#[derive(ScenarioState)]
pub struct ConfigState {
    /// Temporary directory standing in for the user config directory.
    pub(crate) temp_dir: Slot<Arc<TempDir>>,
    /// UTF-8 path of `temp_dir`.
    pub(crate) config_dir: Slot<Utf8PathBuf>,
    /// Environment variables visible to the loader.
    pub(crate) env_vars: Slot<Vec<(String, String)>>,
    /// Config file passed to the file layer, if any.
    pub(crate) config_file: Slot<Utf8PathBuf>,
    /// Configuration after the most recent successful layer.
    pub(crate) config: Slot<Config>,
    /// `Display` text of the first layer that failed.
    pub(crate) error: Slot<String>,
}

#[expect(
    clippy::derivable_impls,
    reason = "ScenarioState guidance discourages deriving Default in this module"
)]
impl Default for ConfigState {
    fn default() -> Self {
        Self {
            temp_dir: Slot::default(),
            config_dir: Slot::default(),
            env_vars: Slot::default(),
            config_file: Slot::default(),
            config: Slot::default(),
            error: Slot::default(),
        }
    }
}

/// Fixture providing fresh state for each configuration scenario.
#[rstest::fixture]
pub fn config_state() -> ConfigState {
    ConfigState::default()
}
