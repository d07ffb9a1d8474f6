//! Scenario state for orchestration behavioural tests.

use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

/// What a finished invocation left behind.
#[derive(Debug, Clone)]
pub(crate) struct RunRecord {
    /// Process exit code.
    pub(crate) exit_code: u8,
    /// Everything written to the command output stream.
    pub(crate) out: String,
    /// Everything written to the diagnostic stream.
    pub(crate) err: String,
    /// Values of the error-event reports that were sent.
    pub(crate) reports: Vec<String>,
}

#[derive(Default, ScenarioState)]
pub(crate) struct OrchestrationState {
    pub(crate) api_key: Slot<Option<String>>,
    pub(crate) latest_release: Slot<String>,
    pub(crate) env_vars: Slot<Vec<(String, String)>>,
    pub(crate) record: Slot<RunRecord>,
}

#[fixture]
pub(crate) fn orchestration_state() -> OrchestrationState {
    let state = OrchestrationState::default();
    state.api_key.set(None);
    state
}
