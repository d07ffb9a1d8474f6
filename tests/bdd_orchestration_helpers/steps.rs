//! Given/when steps for orchestration scenarios.

use std::sync::Arc;

use infracost::api::CommandDispatcher;
use infracost::config::Config;
use infracost::logging::Logger;
use infracost::orchestrator::{Orchestrator, Services};
use infracost::ui::Console;
use mockable::MockEnv;
use rstest_bdd_macros::{given, when};

use super::StepResult;
use super::services::{Captured, FixedRelease, RecordingReporter};
use super::state::{OrchestrationState, RunRecord};

const RUNNING_VERSION: &str = "0.8.2";

#[given("an API key is configured")]
fn api_key_configured(orchestration_state: &OrchestrationState) {
    orchestration_state
        .api_key
        .set(Some(String::from("ico-test-key")));
}

#[given("no API key is configured")]
fn no_api_key(orchestration_state: &OrchestrationState) {
    orchestration_state.api_key.set(None);
}

#[given("a newer release {tag} is published")]
fn newer_release(orchestration_state: &OrchestrationState, tag: String) {
    orchestration_state.latest_release.set(tag);
}

#[given("the environment sets {name} to {value}")]
fn environment_sets(orchestration_state: &OrchestrationState, name: String, value: String) {
    let mut vars = orchestration_state.env_vars.get().unwrap_or_default();
    vars.push((name, value));
    orchestration_state.env_vars.set(vars);
}

#[when("infracost is run with {command}")]
fn infracost_is_run(orchestration_state: &OrchestrationState, command: String) -> StepResult<()> {
    let latest_release = orchestration_state.latest_release.get();
    let config = Config {
        api_key: orchestration_state.api_key.get().flatten(),
        version: String::from(RUNNING_VERSION),
        no_color: true,
        skip_update_check: latest_release.is_none(),
        ..Config::default()
    };

    let reporter = RecordingReporter::default();
    let services = Services {
        releases: Arc::new(FixedRelease {
            tag: latest_release,
        }),
        reporter: Arc::new(reporter.clone()),
        dispatcher: Arc::new(CommandDispatcher),
    };

    let vars = orchestration_state.env_vars.get().unwrap_or_default();
    let mut env = MockEnv::new();
    env.expect_string().returning(move |key| {
        vars.iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
    });

    let out = Captured::default();
    let err = Captured::default();
    let mut console = Console::new(out.clone(), err.clone());

    let args: Vec<String> = std::iter::once(String::from("infracost"))
        .chain(command.split_whitespace().map(String::from))
        .collect();

    let runtime =
        tokio::runtime::Runtime::new().map_err(|e| format!("failed to create runtime: {e}"))?;
    let mut orchestrator = Orchestrator::new(config, env, Logger::discard(), services);
    let exit = runtime.block_on(orchestrator.run(args, &mut console));

    orchestration_state.record.set(RunRecord {
        exit_code: exit.code(),
        out: out.text(),
        err: err.text(),
        reports: reporter.values(),
    });
    Ok(())
}
