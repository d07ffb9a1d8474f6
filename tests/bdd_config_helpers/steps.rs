//! Given and When step definitions for configuration layering BDD tests.

use std::collections::HashMap;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use infracost::config::{CREDENTIALS_FILE_NAME, Config, DEFAULT_PRICING_API_ENDPOINT};
use infracost::logging::Logger;
use mockable::MockEnv;
use rstest_bdd_macros::{given, when};

use super::state::{ConfigState, StepResult};

/// Returns the scenario's config directory, creating it on first use.
fn config_dir(config_state: &ConfigState) -> StepResult<Utf8PathBuf> {
    if let Some(path) = config_state.config_dir.get() {
        return Ok(path);
    }
    let tmp = tempfile::tempdir().map_err(|e| format!("should create temp dir: {e}"))?;
    let path = Utf8Path::from_path(tmp.path())
        .ok_or_else(|| String::from("temp dir path should be UTF-8"))?
        .to_owned();
    config_state.temp_dir.set(Arc::new(tmp));
    config_state.config_dir.set(path.clone());
    Ok(path)
}

/// Writes `contents` to `name` inside the scenario's config directory.
fn write_file(config_state: &ConfigState, name: &str, contents: &str) -> StepResult<Utf8PathBuf> {
    let path = config_dir(config_state)?;
    let dir = Dir::open_ambient_dir(&path, ambient_authority())
        .map_err(|e| format!("should open temp dir: {e}"))?;
    dir.write(name, contents)
        .map_err(|e| format!("should write {name}: {e}"))?;
    Ok(path.join(name))
}

/// Builds a `MockEnv` answering from the scenario's variables.
fn scenario_env(config_state: &ConfigState) -> MockEnv {
    let vars: HashMap<String, String> = config_state
        .env_vars
        .get()
        .unwrap_or_default()
        .into_iter()
        .collect();
    let mut env = MockEnv::new();
    env.expect_string()
        .returning(move |key| vars.get(key).cloned());
    env
}

#[given("an empty environment")]
fn empty_environment(config_state: &ConfigState) {
    config_state.env_vars.set(Vec::new());
}

#[given("the environment variable {name} is {value}")]
fn environment_variable(config_state: &ConfigState, name: String, value: String) {
    let mut vars = config_state.env_vars.get().unwrap_or_default();
    vars.push((name, value));
    config_state.env_vars.set(vars);
}

#[given("a stored API key {key} for the default pricing API endpoint")]
fn stored_api_key(config_state: &ConfigState, key: String) -> StepResult<()> {
    write_file(
        config_state,
        CREDENTIALS_FILE_NAME,
        &format!("{DEFAULT_PRICING_API_ENDPOINT}: {key}\n"),
    )?;
    Ok(())
}

#[given("a config file declaring projects {first} and {second}")]
fn config_file_with_projects(
    config_state: &ConfigState,
    first: String,
    second: String,
) -> StepResult<()> {
    let contents = format!("version: 0.1\nprojects:\n  - path: {first}\n  - path: {second}\n");
    let path = write_file(config_state, "infracost.yml", &contents)?;
    config_state.config_file.set(path);
    Ok(())
}

#[given("a config file with version {version}")]
fn config_file_with_version(config_state: &ConfigState, version: String) -> StepResult<()> {
    let contents = format!("version: \"{version}\"\nprojects:\n  - path: infra\n");
    let path = write_file(config_state, "infracost.yml", &contents)?;
    config_state.config_file.set(path);
    Ok(())
}

#[when("the environment layer is loaded")]
fn environment_layer_loaded(config_state: &ConfigState) -> StepResult<()> {
    let mut config = Config {
        config_dir: Some(config_dir(config_state)?),
        ..Config::default()
    };
    let env = scenario_env(config_state);

    match config.load_from_env(&env, &Logger::discard()) {
        Ok(()) => config_state.config.set(config),
        Err(error) => config_state.error.set(error.to_string()),
    }
    Ok(())
}

#[when("the config file is loaded")]
fn config_file_loaded(config_state: &ConfigState) -> StepResult<()> {
    if config_state.error.get().is_some() {
        return Ok(());
    }
    let mut config = config_state
        .config
        .get()
        .ok_or_else(|| String::from("environment layer should be loaded first"))?;
    let path = config_state
        .config_file
        .get()
        .ok_or_else(|| String::from("a config file should be configured"))?;
    let env = scenario_env(config_state);

    match config.load_from_config_file(&path, &env, &Logger::discard()) {
        Ok(()) => config_state.config.set(config),
        Err(error) => config_state.error.set(error.to_string()),
    }
    Ok(())
}
