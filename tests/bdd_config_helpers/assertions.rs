//! Then step definitions for configuration layering BDD tests.

use infracost::config::Config;
use rstest_bdd_macros::then;

use super::state::{ConfigState, StepResult};

fn loaded_config(config_state: &ConfigState) -> StepResult<Config> {
    if let Some(error) = config_state.error.get() {
        return Err(format!("expected configuration, got error: {error}"));
    }
    config_state
        .config
        .get()
        .ok_or_else(|| String::from("configuration should be loaded"))
}

#[then("loading succeeds")]
fn loading_succeeds(config_state: &ConfigState) -> StepResult<()> {
    loaded_config(config_state).map(|_| ())
}

#[then("loading fails mentioning {text}")]
fn loading_fails_mentioning(config_state: &ConfigState, text: String) -> StepResult<()> {
    let error = config_state
        .error
        .get()
        .ok_or_else(|| String::from("expected loading to fail"))?;
    if error.contains(&text) {
        Ok(())
    } else {
        Err(format!("expected error mentioning '{text}', got: {error}"))
    }
}

#[then("the default pricing API endpoint is in use")]
fn default_endpoint_in_use(config_state: &ConfigState) -> StepResult<()> {
    let config = loaded_config(config_state)?;
    if config.is_default_pricing_api_endpoint() {
        Ok(())
    } else {
        Err(format!(
            "expected the default endpoint, got {}",
            config.pricing_api_endpoint
        ))
    }
}

#[then("the default pricing API endpoint is not in use")]
fn default_endpoint_not_in_use(config_state: &ConfigState) -> StepResult<()> {
    let config = loaded_config(config_state)?;
    if config.is_default_pricing_api_endpoint() {
        Err(String::from("expected a custom pricing endpoint"))
    } else {
        Ok(())
    }
}

#[then("the pricing API endpoint is {endpoint}")]
fn pricing_endpoint_is(config_state: &ConfigState, endpoint: String) -> StepResult<()> {
    let config = loaded_config(config_state)?;
    if config.pricing_api_endpoint == endpoint {
        Ok(())
    } else {
        Err(format!(
            "expected endpoint {endpoint}, got {}",
            config.pricing_api_endpoint
        ))
    }
}

#[then("there is a single project at the working directory")]
fn single_default_project(config_state: &ConfigState) -> StepResult<()> {
    let config = loaded_config(config_state)?;
    match config.projects.as_slice() {
        [project] if project.path.as_str().is_empty() => Ok(()),
        projects => Err(format!("expected one default project, got {projects:?}")),
    }
}

#[then("an install id has been persisted")]
fn install_id_persisted(config_state: &ConfigState) -> StepResult<()> {
    let config = loaded_config(config_state)?;
    let install_id = config
        .install_id()
        .ok_or_else(|| String::from("install id should be set"))?;
    if config.environment.install_id.as_deref() == Some(install_id) {
        Ok(())
    } else {
        Err(String::from("environment should carry the install id"))
    }
}

#[then("the API key is {key}")]
fn api_key_is(config_state: &ConfigState, key: String) -> StepResult<()> {
    let config = loaded_config(config_state)?;
    if config.api_key.as_deref() == Some(key.as_str()) {
        Ok(())
    } else {
        Err(format!("expected API key {key}, got {:?}", config.api_key))
    }
}

#[then("the projects are {first} and {second}")]
fn projects_are(config_state: &ConfigState, first: String, second: String) -> StepResult<()> {
    let config = loaded_config(config_state)?;
    let paths: Vec<&str> = config
        .projects
        .iter()
        .map(|project| project.path.as_str())
        .collect();
    if paths == [first.as_str(), second.as_str()] {
        Ok(())
    } else {
        Err(format!("expected projects [{first}, {second}], got {paths:?}"))
    }
}

#[then("the environment records a config file")]
fn environment_records_config_file(config_state: &ConfigState) -> StepResult<()> {
    let config = loaded_config(config_state)?;
    if config.environment.has_config_file {
        Ok(())
    } else {
        Err(String::from("expected has_config_file to be set"))
    }
}

#[then("every project uses workspace {workspace}")]
fn every_project_uses_workspace(config_state: &ConfigState, workspace: String) -> StepResult<()> {
    let config = loaded_config(config_state)?;
    let mismatched: Vec<_> = config
        .projects
        .iter()
        .filter(|project| project.terraform_workspace.as_deref() != Some(workspace.as_str()))
        .map(|project| project.path.as_str())
        .collect();
    if mismatched.is_empty() {
        Ok(())
    } else {
        Err(format!("projects without workspace {workspace}: {mismatched:?}"))
    }
}
