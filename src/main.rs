//! `infracost` application entry point.
//!
//! Resolves the environment layer of the configuration, builds the network
//! services and hands the command line to the orchestrator, which owns
//! parsing, the remaining configuration layers, command execution and
//! teardown. `eyre` covers failures that happen before the orchestrator
//! exists.

use std::process::ExitCode;
use std::sync::Arc;

use eyre::{Report, Result as EyreResult};
use infracost::api::CommandDispatcher;
use infracost::config::{Config, load_dot_env};
use infracost::events::DashboardReporter;
use infracost::logging::Logger;
use infracost::orchestrator::{Orchestrator, Services, fail_startup, install_fault_hook};
use infracost::ui::Console;
use infracost::update::GitHubReleaseSource;
use mockable::DefaultEnv;

/// Application entry point.
///
/// Configuration errors from the environment layer are printed and reported
/// like command errors and exit with status 1. Failures building the runtime
/// or HTTP clients surface as `eyre` reports.
fn main() -> EyreResult<ExitCode> {
    load_dot_env().map_err(Report::from)?;
    install_fault_hook();

    let logger = Logger::install();
    let env = DefaultEnv::new();
    let mut console = Console::stdio();
    let runtime = tokio::runtime::Runtime::new()?;
    let reporter = Arc::new(DashboardReporter::new().map_err(Report::from)?);

    let mut config = Config::default();
    if let Err(error) = config.load_from_env(&env, &logger) {
        let exit = runtime.block_on(fail_startup(&config, &error, reporter.as_ref(), &mut console));
        return Ok(exit.into());
    }

    let services = Services {
        releases: Arc::new(GitHubReleaseSource::new(config.install_id()).map_err(Report::from)?),
        reporter,
        dispatcher: Arc::new(CommandDispatcher),
    };

    let mut orchestrator = Orchestrator::new(config, env, logger, services);
    let exit = runtime.block_on(orchestrator.run(std::env::args_os(), &mut console));

    Ok(exit.into())
}
