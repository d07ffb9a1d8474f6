//! Command orchestration around a single invocation.
//!
//! [`Orchestrator::run`] owns the whole lifetime of one command:
//!
//! 1. start the background update check;
//! 2. parse the command line and apply the per-command layers (config file,
//!    project flags, global flags) on top of the environment-resolved
//!    [`Config`];
//! 3. run the selected command under fault supervision;
//! 4. tear down exactly once, whatever happened: report an error or fault,
//!    drain the update check, print the upgrade notice, choose the exit code.

mod fault;

use std::ffi::OsString;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches};

pub use fault::{Fault, install_fault_hook, supervise};

use crate::api::Dispatch;
use crate::config::{
    Cli, Commands, Config, FlagOverrides, check_root_flags, explicit_flag_names,
};
use crate::error::{CommandError, InfracostError, Result};
use crate::events::{EventReport, EventReporter, REPORT_TIMEOUT, send_report};
use crate::logging::Logger;
use crate::ui::{Console, indent, strip_color};
use crate::update::{DRAIN_TIMEOUT, PendingUpdate, ReleaseSource, UpdateRequest, start_update_check};

const DEPRECATION_RULE: &str =
    "────────────────────────────────────────────────────────────────────────";

/// Process exit status chosen by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The command succeeded.
    Success,
    /// The command returned an error or raised a fault.
    Failure,
}

impl Exit {
    /// The numeric exit code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        Self::from(exit.code())
    }
}

/// External collaborators used during a run.
#[derive(Clone)]
pub struct Services {
    /// Source of the latest published release.
    pub releases: Arc<dyn ReleaseSource>,
    /// Destination for error-event reports.
    pub reporter: Arc<dyn EventReporter>,
    /// Runs the selected command body.
    pub dispatcher: Arc<dyn Dispatch>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

/// Drives one invocation from argument parsing to exit code.
pub struct Orchestrator<E: mockable::Env> {
    config: Config,
    env: E,
    logger: Logger,
    services: Services,
    drain_timeout: Duration,
    report_timeout: Duration,
}

impl<E: mockable::Env> std::fmt::Debug for Orchestrator<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("drain_timeout", &self.drain_timeout)
            .finish_non_exhaustive()
    }
}

impl<E: mockable::Env> Orchestrator<E> {
    /// Creates an orchestrator over an environment-resolved configuration.
    ///
    /// `env` and `logger` must be the ones the configuration was resolved
    /// with, since a config file re-applies the environment layer.
    #[must_use]
    pub const fn new(config: Config, env: E, logger: Logger, services: Services) -> Self {
        Self {
            config,
            env,
            logger,
            services,
            drain_timeout: DRAIN_TIMEOUT,
            report_timeout: REPORT_TIMEOUT,
        }
    }

    /// Overrides how long teardown waits for the update check.
    #[must_use]
    pub const fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// The configuration as resolved so far.
    #[cfg(test)]
    #[must_use]
    pub(crate) const fn config(&self) -> &Config {
        &self.config
    }

    /// Runs one invocation and returns the exit status.
    ///
    /// `args` includes the program name. Must be called from within a Tokio
    /// runtime.
    pub async fn run<I, T>(&mut self, args: I, console: &mut Console) -> Exit
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        install_fault_hook();
        console.set_color(!self.config.no_color);

        let pending = start_update_check(
            Arc::clone(&self.services.releases),
            UpdateRequest::from(&self.config),
        );
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

        let outcome = supervise(self.execute(args, console)).await;

        let exit = match outcome {
            Ok(Ok(())) => Exit::Success,
            Ok(Err(error)) => {
                self.handle_error(&error, console).await;
                Exit::Failure
            }
            Err(fault) => {
                self.handle_fault(&fault, console).await;
                Exit::Failure
            }
        };

        self.handle_update(pending, console).await;
        exit
    }

    async fn execute(&mut self, args: Vec<OsString>, console: &mut Console) -> Result<()> {
        let mut command = Cli::command();
        let matches = match command.try_get_matches_from_mut(args) {
            Ok(matches) => matches,
            Err(error) => return handle_parse_error(&error, console),
        };
        check_root_flags(&command, &matches)?;
        let cli = Cli::from_arg_matches(&matches).map_err(|error| usage_error(&error))?;

        let overrides = FlagOverrides {
            no_color: cli.no_color,
            log_level: cli.log_level.clone(),
            pricing_api_endpoint: cli.pricing_api_endpoint.clone(),
            names: explicit_flag_names(&command, &matches),
        };
        let deprecations = self.pre_run(&cli, &overrides)?;
        console.set_color(!self.config.no_color);

        if cli.command.is_none() {
            self.warn_root_deprecated(&deprecations, console);
        }

        self.services
            .dispatcher
            .dispatch(&self.config, cli.command.as_ref(), console)
            .await
    }

    /// Applies the per-command layers in precedence order.
    ///
    /// Returns the deprecation warnings raised by v0.7 flags and variables,
    /// which only the root command honours.
    fn pre_run(&mut self, cli: &Cli, overrides: &FlagOverrides) -> Result<Vec<String>> {
        let flag_deprecations = if cli.command.is_none() {
            self.config
                .apply_deprecated_flags(&cli.deprecated, &cli.root)?
        } else {
            Vec::new()
        };

        if let Some(args) = cli.project_args() {
            self.config.apply_project_flags(args)?;
            if let Some(path) = &args.config_file {
                self.config
                    .load_from_config_file(path, &self.env, &self.logger)?;
            }
        }

        if let Some(Commands::Output(args) | Commands::Report(args)) = &cli.command {
            self.config
                .apply_display_flags(args.format, args.fields.as_deref(), args.show_skipped);
        }

        self.config.apply_flags(overrides, &self.logger)?;

        if cli.command.is_some() {
            return Ok(Vec::new());
        }
        let mut deprecations = self.config.apply_deprecated_env(&self.env);
        deprecations.extend(flag_deprecations);
        Ok(deprecations)
    }

    fn warn_root_deprecated(&self, deprecations: &[String], console: &mut Console) {
        let palette = console.palette();
        let edge = palette.warning("│");
        let message = [
            palette.warning(&format!("┌{DEPRECATION_RULE}┐")),
            format!(
                "{edge} {} The root command is deprecated and will be removed in v0.9.0. {edge}",
                palette.warning("Warning:")
            ),
            format!(
                "{edge} Please use {}                                         {edge}",
                palette.primary("infracost breakdown")
            ),
            format!(
                "{edge} Migration details: {}             {edge}",
                palette.link("https://www.infracost.io/v0.8-migration")
            ),
            palette.warning(&format!("└{DEPRECATION_RULE}┘")),
        ]
        .join("\n");

        if self.config.is_logging() {
            for line in strip_color(&message).lines() {
                tracing::warn!("{line}");
            }
            for deprecation in deprecations {
                tracing::warn!("{deprecation}");
            }
        } else {
            console.eprintln(&message);
            for deprecation in deprecations {
                console.eprintln(&format!("{} {deprecation}", palette.warning("Warning:")));
            }
        }
        console.eprintln("");
    }

    async fn handle_error(&self, error: &InfracostError, console: &mut Console) {
        report_error(
            &self.config,
            error,
            self.services.reporter.as_ref(),
            self.report_timeout,
            console,
        )
        .await;
    }

    async fn handle_fault(&self, fault: &Fault, console: &mut Console) {
        console.fail_spinner();
        console.print_unexpected_error(&fault.message, &fault.stack);
        self.report(fault.report_value()).await;
    }

    async fn report(&self, value: String) {
        let report = EventReport::error(&self.config, value);
        send_report(self.services.reporter.as_ref(), report, self.report_timeout).await;
    }

    async fn handle_update(&self, pending: PendingUpdate, console: &mut Console) {
        let Some(info) = pending.drain(self.drain_timeout).await else {
            return;
        };

        let palette = console.palette();
        let current = with_v_prefix(&self.config.version);
        console.eprint(&format!(
            "\n{} A new version of Infracost is available: {} → {}\n{}\n",
            palette.warning("Update:"),
            palette.primary(&current),
            palette.primary(&info.latest_version),
            indent(&info.cmd, "  "),
        ));
    }
}

/// Prints and reports an error that stopped the environment layer.
///
/// Used before an [`Orchestrator`] exists. The report goes to whichever
/// dashboard endpoint `config` had resolved when the error was raised.
pub async fn fail_startup(
    config: &Config,
    error: &InfracostError,
    reporter: &dyn EventReporter,
    console: &mut Console,
) -> Exit {
    console.set_color(!config.no_color);
    report_error(config, error, reporter, REPORT_TIMEOUT, console).await;
    Exit::Failure
}

async fn report_error(
    config: &Config,
    error: &InfracostError,
    reporter: &dyn EventReporter,
    timeout: Duration,
    console: &mut Console,
) {
    console.fail_spinner();

    let message = error.to_string();
    if !message.is_empty() {
        console.print_error(&message);
    }

    let value = strip_color(error.event_label().unwrap_or(&message));
    send_report(reporter, EventReport::error(config, value), timeout).await;
}

fn with_v_prefix(version: &str) -> String {
    if version.starts_with('v') {
        version.to_owned()
    } else {
        format!("v{version}")
    }
}

/// Prints help or version output, or converts a parse failure into an error.
fn handle_parse_error(error: &clap::Error, console: &mut Console) -> Result<()> {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            console.println(error.render().to_string().trim_end())?;
            Ok(())
        }
        _ => Err(usage_error(error).into()),
    }
}

fn usage_error(error: &clap::Error) -> CommandError {
    let rendered = error.render().to_string();
    let message = rendered
        .trim()
        .strip_prefix("error: ")
        .unwrap_or_else(|| rendered.trim())
        .to_owned();
    CommandError::Usage { message }
}
