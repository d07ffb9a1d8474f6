//! Subcommand bodies for infracost.
//!
//! This module provides the library-owned body of each subcommand:
//! [`breakdown`], [`diff`], [`output`], [`report`] and [`register`]. The
//! bodies read the fully resolved [`Config`] and write through a [`Console`];
//! they never touch process state, exit the process or parse arguments.
//!
//! Cost estimation itself is performed by downstream components. The bodies
//! here validate their preconditions and describe the work they hand on.
//!
//! The orchestrator reaches the bodies through the [`Dispatch`] trait so that
//! tests can substitute their own command behaviour.

use clap::ValueEnum;

use crate::BoxFuture;
use crate::config::{Commands, Config, OutputArgs, Project};
use crate::error::{CommandError, EventError, Result};
use crate::ui::{Console, Palette};

/// Label reported when no API key is available for the default endpoint.
pub const MISSING_API_KEY_LABEL: &str = "missing-api-key";

/// Runs the selected subcommand.
pub trait Dispatch: Send + Sync {
    /// Executes `command` against the resolved configuration.
    ///
    /// `None` selects the deprecated root command, which behaves like
    /// `breakdown`.
    ///
    /// # Errors
    ///
    /// Returns whatever error the command body produces.
    fn dispatch<'a>(
        &'a self,
        config: &'a Config,
        command: Option<&'a Commands>,
        console: &'a mut Console,
    ) -> BoxFuture<'a, Result<()>>;
}

/// Dispatches to the bodies in this module.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandDispatcher;

impl Dispatch for CommandDispatcher {
    fn dispatch<'a>(
        &'a self,
        config: &'a Config,
        command: Option<&'a Commands>,
        console: &'a mut Console,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move { run_command(config, command, console) })
    }
}

/// Runs a subcommand body synchronously.
///
/// # Errors
///
/// Returns whatever error the command body produces.
pub fn run_command(
    config: &Config,
    command: Option<&Commands>,
    console: &mut Console,
) -> Result<()> {
    match command {
        None | Some(Commands::Breakdown(_)) => breakdown(config, console),
        Some(Commands::Diff(_)) => diff(config, console),
        Some(Commands::Output(args)) => output(config, args, console),
        Some(Commands::Report(args)) => report(config, args, console),
        Some(Commands::Register) => register(console),
    }
}

/// Verifies that an API key is available for the default pricing endpoint.
///
/// Self-hosted endpoints do not require a key.
///
/// # Errors
///
/// Returns an [`EventError`] labelled [`MISSING_API_KEY_LABEL`] when the
/// default endpoint is in use and no key is configured.
pub fn check_api_key(config: &Config, palette: Palette) -> std::result::Result<(), EventError> {
    let has_key = config.api_key.as_deref().is_some_and(|key| !key.is_empty());
    if config.is_default_pricing_api_endpoint() && !has_key {
        return Err(EventError::new(
            MISSING_API_KEY_LABEL,
            format!(
                "No INFRACOST_API_KEY environment variable is set.\n\
                 We run a free Cloud Pricing API, to get an API key run {}",
                palette.primary("infracost register")
            ),
        ));
    }
    Ok(())
}

/// Shows the full breakdown of costs.
///
/// # Errors
///
/// Returns [`EventError`] if no API key is available, or
/// [`CommandError::Output`] if output cannot be written.
pub fn breakdown(config: &Config, console: &mut Console) -> Result<()> {
    evaluate_projects(config, console, "breakdown")
}

/// Shows the diff of monthly costs between current and planned state.
///
/// # Errors
///
/// Returns [`EventError`] if no API key is available, or
/// [`CommandError::Output`] if output cannot be written.
pub fn diff(config: &Config, console: &mut Console) -> Result<()> {
    evaluate_projects(config, console, "diff")
}

fn evaluate_projects(config: &Config, console: &mut Console, mode: &str) -> Result<()> {
    check_api_key(config, console.palette())?;

    let count = config.projects.len();
    let noun = if count == 1 { "project" } else { "projects" };
    console.start_spinner(&format!("Evaluating {count} {noun} for {mode}"));

    for project in &config.projects {
        console.println(&describe_project(project))?;
    }
    console.println(&format!(
        "Output: {} (fields: {})",
        format_name(config),
        config.fields.join(", ")
    ))?;

    console.succeed_spinner();
    tracing::debug!(count, mode, "projects handed to estimator");
    Ok(())
}

fn describe_project(project: &Project) -> String {
    let path = if project.path.as_str().is_empty() {
        "."
    } else {
        project.path.as_str()
    };
    let mut line = format!("Project: {path}");
    if let Some(workspace) = &project.terraform_workspace {
        line.push_str(&format!(" (workspace {workspace})"));
    }
    if project.terraform_use_state {
        line.push_str(" [state]");
    }
    if let Some(usage_file) = &project.usage_file {
        line.push_str(&format!(" usage: {usage_file}"));
    }
    line
}

fn format_name(config: &Config) -> String {
    config
        .format
        .to_possible_value()
        .map(|value| value.get_name().to_owned())
        .unwrap_or_default()
}

/// Combines Infracost JSON files into the configured output format.
///
/// # Errors
///
/// Returns [`CommandError::Usage`] if no input path was given, or
/// [`CommandError::Output`] if output cannot be written.
pub fn output(config: &Config, args: &OutputArgs, console: &mut Console) -> Result<()> {
    if args.path.is_empty() {
        return Err(CommandError::Usage {
            message: String::from("No input files specified. Use --path to provide Infracost JSON files."),
        }
        .into());
    }

    for path in &args.path {
        console.println(&format!("Input: {path}"))?;
    }
    console.println(&format!("Output: {}", format_name(config)))?;
    Ok(())
}

/// Deprecated alias of [`output`].
///
/// # Errors
///
/// As for [`output`].
pub fn report(config: &Config, args: &OutputArgs, console: &mut Console) -> Result<()> {
    let palette = console.palette();
    console.eprintln(&format!(
        "{} The report command is deprecated and will be removed in v0.9.0. Please use {}",
        palette.warning("Warning:"),
        palette.primary("infracost output")
    ));
    output(config, args, console)
}

/// Explains how to obtain an API key.
///
/// # Errors
///
/// Returns [`CommandError::Output`] if output cannot be written.
pub fn register(console: &mut Console) -> Result<()> {
    let palette = console.palette();
    console.println("To get a free API key, sign up at:")?;
    console.println(&format!("  {}", palette.link("https://www.infracost.io/signup")))?;
    console.println("")?;
    console.println("Then set it in your environment:")?;
    console.println(&format!(
        "  {}",
        palette.primary("export INFRACOST_API_KEY=<your-api-key>")
    ))?;
    Ok(())
}
