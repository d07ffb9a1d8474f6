//! Command-line argument definitions for infracost.

use camino::Utf8PathBuf;
use clap::parser::ValueSource;
use clap::{ArgMatches, Args, Command, Parser, Subcommand};

use super::OutputFormat;
use crate::error::CommandError;

/// Command-line interface for infracost.
///
/// Running without a subcommand is the deprecated root command, which behaves
/// like `breakdown` and therefore accepts the same flags.
#[derive(Debug, Parser)]
#[command(name = "infracost")]
#[command(
    version,
    about = "Cloud cost estimates for Terraform",
    long_about = "Infracost - cloud cost estimates for Terraform\n\n\
        Generate a cost diff from terraform directory with any required terraform flags:\n\n  \
        infracost diff --path /path/to/code --terraform-plan-flags \"-var-file=myvars.tfvars\"\n\n\
        Generate a full cost breakdown from terraform directory with any required terraform flags:\n\n  \
        infracost breakdown --path /path/to/code --terraform-plan-flags \"-var-file=myvars.tfvars\"\n\n\
        Docs:\n  https://infracost.io/docs"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Flags for the deprecated root command.
    #[command(flatten)]
    pub root: ProjectArgs,

    /// v0.7 flags still honoured by the deprecated root command.
    #[command(flatten)]
    pub deprecated: DeprecatedRootArgs,

    /// Turn off colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log level (trace, debug, info, warn, error, fatal).
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Specify an alternate Cloud Pricing API URL.
    #[arg(long, global = true, value_name = "URL")]
    pub pricing_api_endpoint: Option<String>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Register for a free Infracost API key.
    Register,

    /// Show diff of monthly costs between current and planned state.
    Diff(ProjectArgs),

    /// Show full breakdown of costs.
    Breakdown(ProjectArgs),

    /// Combine and output Infracost JSON files in different formats.
    Output(OutputArgs),

    /// Deprecated alias of `output`.
    #[command(hide = true)]
    Report(OutputArgs),
}

/// Arguments describing the projects to evaluate.
#[derive(Debug, Clone, Default, Args)]
pub struct ProjectArgs {
    /// Path to an Infracost config file; cannot be combined with project flags.
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<Utf8PathBuf>,

    /// Path to the Terraform directory or JSON/plan file.
    #[arg(long, short = 'p', value_name = "PATH")]
    pub path: Option<Utf8PathBuf>,

    /// Flags to pass to `terraform plan`.
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub terraform_plan_flags: Option<String>,

    /// Terraform workspace to use.
    #[arg(long, value_name = "NAME")]
    pub terraform_workspace: Option<String>,

    /// Use Terraform state instead of generating a plan.
    #[arg(long)]
    pub terraform_use_state: bool,

    /// Path to the usage file for usage-based resource costs.
    #[arg(long, value_name = "PATH")]
    pub usage_file: Option<Utf8PathBuf>,

    /// Output format.
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Comma separated list of output fields.
    #[arg(long, value_delimiter = ',', value_name = "FIELDS")]
    pub fields: Option<Vec<String>>,

    /// Show unsupported resources.
    #[arg(long)]
    pub show_skipped: bool,

    /// Sync usage-file with missing resources.
    #[arg(long)]
    pub sync_usage_file: bool,
}

impl ProjectArgs {
    /// Names of the project-scoped flags that were set.
    #[must_use]
    pub fn project_flags_set(&self) -> Vec<&'static str> {
        let mut set = Vec::new();
        if self.path.is_some() {
            set.push("--path");
        }
        if self.terraform_plan_flags.is_some() {
            set.push("--terraform-plan-flags");
        }
        if self.terraform_workspace.is_some() {
            set.push("--terraform-workspace");
        }
        if self.terraform_use_state {
            set.push("--terraform-use-state");
        }
        if self.usage_file.is_some() {
            set.push("--usage-file");
        }
        set
    }
}

/// Hidden v0.7 flags of the root command.
///
/// Each maps onto its current replacement; see
/// [`Config::apply_deprecated_flags`](super::Config::apply_deprecated_flags).
#[derive(Debug, Clone, Default, Args)]
pub struct DeprecatedRootArgs {
    /// Path to a Terraform plan JSON file.
    #[arg(long, hide = true, value_name = "PATH")]
    pub tfjson: Option<Utf8PathBuf>,

    /// Path to a Terraform plan file, relative to `--tfdir`.
    #[arg(long, hide = true, value_name = "PATH")]
    pub tfplan: Option<Utf8PathBuf>,

    /// Use Terraform state instead of generating a plan.
    #[arg(long, hide = true)]
    pub use_tfstate: bool,

    /// Path to the Terraform code directory.
    #[arg(long, hide = true, value_name = "PATH")]
    pub tfdir: Option<Utf8PathBuf>,

    /// Flags to pass to `terraform plan`.
    #[arg(long, hide = true, value_name = "FLAGS", allow_hyphen_values = true)]
    pub tfflags: Option<String>,

    /// Output format.
    #[arg(long = "output", short = 'o', hide = true, value_enum, value_name = "FORMAT")]
    pub output_format: Option<OutputFormat>,
}

/// Arguments for the `output` and `report` subcommands.
#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Paths to Infracost JSON files.
    #[arg(long, short = 'p', value_name = "PATH")]
    pub path: Vec<Utf8PathBuf>,

    /// Output format.
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Comma separated list of output fields.
    #[arg(long, value_delimiter = ',', value_name = "FIELDS")]
    pub fields: Option<Vec<String>>,

    /// Show unsupported resources.
    #[arg(long)]
    pub show_skipped: bool,
}

impl Cli {
    /// The project arguments for the selected command, if it takes any.
    #[must_use]
    pub fn project_args(&self) -> Option<&ProjectArgs> {
        match &self.command {
            None => Some(&self.root),
            Some(Commands::Diff(args) | Commands::Breakdown(args)) => Some(args),
            Some(Commands::Register | Commands::Output(_) | Commands::Report(_)) => None,
        }
    }
}

/// Rejects root-command flags given before a subcommand.
///
/// Global flags may appear on either side of the subcommand. The flags of the
/// deprecated root command belong to the root alone, so they are only valid
/// when no subcommand is selected.
///
/// # Errors
///
/// Returns `CommandError::Usage` naming the first misplaced flag.
pub fn check_root_flags(command: &Command, matches: &ArgMatches) -> Result<(), CommandError> {
    let Some(subcommand) = matches.subcommand_name() else {
        return Ok(());
    };

    let misplaced = command
        .get_arguments()
        .filter(|arg| !arg.is_global_set())
        .find(|arg| matches.value_source(arg.get_id().as_str()) == Some(ValueSource::CommandLine));

    match misplaced {
        None => Ok(()),
        Some(arg) => {
            let name = arg
                .get_long()
                .map_or_else(|| arg.get_id().to_string(), str::to_owned);
            Err(CommandError::Usage {
                message: format!(
                    "unexpected argument '--{name}' before the subcommand '{subcommand}'; \
                     pass it after the subcommand"
                ),
            })
        }
    }
}

/// Collects the long names of every flag explicitly set on the command line.
///
/// Walks the root command and the selected subcommand. Global flags propagate
/// into subcommand matches, so names are deduplicated while keeping
/// first-seen order.
#[must_use]
pub fn explicit_flag_names(command: &Command, matches: &ArgMatches) -> Vec<String> {
    let mut names = Vec::new();
    let mut current = Some((command, matches));

    while let Some((level_command, level_matches)) = current {
        for arg in level_command.get_arguments() {
            let id = arg.get_id().as_str();
            if level_matches.value_source(id) != Some(ValueSource::CommandLine) {
                continue;
            }
            let name = arg.get_long().map_or_else(|| id.replace('_', "-"), str::to_owned);
            if !names.contains(&name) {
                names.push(name);
            }
        }
        current = level_matches.subcommand().and_then(|(name, sub_matches)| {
            level_command
                .find_subcommand(name)
                .map(|sub_command| (sub_command, sub_matches))
        });
    }

    names
}
