//! Configuration data types for infracost.

use camino::Utf8PathBuf;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use super::credentials::Credentials;
use super::environment::Environment;
use super::state::State;
use crate::error::LoggingError;
use crate::logging::LoggerConfig;

/// The pricing API endpoint used when nothing overrides it.
pub const DEFAULT_PRICING_API_ENDPOINT: &str = "https://pricing.api.infracost.io";

/// The dashboard API endpoint used when nothing overrides it.
pub const DEFAULT_DASHBOARD_API_ENDPOINT: &str = "https://dashboard.api.infracost.io";

/// Display fields that may be selected with `--fields`.
pub const ALLOWED_FIELDS: &[&str] = &["price", "monthlyQuantity", "unit", "hourlyCost", "monthlyCost"];

/// Output format for cost estimates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// Machine-readable JSON.
    Json,
    /// Standalone HTML report.
    Html,
    /// Cost difference against current state.
    Diff,
}

/// One unit of infrastructure-as-code to evaluate.
///
/// Projects come either from the single placeholder created by the defaults
/// layer (filled in by command-line flags) or from the `projects` list of a
/// config file. Environment variables bind onto every project independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Project {
    /// Path to the Terraform directory, plan JSON or state JSON.
    pub path: Utf8PathBuf,

    /// Extra flags passed to `terraform plan`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terraform_plan_flags: Option<String>,

    /// Terraform binary to invoke.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terraform_binary: Option<String>,

    /// Terraform workspace to select.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terraform_workspace: Option<String>,

    /// Terraform Cloud or Enterprise host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terraform_cloud_host: Option<String>,

    /// Terraform Cloud or Enterprise token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terraform_cloud_token: Option<String>,

    /// Path to the usage file describing usage-based resources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_file: Option<Utf8PathBuf>,

    /// Use Terraform state instead of generating a plan.
    pub terraform_use_state: bool,
}

/// Root runtime configuration.
///
/// Exactly one `Config` lives per process. It is created from compiled-in
/// defaults and then mutated in place by each layer, in order: config file,
/// environment variables, command-line flags. Later layers override earlier
/// ones for every field they touch.
///
/// `Config` also owns the derived [`Environment`] snapshot, the persisted
/// [`State`] and the stored [`Credentials`]; the latter two stay `None` until
/// the environment layer has loaded them.
#[derive(Debug, Clone, SmartDefault)]
pub struct Config {
    /// Process introspection metadata.
    pub environment: Environment,

    /// Persisted installation record, loaded at most once.
    pub state: Option<State>,

    /// Stored API credentials, loaded at most once.
    pub credentials: Option<Credentials>,

    /// Directory holding the state and credentials files.
    pub config_dir: Option<Utf8PathBuf>,

    /// The running version of infracost.
    #[default(_code = "env!(\"CARGO_PKG_VERSION\").to_owned()")]
    pub version: String,

    /// Log level name; empty disables logging.
    pub log_level: String,

    /// Disable coloured output.
    pub no_color: bool,

    /// Skip the background update check.
    pub skip_update_check: bool,

    /// API key for the pricing and dashboard services.
    pub api_key: Option<String>,

    /// The API key was looked up in stored credentials rather than set
    /// directly, so it follows later endpoint changes.
    pub api_key_from_credentials: bool,

    /// Pricing API endpoint in effect.
    #[default(_code = "DEFAULT_PRICING_API_ENDPOINT.to_owned()")]
    pub pricing_api_endpoint: String,

    /// The endpoint considered the default pricing API.
    #[default(_code = "DEFAULT_PRICING_API_ENDPOINT.to_owned()")]
    pub default_pricing_api_endpoint: String,

    /// Dashboard API endpoint, also used for event reports.
    #[default(_code = "DEFAULT_DASHBOARD_API_ENDPOINT.to_owned()")]
    pub dashboard_api_endpoint: String,

    /// Projects to evaluate, in output order.
    #[default(_code = "vec![Project::default()]")]
    pub projects: Vec<Project>,

    /// Output format.
    pub format: OutputFormat,

    /// Show resources skipped by the estimate.
    pub show_skipped: bool,

    /// Write missing usage keys back into usage files.
    pub sync_usage_file: bool,

    /// Columns shown in table output.
    #[default(_code = "vec![\"monthlyQuantity\".to_owned(), \"unit\".to_owned(), \"monthlyCost\".to_owned()]")]
    pub fields: Vec<String>,
}

impl Config {
    /// Returns whether logging is enabled.
    #[must_use]
    pub fn is_logging(&self) -> bool {
        !self.log_level.is_empty()
    }

    /// Returns whether the pricing endpoint in effect is the default one.
    #[must_use]
    pub fn is_default_pricing_api_endpoint(&self) -> bool {
        self.pricing_api_endpoint == self.default_pricing_api_endpoint
    }

    /// Builds the logger configuration for the current log level.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::UnknownLevel`] if the level name is not
    /// recognised.
    pub fn logger_config(&self) -> Result<LoggerConfig, LoggingError> {
        LoggerConfig::from_level_name(&self.log_level)
    }

    /// The installation identifier, once state has been loaded.
    #[must_use]
    pub fn install_id(&self) -> Option<&str> {
        self.state.as_ref().map(|state| state.install_id.as_str())
    }
}
