//! Configuration system for infracost.
//!
//! This module provides the runtime configuration aggregate, its persisted
//! companions (installation state and stored credentials) and the CLI
//! definitions. Resolution applies four layers to a single [`Config`] in a
//! fixed order, each overriding the previous for the fields it touches:
//! compiled-in defaults, an optional config file, `INFRACOST_*` environment
//! variables, then command-line flags.
//!
//! State and credentials live in `~/.config/infracost` by default, or in the
//! directory named by `INFRACOST_CONFIG_DIR`.
//!
//! # Example Config File
//!
//! ```yaml
//! version: 0.1
//! projects:
//!   - path: examples/terraform
//!     terraform_workspace: staging
//!     usage_file: examples/terraform/infracost-usage.yml
//!   - path: examples/plan.json
//!     terraform_use_state: true
//! ```

mod cli;
mod credentials;
mod deprecated;
mod environment;
mod loader;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use cli::{
    Cli, Commands, DeprecatedRootArgs, OutputArgs, ProjectArgs, check_root_flags,
    explicit_flag_names,
};
pub use credentials::{CREDENTIALS_FILE_NAME, Credentials};
pub use deprecated::TERRAFORM_DIR_ENV_VAR;
pub use environment::Environment;
pub use loader::{FlagOverrides, env_var_names, load_dot_env};
pub use state::{STATE_FILE_NAME, State};
pub use types::{
    ALLOWED_FIELDS, Config, DEFAULT_DASHBOARD_API_ENDPOINT, DEFAULT_PRICING_API_ENDPOINT,
    OutputFormat, Project,
};
