//! Configuration resolution with layered precedence.
//!
//! A [`Config`] starts from compiled-in defaults and is mutated in place by
//! each layer, lowest to highest precedence: configuration file, environment
//! variables, command-line flags. A layer only writes the fields it carries,
//! so absence never erases a value resolved by an earlier layer.
//!
//! # Environment Variable Handling
//!
//! Recognised variables are listed in two data-driven tables, one for the
//! top-level configuration and one applied to every [`Project`]. String
//! fields accept any value. Boolean fields accept the usual spellings
//! (`1`, `t`, `true`, `0`, `f`, `false`, and their capitalised forms); any
//! other value, including an empty one, fails immediately with an error naming
//! the variable rather than silently falling back to a default.
//!
//! Unrecognised `INFRACOST_*` variables are ignored.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;

use super::cli::ProjectArgs;
use super::deprecated::TERRAFORM_DIR_ENV_VAR;
use super::{ALLOWED_FIELDS, Config, Credentials, Environment, Project, State};
use crate::error::{ConfigError, Result};
use crate::logging::Logger;

/// Config file versions this build understands.
const SUPPORTED_CONFIG_FILE_VERSIONS: &[&str] = &["0.1"];

/// Variable overriding the directory that holds state and credentials.
const CONFIG_DIR_ENV_VAR: &str = "INFRACOST_CONFIG_DIR";

/// Variable setting the API key directly.
const API_KEY_ENV_VAR: &str = "INFRACOST_API_KEY";

// ============================================================================
// Environment Variable Specification Tables
// ============================================================================

/// How an environment variable value is written onto its target.
enum Binding<T> {
    /// Plain string field (always accepted).
    String(fn(&mut T) -> &mut String),
    /// Optional string field (always accepted).
    OptionalString(fn(&mut T) -> &mut Option<String>),
    /// Optional path field (always accepted).
    Path(fn(&mut T) -> &mut Option<Utf8PathBuf>),
    /// Boolean field. Invalid values return an error.
    Bool(fn(&mut T) -> &mut bool),
}

/// Specification for a single environment variable mapping.
struct EnvVarSpec<T: 'static> {
    /// The environment variable name (e.g., `INFRACOST_LOG_LEVEL`).
    env_var: &'static str,
    /// Where and how the value is stored.
    binding: Binding<T>,
}

/// Variables bound onto the top-level [`Config`].
const CONFIG_ENV_VARS: &[EnvVarSpec<Config>] = &[
    EnvVarSpec {
        env_var: "INFRACOST_LOG_LEVEL",
        binding: Binding::String(|config| &mut config.log_level),
    },
    EnvVarSpec {
        env_var: "INFRACOST_NO_COLOR",
        binding: Binding::Bool(|config| &mut config.no_color),
    },
    EnvVarSpec {
        env_var: "INFRACOST_SKIP_UPDATE_CHECK",
        binding: Binding::Bool(|config| &mut config.skip_update_check),
    },
    EnvVarSpec {
        env_var: API_KEY_ENV_VAR,
        binding: Binding::OptionalString(|config| &mut config.api_key),
    },
    EnvVarSpec {
        env_var: "INFRACOST_PRICING_API_ENDPOINT",
        binding: Binding::String(|config| &mut config.pricing_api_endpoint),
    },
    EnvVarSpec {
        env_var: "INFRACOST_DEFAULT_PRICING_API_ENDPOINT",
        binding: Binding::String(|config| &mut config.default_pricing_api_endpoint),
    },
    EnvVarSpec {
        env_var: "INFRACOST_DASHBOARD_API_ENDPOINT",
        binding: Binding::String(|config| &mut config.dashboard_api_endpoint),
    },
    EnvVarSpec {
        env_var: CONFIG_DIR_ENV_VAR,
        binding: Binding::Path(|config| &mut config.config_dir),
    },
];

/// Variables bound onto every [`Project`].
const PROJECT_ENV_VARS: &[EnvVarSpec<Project>] = &[
    EnvVarSpec {
        env_var: "INFRACOST_TERRAFORM_BINARY",
        binding: Binding::OptionalString(|project| &mut project.terraform_binary),
    },
    EnvVarSpec {
        env_var: "INFRACOST_TERRAFORM_WORKSPACE",
        binding: Binding::OptionalString(|project| &mut project.terraform_workspace),
    },
    EnvVarSpec {
        env_var: "INFRACOST_TERRAFORM_CLOUD_HOST",
        binding: Binding::OptionalString(|project| &mut project.terraform_cloud_host),
    },
    EnvVarSpec {
        env_var: "INFRACOST_TERRAFORM_CLOUD_TOKEN",
        binding: Binding::OptionalString(|project| &mut project.terraform_cloud_token),
    },
];

/// Returns the list of environment variable names recognised by the loader,
/// deprecated ones included.
///
/// This is primarily useful for tests that need to clear every `INFRACOST_*`
/// variable to ensure isolation.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    CONFIG_ENV_VARS
        .iter()
        .map(|spec| spec.env_var)
        .chain(PROJECT_ENV_VARS.iter().map(|spec| spec.env_var))
        .chain(std::iter::once(TERRAFORM_DIR_ENV_VAR))
        .collect()
}

/// Parses a boolean the way the original command-line tooling accepts them.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Applies every variable in `specs` that is present in `env` onto `target`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvValue` if a boolean variable has an
/// unparseable value.
fn bind_env<T, E: mockable::Env>(
    target: &mut T,
    specs: &[EnvVarSpec<T>],
    env: &E,
) -> std::result::Result<(), ConfigError> {
    for spec in specs {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };

        match spec.binding {
            Binding::String(field) => *field(target) = raw_value,
            Binding::OptionalString(field) => *field(target) = Some(raw_value),
            Binding::Path(field) => *field(target) = Some(Utf8PathBuf::from(raw_value)),
            Binding::Bool(field) => {
                let value = parse_bool(&raw_value).ok_or_else(|| ConfigError::InvalidEnvValue {
                    var: spec.env_var.to_owned(),
                    reason: format!("expected bool (true/false), got '{raw_value}'"),
                })?;
                *field(target) = value;
            }
        }
    }
    Ok(())
}

impl Project {
    /// Binds the project-level environment variables onto this project.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvValue` if a recognised variable holds
    /// an invalid value.
    pub fn bind_env<E: mockable::Env>(&mut self, env: &E) -> std::result::Result<(), ConfigError> {
        bind_env(self, PROJECT_ENV_VARS, env)
    }
}

// ============================================================================
// Config File
// ============================================================================

/// The on-disk shape of an infracost config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFileSpec {
    version: Option<serde_yaml::Value>,
    projects: Vec<Project>,
}

/// Renders a `version` value; YAML reads an unquoted `0.1` as a number.
fn version_text(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(text) => text.clone(),
        serde_yaml::Value::Number(number) => number.to_string(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim().to_owned())
            .unwrap_or_default(),
    }
}

/// Reads and validates a config file.
///
/// Uses `cap_std::fs_utf8` for capability-oriented filesystem access: the
/// parent directory is opened with ambient authority and the file is read
/// from there.
fn read_config_file(path: &Utf8Path) -> std::result::Result<Vec<Project>, ConfigError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| ConfigError::FileNotFound {
        path: path.to_owned(),
    })?;

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|_| {
        ConfigError::FileNotFound {
            path: path.to_owned(),
        }
    })?;

    let content = dir.read_to_string(file_name).map_err(|error| {
        if error.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound {
                path: path.to_owned(),
            }
        } else {
            ConfigError::FileParse {
                path: path.to_owned(),
                message: format!("failed to read file: {error}"),
            }
        }
    })?;

    let spec: ConfigFileSpec =
        serde_yaml::from_str(&content).map_err(|error| ConfigError::FileParse {
            path: path.to_owned(),
            message: error.to_string(),
        })?;

    if let Some(version) = spec.version.as_ref().map(version_text)
        && !SUPPORTED_CONFIG_FILE_VERSIONS.contains(&version.as_str())
    {
        return Err(ConfigError::UnsupportedVersion {
            path: path.to_owned(),
            version,
        });
    }

    if spec.projects.is_empty() {
        return Err(ConfigError::NoProjects {
            path: path.to_owned(),
        });
    }

    Ok(spec.projects)
}

// ============================================================================
// Developer Overrides
// ============================================================================

/// Loads developer-local dotenv override files.
///
/// `.env.local` in the crate root is consulted first, then `.env` in the
/// working directory. Missing files are skipped and variables already present
/// in the process environment are never overwritten. Call this at process
/// entry, before any other thread is started.
///
/// # Errors
///
/// Returns `ConfigError::DotEnv` if a file exists but cannot be parsed.
pub fn load_dot_env() -> std::result::Result<(), ConfigError> {
    let candidates = [
        Utf8Path::new(env!("CARGO_MANIFEST_DIR")).join(".env.local"),
        Utf8PathBuf::from(".env"),
    ];

    for path in candidates {
        match dotenvy::from_path(&path) {
            Ok(()) => tracing::debug!(%path, "loaded environment overrides"),
            Err(error) if error.not_found() => {}
            Err(error) => {
                return Err(ConfigError::DotEnv {
                    path,
                    message: error.to_string(),
                });
            }
        }
    }
    Ok(())
}

// ============================================================================
// Command-Line Flags
// ============================================================================

/// Values from global flags that the user explicitly set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagOverrides {
    /// `--no-color` was passed.
    pub no_color: bool,
    /// `--log-level` value, if passed.
    pub log_level: Option<String>,
    /// `--pricing-api-endpoint` value, if passed.
    pub pricing_api_endpoint: Option<String>,
    /// Long names of every flag explicitly set this invocation.
    pub names: Vec<String>,
}

// ============================================================================
// Layer Application
// ============================================================================

impl Config {
    /// Applies the environment layer and bootstraps dependent services.
    ///
    /// Binds recognised variables onto the configuration and onto every
    /// project, reconfigures the logger for the resolved level, then loads the
    /// persisted state and credentials if this has not already happened in
    /// this process. Safe to call again after a later layer replaced the
    /// project list: state and credentials are never reloaded.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvValue` for an invalid variable value,
    /// `LoggingError::UnknownLevel` for an unknown log level, and state or
    /// credentials errors if a persisted file exists but is corrupt.
    pub fn load_from_env<E: mockable::Env>(&mut self, env: &E, logger: &Logger) -> Result<()> {
        if self.environment.version.is_empty() {
            self.environment = Environment::detect(env);
        }

        self.bind_env(env)?;
        logger.apply(&self.logger_config()?)?;

        if self.state.is_none() || self.credentials.is_none() {
            let config_dir = self.resolve_config_dir()?;
            if self.state.is_none() {
                self.state = Some(State::load_or_create(&config_dir)?);
            }
            if self.credentials.is_none() {
                self.credentials = Some(Credentials::load(&config_dir)?);
            }
        }
        self.environment.install_id = self.install_id().map(str::to_owned);
        self.resolve_api_key();

        Ok(())
    }

    /// Binds the environment layer onto the configuration and every project.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvValue` naming the first variable with
    /// an invalid value.
    pub fn bind_env<E: mockable::Env>(&mut self, env: &E) -> std::result::Result<(), ConfigError> {
        bind_env(self, CONFIG_ENV_VARS, env)?;
        if env.string(API_KEY_ENV_VAR).is_some() {
            self.api_key_from_credentials = false;
        }
        for project in &mut self.projects {
            project.bind_env(env)?;
        }
        Ok(())
    }

    /// Applies a config file layer.
    ///
    /// Replaces the project list wholesale, records that a config file was
    /// present, then re-applies the environment layer so that variables still
    /// take precedence over the file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::FileNotFound` if nothing exists at `path`,
    /// `ConfigError::FileParse`, `ConfigError::UnsupportedVersion` or
    /// `ConfigError::NoProjects` for an invalid file, plus any error from
    /// [`Config::load_from_env`].
    pub fn load_from_config_file<E: mockable::Env>(
        &mut self,
        path: &Utf8Path,
        env: &E,
        logger: &Logger,
    ) -> Result<()> {
        self.projects = read_config_file(path)?;
        self.environment.has_config_file = true;
        self.load_from_env(env, logger)
    }

    /// Applies per-command project flags.
    ///
    /// Without a config file, project flags fill in the placeholder project.
    /// Display flags apply either way.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConflictingFlags` if a config file was loaded and
    /// project flags were also given.
    pub fn apply_project_flags(&mut self, args: &ProjectArgs) -> Result<()> {
        let project_flags = args.project_flags_set();
        if args.config_file.is_some() && !project_flags.is_empty() {
            return Err(ConfigError::ConflictingFlags {
                flags: project_flags.join(", "),
            }
            .into());
        }

        if args.config_file.is_none()
            && let Some(project) = self.projects.first_mut()
        {
            if let Some(path) = &args.path {
                project.path.clone_from(path);
            }
            if let Some(flags) = &args.terraform_plan_flags {
                project.terraform_plan_flags = Some(flags.clone());
            }
            if let Some(workspace) = &args.terraform_workspace {
                project.terraform_workspace = Some(workspace.clone());
            }
            if args.terraform_use_state {
                project.terraform_use_state = true;
            }
            if let Some(usage_file) = &args.usage_file {
                project.usage_file = Some(usage_file.clone());
            }
        }

        self.apply_display_flags(args.format, args.fields.as_deref(), args.show_skipped);
        if args.sync_usage_file {
            self.sync_usage_file = true;
        }
        Ok(())
    }

    /// Applies output display flags shared by several commands.
    pub fn apply_display_flags(
        &mut self,
        format: Option<super::OutputFormat>,
        fields: Option<&[String]>,
        show_skipped: bool,
    ) {
        if let Some(format) = format {
            self.format = format;
        }
        if let Some(fields) = fields {
            self.fields = fields
                .iter()
                .filter(|field| {
                    let allowed = ALLOWED_FIELDS.contains(&field.as_str());
                    if !allowed {
                        tracing::warn!(
                            field = %field,
                            "ignoring invalid output field; allowed fields are {}",
                            ALLOWED_FIELDS.join(", ")
                        );
                    }
                    allowed
                })
                .cloned()
                .collect();
        }
        if show_skipped {
            self.show_skipped = true;
        }
    }

    /// Applies the global flag layer.
    ///
    /// Only flags the user explicitly set are written. Afterwards the
    /// environment snapshot records whether the default pricing endpoint is in
    /// use and which flags were set.
    ///
    /// # Errors
    ///
    /// Returns `LoggingError::UnknownLevel` if `--log-level` names an unknown
    /// level.
    pub fn apply_flags(&mut self, flags: &FlagOverrides, logger: &Logger) -> Result<()> {
        if flags.no_color {
            self.no_color = true;
        }

        if let Some(level) = &flags.log_level {
            self.log_level.clone_from(level);
            logger.apply(&self.logger_config()?)?;
        }

        if let Some(endpoint) = &flags.pricing_api_endpoint {
            self.pricing_api_endpoint.clone_from(endpoint);
            self.resolve_api_key();
        }

        self.environment.is_default_pricing_api_endpoint = self.is_default_pricing_api_endpoint();
        self.environment.flags.clone_from(&flags.names);

        Ok(())
    }

    /// Looks the API key up in stored credentials for the endpoint in effect.
    ///
    /// A key set directly (by `INFRACOST_API_KEY`) is kept. A key that came
    /// from credentials is looked up again, so a changed endpoint never keeps
    /// the key stored for the previous one.
    fn resolve_api_key(&mut self) {
        let set_directly = !self.api_key_from_credentials
            && self.api_key.as_deref().is_some_and(|key| !key.is_empty());
        if set_directly {
            return;
        }
        self.api_key = self
            .credentials
            .as_ref()
            .and_then(|credentials| credentials.api_key_for(&self.pricing_api_endpoint))
            .map(str::to_owned);
        self.api_key_from_credentials = self.api_key.is_some();
    }

    /// Determines the directory holding state and credentials.
    fn resolve_config_dir(&self) -> std::result::Result<Utf8PathBuf, ConfigError> {
        if let Some(dir) = self.config_dir.as_ref().filter(|dir| !dir.as_str().is_empty()) {
            return Ok(dir.clone());
        }
        dirs::home_dir()
            .and_then(|home| Utf8PathBuf::try_from(home).ok())
            .map(|home| home.join(".config").join("infracost"))
            .ok_or(ConfigError::NoConfigDirectory)
    }
}
