//! v0.7 flags and variables still honoured by the deprecated root command.
//!
//! Each one fills the placeholder project unless its current replacement was
//! also given, and yields a warning that names the replacement.

use camino::Utf8PathBuf;

use super::Config;
use super::cli::{DeprecatedRootArgs, ProjectArgs};
use crate::error::{ConfigError, Result};

/// Deprecated variable naming the Terraform directory.
pub const TERRAFORM_DIR_ENV_VAR: &str = "INFRACOST_TERRAFORM_DIR";

fn deprecation(old: &str, replacement: &str) -> String {
    format!("{old} is deprecated and will be removed in v0.9.0. Please use {replacement}.")
}

impl DeprecatedRootArgs {
    /// Deprecated flags that were set, with their replacements.
    #[must_use]
    pub fn flags_set(&self) -> Vec<(&'static str, &'static str)> {
        let mut set = Vec::new();
        if self.tfjson.is_some() {
            set.push(("--tfjson", "--path"));
        }
        if self.tfplan.is_some() {
            set.push(("--tfplan", "--path"));
        }
        if self.use_tfstate {
            set.push(("--use-tfstate", "--terraform-use-state"));
        }
        if self.tfdir.is_some() {
            set.push(("--tfdir", "--path"));
        }
        if self.tfflags.is_some() {
            set.push(("--tfflags", "--terraform-plan-flags"));
        }
        if self.output_format.is_some() {
            set.push(("--output", "--format"));
        }
        set
    }

    /// The project path the deprecated flags describe.
    ///
    /// `--tfjson` wins; `--tfplan` is resolved against `--tfdir`.
    fn project_path(&self) -> Option<Utf8PathBuf> {
        if let Some(plan_json) = &self.tfjson {
            return Some(plan_json.clone());
        }
        match (&self.tfplan, &self.tfdir) {
            (Some(plan), Some(dir)) => Some(dir.join(plan)),
            (Some(plan), None) => Some(plan.clone()),
            (None, dir) => dir.clone(),
        }
    }
}

impl Config {
    /// Maps deprecated root-command flags onto the placeholder project.
    ///
    /// `current` holds the flags given in their current spelling; a
    /// deprecated flag never overrides its replacement. Returns one warning
    /// per deprecated flag used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConflictingFlags` if deprecated project flags are
    /// combined with `--config-file`.
    pub fn apply_deprecated_flags(
        &mut self,
        deprecated: &DeprecatedRootArgs,
        current: &ProjectArgs,
    ) -> Result<Vec<String>> {
        let used = deprecated.flags_set();
        if used.is_empty() {
            return Ok(Vec::new());
        }

        if current.config_file.is_some() {
            let project_flags: Vec<&str> = used
                .iter()
                .filter(|(flag, _)| *flag != "--output")
                .map(|(flag, _)| *flag)
                .collect();
            if !project_flags.is_empty() {
                return Err(ConfigError::ConflictingFlags {
                    flags: project_flags.join(", "),
                }
                .into());
            }
        } else if let Some(project) = self.projects.first_mut() {
            if current.path.is_none()
                && let Some(path) = deprecated.project_path()
            {
                project.path = path;
            }
            if current.terraform_plan_flags.is_none()
                && let Some(flags) = &deprecated.tfflags
            {
                project.terraform_plan_flags = Some(flags.clone());
            }
            if deprecated.use_tfstate {
                project.terraform_use_state = true;
            }
        }

        if current.format.is_none()
            && let Some(format) = deprecated.output_format
        {
            self.format = format;
        }

        Ok(used
            .into_iter()
            .map(|(flag, replacement)| deprecation(flag, replacement))
            .collect())
    }

    /// Applies deprecated environment variables onto the placeholder project.
    ///
    /// `INFRACOST_TERRAFORM_DIR` only fills a project path nothing else set.
    /// Returns one warning per deprecated variable present.
    pub fn apply_deprecated_env<E: mockable::Env>(&mut self, env: &E) -> Vec<String> {
        let Some(dir) = env
            .string(TERRAFORM_DIR_ENV_VAR)
            .filter(|dir| !dir.is_empty())
        else {
            return Vec::new();
        };

        if let Some(project) = self.projects.first_mut()
            && project.path.as_str().is_empty()
        {
            project.path = Utf8PathBuf::from(dir);
        }
        vec![deprecation(TERRAFORM_DIR_ENV_VAR, "--path")]
    }
}
