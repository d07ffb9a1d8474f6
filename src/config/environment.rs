//! Process introspection metadata.

use serde::Serialize;

/// Environment variables that identify a CI platform, checked in order.
const CI_PLATFORM_VARS: &[(&str, &str)] = &[
    ("GITHUB_ACTIONS", "github_actions"),
    ("GITLAB_CI", "gitlab_ci"),
    ("CIRCLECI", "circleci"),
    ("JENKINS_HOME", "jenkins"),
    ("BUILDKITE", "buildkite"),
    ("TF_BUILD", "azure_devops"),
    ("CI", "ci"),
];

/// In-memory snapshot describing this invocation.
///
/// Fields are filled in as resolution proceeds: `has_config_file` when a
/// config file loads, `install_id` when state loads, and the pricing
/// endpoint flag and `flags` after command-line parsing. The snapshot is never
/// persisted; it is sent as context with event reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    /// The running version of infracost.
    pub version: String,
    /// Operating system family.
    pub os: String,
    /// CI platform the process is running under, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_platform: Option<String>,
    /// Installation identifier copied from the persisted state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_id: Option<String>,
    /// Whether a config file supplied the project list.
    pub has_config_file: bool,
    /// Whether the resolved pricing endpoint is the default one.
    pub is_default_pricing_api_endpoint: bool,
    /// Flags explicitly set on the command line this invocation.
    pub flags: Vec<String>,
}

impl Environment {
    /// Builds the initial snapshot for this process.
    #[must_use]
    pub fn detect<E: mockable::Env>(env: &E) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_owned(),
            os: std::env::consts::OS.to_owned(),
            ci_platform: detect_ci_platform(env),
            is_default_pricing_api_endpoint: true,
            ..Self::default()
        }
    }
}

fn detect_ci_platform<E: mockable::Env>(env: &E) -> Option<String> {
    CI_PLATFORM_VARS
        .iter()
        .find(|(var, _)| env.string(var).is_some_and(|value| !value.is_empty()))
        .map(|(_, name)| (*name).to_owned())
}
