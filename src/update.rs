//! Background update-availability check.
//!
//! The check runs on its own task, concurrently with the user's command, and
//! hands its single result back over a one-shot channel. Failures never reach
//! the caller: they are logged at debug level and treated as "no update".
//! The consumer drains the channel once, at shutdown, so the notice is always
//! printed after the command's own output.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use semver::Version;
use serde::Deserialize;
use tokio::sync::oneshot;

use crate::BoxFuture;
use crate::config::Config;
use crate::error::UpdateError;

/// Release endpoint queried for the latest published version.
pub const LATEST_RELEASE_URL: &str =
    "https://api.github.com/repos/infracost/infracost/releases/latest";

/// Upper bound on a single release query.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on waiting for the result at shutdown.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

const INSTALL_ID_HEADER: &str = "X-Infracost-Install-Id";

const BREW_UPGRADE_COMMAND: &str = "$ brew upgrade infracost";

const UPDATE_DOCS_COMMAND: &str = "Go to https://www.infracost.io/docs/update for instructions";

const HOMEBREW_PATH_MARKERS: &[&str] = &[
    "/opt/homebrew/",
    "/usr/local/cellar/",
    "/home/linuxbrew/",
    "/.linuxbrew/",
];

/// A newer release the user can upgrade to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateInfo {
    /// The latest published version, as tagged.
    pub latest_version: String,
    /// Suggested shell command or instructions for upgrading.
    pub cmd: String,
}

/// Source of the latest published version.
///
/// Production code uses [`GitHubReleaseSource`]; tests inject mocks.
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseSource: Send + Sync {
    /// Returns the tag of the latest published release.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::RequestFailed`] if the service cannot be
    /// reached or answers with an error.
    fn latest_version(&self) -> BoxFuture<'_, Result<String, UpdateError>>;
}

#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: String,
}

/// Queries the GitHub releases API.
#[derive(Debug, Clone)]
pub struct GitHubReleaseSource {
    client: Client,
    url: String,
    install_id: Option<String>,
}

impl GitHubReleaseSource {
    /// Creates a source for the public release endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::RequestFailed`] if the HTTP client cannot be
    /// built.
    pub fn new(install_id: Option<&str>) -> Result<Self, UpdateError> {
        Self::with_url(LATEST_RELEASE_URL, install_id)
    }

    /// Creates a source for an alternate release endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::RequestFailed`] if the HTTP client cannot be
    /// built.
    pub fn with_url(url: &str, install_id: Option<&str>) -> Result<Self, UpdateError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("infracost/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| UpdateError::RequestFailed {
                message: format!("failed to build HTTP client: {error}"),
            })?;

        Ok(Self {
            client,
            url: url.to_owned(),
            install_id: install_id.map(str::to_owned),
        })
    }
}

impl ReleaseSource for GitHubReleaseSource {
    fn latest_version(&self) -> BoxFuture<'_, Result<String, UpdateError>> {
        Box::pin(async move {
            let mut request = self.client.get(&self.url);
            if let Some(install_id) = &self.install_id {
                request = request.header(INSTALL_ID_HEADER, install_id);
            }

            let release: LatestRelease = request
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|error| UpdateError::RequestFailed {
                    message: error.to_string(),
                })?
                .json()
                .await
                .map_err(|error| UpdateError::RequestFailed {
                    message: format!("unexpected release payload: {error}"),
                })?;

            Ok(release.tag_name)
        })
    }
}

/// The parts of [`Config`] the checker reads.
///
/// Taken as a snapshot before the task starts, so the task never holds a
/// reference into the live configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    /// The running version.
    pub current_version: String,
    /// Skip the check entirely.
    pub skip: bool,
}

impl From<&Config> for UpdateRequest {
    fn from(config: &Config) -> Self {
        Self {
            current_version: config.version.clone(),
            skip: config.skip_update_check,
        }
    }
}

/// Checks whether a newer release is available.
///
/// Returns `Ok(None)` when the check is skipped or the running version is
/// current.
///
/// # Errors
///
/// Returns [`UpdateError::RequestFailed`] if the source fails, or
/// [`UpdateError::InvalidVersion`] if either version is not valid semver.
pub async fn check_for_update(
    source: &dyn ReleaseSource,
    request: &UpdateRequest,
) -> Result<Option<UpdateInfo>, UpdateError> {
    if request.skip {
        tracing::debug!("skipping update check");
        return Ok(None);
    }

    let latest_tag = source.latest_version().await?;
    let current = parse_version(&request.current_version)?;
    let latest = parse_version(&latest_tag)?;

    if latest <= current {
        return Ok(None);
    }

    Ok(Some(UpdateInfo {
        latest_version: latest_tag,
        cmd: upgrade_command(),
    }))
}

fn parse_version(raw: &str) -> Result<Version, UpdateError> {
    let trimmed = raw.trim();
    let numeric = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(numeric).map_err(|error| UpdateError::InvalidVersion {
        version: raw.to_owned(),
        message: error.to_string(),
    })
}

/// Suggested upgrade command for this installation.
#[must_use]
pub fn upgrade_command() -> String {
    let exe = std::env::current_exe()
        .map(|path| path.to_string_lossy().into_owned())
        .unwrap_or_default();
    upgrade_command_for(&exe)
}

fn upgrade_command_for(exe_path: &str) -> String {
    let lowered = exe_path.to_lowercase();
    if HOMEBREW_PATH_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        BREW_UPGRADE_COMMAND.to_owned()
    } else {
        UPDATE_DOCS_COMMAND.to_owned()
    }
}

/// The receiving half of an in-flight update check.
#[derive(Debug)]
pub struct PendingUpdate {
    receiver: oneshot::Receiver<Option<UpdateInfo>>,
}

impl PendingUpdate {
    /// Waits for the check to hand over its result.
    ///
    /// Returns `None` if no update was found, the check failed, or the result
    /// did not arrive within `timeout`.
    pub async fn drain(self, timeout: Duration) -> Option<UpdateInfo> {
        match tokio::time::timeout(timeout, self.receiver).await {
            Ok(Ok(info)) => info,
            Ok(Err(_)) => {
                tracing::debug!("update check ended without a result");
                None
            }
            Err(_) => {
                tracing::debug!(?timeout, "update check did not finish in time");
                None
            }
        }
    }
}

/// Starts the update check on a background task.
///
/// Must be called from within a Tokio runtime. The task sends exactly one
/// value and then ends.
#[must_use]
pub fn start_update_check(source: Arc<dyn ReleaseSource>, request: UpdateRequest) -> PendingUpdate {
    let (sender, receiver) = oneshot::channel();

    tokio::spawn(async move {
        let info = match check_for_update(source.as_ref(), &request).await {
            Ok(info) => info,
            Err(error) => {
                tracing::debug!(%error, "error checking for update");
                None
            }
        };
        if sender.send(info).is_err() {
            tracing::debug!("update result receiver dropped");
        }
    });

    PendingUpdate { receiver }
}
