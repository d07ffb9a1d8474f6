//! Best-effort error-event reporting to the dashboard service.
//!
//! Reports are fire-and-forget from the caller's point of view: delivery is
//! bounded by [`REPORT_TIMEOUT`] and any failure is logged at debug level and
//! otherwise ignored, so reporting can never change the exit code.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::BoxFuture;
use crate::config::{Config, Environment};
use crate::error::EventsError;

/// Upper bound on delivering a single report.
pub const REPORT_TIMEOUT: Duration = Duration::from_secs(5);

const API_KEY_HEADER: &str = "X-Api-Key";

/// Report type used for command failures and faults.
pub const ERROR_REPORT_TYPE: &str = "error";

/// JSON body of an event report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBody {
    /// Category of the report, e.g. `error`.
    pub report_type: String,
    /// Colour-free message or label.
    pub report_value: String,
    /// Snapshot of the invocation environment.
    pub env: Environment,
}

/// A report addressed to a dashboard endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventReport {
    /// Base URL of the dashboard API.
    pub dashboard_endpoint: String,
    /// API key sent with the report, if one is configured.
    pub api_key: Option<String>,
    /// The payload.
    pub body: ReportBody,
}

impl EventReport {
    /// Builds an `error` report for `value` from the resolved configuration.
    #[must_use]
    pub fn error(config: &Config, value: impl Into<String>) -> Self {
        Self {
            dashboard_endpoint: config.dashboard_api_endpoint.clone(),
            api_key: config.api_key.clone(),
            body: ReportBody {
                report_type: ERROR_REPORT_TYPE.to_owned(),
                report_value: value.into(),
                env: config.environment.clone(),
            },
        }
    }
}

/// Delivers event reports.
#[cfg_attr(test, mockall::automock)]
pub trait EventReporter: Send + Sync {
    /// Sends one report.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::SendFailed`] if the report cannot be delivered.
    fn send(&self, report: EventReport) -> BoxFuture<'_, Result<(), EventsError>>;
}

/// Posts reports to `<dashboard>/report`.
#[derive(Debug, Clone)]
pub struct DashboardReporter {
    client: Client,
}

impl DashboardReporter {
    /// Creates a reporter with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::SendFailed`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, EventsError> {
        let client = Client::builder()
            .timeout(REPORT_TIMEOUT)
            .user_agent(concat!("infracost/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| EventsError::SendFailed {
                message: format!("failed to build HTTP client: {error}"),
            })?;
        Ok(Self { client })
    }
}

impl EventReporter for DashboardReporter {
    fn send(&self, report: EventReport) -> BoxFuture<'_, Result<(), EventsError>> {
        Box::pin(async move {
            let url = format!("{}/report", report.dashboard_endpoint.trim_end_matches('/'));
            let mut request = self.client.post(url).json(&report.body);
            if let Some(api_key) = &report.api_key {
                request = request.header(API_KEY_HEADER, api_key);
            }

            request
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|error| EventsError::SendFailed {
                    message: error.to_string(),
                })?;
            Ok(())
        })
    }
}

/// Sends `report`, swallowing any failure.
///
/// Waits at most `timeout` for delivery.
pub async fn send_report(reporter: &dyn EventReporter, report: EventReport, timeout: Duration) {
    match tokio::time::timeout(timeout, reporter.send(report)).await {
        Ok(Ok(())) => tracing::debug!("event report sent"),
        Ok(Err(error)) => tracing::debug!(%error, "unable to send event report"),
        Err(_) => tracing::debug!(?timeout, "event report timed out"),
    }
}
