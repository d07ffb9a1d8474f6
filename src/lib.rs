//! Cloud cost estimates for Terraform.
//!
//! `infracost` resolves its configuration from built-in defaults, an optional
//! YAML config file, `INFRACOST_*` environment variables and command-line
//! flags, then runs one subcommand under an orchestrator that guarantees a
//! single, consistent teardown: errors and faults are printed and reported,
//! and a background update check is drained before the process exits.
//!
//! # Modules
//!
//! - [`config`]: Layered configuration, persisted state and credentials
//! - [`logging`]: Reloadable `tracing` subscriber driven by the log level
//! - [`api`]: Subcommand bodies and the dispatch seam
//! - [`orchestrator`]: Invocation lifecycle, fault capture and teardown
//! - [`update`]: Background check for newer releases
//! - [`events`]: Best-effort error-event reports
//! - [`ui`]: Console streams, colour and the spinner
//! - [`error`]: Semantic error types for the application

use std::future::Future;
use std::pin::Pin;

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod orchestrator;
pub mod ui;
pub mod update;

/// A boxed, sendable future borrowed for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
