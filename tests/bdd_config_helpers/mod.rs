//! Behavioural step helpers for configuration layering scenarios.

mod assertions;
mod state;
mod steps;

pub use state::{ConfigState, config_state};
