//! Behavioural helpers for orchestration scenarios.

mod assertions;
mod services;
mod state;
mod steps;

pub(crate) type StepResult<T> = Result<T, String>;

pub(crate) use state::{OrchestrationState, orchestration_state};
