//! Assertion helpers for orchestration behavioural tests.

use rstest_bdd_macros::then;

use super::StepResult;
use super::state::{OrchestrationState, RunRecord};

fn record(orchestration_state: &OrchestrationState) -> StepResult<RunRecord> {
    orchestration_state
        .record
        .get()
        .ok_or_else(|| String::from("infracost should have been run"))
}

#[then("the exit code is {expected}")]
fn exit_code_is(orchestration_state: &OrchestrationState, expected: u8) -> StepResult<()> {
    let run = record(orchestration_state)?;
    if run.exit_code == expected {
        Ok(())
    } else {
        Err(format!(
            "expected exit code {expected}, got {}; diagnostics:\n{}",
            run.exit_code, run.err
        ))
    }
}

#[then("the output contains {text}")]
fn output_contains(orchestration_state: &OrchestrationState, text: String) -> StepResult<()> {
    let run = record(orchestration_state)?;
    if run.out.contains(&text) {
        Ok(())
    } else {
        Err(format!("expected output to contain '{text}', got:\n{}", run.out))
    }
}

#[then("the diagnostics contain {text}")]
fn diagnostics_contain(orchestration_state: &OrchestrationState, text: String) -> StepResult<()> {
    let run = record(orchestration_state)?;
    if run.err.contains(&text) {
        Ok(())
    } else {
        Err(format!("expected diagnostics to contain '{text}', got:\n{}", run.err))
    }
}

#[then("no error event is reported")]
fn no_error_event(orchestration_state: &OrchestrationState) -> StepResult<()> {
    let run = record(orchestration_state)?;
    if run.reports.is_empty() {
        Ok(())
    } else {
        Err(format!("expected no reports, got {:?}", run.reports))
    }
}

#[then("the reported error event is {label}")]
fn reported_error_event(orchestration_state: &OrchestrationState, label: String) -> StepResult<()> {
    let run = record(orchestration_state)?;
    if run.reports == [label.clone()] {
        Ok(())
    } else {
        Err(format!("expected a single report '{label}', got {:?}", run.reports))
    }
}

#[then("the diagnostics end with an update notice for {tag}")]
fn diagnostics_end_with_notice(orchestration_state: &OrchestrationState, tag: String) -> StepResult<()> {
    let run = record(orchestration_state)?;
    let notice = format!("Update: A new version of Infracost is available: v0.8.2 → {tag}");
    let position = run
        .err
        .rfind(&notice)
        .ok_or_else(|| format!("expected an update notice, got:\n{}", run.err))?;
    let after = run.err.get(position..).unwrap_or_default();
    if after.contains("Error:") || after.contains('✔') {
        Err(format!("update notice was not last:\n{}", run.err))
    } else {
        Ok(())
    }
}
