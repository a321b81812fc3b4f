//! Run reporting
//!
//! Turns a [`RunOutcome`] into the error block, the final summary line,
//! and the process exit code. Supports the human rendering and a
//! machine-readable `--json` rendering.

use serde::Serialize;

use crate::runner::{ErrorRecord, ProjectState, RunOutcome};

/// One project in the JSON report
#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub state: ProjectState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_secs: Option<f64>,
}

/// Aggregated result of one run
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub passed: usize,
    pub failed: usize,
    pub projects: Vec<ProjectSummary>,
    pub errors: Vec<ErrorRecord>,
}

impl RunReport {
    pub fn from_outcome(outcome: RunOutcome) -> Self {
        let projects = outcome
            .tasks
            .iter()
            .map(|task| ProjectSummary {
                name: task.name.clone(),
                state: task.state,
                elapsed_secs: task.elapsed.map(|d| d.as_secs_f64()),
            })
            .collect();
        let failed = outcome.errors.len();
        RunReport {
            passed: outcome.tasks.len() - failed,
            failed,
            projects,
            errors: outcome.errors,
        }
    }

    /// Zero on all-pass, 1 otherwise. Callers must only rely on the
    /// zero/non-zero distinction.
    pub fn exit_code(&self) -> i32 {
        if self.errors.is_empty() {
            0
        } else {
            1
        }
    }

    /// Print every recorded error followed by the summary line
    pub fn print_human(&self) {
        if !self.errors.is_empty() {
            println!("###############################################################");
            for error in &self.errors {
                println!("## {} exited with status {}:", error.name, error.code);
                println!("STDOUT:\n{}", error.stdout);
                println!("STDERR:\n{}", error.stderr);
            }
        }
        println!("{} projects passed, {} failed.", self.passed, self.failed);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
