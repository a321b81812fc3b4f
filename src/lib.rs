//! Deploycheck - deployment smoke-test harness
//!
//! For each configured project (a checked-out git repository with a
//! deployment remote), deploycheck forces a redeploy by pushing an empty
//! commit, waits for the remote build to finish, reverts the commit, and
//! probes the deployed application's root URL to confirm it answers with
//! a healthy HTTP status. Results are aggregated into a pass/fail report
//! and the process exit code.

pub mod config;
pub mod error;
pub mod git;
pub mod platform;
pub mod probe;
pub mod report;
pub mod runner;

// Re-exports for convenience
pub use config::RunConfig;
pub use error::{DeployCheckError, DeployCheckResult};
pub use git::{GitCli, PushInFlight, PushOutput, Vcs};
pub use platform::{HerokuCli, PlatformCli};
pub use probe::{HttpProbe, UreqProbe};
pub use report::RunReport;
pub use runner::{run, ErrorRecord, ProjectState, ProjectTask, RunOutcome};
