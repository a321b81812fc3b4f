//! Version-control command surface
//!
//! Wraps the git operations the runner needs: baseline checkout, empty
//! commit, force-push with captured output, and the hard reset that
//! reverts the empty commit. The `Vcs` trait is the seam that lets the
//! runner be exercised without a real git binary.

use std::path::Path;
use std::process::{Child, Command, Stdio};

use crate::error::{DeployCheckError, DeployCheckResult};

/// Captured result of a completed push process
#[derive(Debug, Clone)]
pub struct PushOutput {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code; signal-terminated pushes are reported as 1
    pub code: i32,
}

/// A push that has been started but not yet waited on.
///
/// Joining consumes the handle; there is exactly one wait per push.
pub trait PushInFlight {
    fn wait(self: Box<Self>) -> DeployCheckResult<PushOutput>;
}

/// Version-control seam used by the runner
pub trait Vcs {
    /// Check out the baseline branch
    fn checkout(&self, dir: &Path, branch: &str) -> DeployCheckResult<()>;

    /// Create a commit with no file changes
    fn commit_empty(&self, dir: &Path, message: &str) -> DeployCheckResult<()>;

    /// Start a force-push of `branch` to `remote` without blocking.
    /// Stdout and stderr are piped for later inspection.
    fn start_force_push(
        &self,
        dir: &Path,
        remote: &str,
        branch: &str,
    ) -> DeployCheckResult<Box<dyn PushInFlight>>;

    /// Discard the most recent commit, returning the checkout to its
    /// pre-run state
    fn reset_to_parent(&self, dir: &Path) -> DeployCheckResult<()>;
}

/// Real git CLI implementation
///
/// Every invocation uses `git -C <dir>` so the controller's own working
/// directory never matters.
pub struct GitCli;

impl GitCli {
    fn run(&self, dir: &Path, args: &[&str]) -> DeployCheckResult<()> {
        let output = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(args)
            .output()
            .map_err(|e| DeployCheckError::Launch {
                program: "git".to_string(),
                dir: dir.to_path_buf(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(DeployCheckError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                dir: dir.to_path_buf(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }
        Ok(())
    }
}

impl Vcs for GitCli {
    fn checkout(&self, dir: &Path, branch: &str) -> DeployCheckResult<()> {
        self.run(dir, &["checkout", branch])
    }

    fn commit_empty(&self, dir: &Path, message: &str) -> DeployCheckResult<()> {
        self.run(dir, &["commit", "--allow-empty", "-m", message])
    }

    fn start_force_push(
        &self,
        dir: &Path,
        remote: &str,
        branch: &str,
    ) -> DeployCheckResult<Box<dyn PushInFlight>> {
        let child = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(["push", "--force", remote, branch])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DeployCheckError::Launch {
                program: "git push".to_string(),
                dir: dir.to_path_buf(),
                source: e,
            })?;

        Ok(Box::new(GitPush { child }))
    }

    fn reset_to_parent(&self, dir: &Path) -> DeployCheckResult<()> {
        self.run(dir, &["reset", "--hard", "HEAD~1"])
    }
}

/// In-flight `git push` child process
struct GitPush {
    child: Child,
}

impl PushInFlight for GitPush {
    fn wait(self: Box<Self>) -> DeployCheckResult<PushOutput> {
        let output = self.child.wait_with_output()?;
        Ok(PushOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            code: output.status.code().unwrap_or(1),
        })
    }
}
