//! Deployment-platform command surface
//!
//! Thin wrapper over the `heroku` CLI: reading and enforcing the
//! buildpack, toggling config vars, and fetching the deployed
//! application's root URL. Commands run with the project checkout as
//! their working directory so the CLI resolves the right app.
//!
//! Output is captured rather than inherited; command noise would
//! otherwise corrupt `--json` runs.

use std::path::Path;
use std::process::Command;

use crate::error::{DeployCheckError, DeployCheckResult};

/// Deployment-platform seam used by the runner
pub trait PlatformCli {
    /// Currently configured buildpack, if any
    fn current_buildpack(&self, dir: &Path) -> DeployCheckResult<Option<String>>;

    /// Replace the buildpack configuration
    fn set_buildpack(&self, dir: &Path, url: &str) -> DeployCheckResult<()>;

    /// Set a named config var
    fn set_var(&self, dir: &Path, key: &str, value: &str) -> DeployCheckResult<()>;

    /// Explicitly unset a named config var
    fn unset_var(&self, dir: &Path, key: &str) -> DeployCheckResult<()>;

    /// Fetch a named config var; empty string when unset
    fn get_var(&self, dir: &Path, key: &str) -> DeployCheckResult<String>;
}

/// Real `heroku` CLI implementation
pub struct HerokuCli;

impl HerokuCli {
    fn output(&self, dir: &Path, args: &[&str]) -> DeployCheckResult<String> {
        let output = Command::new("heroku")
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| DeployCheckError::Launch {
                program: "heroku".to_string(),
                dir: dir.to_path_buf(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(DeployCheckError::CommandFailed {
                command: format!("heroku {}", args.join(" ")),
                dir: dir.to_path_buf(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn check(&self, dir: &Path, args: &[&str]) -> DeployCheckResult<()> {
        self.output(dir, args).map(|_| ())
    }
}

impl PlatformCli for HerokuCli {
    fn current_buildpack(&self, dir: &Path) -> DeployCheckResult<Option<String>> {
        let listing = self.output(dir, &["buildpacks"])?;
        Ok(parse_buildpack_listing(&listing))
    }

    fn set_buildpack(&self, dir: &Path, url: &str) -> DeployCheckResult<()> {
        self.check(dir, &["buildpacks:set", url])
    }

    fn set_var(&self, dir: &Path, key: &str, value: &str) -> DeployCheckResult<()> {
        self.check(dir, &["config:set", &format!("{}={}", key, value)])
    }

    fn unset_var(&self, dir: &Path, key: &str) -> DeployCheckResult<()> {
        self.check(dir, &["config:unset", key])
    }

    fn get_var(&self, dir: &Path, key: &str) -> DeployCheckResult<String> {
        Ok(self.output(dir, &["config:get", key])?.trim().to_string())
    }
}

/// Extract the configured buildpack from a `heroku buildpacks` listing.
///
/// The CLI prints a `=== app Buildpack URL` header followed by the URL,
/// so the URL is the last whitespace-separated token. An app with no
/// buildpack prints a sentence instead; its last token is still
/// returned and simply never matches a real buildpack URL, which makes
/// the caller enforce one.
fn parse_buildpack_listing(listing: &str) -> Option<String> {
    listing.split_whitespace().last().map(str::to_string)
}
