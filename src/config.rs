//! Run configuration for deploycheck
//!
//! One `RunConfig` is built from CLI arguments and stays immutable for
//! the duration of a run. There is no persistent state anywhere.

use std::path::PathBuf;

/// Buildpack enforced on every project before pushing, unless
/// overridden with `--buildpack`.
pub const DEFAULT_BUILDPACK: &str =
    "https://github.com/AdmitHub/meteor-buildpack-horse.git#devel";

/// Platform config var toggling verbose buildpack output.
pub const VERBOSE_VAR: &str = "BUILDPACK_VERBOSE";

/// Platform config var forcing a clean build cache.
pub const CLEAR_CACHE_VAR: &str = "BUILDPACK_CLEAR_CACHE";

/// Platform config var holding the deployed application's public URL.
pub const ROOT_URL_VAR: &str = "ROOT_URL";

/// Message used for the empty commit that forces a redeploy.
pub const REBUILD_COMMIT_MESSAGE: &str = "Rebuild";

/// Status code recorded for HTTP-probe failures. Negative so it can
/// never collide with a real process exit code.
pub const HTTP_FAILURE_CODE: i32 = -1;

/// Buildpack fixture projects exercised when no names are given on the
/// command line.
pub const DEFAULT_PROJECTS: &[&str] = &[
    "mbh-android",
    // mbh-betarelease: release files no longer on meteor's servers
    "mbh-dynometadata",
    "mbh-ironscaffold",
    "mbh-subdir",
    "mbh-vanilla",
    "mbh-old1.1.0.3",
    "mbh-old1.2.1",
    "mbh-old1.3.5",
    "mbh-1.4",
];

/// Immutable configuration for a single run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Buildpack URL to enforce before pushing
    pub buildpack: String,
    /// Set the verbose-build config var instead of unsetting it
    pub verbose: bool,
    /// Set the clear-cache config var instead of unsetting it
    pub clear_cache: bool,
    /// Directory containing the project checkouts
    pub projects_dir: PathBuf,
    /// Baseline branch that gets the empty commit and the force-push
    pub branch: String,
    /// Name of the deployment remote in each checkout
    pub remote: String,
    /// Projects to exercise, in reporting order
    pub projects: Vec<String>,
}

impl RunConfig {
    /// Working directory for a named project
    pub fn project_dir(&self, name: &str) -> PathBuf {
        self.projects_dir.join(name)
    }
}
