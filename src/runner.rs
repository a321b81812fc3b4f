//! Deploy-and-verify runner
//!
//! Orchestrates one run: fan-out (normalize platform config, check out
//! the baseline branch, create the empty commit, start the force-push,
//! per project in list order) followed by fan-in (join each push in the
//! same order, revert the empty commit, classify the result, probe the
//! root URL). Joining in launch order keeps reporting deterministic
//! while the remote builds overlap.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::{
    RunConfig, CLEAR_CACHE_VAR, HTTP_FAILURE_CODE, REBUILD_COMMIT_MESSAGE, ROOT_URL_VAR,
    VERBOSE_VAR,
};
use crate::error::{DeployCheckError, DeployCheckResult};
use crate::git::{PushInFlight, PushOutput, Vcs};
use crate::platform::PlatformCli;
use crate::probe::HttpProbe;

/// Lifecycle of a single project within a run.
///
/// `pending → configuring → pushed → (build_failed | build_succeeded)
/// → (probe_skipped | probe_passed | probe_failed)`. No retries; one
/// failure is final for that project within the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectState {
    Pending,
    Configuring,
    Pushed,
    BuildFailed,
    BuildSucceeded,
    ProbeSkipped,
    ProbePassed,
    ProbeFailed,
}

impl ProjectState {
    /// Terminal states end a project's processing
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::BuildFailed | Self::ProbeSkipped | Self::ProbePassed | Self::ProbeFailed
        )
    }

    /// A project passes when it either probed healthy or had nothing
    /// to probe
    pub fn passed(self) -> bool {
        matches!(self, Self::ProbeSkipped | Self::ProbePassed)
    }
}

/// Failure attributed to one project. Created once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub name: String,
    pub stdout: String,
    pub stderr: String,
    /// Push exit code, or [`HTTP_FAILURE_CODE`] for probe failures
    pub code: i32,
}

/// Per-project bookkeeping for one run
#[derive(Debug)]
pub struct ProjectTask {
    pub name: String,
    pub dir: PathBuf,
    pub state: ProjectState,
    /// Wall time from configuration start to push completion
    pub elapsed: Option<Duration>,
}

/// Everything a run produced, in project list order
#[derive(Debug)]
pub struct RunOutcome {
    pub tasks: Vec<ProjectTask>,
    pub errors: Vec<ErrorRecord>,
}

struct InFlight {
    push: Box<dyn PushInFlight>,
    started: Instant,
}

/// Run the whole harness over `config.projects`.
///
/// Build/push and probe failures are recorded in the outcome and the
/// run continues; anything else (configuration-command failures,
/// unreadable project directories) aborts the run with an error. Pushes
/// already in flight when an abort happens are still joined and their
/// empty commits reverted, so checkouts are back in their pre-run state
/// either way.
pub fn run(
    config: &RunConfig,
    vcs: &dyn Vcs,
    platform: &dyn PlatformCli,
    probe: &dyn HttpProbe,
    json: bool,
) -> DeployCheckResult<RunOutcome> {
    let mut tasks: Vec<ProjectTask> = config
        .projects
        .iter()
        .map(|name| ProjectTask {
            name: name.clone(),
            dir: config.project_dir(name),
            state: ProjectState::Pending,
            elapsed: None,
        })
        .collect();

    // Fan-out: start every push in list order.
    let mut inflight: Vec<InFlight> = Vec::new();
    let mut fatal: Option<DeployCheckError> = None;
    for task in tasks.iter_mut() {
        match start_project(config, vcs, platform, task, json) {
            Ok(push) => inflight.push(push),
            Err(e) => {
                fatal = Some(e);
                break;
            }
        }
    }

    // Fan-in: join in the same order. The revert is mandatory and runs
    // whether or not the push succeeded.
    let mut errors: Vec<ErrorRecord> = Vec::new();
    for (task, flight) in tasks.iter_mut().zip(inflight) {
        if !json {
            println!();
            println!("⏳ waiting on {}", task.name);
        }
        let waited = flight.push.wait();
        let reset = vcs.reset_to_parent(&task.dir);
        task.elapsed = Some(flight.started.elapsed());

        if fatal.is_some() {
            // Aborting: only the cleanup above matters for this project.
            continue;
        }
        let output = match waited {
            Ok(output) => output,
            Err(e) => {
                fatal = Some(e);
                continue;
            }
        };
        if let Err(e) = reset {
            fatal = Some(e);
            continue;
        }
        if let Err(e) = classify(platform, probe, task, output, &mut errors, json) {
            fatal = Some(e);
        }
    }

    if let Some(e) = fatal {
        return Err(e);
    }
    Ok(RunOutcome { tasks, errors })
}

/// Launch phase for one project: normalize platform config, check out
/// the baseline branch, create the empty commit, start the force-push.
fn start_project(
    config: &RunConfig,
    vcs: &dyn Vcs,
    platform: &dyn PlatformCli,
    task: &mut ProjectTask,
    json: bool,
) -> DeployCheckResult<InFlight> {
    let started = Instant::now();
    task.state = ProjectState::Configuring;

    if !task.dir.is_dir() {
        return Err(DeployCheckError::ProjectDirNotFound {
            path: task.dir.clone(),
        });
    }
    if !json {
        println!();
        println!("🚀 {} ({})", task.name, task.dir.display());
    }

    let current = platform.current_buildpack(&task.dir)?;
    if current.as_deref() != Some(config.buildpack.as_str()) {
        if !json {
            println!("  buildpacks:set {}", config.buildpack);
        }
        platform.set_buildpack(&task.dir, &config.buildpack)?;
    }
    if config.verbose {
        platform.set_var(&task.dir, VERBOSE_VAR, "1")?;
    } else {
        platform.unset_var(&task.dir, VERBOSE_VAR)?;
    }
    if config.clear_cache {
        platform.set_var(&task.dir, CLEAR_CACHE_VAR, "1")?;
    } else {
        platform.unset_var(&task.dir, CLEAR_CACHE_VAR)?;
    }

    if !json {
        println!("  checkout {}", config.branch);
    }
    vcs.checkout(&task.dir, &config.branch)?;
    if !json {
        println!("  empty commit");
    }
    vcs.commit_empty(&task.dir, REBUILD_COMMIT_MESSAGE)?;
    if !json {
        println!("  push --force {} {}", config.remote, config.branch);
    }
    // The empty commit exists from here until the fan-in revert; if the
    // push cannot even be spawned, revert right away.
    match vcs.start_force_push(&task.dir, &config.remote, &config.branch) {
        Ok(push) => {
            task.state = ProjectState::Pushed;
            Ok(InFlight { push, started })
        }
        Err(e) => {
            let _ = vcs.reset_to_parent(&task.dir);
            Err(e)
        }
    }
}

/// Classify a completed push and, on success, probe the root URL.
fn classify(
    platform: &dyn PlatformCli,
    probe: &dyn HttpProbe,
    task: &mut ProjectTask,
    output: PushOutput,
    errors: &mut Vec<ErrorRecord>,
    json: bool,
) -> DeployCheckResult<()> {
    let elapsed = task.elapsed.unwrap_or_default();

    if output.code != 0 {
        task.state = ProjectState::BuildFailed;
        if !json {
            println!("{}", output.stderr);
            println!("BUILD TIME: {:.1} seconds", elapsed.as_secs_f64());
        }
        errors.push(ErrorRecord {
            name: task.name.clone(),
            stdout: output.stdout,
            stderr: output.stderr,
            code: output.code,
        });
        return Ok(());
    }

    task.state = ProjectState::BuildSucceeded;
    if !json {
        println!("{}", output.stdout);
        println!("{}", output.stderr);
        println!("BUILD TIME: {:.1} seconds", elapsed.as_secs_f64());
    }

    let root_url = platform.get_var(&task.dir, ROOT_URL_VAR)?;
    if root_url.is_empty() {
        // Some projects (dyno metadata) have no public URL; not an error.
        task.state = ProjectState::ProbeSkipped;
        if !json {
            println!("Skipping GET for {} ({} not defined)", task.name, ROOT_URL_VAR);
        }
        return Ok(());
    }

    let code = probe.status(&root_url);
    if !json {
        println!("GET {}: {}", root_url, code);
    }
    if code == 200 {
        task.state = ProjectState::ProbePassed;
    } else {
        task.state = ProjectState::ProbeFailed;
        errors.push(ErrorRecord {
            name: task.name.clone(),
            stdout: String::new(),
            stderr: format!("Status code {} retrieving {}", code, root_url),
            code: HTTP_FAILURE_CODE,
        });
    }
    Ok(())
}
