//! deploycheck CLI
//!
//! Redeploys each configured project by force-pushing an empty commit,
//! waits for the remote build, reverts the commit, and probes the
//! deployed application's root URL. Exits 0 only when every project
//! builds and answers healthy.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use deploycheck::config::{DEFAULT_BUILDPACK, DEFAULT_PROJECTS};
use deploycheck::{run, GitCli, HerokuCli, RunConfig, RunReport, UreqProbe};

/// Deploycheck - redeploy buildpack projects and verify them over HTTP
#[derive(Parser, Debug)]
#[command(name = "deploycheck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project names to exercise (defaults to the built-in fixture list)
    project: Vec<String>,

    /// Directory containing the project checkouts
    #[arg(long, default_value = "projects")]
    projects_dir: PathBuf,

    /// Buildpack URL to enforce before pushing
    #[arg(long, default_value = DEFAULT_BUILDPACK)]
    buildpack: String,

    /// Set BUILDPACK_VERBOSE=1 on the platform (explicitly unset when absent)
    #[arg(long)]
    verbose: bool,

    /// Set BUILDPACK_CLEAR_CACHE=1 on the platform (explicitly unset when absent)
    #[arg(long)]
    clear_cache: bool,

    /// Baseline branch that gets the empty commit and the force-push
    #[arg(long, default_value = "master")]
    branch: String,

    /// Name of the deployment remote in each checkout
    #[arg(long, default_value = "heroku")]
    remote: String,

    /// Machine-readable JSON report on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let projects = if cli.project.is_empty() {
        DEFAULT_PROJECTS.iter().map(|s| s.to_string()).collect()
    } else {
        cli.project
    };
    let config = RunConfig {
        buildpack: cli.buildpack,
        verbose: cli.verbose,
        clear_cache: cli.clear_cache,
        projects_dir: cli.projects_dir,
        branch: cli.branch,
        remote: cli.remote,
        projects,
    };

    let outcome = run(&config, &GitCli, &HerokuCli, &UreqProbe, cli.json)?;
    let report = RunReport::from_outcome(outcome);
    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        report.print_human();
    }

    if report.exit_code() != 0 {
        std::process::exit(1);
    }
    Ok(())
}
