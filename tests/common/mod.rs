#![allow(dead_code)]
//! Common test utilities for deploycheck integration tests.
//!
//! Provides `TestEnv`, an isolated fixture with temp directories: real
//! git project checkouts whose `heroku` remote is a local bare repo, a
//! stub `heroku` executable placed first on PATH, and a one-shot HTTP
//! listener for probe responses.

use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;

use tempfile::TempDir;

/// Result of running the deploycheck binary
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated test environment.
///
/// Layout under the temp root:
///   bin/heroku        stub platform CLI (state in dot-files per project)
///   projects/<name>   git checkouts under test
///   remotes/<name>.git  bare repos standing in for the platform remote
pub struct TestEnv {
    pub root: TempDir,
    bin_dir: PathBuf,
    deploycheck_bin: PathBuf,
}

const HEROKU_STUB: &str = r#"#!/bin/sh
# Minimal heroku CLI stand-in; state lives in dot-files in the cwd.
case "$1" in
  buildpacks)
    if [ -f .heroku-buildpack ]; then
      echo "=== fixture Buildpack URL"
      cat .heroku-buildpack
    else
      echo "fixture has no Buildpack URL set."
    fi
    ;;
  buildpacks:set)
    printf '%s\n' "$2" > .heroku-buildpack
    ;;
  config:set)
    key="${2%%=*}"
    value="${2#*=}"
    printf '%s\n' "$value" > ".heroku-config-$key"
    ;;
  config:unset)
    rm -f ".heroku-config-$2"
    ;;
  config:get)
    cat ".heroku-config-$2" 2>/dev/null
    echo
    ;;
  *)
    echo "heroku stub: unsupported: $*" >&2
    exit 64
    ;;
esac
"#;

impl TestEnv {
    pub fn new() -> Self {
        let root = TempDir::new().expect("failed to create temp root");
        let bin_dir = root.path().join("bin");
        fs::create_dir_all(&bin_dir).unwrap();
        fs::create_dir_all(root.path().join("projects")).unwrap();
        fs::create_dir_all(root.path().join("remotes")).unwrap();

        let stub = bin_dir.join("heroku");
        fs::write(&stub, HEROKU_STUB).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&stub, fs::Permissions::from_mode(0o755)).unwrap();
        }

        TestEnv {
            root,
            bin_dir,
            deploycheck_bin: PathBuf::from(env!("CARGO_BIN_EXE_deploycheck")),
        }
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.path().join("projects")
    }

    pub fn project_dir(&self, name: &str) -> PathBuf {
        self.projects_dir().join(name)
    }

    /// Create a project checkout with one commit on master and a local
    /// bare repo wired up as its `heroku` remote.
    pub fn add_project(&self, name: &str) -> PathBuf {
        let dir = self.project_dir(name);
        fs::create_dir_all(&dir).unwrap();
        git(&dir, &["init", "-b", "master"]);
        git(&dir, &["config", "user.email", "tests@example.com"]);
        git(&dir, &["config", "user.name", "deploycheck tests"]);
        fs::write(dir.join("README"), "fixture project\n").unwrap();
        git(&dir, &["add", "README"]);
        git(&dir, &["commit", "-m", "initial"]);

        let remote = self.root.path().join("remotes").join(format!("{name}.git"));
        fs::create_dir_all(&remote).unwrap();
        git(&remote, &["init", "--bare"]);
        git(&dir, &["remote", "add", "heroku", remote.to_str().unwrap()]);
        dir
    }

    /// Point the project's deployment remote at a path that does not
    /// exist so its push fails.
    pub fn break_remote(&self, name: &str) {
        git(
            &self.project_dir(name),
            &["remote", "set-url", "heroku", "/nonexistent/deploycheck-remote.git"],
        );
    }

    /// Seed the stub platform's ROOT_URL for a project
    pub fn set_root_url(&self, name: &str, url: &str) {
        fs::write(self.project_dir(name).join(".heroku-config-ROOT_URL"), url).unwrap();
    }

    pub fn commit_count(&self, name: &str) -> usize {
        let output = Command::new("git")
            .arg("-C")
            .arg(self.project_dir(name))
            .args(["rev-list", "--count", "HEAD"])
            .output()
            .expect("failed to run git rev-list");
        String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse()
            .expect("rev-list count was not a number")
    }

    /// Run deploycheck against this environment's projects directory
    pub fn run(&self, args: &[&str]) -> TestResult {
        let path = format!(
            "{}:{}",
            self.bin_dir.display(),
            std::env::var("PATH").unwrap_or_default()
        );
        let output = Command::new(&self.deploycheck_bin)
            .current_dir(self.root.path())
            .env("PATH", path)
            .arg("--projects-dir")
            .arg(self.projects_dir())
            .args(args)
            .output()
            .expect("failed to execute deploycheck");
        output_to_result(output)
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("failed to run git");
    assert!(status.success(), "git {:?} failed in {}", args, dir.display());
}

/// Serve one canned HTTP response on a throwaway port, returning the
/// URL to probe.
pub fn serve_once(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let response =
                format!("{status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}/")
}
