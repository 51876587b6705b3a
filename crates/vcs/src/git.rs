//! `VcsBackend` implemented by invoking the `git` binary

use crate::backend::{ListedFile, Scan, VcsBackend};
use crate::command::{CommandOutput, CommandRunner, CommandSpec, SystemCommandRunner};
use crate::parse::{parse_ls_files, parse_path_list, ref_commit};
use async_trait::async_trait;
use stamp_core::constants::DEFAULT_NETWORK_TIMEOUT_SECS;
use stamp_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Exit code git uses for "fatal" errors such as "not a git repository"
/// or, for `diff-index HEAD`, an unborn HEAD
const EXIT_FATAL: i32 = 128;

const GIT_BINARY: &str = "git";

/// Git backend driving the `git` binary through a [`CommandRunner`]
#[derive(Clone)]
pub struct GitBackend {
    runner: Arc<dyn CommandRunner>,
    network_timeout: Duration,
}

impl std::fmt::Debug for GitBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitBackend")
            .field("network_timeout", &self.network_timeout)
            .finish()
    }
}

impl Default for GitBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GitBackend {
    /// Backend using the `git` on `PATH`
    pub fn new() -> Self {
        Self::with_runner(Arc::new(SystemCommandRunner::new()))
    }

    pub fn with_runner(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            network_timeout: Duration::from_secs(DEFAULT_NETWORK_TIMEOUT_SECS),
        }
    }

    /// Limit for clone, fetch, ls-remote and remote update
    pub fn network_timeout(mut self, timeout: Duration) -> Self {
        self.network_timeout = timeout;
        self
    }

    fn local(&self, cwd: &Path, args: &[&str]) -> CommandSpec {
        CommandSpec::new(GIT_BINARY, cwd).args(args.iter().copied())
    }

    fn network(&self, cwd: &Path, args: &[&str]) -> CommandSpec {
        self.local(cwd, args)
            // Never block on an interactive credential prompt
            .env("GIT_TERMINAL_PROMPT", "0")
            .timeout(self.network_timeout)
    }

    async fn run(&self, spec: CommandSpec) -> Result<(CommandSpec, CommandOutput)> {
        tracing::trace!(command = %spec.display(), cwd = %spec.cwd.display(), "running git");
        let output = self.runner.run(&spec).await?;
        Ok((spec, output))
    }

    /// Run a command that must succeed, returning its stdout
    async fn run_checked(&self, spec: CommandSpec) -> Result<String> {
        let (spec, output) = self.run(spec).await?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(failure(&spec, &output))
        }
    }

    /// Run a scan-family command, mapping exit 128 to `NotARepository`
    async fn run_scan(&self, spec: CommandSpec) -> Result<Scan<String>> {
        let (spec, output) = self.run(spec).await?;
        match output.status_code {
            Some(0) => Ok(Scan::Found(output.stdout)),
            Some(EXIT_FATAL) => {
                tracing::debug!(
                    cwd = %spec.cwd.display(),
                    stderr = %output.stderr.trim(),
                    "not inside a repository"
                );
                Ok(Scan::NotARepository)
            }
            _ => Err(failure(&spec, &output)),
        }
    }
}

/// Full branch, tag and peeled-tag names for `ref_name`
fn exact_refs(ref_name: &str) -> (String, String, String) {
    let tag = format!("refs/tags/{ref_name}");
    let peeled = format!("{tag}^{{}}");
    (format!("refs/heads/{ref_name}"), tag, peeled)
}

fn failure(spec: &CommandSpec, output: &CommandOutput) -> Error {
    let message = match output.stderr.trim() {
        "" => "no error output".to_string(),
        stderr => stderr.to_string(),
    };
    Error::command_execution(&spec.program, spec.args.clone(), message, output.status_code)
}

#[async_trait]
impl VcsBackend for GitBackend {
    async fn top_level(&self, path: &Path) -> Result<Scan<PathBuf>> {
        let spec = self.local(path, &["rev-parse", "--show-toplevel"]);
        Ok(match self.run_scan(spec).await? {
            Scan::Found(stdout) => Scan::Found(PathBuf::from(stdout.trim_end_matches(['\n', '\r']))),
            Scan::NotARepository => Scan::NotARepository,
            Scan::NoCommits => Scan::NoCommits,
        })
    }

    async fn list_files(&self, path: &Path, exclude_dir: &str) -> Result<Scan<Vec<ListedFile>>> {
        let exclude = format!("--exclude={exclude_dir}");
        let spec = self.local(
            path,
            &["ls-files", "-s", "--other", &exclude, "--exclude-standard", "."],
        );
        Ok(match self.run_scan(spec).await? {
            Scan::Found(stdout) => Scan::Found(parse_ls_files(&stdout)),
            Scan::NotARepository => Scan::NotARepository,
            Scan::NoCommits => Scan::NoCommits,
        })
    }

    async fn list_ignored(&self, path: &Path, ignore_file: &str) -> Result<Scan<Vec<PathBuf>>> {
        let per_directory = format!("--exclude-per-directory={ignore_file}");
        let spec = self.local(
            path,
            &["ls-files", "--cached", "--other", "--ignored", &per_directory, "."],
        );
        Ok(match self.run_scan(spec).await? {
            Scan::Found(stdout) => Scan::Found(parse_path_list(&stdout)),
            Scan::NotARepository => Scan::NotARepository,
            Scan::NoCommits => Scan::NoCommits,
        })
    }

    async fn list_modified(&self, path: &Path) -> Result<Scan<Vec<PathBuf>>> {
        let spec = self.local(path, &["diff-index", "--name-only", "HEAD", "."]);
        let (spec, output) = self.run(spec).await?;
        match output.status_code {
            Some(0) => Ok(Scan::Found(parse_path_list(&output.stdout))),
            // Either an unborn HEAD or no repository at all; both mean nothing is modified
            Some(EXIT_FATAL) => {
                tracing::debug!(
                    cwd = %spec.cwd.display(),
                    stderr = %output.stderr.trim(),
                    "no commits to compare against"
                );
                Ok(Scan::NoCommits)
            }
            _ => Err(failure(&spec, &output)),
        }
    }

    async fn clone_ref(&self, url: &str, ref_name: &str, dest: &Path) -> Result<()> {
        let parent = dest.parent().unwrap_or(dest);
        let branch = format!("--branch={ref_name}");
        let dest_str = dest.to_string_lossy();
        let spec = self.network(parent, &["clone", "--depth=1", &branch, url, &dest_str]);
        self.run_checked(spec).await.map(|_| ())
    }

    async fn remote_update(&self, checkout: &Path) -> Result<()> {
        let spec = self.network(checkout, &["remote", "update"]);
        self.run_checked(spec).await.map(|_| ())
    }

    async fn remote_commit(
        &self,
        checkout: &Path,
        url: &str,
        ref_name: &str,
    ) -> Result<Option<String>> {
        let (branch, tag, peeled) = exact_refs(ref_name);
        let spec = self.network(checkout, &["ls-remote", url, &branch, &tag, &peeled]);
        let stdout = self.run_checked(spec).await?;
        Ok(ref_commit(&stdout, ref_name))
    }

    async fn local_commit(&self, checkout: &Path, ref_name: &str) -> Result<Option<String>> {
        let (branch, tag, _) = exact_refs(ref_name);
        let spec = self.local(checkout, &["show-ref", "--dereference", &branch, &tag]);
        let (spec, output) = self.run(spec).await?;
        match output.status_code {
            Some(0) => Ok(ref_commit(&output.stdout, ref_name)),
            // show-ref exits 1 when nothing matches
            Some(1) if output.stdout.trim().is_empty() => Ok(None),
            _ => Err(failure(&spec, &output)),
        }
    }

    async fn fetch_ref(&self, checkout: &Path, ref_name: &str) -> Result<()> {
        let spec = self.network(checkout, &["fetch", "--depth=1", "origin", ref_name]);
        self.run_checked(spec).await.map(|_| ())
    }

    async fn reset_hard(&self, checkout: &Path, ref_name: &str) -> Result<()> {
        let target = format!("origin/{ref_name}");
        let spec = self.local(checkout, &["reset", "--hard", &target]);
        self.run_checked(spec).await.map(|_| ())
    }
}
