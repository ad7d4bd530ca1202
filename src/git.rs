//! Git command wrappers.
//!
//! This module provides the [`RepositoryClient`] seam the cleanup pass talks
//! to, and [`GitCli`], the implementation that shells out to the `git` binary.

use anyhow::Context;
use colored::Colorize;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Callback invoked with the arguments of every git command before it runs.
pub type GitLogger = fn(&[&str]);

/// Echoes each git invocation to stderr.
pub fn verbose_logger(args: &[&str]) {
    eprintln!("    {} {}", "$ git".dimmed(), args.join(" ").dimmed());
}

pub fn no_op_logger(_args: &[&str]) {}

/// Source-control operations consumed by the cleanup pass.
///
/// Every method maps to one external command. Failures come back as
/// `Err`; deciding whether a failure is fatal is up to the caller.
pub trait RepositoryClient {
    /// Raw `git branch` listing, one branch per line.
    fn list_branches(&self) -> anyhow::Result<String>;

    /// Metadata and diff of the commit at the tip of `rev`.
    fn show_commit(&self, rev: &str) -> anyhow::Result<String>;

    /// Streams the log of every commit reachable from `rev` that mentions a
    /// `Change-Id`, calling `on_line` once per output line.
    ///
    /// Returns `Err` if the log cannot be started, read to the end, or exits
    /// with a non-zero status.
    fn scan_history(&self, rev: &str, on_line: &mut dyn FnMut(&str)) -> anyhow::Result<()>;

    /// Abbreviated object id of a fully qualified ref. `Err` means the ref
    /// does not exist.
    fn resolve_short_ref(&self, reference: &str) -> anyhow::Result<String>;

    /// Force-deletes a local branch.
    fn delete_branch(&self, name: &str) -> anyhow::Result<()>;

    fn delete_tag(&self, name: &str) -> anyhow::Result<()>;
}

/// Runs `git <args>` in `repo` and returns trimmed stdout.
pub fn run_git(repo: &Path, args: &[&str], logger: GitLogger) -> anyhow::Result<String> {
    logger(args);
    let output = Command::new("git")
        .current_dir(repo)
        .args(args)
        .output()
        .context("Failed to execute git command")?;

    if output.status.success() {
        let result = String::from_utf8_lossy(&output.stdout);
        Ok(result.as_ref().trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("git {} failed: {}", args.join(" "), stderr.trim())
    }
}

fn validate_ref_name(name: &str) -> anyhow::Result<()> {
    if name.is_empty() || name.starts_with('-') || name.contains('\0') || name.contains('\n') {
        anyhow::bail!("Invalid ref name: {:?}", name);
    }
    Ok(())
}

/// [`RepositoryClient`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo: PathBuf,
    logger: GitLogger,
}

impl GitCli {
    pub fn new(repo: impl Into<PathBuf>, logger: GitLogger) -> Self {
        Self {
            repo: repo.into(),
            logger,
        }
    }

    fn git(&self, args: &[&str]) -> anyhow::Result<String> {
        run_git(&self.repo, args, self.logger)
    }
}

impl RepositoryClient for GitCli {
    fn list_branches(&self) -> anyhow::Result<String> {
        self.git(&["branch"]).context("Failed to list branches")
    }

    fn show_commit(&self, rev: &str) -> anyhow::Result<String> {
        validate_ref_name(rev)?;
        self.git(&["show", rev, "--"])
            .with_context(|| format!("Failed to show '{}'", rev))
    }

    fn scan_history(&self, rev: &str, on_line: &mut dyn FnMut(&str)) -> anyhow::Result<()> {
        validate_ref_name(rev)?;
        let args = ["log", "-F", "--grep", "Change-Id:", rev, "--"];
        (self.logger)(&args);

        let mut child = Command::new("git")
            .current_dir(&self.repo)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start git log for '{}'", rev))?;

        // Both pipes must be drained concurrently.
        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut text = String::new();
                let _ = pipe.read_to_string(&mut text);
                text
            })
        });

        let stdout = child
            .stdout
            .take()
            .context("git log did not expose its output")?;
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => on_line(String::from_utf8_lossy(&buf).trim_end()),
                Err(err) => {
                    // Reap the child before reporting.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(err)
                        .with_context(|| format!("Failed to read git log for '{}'", rev));
                }
            }
        }

        let status = child
            .wait()
            .with_context(|| format!("Failed to wait for git log for '{}'", rev))?;
        let stderr = stderr
            .and_then(|reader| reader.join().ok())
            .unwrap_or_default();
        if !status.success() {
            anyhow::bail!("git {} failed: {}", args.join(" "), stderr.trim());
        }
        Ok(())
    }

    fn resolve_short_ref(&self, reference: &str) -> anyhow::Result<String> {
        validate_ref_name(reference)?;
        self.git(&["rev-parse", "--verify", "--quiet", "--short", reference])
            .with_context(|| format!("Failed to resolve '{}'", reference))
    }

    fn delete_branch(&self, name: &str) -> anyhow::Result<()> {
        validate_ref_name(name)?;
        self.git(&["branch", "-D", name])
            .with_context(|| format!("Failed to delete branch '{}'", name))?;
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> anyhow::Result<()> {
        validate_ref_name(name)?;
        self.git(&["tag", "-d", name])
            .with_context(|| format!("Failed to delete tag '{}'", name))?;
        Ok(())
    }
}
