//! Test infrastructure for git-cleanup integration tests.
#![allow(dead_code)]

use anyhow::Result;
use git_cleanup::git::{GitCli, no_op_logger, run_git};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary git repository for testing.
/// Automatically cleaned up when dropped.
pub struct TestRepo {
    _temp_dir: TempDir,
    path: PathBuf,
}

impl TestRepo {
    /// Creates a new test repository with an initial commit on the master branch.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("repo");
        std::fs::create_dir(&path)?;

        git(&path, &["init", "-b", "master"])?;
        git(&path, &["config", "user.email", "test@example.com"])?;
        git(&path, &["config", "user.name", "Test User"])?;

        std::fs::write(path.join("README.md"), "# Test Repo\n")?;
        git(&path, &["add", "README.md"])?;
        git(&path, &["commit", "-m", "Initial commit"])?;

        Ok(Self {
            _temp_dir: temp_dir,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn client(&self) -> GitCli {
        GitCli::new(&self.path, no_op_logger)
    }

    pub fn git(&self, args: &[&str]) -> Result<String> {
        git(&self.path, args)
    }

    /// Creates `name` at `start` and commits a change carrying `change_id` on it.
    /// Leaves the current branch unchanged.
    pub fn branch_with_change(&self, name: &str, start: &str, change_id: Option<&str>) -> Result<()> {
        let current = self.git(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        self.git(&["checkout", "-q", "-b", name, start])?;
        self.commit_change(&format!("work on {}", name), change_id)?;
        self.git(&["checkout", "-q", &current])?;
        Ok(())
    }

    /// Commits a file change on the current branch.
    pub fn commit_change(&self, subject: &str, change_id: Option<&str>) -> Result<()> {
        let file = format!("{}.txt", subject.replace([' ', '/'], "_"));
        std::fs::write(self.path.join(&file), format!("{}\n", subject))?;
        self.git(&["add", &file])?;
        let message = match change_id {
            Some(id) => format!("{}\n\nChange-Id: {}\n", subject, id),
            None => subject.to_string(),
        };
        self.git(&["commit", "-q", "-m", &message])?;
        Ok(())
    }

    pub fn checkout(&self, branch: &str) -> Result<()> {
        self.git(&["checkout", "-q", branch])?;
        Ok(())
    }

    pub fn tag(&self, name: &str, rev: &str) -> Result<()> {
        self.git(&["tag", name, rev])?;
        Ok(())
    }

    /// Checks `branch` out in a secondary worktree under the temp dir.
    pub fn add_worktree(&self, branch: &str) -> Result<PathBuf> {
        let dir = self._temp_dir.path().join(format!("wt-{}", branch));
        let dir_arg = dir.to_string_lossy().to_string();
        self.git(&["worktree", "add", "-q", &dir_arg, branch])?;
        Ok(dir)
    }

    pub fn branch_exists(&self, name: &str) -> bool {
        self.ref_exists(&format!("refs/heads/{}", name))
    }

    pub fn tag_exists(&self, name: &str) -> bool {
        self.ref_exists(&format!("refs/tags/{}", name))
    }

    fn ref_exists(&self, reference: &str) -> bool {
        self.git(&["rev-parse", "--verify", "--quiet", reference]).is_ok()
    }
}

fn git(path: &Path, args: &[&str]) -> Result<String> {
    run_git(path, args, no_op_logger)
}
