//! Git activity provider.
//!
//! Shells out to the `git` binary for commit history and diffs, scoped
//! to a project's subtree beneath the workspace root. Every invocation
//! uses an argument array (never a shell), runs with a hard timeout, and
//! is killed on timeout via `kill_on_drop`. A hung git can fail a
//! request but never wedge the service.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::warn;

use crate::errors::GitError;
use crate::ident::{CommitHash, ProjectId};
use crate::models::GitCommit;

/// Field separator for `git log --pretty`. Multi-character on purpose:
/// a single character can appear in a commit subject and silently
/// truncate the parsed message.
const FIELD_SEP: &str = "|~|";

const LOG_TIMEOUT: Duration = Duration::from_secs(5);
const DIFF_TIMEOUT: Duration = Duration::from_secs(5);
const FILE_COUNT_TIMEOUT: Duration = Duration::from_secs(3);

pub const DEFAULT_COMMIT_LIMIT: usize = 20;

/// Sentinel returned whenever a diff cannot be produced; the caller
/// always receives renderable text.
pub const DIFF_UNAVAILABLE: &str = "Diff not available";

#[derive(Clone)]
pub struct GitActivity {
    root: PathBuf,
}

impl GitActivity {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// List the most recent commits touching the project's subtree,
    /// newest first.
    ///
    /// The per-commit file count comes from a second scoped query; if
    /// that query fails or times out for a commit, the commit is kept
    /// with a count of 0 rather than aborting the listing.
    pub async fn list_commits(
        &self,
        project: &ProjectId,
        limit: usize,
    ) -> Result<Vec<GitCommit>, GitError> {
        let pathspec = format!("projects/{}", project);
        let format = format!("%H{SEP}%an{SEP}%aI{SEP}%s", SEP = FIELD_SEP);
        let stdout = self
            .run_git(
                &[
                    "log",
                    "-n",
                    &limit.to_string(),
                    &format!("--pretty=format:{}", format),
                    "--",
                    &pathspec,
                ],
                LOG_TIMEOUT,
            )
            .await?;

        let mut commits = Vec::new();
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            let mut parts = line.splitn(4, FIELD_SEP);
            let (Some(hash), Some(author), Some(timestamp), Some(message)) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                warn!(line, "skipping unparseable git log line");
                continue;
            };
            let files_changed = self.count_changed_files(hash, &pathspec).await;
            commits.push(GitCommit {
                hash: hash.to_string(),
                author: author.to_string(),
                timestamp: timestamp.to_string(),
                message: message.to_string(),
                files_changed,
            });
        }
        Ok(commits)
    }

    /// Combined stat+patch rendering for one validated commit, run from
    /// the workspace root. Never errors: any failure yields the
    /// `DIFF_UNAVAILABLE` sentinel.
    pub async fn get_diff(&self, project: &ProjectId, hash: &CommitHash) -> String {
        match self
            .run_git(&["show", hash.as_str(), "--stat", "--patch"], DIFF_TIMEOUT)
            .await
        {
            Ok(diff) if !diff.trim().is_empty() => diff,
            Ok(_) => DIFF_UNAVAILABLE.to_string(),
            Err(e) => {
                warn!(project = %project, hash = %hash, error = %e, "diff unavailable");
                DIFF_UNAVAILABLE.to_string()
            }
        }
    }

    /// Count of files the commit changed within the project subtree;
    /// 0 on any failure.
    async fn count_changed_files(&self, hash: &str, pathspec: &str) -> usize {
        let result = self
            .run_git(
                &[
                    "show",
                    "--name-only",
                    "--pretty=format:",
                    hash,
                    "--",
                    pathspec,
                ],
                FILE_COUNT_TIMEOUT,
            )
            .await;
        match result {
            Ok(stdout) => stdout.lines().filter(|l| !l.trim().is_empty()).count(),
            Err(e) => {
                warn!(hash, error = %e, "file count query failed; recording 0");
                0
            }
        }
    }

    /// Run git with an argument array from the workspace root, bounded
    /// by `limit`. Dropping the wait future on timeout kills the child.
    async fn run_git(&self, args: &[&str], limit: Duration) -> Result<String, GitError> {
        let child = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(GitError::Spawn)?;

        let output = timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| GitError::Timeout {
                seconds: limit.as_secs(),
            })?
            .map_err(GitError::Spawn)?;

        if !output.status.success() {
            return Err(GitError::NonZeroExit {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn git(dir: &Path, args: &[&str]) {
        let status = std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    fn setup_repo() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        git(dir.path(), &["init", "-q"]);
        git(dir.path(), &["config", "user.name", "test"]);
        git(dir.path(), &["config", "user.email", "test@test.com"]);
        dir
    }

    fn commit_file(dir: &Path, rel: &str, content: &str, msg: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        git(dir, &["add", "."]);
        git(dir, &["commit", "-q", "-m", msg]);
    }

    fn pid(s: &str) -> ProjectId {
        ProjectId::parse(s).unwrap()
    }

    #[tokio::test]
    async fn list_commits_newest_first_with_file_counts() {
        let dir = setup_repo();
        commit_file(dir.path(), "projects/proj-1/board.json", "{}", "first");
        commit_file(dir.path(), "projects/proj-1/notes.md", "x", "second");

        let git_activity = GitActivity::new(dir.path());
        let commits = git_activity
            .list_commits(&pid("proj-1"), DEFAULT_COMMIT_LIMIT)
            .await
            .unwrap();

        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].message, "second");
        assert_eq!(commits[1].message, "first");
        assert_eq!(commits[0].files_changed, 1);
        assert_eq!(commits[0].author, "test");
        assert_eq!(commits[0].hash.len(), 40);
    }

    #[tokio::test]
    async fn list_commits_scopes_to_project_subtree() {
        let dir = setup_repo();
        commit_file(dir.path(), "projects/proj-1/board.json", "{}", "mine");
        commit_file(dir.path(), "projects/proj-2/board.json", "{}", "other");

        let git_activity = GitActivity::new(dir.path());
        let commits = git_activity
            .list_commits(&pid("proj-1"), DEFAULT_COMMIT_LIMIT)
            .await
            .unwrap();

        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].message, "mine");
    }

    #[tokio::test]
    async fn list_commits_respects_limit() {
        let dir = setup_repo();
        for i in 0..5 {
            commit_file(
                dir.path(),
                "projects/proj-1/board.json",
                &format!("{{\"v\": {}}}", i),
                &format!("commit {}", i),
            );
        }

        let git_activity = GitActivity::new(dir.path());
        let commits = git_activity.list_commits(&pid("proj-1"), 3).await.unwrap();
        assert_eq!(commits.len(), 3);
        assert_eq!(commits[0].message, "commit 4");
    }

    #[tokio::test]
    async fn message_containing_single_pipe_survives() {
        let dir = setup_repo();
        commit_file(
            dir.path(),
            "projects/proj-1/board.json",
            "{}",
            "fix: a | b | c",
        );

        let git_activity = GitActivity::new(dir.path());
        let commits = git_activity
            .list_commits(&pid("proj-1"), DEFAULT_COMMIT_LIMIT)
            .await
            .unwrap();
        assert_eq!(commits[0].message, "fix: a | b | c");
    }

    #[tokio::test]
    async fn list_commits_outside_a_repo_errors() {
        let dir = tempdir().unwrap();
        let git_activity = GitActivity::new(dir.path());
        let result = git_activity
            .list_commits(&pid("proj-1"), DEFAULT_COMMIT_LIMIT)
            .await;
        assert!(matches!(result, Err(GitError::NonZeroExit { .. })));
    }

    #[tokio::test]
    async fn get_diff_returns_patch_text() {
        let dir = setup_repo();
        commit_file(
            dir.path(),
            "projects/proj-1/board.json",
            "{\"tasks\": []}",
            "add board",
        );

        let git_activity = GitActivity::new(dir.path());
        let commits = git_activity
            .list_commits(&pid("proj-1"), DEFAULT_COMMIT_LIMIT)
            .await
            .unwrap();
        let hash = CommitHash::parse(&commits[0].hash).unwrap();

        let diff = git_activity.get_diff(&pid("proj-1"), &hash).await;
        assert!(diff.contains("board.json"));
        assert!(diff.contains("add board"));
    }

    #[tokio::test]
    async fn get_diff_unknown_commit_yields_sentinel() {
        let dir = setup_repo();
        commit_file(dir.path(), "projects/proj-1/board.json", "{}", "init");

        let git_activity = GitActivity::new(dir.path());
        let missing = CommitHash::parse("deadbeefdeadbeefdeadbeefdeadbeefdeadbeef").unwrap();
        let diff = git_activity.get_diff(&pid("proj-1"), &missing).await;
        assert_eq!(diff, DIFF_UNAVAILABLE);
    }

    #[tokio::test]
    async fn get_diff_outside_a_repo_yields_sentinel() {
        let dir = tempdir().unwrap();
        let git_activity = GitActivity::new(dir.path());
        let hash = CommitHash::parse("abc123").unwrap();
        assert_eq!(git_activity.get_diff(&pid("proj-1"), &hash).await, DIFF_UNAVAILABLE);
    }
}
