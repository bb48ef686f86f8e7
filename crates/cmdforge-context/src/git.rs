//! Read-only git sub-snapshot. Shells out to the system `git`
//! binary rather than linking `git2` — the only queries needed are
//! `rev-parse`/`status`/`remote`, and the gatherer must degrade gracefully
//! rather than fail the whole snapshot if `git` is missing or errors.

use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;

use cmdforge_core::cancel::CancellationToken;
use cmdforge_core::model::GitState;
use tokio::process::Command;

/// Walks upward from `start` looking for a `.git` entry. Returns the
/// repository root, or `None` if none was found before reaching `/`.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

/// Runs `git <args>`, returning the trimmed stdout on success. `None`
/// means the query itself failed (missing binary, cancellation, non-zero
/// exit) — an empty-but-successful result (e.g. a clean `status
/// --porcelain`) is `Some(String::new())`, not `None`.
async fn run_git(repo_root: &Path, token: &CancellationToken, args: &[&str]) -> Option<String> {
    let mut child = Command::new("git")
        .args(args)
        .current_dir(repo_root)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let output = tokio::select! {
        result = child.wait_with_output() => result.ok()?,
        _ = token.cancelled() => return None,
    };

    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Builds a [`GitState`] for `repo_root`, pushing a warning onto
/// `warnings` for each sub-query that could not be answered rather than
/// failing the whole gather.
pub async fn snapshot(repo_root: &Path, token: &CancellationToken, warnings: &mut Vec<String>) -> GitState {
    let current_branch = run_git(repo_root, token, &["rev-parse", "--abbrev-ref", "HEAD"]).await;
    if current_branch.is_none() {
        warnings.push("git: could not determine current branch".to_string());
    }

    let last_commit_id = run_git(repo_root, token, &["rev-parse", "HEAD"]).await;
    if last_commit_id.is_none() {
        warnings.push("git: could not determine HEAD commit".to_string());
    }

    let has_uncommitted_changes = match run_git(repo_root, token, &["status", "--porcelain"]).await {
        Some(status) => !status.is_empty(),
        None => {
            warnings.push("git: could not determine working tree status".to_string());
            false
        }
    };

    // A missing `origin` remote is routine, not a degraded sub-gatherer —
    // no warning is pushed for it.
    let remote_url = run_git(repo_root, token, &["remote", "get-url", "origin"]).await;

    GitState {
        is_repo: true,
        current_branch,
        has_uncommitted_changes,
        last_commit_id,
        remote_url,
    }
}
