//! C2 — Context Gatherer.
//!
//! Grounded in `cli/src/git_commands.rs`'s approach to probing git state
//! without linking `git2`, generalized to a bounded filesystem snapshot
//! plus a curated environment overlay. Never writes; the only subprocess
//! it ever spawns is a read-only `git` query.

mod git;

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use cmdforge_core::cancel::CancellationToken;
use cmdforge_core::error::AppError;
use cmdforge_core::error::AppResult;
use cmdforge_core::error::ErrorKind;
use cmdforge_core::model::Context;
use cmdforge_core::model::FileEntry;
use cmdforge_core::traits::ContextGatherer;
use tracing::instrument;
use tracing::warn;

/// Environment variable names surfaced to the LLM provider. Deliberately
/// small: the full process environment is never forwarded.
const ENV_ALLOWLIST: &[&str] = &["SHELL", "PATH", "USER", "HOME", "LANG", "TERM", "PWD"];

/// Filesystem + git + environment snapshot builder.
pub struct DefaultContextGatherer {
    max_entries: usize,
}

impl DefaultContextGatherer {
    pub fn new() -> Self {
        Self {
            max_entries: Context::DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self { max_entries }
    }
}

impl Default for DefaultContextGatherer {
    fn default() -> Self {
        Self::new()
    }
}

fn list_children(dir: &Path, max_entries: usize, warnings: &mut Vec<String>) -> (Vec<FileEntry>, bool) {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            warnings.push(format!("could not list directory entries: {e}"));
            return (Vec::new(), false);
        }
    };

    let mut entries = Vec::new();
    for item in read_dir.flatten() {
        let metadata = match item.metadata() {
            Ok(m) => m,
            Err(_) => continue,
        };
        let modified_at = metadata.modified().ok().map(DateTime::<Utc>::from);
        entries.push(FileEntry {
            name: item.file_name().to_string_lossy().into_owned(),
            is_directory: metadata.is_dir(),
            size: metadata.len(),
            modified_at,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let truncated = entries.len() > max_entries;
    entries.truncate(max_entries);
    (entries, truncated)
}

fn gather_environment() -> BTreeMap<String, String> {
    ENV_ALLOWLIST
        .iter()
        .filter_map(|name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
        .collect()
}

#[async_trait]
impl ContextGatherer for DefaultContextGatherer {
    #[instrument(skip(self, token))]
    async fn gather(&self, token: &CancellationToken) -> AppResult<Context> {
        let raw_cwd = std::env::current_dir().map_err(|e| {
            AppError::new(
                ErrorKind::Context,
                "cmdforge-context",
                "gather",
                "could not determine the current working directory",
            )
            .with_cause(e)
        })?;

        let working_directory: PathBuf = std::fs::canonicalize(&raw_cwd).unwrap_or(raw_cwd);

        let mut warnings = Vec::new();
        let (files, truncated) = list_children(&working_directory, self.max_entries, &mut warnings);

        let git = match git::find_repo_root(&working_directory) {
            Some(root) => Some(git::snapshot(&root, token, &mut warnings).await),
            None => None,
        };

        let environment = gather_environment();

        if !warnings.is_empty() {
            warn!(count = warnings.len(), "context gather degraded");
        }

        Ok(Context {
            working_directory,
            files,
            truncated,
            git,
            environment,
            gathered_at: Utc::now(),
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn gather_returns_cwd_and_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hi").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"hi").unwrap();

        let previous = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        let gatherer = DefaultContextGatherer::new();
        let token = CancellationToken::new();
        let context = gatherer.gather(&token).await.unwrap();
        std::env::set_current_dir(previous).unwrap();

        assert_eq!(context.files.len(), 2);
        assert!(!context.truncated);
        assert!(context.git.is_none());
    }

    #[tokio::test]
    async fn listing_is_bounded_and_marks_truncated() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            std::fs::write(dir.path().join(format!("f{i}.txt")), b"x").unwrap();
        }

        let previous = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        let gatherer = DefaultContextGatherer::with_max_entries(3);
        let token = CancellationToken::new();
        let context = gatherer.gather(&token).await.unwrap();
        std::env::set_current_dir(previous).unwrap();

        assert_eq!(context.files.len(), 3);
        assert!(context.truncated);
    }

    #[test]
    fn allowlist_never_forwards_arbitrary_vars() {
        std::env::set_var("CMDFORGE_CONTEXT_TEST_SECRET", "do-not-leak");
        let env = gather_environment();
        assert!(!env.contains_key("CMDFORGE_CONTEXT_TEST_SECRET"));
        std::env::remove_var("CMDFORGE_CONTEXT_TEST_SECRET");
    }
}
