//! Core entities.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Immediate-child file entry in a [`Context`] snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub is_directory: bool,
    pub size: u64,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Git sub-snapshot, present only when the working directory is inside a
/// repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitState {
    pub is_repo: bool,
    pub current_branch: Option<String>,
    pub has_uncommitted_changes: bool,
    pub last_commit_id: Option<String>,
    pub remote_url: Option<String>,
}

/// Immutable snapshot of filesystem/git/environment state accompanying a
/// request. Produced once by the Context Gatherer; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Context {
    pub working_directory: PathBuf,
    pub files: Vec<FileEntry>,
    pub truncated: bool,
    pub git: Option<GitState>,
    pub environment: BTreeMap<String, String>,
    pub gathered_at: DateTime<Utc>,
    pub warnings: Vec<String>,
}

impl Context {
    /// Default bound on the child-entry listing.
    pub const DEFAULT_MAX_ENTRIES: usize = 512;
}

/// A synthesized shell command, owned by the [`Orchestrator`](crate::manager::Manager)
/// that created it. `generated` is immutable once set; `validated` flips
/// false -> true exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub id: u64,
    pub original: String,
    pub generated: String,
    /// Index into the enclosing [`CommandResult`]; Context is owned by the
    /// result, not by the Command, to avoid a Context -> Command -> Context
    /// reference cycle.
    pub context: Context,
    pub working_directory: Option<PathBuf>,
    pub environment: BTreeMap<String, String>,
    pub timeout: Duration,
    pub validated: bool,
    pub created_at: DateTime<Utc>,
}

impl Command {
    pub fn new(id: u64, original: impl Into<String>, generated: impl Into<String>, context: Context, timeout: Duration) -> Self {
        Self {
            id,
            original: original.into(),
            generated: generated.into(),
            context,
            working_directory: None,
            environment: BTreeMap::new(),
            timeout,
            validated: false,
            created_at: Utc::now(),
        }
    }
}

/// Total order over danger levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DangerLevel {
    Safe,
    Warning,
    Dangerous,
    Critical,
}

impl std::fmt::Display for DangerLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DangerLevel::Safe => "safe",
            DangerLevel::Warning => "warning",
            DangerLevel::Dangerous => "dangerous",
            DangerLevel::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyResult {
    pub danger_level: DangerLevel,
    pub warnings: Vec<String>,
    pub bypassed: bool,
    pub audit_entry_id: Option<u64>,
    pub matched_pattern_ids: Vec<String>,
}

impl SafetyResult {
    pub fn is_safe(&self) -> bool {
        self.danger_level == DangerLevel::Safe
    }

    pub fn requires_confirmation(&self) -> bool {
        self.danger_level >= DangerLevel::Warning
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: crate::error::ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub command_id: u64,
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub duration: Duration,
    pub error: Option<ErrorDetail>,
}

impl ExecutionResult {
    /// `-1` is reserved for "never started / internal error".
    pub const NEVER_STARTED: i32 = -1;

    pub fn success(&self) -> bool {
        self.exit_code == 0 && self.error.is_none()
    }

    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSeverity {
    Ok,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub severity: FindingSeverity,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DryRunResult {
    pub command_id: u64,
    pub analysis: String,
    pub predictions: Vec<String>,
    pub findings: Vec<ValidationFinding>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationResult {
    pub is_correct: bool,
    pub explanation: String,
    pub suggestions: Vec<String>,
    pub corrected_command: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    pub command: Command,
    pub safety: SafetyResult,
    pub confidence: f32,
    pub alternatives: Vec<String>,
}

/// Exactly one of `dry_run`/`execution`/`requires_confirmation` is ever set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullResult {
    pub command_result: CommandResult,
    pub dry_run: Option<DryRunResult>,
    pub execution: Option<ExecutionResult>,
    pub requires_confirmation: bool,
    pub validation: Option<ValidationResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Validated,
    Bypassed,
    Denied,
    Executed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub command: String,
    pub user_id: String,
    pub session_id: String,
    pub action: AuditAction,
    pub danger_level: DangerLevel,
    pub reason: String,
}

/// Filter used by [`crate::traits::AuditLog::read`].
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub user_id: Option<String>,
    pub action: Option<AuditAction>,
    pub min_level: Option<DangerLevel>,
}

impl AuditFilter {
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(since) = self.since {
            if entry.timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if entry.timestamp > until {
                return false;
            }
        }
        if let Some(user_id) = &self.user_id {
            if &entry.user_id != user_id {
                return false;
            }
        }
        if let Some(action) = self.action {
            if entry.action != action {
                return false;
            }
        }
        if let Some(min_level) = self.min_level {
            if entry.danger_level < min_level {
                return false;
            }
        }
        true
    }
}

/// Per-provider configuration. The persisted form never carries a
/// plaintext secret sourced from env/keychain — callers
/// resolve `api_key` through `cmdforge-credentials` at call time and should
/// not serialize a populated `api_key` back to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub default_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub retry_overrides: Option<RetryOverrides>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryOverrides {
    pub max_attempts: Option<u32>,
    pub initial_delay: Option<Duration>,
    pub max_delay: Option<Duration>,
}

/// Candidate command synthesized by an LLM provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedCommand {
    pub command: String,
    pub explanation: String,
    pub confidence: f32,
    pub alternatives: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn danger_level_total_order() {
        assert!(DangerLevel::Safe < DangerLevel::Warning);
        assert!(DangerLevel::Warning < DangerLevel::Dangerous);
        assert!(DangerLevel::Dangerous < DangerLevel::Critical);
    }

    #[test]
    fn execution_result_success_requires_zero_exit_and_no_error() {
        let ok = ExecutionResult {
            command_id: 1,
            exit_code: 0,
            stdout: b"hello\n".to_vec(),
            stderr: Vec::new(),
            duration: Duration::from_millis(5),
            error: None,
        };
        assert!(ok.success());

        let mut failed = ok.clone();
        failed.exit_code = 2;
        assert!(!failed.success());
    }

    #[test]
    fn audit_filter_matches_on_min_level() {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            command: "rm -rf /".into(),
            user_id: "alice".into(),
            session_id: "s1".into(),
            action: AuditAction::Denied,
            danger_level: DangerLevel::Critical,
            reason: "bypass ceiling".into(),
        };
        let filter = AuditFilter {
            min_level: Some(DangerLevel::Dangerous),
            ..Default::default()
        };
        assert!(filter.matches(&entry));

        let filter = AuditFilter {
            min_level: Some(DangerLevel::Critical),
            user_id: Some("bob".into()),
            ..Default::default()
        };
        assert!(!filter.matches(&entry));
    }
}
