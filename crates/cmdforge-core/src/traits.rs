//! The seams between `cmdforge-core`'s [`crate::manager::Manager`] and the
//! rest of the workspace. Each concrete crate implements one of these
//! traits; the Manager only ever holds `Arc<dyn Trait>` handles, which is
//! what keeps the crate graph acyclic.

use std::time::Duration;

use async_trait::async_trait;

use crate::cancel::CancellationToken;
use crate::error::AppResult;
use crate::model::AuditEntry;
use crate::model::AuditFilter;
use crate::model::Command;
use crate::model::Context;
use crate::model::DangerLevel;
use crate::model::DryRunResult;
use crate::model::ExecutionResult;
use crate::model::GeneratedCommand;
use crate::model::ValidationResult;

/// C3 — translate intent into a command, and judge an execution result.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate_command(
        &self,
        token: &CancellationToken,
        user_text: &str,
        context: &Context,
    ) -> AppResult<GeneratedCommand>;

    async fn validate_result(
        &self,
        token: &CancellationToken,
        command: &str,
        combined_output: &str,
        intent: &str,
    ) -> AppResult<ValidationResult>;
}

/// C2 — snapshot filesystem/git/environment state.
#[async_trait]
pub trait ContextGatherer: Send + Sync {
    async fn gather(&self, token: &CancellationToken) -> AppResult<Context>;
}

/// Options recognized by [`SafetyClassifier::validate_with_options`].
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    pub skip_confirmation: bool,
    pub bypass_level: DangerLevel,
    pub user_id: String,
    pub session_id: String,
    pub reason: String,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            skip_confirmation: false,
            bypass_level: DangerLevel::Safe,
            user_id: "unknown".to_string(),
            session_id: "unknown".to_string(),
            reason: String::new(),
        }
    }
}

/// C4 — classify danger level, optionally applying a bypass with an audit
/// trail.
#[async_trait]
pub trait SafetyClassifier: Send + Sync {
    fn classify(&self, command: &str) -> crate::model::SafetyResult;

    async fn validate_with_options(
        &self,
        command: &str,
        options: &ClassifyOptions,
        audit: &dyn AuditLog,
    ) -> AppResult<crate::model::SafetyResult>;
}

/// C5 — append-only decision log.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> AppResult<()>;
    async fn read(&self, filter: &AuditFilter) -> AppResult<Vec<AuditEntry>>;
}

/// C6 — run or dry-run a validated command.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, token: &CancellationToken, command: &Command) -> ExecutionResult;
    fn dry_run(&self, command: &Command) -> DryRunResult;
}

/// C1 — resolve a provider secret.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    async fn retrieve(&self, provider: &str, kind: &str) -> AppResult<Option<String>>;
    async fn store(&self, provider: &str, kind: &str, secret: &str) -> AppResult<()>;
    async fn delete(&self, provider: &str, kind: &str) -> AppResult<()>;
}

/// C7 — judge an execution against the intent that produced it, and try
/// to obtain a correction when it fell short. Split out from
/// [`LlmProvider`] itself (rather than folded into the provider call
/// directly) so the Manager can depend only on this trait object and
/// never on `cmdforge-validator`'s concrete correction machinery, which in
/// turn depends on `cmdforge-core`. Avoiding a
/// `Context -> FullResult -> Command -> Context`-shaped cycle at the type
/// level applies equally to the crate graph.
#[async_trait]
pub trait ResultValidator: Send + Sync {
    async fn validate(&self, token: &CancellationToken, command: &Command, exec_result: &ExecutionResult) -> AppResult<ValidationResult>;
}

/// Per-request deadline helper, used by stages that need "the smaller of
/// applicable deadlines governs".
pub fn min_timeout(a: Duration, b: Duration) -> Duration {
    std::cmp::min(a, b)
}
