//! `ApplicationContext` — the single value threaded into the
//! [`crate::manager::Manager`] at construction, replacing process-wide
//! singletons (logger, metrics monitor, classifier pattern table) with one
//! explicit, testable value.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::traits::AuditLog;
use crate::traits::ContextGatherer;
use crate::traits::CredentialResolver;
use crate::traits::Executor;
use crate::traits::LlmProvider;
use crate::traits::ResultValidator;
use crate::traits::SafetyClassifier;

pub struct ApplicationContext {
    pub context_gatherer: Arc<dyn ContextGatherer>,
    pub provider: Arc<dyn LlmProvider>,
    pub classifier: Arc<dyn SafetyClassifier>,
    pub audit: Arc<dyn AuditLog>,
    pub executor: Arc<dyn Executor>,
    pub credentials: Arc<dyn CredentialResolver>,
    pub validator: Arc<dyn ResultValidator>,
    next_command_id: AtomicU64,
}

impl ApplicationContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        context_gatherer: Arc<dyn ContextGatherer>,
        provider: Arc<dyn LlmProvider>,
        classifier: Arc<dyn SafetyClassifier>,
        audit: Arc<dyn AuditLog>,
        executor: Arc<dyn Executor>,
        credentials: Arc<dyn CredentialResolver>,
        validator: Arc<dyn ResultValidator>,
    ) -> Self {
        Self {
            context_gatherer,
            provider,
            classifier,
            audit,
            executor,
            credentials,
            validator,
            next_command_id: AtomicU64::new(1),
        }
    }

    /// Monotonic id generator for `Command.id`: an opaque, process-local,
    /// ever-increasing counter.
    pub fn next_command_id(&self) -> u64 {
        self.next_command_id.fetch_add(1, Ordering::Relaxed)
    }
}
