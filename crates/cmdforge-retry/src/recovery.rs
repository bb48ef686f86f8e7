//! Recovery strategies and dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use cmdforge_core::error::AppError;
use cmdforge_core::error::AppResult;
use cmdforge_core::error::ErrorKind;
use cmdforge_core::error::Severity;
use tracing::info;

#[async_trait]
pub trait RecoveryStrategy: Send + Sync {
    fn can_recover(&self, error: &AppError) -> bool;
    async fn recover(&self, error: &AppError) -> AppResult<()>;
}

/// Applies to Configuration errors: re-invokes a caller-supplied reload.
pub struct ConfigReload {
    reload: Arc<dyn Fn() -> AppResult<()> + Send + Sync>,
}

impl ConfigReload {
    pub fn new(reload: Arc<dyn Fn() -> AppResult<()> + Send + Sync>) -> Self {
        Self { reload }
    }
}

#[async_trait]
impl RecoveryStrategy for ConfigReload {
    fn can_recover(&self, error: &AppError) -> bool {
        error.kind == ErrorKind::Configuration
    }

    async fn recover(&self, _error: &AppError) -> AppResult<()> {
        (self.reload)()
    }
}

/// Applies to Provider errors: tries each alternate provider name in
/// order through a caller-supplied switch function until one succeeds.
pub struct ProviderFallback {
    alternates: Vec<String>,
    switch: Arc<dyn Fn(&str) -> AppResult<()> + Send + Sync>,
}

impl ProviderFallback {
    pub fn new(alternates: Vec<String>, switch: Arc<dyn Fn(&str) -> AppResult<()> + Send + Sync>) -> Self {
        Self { alternates, switch }
    }
}

#[async_trait]
impl RecoveryStrategy for ProviderFallback {
    fn can_recover(&self, error: &AppError) -> bool {
        error.kind == ErrorKind::Provider && !self.alternates.is_empty()
    }

    async fn recover(&self, error: &AppError) -> AppResult<()> {
        let mut last = None;
        for name in &self.alternates {
            match (self.switch)(name) {
                Ok(()) => {
                    info!(provider = %name, "switched to fallback provider");
                    return Ok(());
                }
                Err(e) => last = Some(e),
            }
        }
        Err(last.unwrap_or_else(|| {
            AppError::new(
                ErrorKind::Provider,
                "cmdforge-retry",
                "provider_fallback",
                format!("no fallback provider available for: {error}"),
            )
        }))
    }
}

/// Applies to any non-critical error that is not Safety, Internal, or
/// Permission — those three always require the caller's own handling.
pub struct GracefulDegradation;

#[async_trait]
impl RecoveryStrategy for GracefulDegradation {
    fn can_recover(&self, error: &AppError) -> bool {
        !matches!(error.kind, ErrorKind::Safety | ErrorKind::Internal | ErrorKind::Permission) && error.severity < Severity::Critical
    }

    async fn recover(&self, error: &AppError) -> AppResult<()> {
        info!(kind = %error.kind, "degrading gracefully instead of aborting");
        Ok(())
    }
}

/// Dispatches to registered [`RecoveryStrategy`]s by error kind, trying
/// each in registration order until one reports it can recover.
pub struct RecoveryManager {
    strategies: Vec<Arc<dyn RecoveryStrategy>>,
}

impl RecoveryManager {
    pub fn new() -> Self {
        Self { strategies: Vec::new() }
    }

    pub fn register(mut self, strategy: Arc<dyn RecoveryStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub async fn try_recover(&self, error: &AppError) -> AppResult<()> {
        for strategy in &self.strategies {
            if strategy.can_recover(error) {
                return strategy.recover(error).await;
            }
        }
        Err(AppError::new(
            error.kind,
            "cmdforge-retry",
            "try_recover",
            format!("no recovery strategy registered for: {error}"),
        ))
    }
}

impl Default for RecoveryManager {
    fn default() -> Self {
        Self::new()
    }
}
