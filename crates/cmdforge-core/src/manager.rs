//! C9 — the Pipeline Orchestrator.

use std::time::Duration;

use tracing::instrument;

use crate::app_context::ApplicationContext;
use crate::cancel::CancellationToken;
use crate::error::AppError;
use crate::error::AppResult;
use crate::error::ErrorKind;
use crate::model::Command;
use crate::model::CommandResult;
use crate::model::DangerLevel;
use crate::model::FullResult;
use crate::model::ValidationResult;
use crate::traits::ClassifyOptions;

/// The recognized options for [`Manager::generate_and_execute`]:
/// an explicit struct, every field enumerated, no dict-of-anything.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub dry_run: bool,
    pub skip_confirmation: bool,
    pub bypass_level: DangerLevel,
    pub reason: String,
    pub validate_results: bool,
    pub timeout: Duration,
    pub user_id: String,
    pub session_id: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            skip_confirmation: false,
            bypass_level: DangerLevel::Safe,
            reason: String::new(),
            validate_results: true,
            timeout: Duration::from_secs(30),
            user_id: "unknown".to_string(),
            session_id: "unknown".to_string(),
        }
    }
}

pub struct Manager {
    app: ApplicationContext,
}

impl Manager {
    pub fn new(app: ApplicationContext) -> Self {
        Self { app }
    }

    /// Synthesize and classify a command, without running it. Exposed
    /// separately so the CLI/session layer can re-enter the pipeline after
    /// collecting a user decision on whether to proceed (passing the same
    /// `options` back in, with `skip_confirmation`/`bypass_level` updated to
    /// reflect that decision).
    #[instrument(skip(self, token, options), fields(component = "manager"))]
    pub async fn generate_command(&self, token: &CancellationToken, intent: &str, options: &GenerateOptions) -> AppResult<CommandResult> {
        let context = self
            .app
            .context_gatherer
            .gather(token)
            .await
            .map_err(|e| AppError::wrap(ErrorKind::Validation, "manager", "generate_command", e).with_context("intent", intent))?;

        let generated = self
            .app
            .provider
            .generate_command(token, intent, &context)
            .await
            .map_err(|e| {
                AppError::wrap(ErrorKind::Provider, "manager", "generate_command", e)
                    .with_context("intent", intent)
                    .with_context("provider", self.app.provider.name())
            })?;

        let id = self.app.next_command_id();
        let mut command = Command::new(id, intent, &generated.command, context, options.timeout);

        let classify_options = ClassifyOptions {
            skip_confirmation: options.skip_confirmation,
            bypass_level: options.bypass_level,
            user_id: options.user_id.clone(),
            session_id: options.session_id.clone(),
            reason: options.reason.clone(),
        };
        let safety = self
            .app
            .classifier
            .validate_with_options(&command.generated, &classify_options, self.app.audit.as_ref())
            .await
            .map_err(|e| AppError::wrap(ErrorKind::Validation, "manager", "generate_command", e))?;

        command.validated = safety.is_safe() || safety.bypassed;

        Ok(CommandResult {
            command,
            safety,
            confidence: generated.confidence,
            alternatives: generated.alternatives,
        })
    }

    /// The full five-stage pipeline.
    #[instrument(skip(self, token, options), fields(component = "manager"))]
    pub async fn generate_and_execute(&self, token: &CancellationToken, intent: &str, options: GenerateOptions) -> AppResult<FullResult> {
        let command_result = self.generate_command(token, intent, &options).await?;

        if options.dry_run {
            let dry_run = self.app.executor.dry_run(&command_result.command);
            return Ok(FullResult {
                command_result,
                dry_run: Some(dry_run),
                execution: None,
                requires_confirmation: false,
                validation: None,
            });
        }

        // The classifier's own bypass ceiling is what decides `validated`
        // (set in `generate_command`); nothing here second-guesses it.
        if !command_result.command.validated {
            return Ok(FullResult {
                command_result,
                dry_run: None,
                execution: None,
                requires_confirmation: true,
                validation: None,
            });
        }

        let execution = self.app.executor.execute(token, &command_result.command).await;
        if let Some(err) = &execution.error {
            return Err(AppError::new(err.kind, "manager", "generate_and_execute", err.message.clone()));
        }

        let validation = if options.validate_results {
            Some(self.validate_non_fatal(token, &command_result.command, &execution).await)
        } else {
            None
        };

        Ok(FullResult {
            command_result,
            dry_run: None,
            execution: Some(execution),
            requires_confirmation: false,
            validation,
        })
    }

    /// Step 6: a Result Validator failure is downgraded, never aborts the
    /// pipeline.
    async fn validate_non_fatal(&self, token: &CancellationToken, command: &Command, execution: &crate::model::ExecutionResult) -> ValidationResult {
        match self.app.validator.validate(token, command, execution).await {
            Ok(result) => result,
            Err(err) => ValidationResult {
                is_correct: false,
                explanation: format!("Validation failed: {err}"),
                suggestions: Vec::new(),
                corrected_command: None,
            },
        }
    }
}
