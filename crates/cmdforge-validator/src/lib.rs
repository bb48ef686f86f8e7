//! C7 — Result Validator: judges whether an execution
//! satisfied the user's intent, and, when it didn't, tries to obtain a
//! corrected command.

mod correction;

use std::sync::Arc;

use async_trait::async_trait;
use cmdforge_core::cancel::CancellationToken;
use cmdforge_core::error::AppResult;
use cmdforge_core::format::format_combined_output;
use cmdforge_core::model::Command;
use cmdforge_core::model::ExecutionResult;
use cmdforge_core::model::ValidationResult;
use cmdforge_core::traits::LlmProvider;
use cmdforge_core::traits::ResultValidator;
use tracing::debug;

fn correction_prompt(command: &Command, exec_result: &ExecutionResult, judgment: &ValidationResult) -> String {
    let failure_reason = exec_result
        .error
        .as_ref()
        .map(|e| format!("{}: {}", e.kind, e.message))
        .unwrap_or_else(|| format!("exit code {}", exec_result.exit_code));

    format!(
        "The previous command did not satisfy the user's intent.\n\
         INTENT:\n{}\n\n\
         FAILED COMMAND:\n{}\n\n\
         FAILURE REASON:\n{}\n\n\
         STDERR:\n{}\n\n\
         JUDGE'S EXPLANATION:\n{}\n\n\
         Propose a single corrected shell command that would satisfy the intent.",
        command.original,
        command.generated,
        failure_reason,
        exec_result.stderr_string(),
        judgment.explanation,
    )
}

/// Judges `exec_result` against `command`'s original intent, and — when
/// the provider reports the run incorrect and didn't supply a correction
/// itself — asks it to generate one. Every proposed correction, whichever
/// path it came from, passes through the sanity check before being
/// returned.
pub async fn validate(token: &CancellationToken, provider: &dyn LlmProvider, command: &Command, exec_result: &ExecutionResult) -> AppResult<ValidationResult> {
    let combined_output = format_combined_output(exec_result);
    let mut result = provider.validate_result(token, &command.generated, &combined_output, &command.original).await?;

    if !result.is_correct {
        if result.corrected_command.is_none() {
            debug!(command_id = command.id, "requesting a correction from the provider");
            let prompt = correction_prompt(command, exec_result, &result);
            let generated = provider.generate_command(token, &prompt, &command.context).await?;
            result.corrected_command = Some(generated.command);
        }

        result.corrected_command = result.corrected_command.as_deref().and_then(|candidate| correction::sanitize(&command.generated, candidate));
    }

    Ok(result)
}

/// The `ResultValidator` wired into `ApplicationContext` by the CLI's
/// composition root: a thin adapter holding the same provider handle the
/// rest of the pipeline uses, so the Manager never has to depend on this
/// crate directly.
pub struct ProviderResultValidator {
    provider: Arc<dyn LlmProvider>,
}

impl ProviderResultValidator {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ResultValidator for ProviderResultValidator {
    async fn validate(&self, token: &CancellationToken, command: &Command, exec_result: &ExecutionResult) -> AppResult<ValidationResult> {
        validate(token, self.provider.as_ref(), command, exec_result).await
    }
}
