//! Formats an [`ExecutionResult`] into the labeled block the Result
//! Validator hands to the LLM provider.

use crate::model::ExecutionResult;

pub fn format_combined_output(result: &ExecutionResult) -> String {
    let error_line = result
        .error
        .as_ref()
        .map(|e| format!("{}: {}", e.kind, e.message))
        .unwrap_or_else(|| "none".to_string());

    format!(
        "STDOUT:\n{}\nSTDERR:\n{}\nERROR: {}\nEXIT_CODE: {}\nSUCCESS: {}\nDURATION: {:?}\n",
        result.stdout_string(),
        result.stderr_string(),
        error_line,
        result.exit_code,
        result.success(),
        result.duration,
    )
}
