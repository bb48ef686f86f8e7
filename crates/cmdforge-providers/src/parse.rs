//! Parses a vendor's textual reply into the workspace's data model. A
//! reply that isn't the requested JSON object is still usable, just less
//! structured.

use cmdforge_core::error::AppError;
use cmdforge_core::error::ErrorKind;
use cmdforge_core::model::GeneratedCommand;
use cmdforge_core::model::ValidationResult;
use serde::Deserialize;

#[derive(Deserialize)]
struct RawGenerated {
    command: String,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    alternatives: Vec<String>,
}

/// Vendor replies are free-form text that may or may not be the JSON
/// object the prompt asked for. When it isn't, the whole reply is taken
/// as the command verbatim rather than treated as a hard failure.
pub fn parse_generated(text: &str, provider_name: &str) -> GeneratedCommand {
    let trimmed = text.trim();
    if let Some(json) = extract_json_object(trimmed) {
        if let Ok(raw) = serde_json::from_str::<RawGenerated>(&json) {
            return GeneratedCommand {
                command: raw.command,
                explanation: raw.explanation,
                confidence: raw.confidence.unwrap_or(0.8),
                alternatives: raw.alternatives,
            };
        }
    }

    GeneratedCommand {
        command: trimmed.to_string(),
        explanation: format!("Generated by {provider_name}"),
        confidence: 0.8,
        alternatives: Vec::new(),
    }
}

#[derive(Deserialize)]
struct RawValidation {
    is_correct: bool,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    suggestions: Vec<String>,
    #[serde(default)]
    corrected_command: Option<String>,
}

/// Unlike generation, a validation reply has no sensible free-text
/// fallback: a decode failure here is reported, not guessed at.
pub fn parse_validation(text: &str) -> Result<ValidationResult, AppError> {
    let trimmed = text.trim();
    let json = extract_json_object(trimmed).unwrap_or_else(|| trimmed.to_string());
    let raw: RawValidation = serde_json::from_str(&json).map_err(|e| {
        AppError::new(
            ErrorKind::Validation,
            "cmdforge-providers",
            "parse_validation",
            format!("could not decode validation reply as JSON: {e}"),
        )
    })?;

    Ok(ValidationResult {
        is_correct: raw.is_correct,
        explanation: raw.explanation,
        suggestions: raw.suggestions,
        corrected_command: raw.corrected_command,
    })
}

/// Vendors sometimes wrap the requested JSON in a markdown code fence or
/// surrounding prose; find the outermost `{...}` span rather than
/// requiring the whole reply to be bare JSON.
fn extract_json_object(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(text[start..=end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_clean_json_reply() {
        let text = r#"{"command": "ls -la", "explanation": "list files", "confidence": 0.95, "alternatives": ["ls"]}"#;
        let generated = parse_generated(text, "openai");
        assert_eq!(generated.command, "ls -la");
        assert_eq!(generated.confidence, 0.95);
        assert_eq!(generated.alternatives, vec!["ls".to_string()]);
    }

    #[test]
    fn parses_json_wrapped_in_a_markdown_fence() {
        let text = "Sure thing!\n```json\n{\"command\": \"pwd\", \"explanation\": \"\", \"confidence\": 0.5, \"alternatives\": []}\n```";
        let generated = parse_generated(text, "openai");
        assert_eq!(generated.command, "pwd");
    }

    #[test]
    fn falls_back_to_whole_text_when_not_json() {
        let generated = parse_generated("  ls -la  \n", "anthropic");
        assert_eq!(generated.command, "ls -la");
        assert_eq!(generated.explanation, "Generated by anthropic");
        assert_eq!(generated.confidence, 0.8);
        assert!(generated.alternatives.is_empty());
    }

    #[test]
    fn validation_reply_must_be_json() {
        let result = parse_validation("yes that looks right");
        assert!(result.is_err());
    }

    #[test]
    fn validation_reply_parses_corrected_command() {
        let text = r#"{"is_correct": false, "explanation": "wrong flag", "suggestions": [], "corrected_command": "ls -l"}"#;
        let result = parse_validation(text).unwrap();
        assert!(!result.is_correct);
        assert_eq!(result.corrected_command.as_deref(), Some("ls -l"));
    }
}
