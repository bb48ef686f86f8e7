//! Builds a concrete [`LlmProvider`] from a vendor name and a
//! [`ProviderConfig`].

use std::sync::Arc;
use std::time::Duration;

use cmdforge_core::error::AppError;
use cmdforge_core::error::AppResult;
use cmdforge_core::error::ErrorKind;
use cmdforge_core::model::ProviderConfig;
use cmdforge_core::traits::LlmProvider;

use crate::anthropic::AnthropicProvider;
use crate::gemini::GeminiProvider;
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiCompatibleProvider;

/// Fallback used when a provider's `request_timeout` is zero, which would
/// otherwise build a `reqwest::Client` that fails every request instantly.
const MIN_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

pub fn build(name: &str, config: ProviderConfig) -> AppResult<Arc<dyn LlmProvider>> {
    let timeout = config.request_timeout.max(MIN_REQUEST_TIMEOUT);
    let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
        AppError::new(
            ErrorKind::Configuration,
            "cmdforge-providers",
            "build",
            format!("could not build an HTTP client for provider `{name}`: {e}"),
        )
    })?;

    let provider: Arc<dyn LlmProvider> = match name.to_ascii_lowercase().as_str() {
        "openai" => Arc::new(OpenAiCompatibleProvider::new("openai", client, config.base_url, config.default_model, config.api_key)),
        "openrouter" => Arc::new(OpenAiCompatibleProvider::new("openrouter", client, config.base_url, config.default_model, config.api_key)),
        "anthropic" => Arc::new(AnthropicProvider::new(client, config.base_url, config.default_model, config.api_key)),
        "gemini" => Arc::new(GeminiProvider::new(client, config.base_url, config.default_model, config.api_key)),
        "ollama" => Arc::new(OllamaProvider::new(client, config.base_url, config.default_model)),
        other => {
            return Err(AppError::new(
                ErrorKind::Configuration,
                "cmdforge-providers",
                "build",
                format!("unknown provider `{other}`"),
            ))
        }
    };

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        ProviderConfig {
            base_url: "https://example.invalid".to_string(),
            default_model: "test-model".to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(30),
            retry_overrides: None,
        }
    }

    #[test]
    fn builds_each_known_vendor() {
        for name in ["openai", "openrouter", "anthropic", "gemini", "ollama"] {
            let provider = build(name, config()).unwrap();
            assert_eq!(provider.name(), name);
        }
    }

    #[test]
    fn unknown_vendor_is_a_configuration_error() {
        let err = build("not-a-real-vendor", config()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
