//! OpenAI's `/chat/completions` wire shape, also used as-is by OpenRouter
//! (it proxies the same request/response format). `name` distinguishes
//! the two so logging and the generation fallback's "Generated by ..."
//! text stay accurate.

use async_trait::async_trait;
use cmdforge_core::cancel::CancellationToken;
use cmdforge_core::error::AppResult;
use cmdforge_core::model::Context;
use cmdforge_core::model::GeneratedCommand;
use cmdforge_core::model::ValidationResult;
use cmdforge_core::traits::LlmProvider;

use crate::http;
use crate::parse;
use crate::prompt;

pub struct OpenAiCompatibleProvider {
    name: String,
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleProvider {
    pub fn new(name: impl Into<String>, client: reqwest::Client, base_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            name: name.into(),
            client,
            base_url,
            model,
            api_key,
        }
    }

    fn auth_headers(&self) -> Vec<(&'static str, String)> {
        match &self.api_key {
            Some(key) => vec![("Authorization", format!("Bearer {key}"))],
            None => Vec::new(),
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_command(&self, _token: &CancellationToken, user_text: &str, context: &Context) -> AppResult<GeneratedCommand> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt::system_prompt_for_generation(context)},
                {"role": "user", "content": user_text},
            ],
        });

        let response = http::post_json(&self.client, &self.chat_completions_url(), self.auth_headers(), body).await?;
        let text = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| http::missing_field(&self.name, "choices[0].message.content"))?;

        Ok(parse::parse_generated(text, &self.name))
    }

    async fn validate_result(&self, _token: &CancellationToken, command: &str, combined_output: &str, intent: &str) -> AppResult<ValidationResult> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt::system_prompt_for_validation()},
                {"role": "user", "content": prompt::validation_user_message(command, combined_output, intent)},
            ],
        });

        let response = http::post_json(&self.client, &self.chat_completions_url(), self.auth_headers(), body).await?;
        let text = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| http::missing_field(&self.name, "choices[0].message.content"))?;

        parse::parse_validation(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdforge_core::cancel::CancellationToken;
    use wiremock::matchers::method;
    use wiremock::matchers::path;
    use wiremock::Mock;
    use wiremock::MockServer;
    use wiremock::ResponseTemplate;

    fn empty_context() -> Context {
        Context {
            working_directory: "/tmp".into(),
            files: Vec::new(),
            truncated: false,
            git: None,
            environment: Default::default(),
            gathered_at: chrono::Utc::now(),
            warnings: Vec::new(),
        }
    }

    #[tokio::test]
    async fn generates_a_command_from_a_clean_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "{\"command\":\"ls -la\",\"explanation\":\"list\",\"confidence\":0.9,\"alternatives\":[]}"}}]
            })))
            .mount(&server)
            .await;

        let provider = OpenAiCompatibleProvider::new("openai", reqwest::Client::new(), server.uri(), "gpt-test".into(), Some("sk-test".into()));
        let token = CancellationToken::new();
        let generated = provider.generate_command(&token, "list files", &empty_context()).await.unwrap();
        assert_eq!(generated.command, "ls -la");
    }

    #[tokio::test]
    async fn retries_after_a_rate_limit_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "pwd"}}]
            })))
            .mount(&server)
            .await;

        let provider = OpenAiCompatibleProvider::new("openai", reqwest::Client::new(), server.uri(), "gpt-test".into(), None);
        let token = CancellationToken::new();
        let policy = cmdforge_retry::RetryPolicy::default_policy();

        let result = cmdforge_retry::retry(&policy, &token, || provider.generate_command(&token, "where am i", &empty_context())).await.unwrap();

        assert_eq!(result.command, "pwd");
        assert_eq!(result.explanation, "Generated by openai");
    }

    #[tokio::test]
    async fn authentication_failure_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = OpenAiCompatibleProvider::new("openai", reqwest::Client::new(), server.uri(), "gpt-test".into(), Some("sk-bad".into()));
        let token = CancellationToken::new();
        let err = provider.generate_command(&token, "list files", &empty_context()).await.unwrap_err();
        assert_eq!(err.kind, cmdforge_core::error::ErrorKind::Authentication);
    }
}
