//! Anthropic's Messages API: the system prompt is a top-level field
//! rather than a message with `role: "system"`, and the reply is a list
//! of content blocks instead of a single message string.

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

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

pub struct AnthropicProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl AnthropicProvider {
    pub fn new(client: reqwest::Client, base_url: String, model: String, api_key: Option<String>) -> Self {
        Self { client, base_url, model, api_key }
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![("anthropic-version", ANTHROPIC_VERSION.to_string())];
        if let Some(key) = &self.api_key {
            headers.push(("x-api-key", key.clone()));
        }
        headers
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }

    fn extract_text<'a>(&self, response: &'a serde_json::Value) -> Option<&'a str> {
        response["content"].as_array()?.iter().find_map(|block| block["text"].as_str())
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate_command(&self, _token: &CancellationToken, user_text: &str, context: &Context) -> AppResult<GeneratedCommand> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": DEFAULT_MAX_TOKENS,
            "system": prompt::system_prompt_for_generation(context),
            "messages": [{"role": "user", "content": user_text}],
        });

        let response = http::post_json(&self.client, &self.messages_url(), self.headers(), body).await?;
        let text = self.extract_text(&response).ok_or_else(|| http::missing_field("anthropic", "content[].text"))?;

        Ok(parse::parse_generated(text, "anthropic"))
    }

    async fn validate_result(&self, _token: &CancellationToken, command: &str, combined_output: &str, intent: &str) -> AppResult<ValidationResult> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": DEFAULT_MAX_TOKENS,
            "system": prompt::system_prompt_for_validation(),
            "messages": [{"role": "user", "content": prompt::validation_user_message(command, combined_output, intent)}],
        });

        let response = http::post_json(&self.client, &self.messages_url(), self.headers(), body).await?;
        let text = self.extract_text(&response).ok_or_else(|| http::missing_field("anthropic", "content[].text"))?;

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
    async fn generates_a_command_from_a_content_block_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "{\"command\":\"df -h\",\"explanation\":\"disk usage\",\"confidence\":0.7,\"alternatives\":[]}"}]
            })))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(reqwest::Client::new(), server.uri(), "claude-test".into(), Some("sk-ant-test".into()));
        let token = CancellationToken::new();
        let generated = provider.generate_command(&token, "how much disk space", &empty_context()).await.unwrap();
        assert_eq!(generated.command, "df -h");
    }
}
