//! Local Ollama server: no API key, `stream: false` for a single JSON
//! response instead of the default newline-delimited stream.

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

pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(client: reqwest::Client, base_url: String, model: String) -> Self {
        Self { client, base_url, model }
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate_command(&self, _token: &CancellationToken, user_text: &str, context: &Context) -> AppResult<GeneratedCommand> {
        let body = serde_json::json!({
            "model": self.model,
            "stream": false,
            "messages": [
                {"role": "system", "content": prompt::system_prompt_for_generation(context)},
                {"role": "user", "content": user_text},
            ],
        });

        let response = http::post_json(&self.client, &self.chat_url(), Vec::new(), body).await?;
        let text = response["message"]["content"].as_str().ok_or_else(|| http::missing_field("ollama", "message.content"))?;

        Ok(parse::parse_generated(text, "ollama"))
    }

    async fn validate_result(&self, _token: &CancellationToken, command: &str, combined_output: &str, intent: &str) -> AppResult<ValidationResult> {
        let body = serde_json::json!({
            "model": self.model,
            "stream": false,
            "messages": [
                {"role": "system", "content": prompt::system_prompt_for_validation()},
                {"role": "user", "content": prompt::validation_user_message(command, combined_output, intent)},
            ],
        });

        let response = http::post_json(&self.client, &self.chat_url(), Vec::new(), body).await?;
        let text = response["message"]["content"].as_str().ok_or_else(|| http::missing_field("ollama", "message.content"))?;

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
    async fn generates_a_command_from_a_local_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": {"role": "assistant", "content": "top -b -n 1"}
            })))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(reqwest::Client::new(), server.uri(), "llama3".into());
        let token = CancellationToken::new();
        let generated = provider.generate_command(&token, "show running processes", &empty_context()).await.unwrap();
        assert_eq!(generated.command, "top -b -n 1");
    }
}
