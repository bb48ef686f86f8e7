//! Google's Gemini `generateContent` REST endpoint. The API key travels
//! as a query parameter rather than a header, and the text lives under
//! `candidates[0].content.parts[0].text`.

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

pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiProvider {
    pub fn new(client: reqwest::Client, base_url: String, model: String, api_key: Option<String>) -> Self {
        Self { client, base_url, model, api_key }
    }

    fn generate_content_url(&self) -> String {
        let base = format!("{}/v1beta/models/{}:generateContent", self.base_url.trim_end_matches('/'), self.model);
        match &self.api_key {
            Some(key) => format!("{base}?key={key}"),
            None => base,
        }
    }

    fn extract_text<'a>(&self, response: &'a serde_json::Value) -> Option<&'a str> {
        response["candidates"][0]["content"]["parts"][0]["text"].as_str()
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate_command(&self, _token: &CancellationToken, user_text: &str, context: &Context) -> AppResult<GeneratedCommand> {
        let body = serde_json::json!({
            "systemInstruction": {"parts": [{"text": prompt::system_prompt_for_generation(context)}]},
            "contents": [{"role": "user", "parts": [{"text": user_text}]}],
        });

        let response = http::post_json(&self.client, &self.generate_content_url(), Vec::new(), body).await?;
        let text = self.extract_text(&response).ok_or_else(|| http::missing_field("gemini", "candidates[0].content.parts[0].text"))?;

        Ok(parse::parse_generated(text, "gemini"))
    }

    async fn validate_result(&self, _token: &CancellationToken, command: &str, combined_output: &str, intent: &str) -> AppResult<ValidationResult> {
        let body = serde_json::json!({
            "systemInstruction": {"parts": [{"text": prompt::system_prompt_for_validation()}]},
            "contents": [{"role": "user", "parts": [{"text": prompt::validation_user_message(command, combined_output, intent)}]}],
        });

        let response = http::post_json(&self.client, &self.generate_content_url(), Vec::new(), body).await?;
        let text = self.extract_text(&response).ok_or_else(|| http::missing_field("gemini", "candidates[0].content.parts[0].text"))?;

        parse::parse_validation(text)
    }
}
