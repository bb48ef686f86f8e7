//! C3 — LLM Provider: translates intent into a command and
//! judges execution results against one of several vendor APIs.

mod anthropic;
mod factory;
mod gemini;
mod http;
mod ollama;
mod openai;
mod parse;
mod prompt;

pub use anthropic::AnthropicProvider;
pub use factory::build;
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiCompatibleProvider;
