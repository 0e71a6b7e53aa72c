//! Text-completion client with enum-dispatch over providers.
//!
//! One thin client per backend (Anthropic Messages, OpenAI Chat
//! Completions), unified behind [`CompletionClient`]. No `async-trait`,
//! no heap trait objects; provider selection happens once at startup from
//! the environment.

pub mod anthropic;
pub mod errors;
pub mod open_ai;

pub use anthropic::AnthropicClient;
pub use errors::{LlmError, LlmResult};
pub use open_ai::OpenAiClient;

use std::time::Duration;

/// One completion call: prompt plus per-call generation knobs.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub prompt: &'a str,
    pub model: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Concrete completion client (enum-dispatch).
#[derive(Debug, Clone)]
pub enum CompletionClient {
    Anthropic(AnthropicClient),
    OpenAi(OpenAiClient),
}

impl CompletionClient {
    /// Pick a provider from the environment: `ANTHROPIC_API_KEY` wins,
    /// then `OPENAI_API_KEY`. Returns `None` when neither is set — callers
    /// fall back to heuristic analysis in that case.
    pub fn from_env() -> Option<Self> {
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            if !key.is_empty() {
                return Some(Self::Anthropic(AnthropicClient::new(
                    build_http(),
                    "https://api.anthropic.com/v1".to_string(),
                    key,
                )));
            }
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                return Some(Self::OpenAi(OpenAiClient::new(
                    build_http(),
                    "https://api.openai.com/v1".to_string(),
                    key,
                )));
            }
        }
        None
    }

    pub async fn complete(&self, req: &CompletionRequest<'_>) -> LlmResult<String> {
        match self {
            Self::Anthropic(c) => c.complete(req).await,
            Self::OpenAi(c) => c.complete(req).await,
        }
    }
}

fn build_http() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .tcp_keepalive(Some(Duration::from_secs(30)))
        .build()
        .expect("http client")
}
