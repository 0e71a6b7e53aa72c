//! Thin Anthropic Messages API client.

use tracing::debug;

use crate::errors::{LlmError, LlmResult};
use crate::CompletionRequest;

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    base_api: String, // "https://api.anthropic.com/v1"
    api_key: String,
}

impl AnthropicClient {
    pub fn new(http: reqwest::Client, base_api: String, api_key: String) -> Self {
        Self {
            http,
            base_api,
            api_key,
        }
    }

    /// Minimal `/messages` wrapper, returns the first text block.
    pub async fn complete(&self, req: &CompletionRequest<'_>) -> LlmResult<String> {
        #[derive(serde::Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(serde::Serialize)]
        struct Req<'a> {
            model: &'a str,
            max_tokens: u32,
            temperature: f32,
            messages: Vec<Message<'a>>,
        }
        #[derive(serde::Deserialize)]
        struct ContentBlock {
            #[serde(default)]
            text: String,
        }
        #[derive(serde::Deserialize)]
        struct Resp {
            content: Vec<ContentBlock>,
        }

        let url = format!("{}/messages", self.base_api.trim_end_matches('/'));
        debug!("llm.complete provider=anthropic model={}", req.model);
        let resp = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&Req {
                model: req.model,
                max_tokens: req.max_tokens,
                temperature: req.temperature,
                messages: vec![Message {
                    role: "user",
                    content: req.prompt,
                }],
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(LlmError::HttpStatus(resp.status().as_u16()));
        }
        let body: Resp = resp.json().await?;
        body.content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| LlmError::InvalidResponse("empty content array".into()))
    }
}
