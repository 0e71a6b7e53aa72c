//! Thin OpenAI Chat Completions client.

use tracing::debug;

use crate::errors::{LlmError, LlmResult};
use crate::CompletionRequest;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_api: String, // "https://api.openai.com/v1"
    api_key: String,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, base_api: String, api_key: String) -> Self {
        Self {
            http,
            base_api,
            api_key,
        }
    }

    /// Minimal `/chat/completions` wrapper, returns the first choice text.
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
        struct RespMessage {
            #[serde(default)]
            content: String,
        }
        #[derive(serde::Deserialize)]
        struct Choice {
            message: RespMessage,
        }
        #[derive(serde::Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        let url = format!("{}/chat/completions", self.base_api.trim_end_matches('/'));
        debug!("llm.complete provider=openai model={}", req.model);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
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
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("empty choices array".into()))
    }
}
