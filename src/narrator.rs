//! Narrator collaborators.
//!
//! The narrative stages are produced by an external text generator. A call
//! may fail outright or return text matching none of the expected patterns;
//! both outcomes are tolerated downstream, so implementations stay thin.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

#[async_trait]
pub trait Narrator: Send + Sync {
    /// Produce the narrative for one stage prompt.
    async fn invoke(&self, prompt: &str) -> Result<String>;
}

/// Narrator backed by a local Ollama daemon.
pub struct OllamaNarrator {
    client: ollama_rs::Ollama,
    model: String,
}

impl OllamaNarrator {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: ollama_rs::Ollama::default(),
            model: model.into(),
        }
    }

    pub fn with_client(mut self, client: ollama_rs::Ollama) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl Narrator for OllamaNarrator {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        use ollama_rs::generation::chat::{request::ChatMessageRequest, ChatMessage};

        let messages = vec![ChatMessage::user(prompt.to_string())];
        let res = self
            .client
            .send_chat_messages(ChatMessageRequest::new(self.model.clone(), messages))
            .await?;

        Ok(res.message.content)
    }
}

/// Narrator backed by any OpenAI-compatible chat endpoint (vLLM, hosted
/// APIs, ...).
pub struct OpenAiCompatibleNarrator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiCompatibleNarrator {
    pub fn new(base_url: String, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Narrator for OpenAiCompatibleNarrator {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.7,
        });

        let mut request = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.base_url.trim_end_matches('/')
            ))
            .json(&body);

        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let res = request.send().await?.error_for_status()?;
        let json: serde_json::Value = res.json().await?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .context("failed to parse content from narrator response")?;

        Ok(content.to_string())
    }
}
