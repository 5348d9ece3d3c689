//! Environment-driven configuration.

use std::env;

/// Which narrator backend the service talks to.
#[derive(Debug, Clone)]
pub enum NarratorBackend {
    /// Local Ollama daemon.
    Ollama { model: String },
    /// Any OpenAI-compatible chat endpoint (vLLM, hosted APIs, ...).
    OpenAiCompatible {
        base_url: String,
        api_key: Option<String>,
        model: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub narrator: NarratorBackend,
    /// Inter-stage pacing delay, in milliseconds.
    pub stage_delay_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8002".to_string());
        let stage_delay_ms = env::var("STAGE_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        // A NARRATOR_URL selects the OpenAI-compatible backend; otherwise
        // we expect a local Ollama daemon.
        let narrator = match env::var("NARRATOR_URL") {
            Ok(base_url) => NarratorBackend::OpenAiCompatible {
                base_url,
                api_key: env::var("NARRATOR_API_KEY").ok(),
                model: env::var("NARRATOR_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            },
            Err(_) => NarratorBackend::Ollama {
                model: env::var("NARRATOR_MODEL").unwrap_or_else(|_| "llama3.2:3b".to_string()),
            },
        };

        Self {
            bind_addr,
            narrator,
            stage_delay_ms,
        }
    }
}
