use crate::core::config::LensLlmConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;

/// One-shot chat completion. Everything in triage that needs a language
/// model goes through this seam, so tests can script replies.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint
/// (OpenAI, Groq, Ollama, LM Studio).
#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiChatClient {
    pub fn new(http: reqwest::Client, base_url: String, model: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            model,
            api_key,
        }
    }

    /// Build from config. Returns `None` when no API key is configured
    /// anywhere — an explicit empty key still counts (key-less local
    /// endpoints work without auth).
    pub fn from_config(http: reqwest::Client, cfg: &LensLlmConfig) -> Option<Self> {
        let api_key = cfg.resolve_api_key()?;
        Some(Self::new(http, cfg.resolve_base_url(), cfg.resolve_model(), api_key))
    }
}

#[async_trait]
impl ChatModel for OpenAiChatClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let body = serde_json::json!({
            "model": self.model,
            "temperature": 0.2,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });

        let builder = self.http.post(url).json(&body);
        // Only send Authorization header when a key is provided.
        // Key-less local endpoints (Ollama / LM Studio) work without it.
        let builder = if self.api_key.is_empty() {
            builder
        } else {
            builder.bearer_auth(self.api_key.trim())
        };
        let response = builder
            .send()
            .await
            .context("openai chat.completions request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "openai chat.completions failed: status={} body={}",
                status,
                text
            ));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .context("openai response json parse failed")?;

        value
            .get("choices")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("openai response contained no message content"))
    }
}
