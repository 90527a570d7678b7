use crate::core::config::LensSearchConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;

/// Web-search seam for the condition-information lookup.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Runs a query and returns the most useful snippet text, newline-joined.
    async fn search_snippets(&self, query: &str) -> Result<String>;
}

/// Client for the Serper.dev JSON search API.
#[derive(Debug, Clone)]
pub struct SerperClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl SerperClient {
    pub fn new(http: reqwest::Client, endpoint: String, api_key: String) -> Self {
        Self {
            http,
            endpoint,
            api_key,
        }
    }

    /// Build from config. Returns `None` when no API key is configured,
    /// which disables condition-information lookups.
    pub fn from_config(http: reqwest::Client, cfg: &LensSearchConfig) -> Option<Self> {
        let api_key = cfg.resolve_api_key()?;
        Some(Self::new(http, cfg.resolve_endpoint(), api_key))
    }
}

#[async_trait]
impl SearchProvider for SerperClient {
    async fn search_snippets(&self, query: &str) -> Result<String> {
        let body = serde_json::json!({ "q": query });
        let response = self
            .http
            .post(&self.endpoint)
            .header("X-API-KEY", self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .context("serper search request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "serper search failed: status={} body={}",
                status,
                text
            ));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .context("serper response json parse failed")?;

        extract_snippets(&value)
            .ok_or_else(|| anyhow::anyhow!("serper response contained no snippets"))
    }
}

/// Prefer the answer box; otherwise join the first organic snippets.
fn extract_snippets(value: &serde_json::Value) -> Option<String> {
    if let Some(answer_box) = value.get("answerBox") {
        for field in ["answer", "snippet"] {
            if let Some(text) = answer_box.get(field).and_then(|v| v.as_str()) {
                let text = text.trim();
                if !text.is_empty() {
                    return Some(text.to_string());
                }
            }
        }
    }

    let snippets: Vec<&str> = value
        .get("organic")
        .and_then(|v| v.as_array())
        .map(|results| {
            results
                .iter()
                .take(5)
                .filter_map(|r| r.get("snippet").and_then(|s| s.as_str()))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if snippets.is_empty() {
        None
    } else {
        Some(snippets.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn answer_box_answer_wins() {
        let value = json!({
            "answerBox": {"answer": "Itching and redness.", "snippet": "longer text"},
            "organic": [{"snippet": "ignored"}]
        });
        assert_eq!(extract_snippets(&value).as_deref(), Some("Itching and redness."));
    }

    #[test]
    fn answer_box_snippet_when_no_answer() {
        let value = json!({"answerBox": {"snippet": "From the box."}});
        assert_eq!(extract_snippets(&value).as_deref(), Some("From the box."));
    }

    #[test]
    fn organic_snippets_joined_and_capped() {
        let organic: Vec<_> = (1..=7)
            .map(|i| json!({"snippet": format!("snippet {i}")}))
            .collect();
        let value = json!({ "organic": organic });
        let joined = extract_snippets(&value).unwrap();
        assert_eq!(joined.lines().count(), 5);
        assert!(joined.starts_with("snippet 1"));
        assert!(joined.ends_with("snippet 5"));
    }

    #[test]
    fn empty_response_yields_none() {
        assert_eq!(extract_snippets(&json!({})), None);
        assert_eq!(extract_snippets(&json!({"organic": []})), None);
        let blank = json!({"answerBox": {"answer": "  "}, "organic": [{"snippet": ""}]});
        assert_eq!(extract_snippets(&blank), None);
    }
}
