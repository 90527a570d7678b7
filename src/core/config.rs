use std::path::PathBuf;

// ---------------------------------------------------------------------------
// LensConfig — file-based config loader (civic-lens.json) with env-var fallback
// ---------------------------------------------------------------------------

/// Fact-check sub-config (mirrors the `fact_check` key in civic-lens.json).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct LensFactCheckConfig {
    /// Claim-search endpoint. Defaults to the Google Fact Check Tools API.
    pub endpoint: Option<String>,
    /// API key sent as the `key` query parameter. Never logged.
    pub api_key: Option<String>,
}

impl LensFactCheckConfig {
    /// Endpoint: JSON field → `FACT_CHECK_ENDPOINT` env var → Google Fact Check Tools.
    pub fn resolve_endpoint(&self) -> String {
        if let Some(u) = &self.endpoint {
            if !u.trim().is_empty() {
                return u.clone();
            }
        }
        std::env::var("FACT_CHECK_ENDPOINT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| {
                "https://factchecktools.googleapis.com/v1alpha1/claims:search".to_string()
            })
    }

    /// API key: JSON field → `FACT_CHECK_API_KEY` env var → empty string.
    ///
    /// An empty key is still sent; the service answers with a non-200 status and
    /// the verdict degrades to "service unreachable" instead of failing the post.
    pub fn resolve_api_key(&self) -> String {
        if let Some(k) = &self.api_key {
            return k.trim().to_string();
        }
        std::env::var("FACT_CHECK_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_default()
    }
}

/// Chat-model sub-config for complaint triage and health-check summaries
/// (mirrors the `llm` key in civic-lens.json).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct LensLlmConfig {
    /// LLM endpoint — e.g. `https://api.openai.com/v1` or `http://localhost:11434/v1` (Ollama).
    pub base_url: Option<String>,
    /// API key. Never logged. Leave blank for key-less local endpoints.
    pub api_key: Option<String>,
    /// Model name — e.g. `gpt-4o-mini`, `llama3-8b-8192`.
    pub model: Option<String>,
}

impl LensLlmConfig {
    /// API key: JSON field → `OPENAI_API_KEY` env var → `None`.
    ///
    /// When `api_key` is explicitly set to `""` in the config file, returns `Some("")`.
    /// This signals "no key required" (Ollama / LM Studio) — triage proceeds without auth.
    /// Returns `None` only when the field is absent from config AND `OPENAI_API_KEY` is
    /// unset, which disables the chat model entirely (every derived field falls back).
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(k) = &self.api_key {
            return Some(k.trim().to_string());
        }
        std::env::var("OPENAI_API_KEY").ok().filter(|v| !v.trim().is_empty())
    }

    /// LLM base URL: JSON field → `OPENAI_BASE_URL` env var → `https://api.openai.com/v1`.
    pub fn resolve_base_url(&self) -> String {
        if let Some(u) = &self.base_url {
            if !u.trim().is_empty() {
                return u.clone();
            }
        }
        std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
    }

    /// Model name: JSON field → `TRIAGE_LLM_MODEL` env var → `llama3-8b-8192`.
    pub fn resolve_model(&self) -> String {
        if let Some(m) = &self.model {
            if !m.trim().is_empty() {
                return m.clone();
            }
        }
        std::env::var("TRIAGE_LLM_MODEL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "llama3-8b-8192".to_string())
    }
}

/// Web-search sub-config for the health-check feature
/// (mirrors the `search` key in civic-lens.json).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct LensSearchConfig {
    /// Search endpoint. Defaults to Serper.
    pub endpoint: Option<String>,
    /// API key sent as the `X-API-KEY` header. Never logged.
    pub api_key: Option<String>,
}

impl LensSearchConfig {
    /// Endpoint: JSON field → `SEARCH_API_ENDPOINT` env var → Serper.
    pub fn resolve_endpoint(&self) -> String {
        if let Some(u) = &self.endpoint {
            if !u.trim().is_empty() {
                return u.clone();
            }
        }
        std::env::var("SEARCH_API_ENDPOINT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "https://google.serper.dev/search".to_string())
    }

    /// API key: JSON field → `SERPER_API_KEY` env var → `None` (search disabled).
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(k) = &self.api_key {
            let k = k.trim();
            if !k.is_empty() {
                return Some(k.to_string());
            }
        }
        std::env::var("SERPER_API_KEY").ok().filter(|v| !v.trim().is_empty())
    }
}

/// ONNX model locations (mirrors the `models` key in civic-lens.json).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct LensModelsConfig {
    /// Deepfake detector (single-logit image classifier).
    pub deepfake_path: Option<String>,
    /// Skin-lesion classifier (7-class HAM10000-style head).
    pub skin_path: Option<String>,
}

impl LensModelsConfig {
    /// Deepfake model: JSON field → `DEEPFAKE_MODEL_PATH` env var → `deepfake_model.onnx`.
    pub fn resolve_deepfake_path(&self) -> PathBuf {
        if let Some(p) = &self.deepfake_path {
            if !p.trim().is_empty() {
                return PathBuf::from(p);
            }
        }
        std::env::var("DEEPFAKE_MODEL_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("deepfake_model.onnx"))
    }

    /// Skin model: JSON field → `SKIN_MODEL_PATH` env var → `skin_disease_model.onnx`.
    pub fn resolve_skin_path(&self) -> PathBuf {
        if let Some(p) = &self.skin_path {
            if !p.trim().is_empty() {
                return PathBuf::from(p);
            }
        }
        std::env::var("SKIN_MODEL_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("skin_disease_model.onnx"))
    }
}

/// Post-analysis tuning (mirrors the `analyze` key in civic-lens.json).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct LensAnalyzeConfig {
    /// Concurrent news URLs processed per post. Default: 4.
    pub max_concurrent: Option<usize>,
}

impl LensAnalyzeConfig {
    /// Fan-out per post: JSON field → `ANALYZE_MAX_CONCURRENT` env var → 4 (min 1).
    pub fn resolve_max_concurrent(&self) -> usize {
        let n = if let Some(n) = self.max_concurrent {
            n
        } else {
            std::env::var("ANALYZE_MAX_CONCURRENT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4)
        };
        n.max(1)
    }
}

/// Top-level config loaded from `civic-lens.json`.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct LensConfig {
    #[serde(default)]
    pub fact_check: LensFactCheckConfig,
    #[serde(default)]
    pub llm: LensLlmConfig,
    #[serde(default)]
    pub search: LensSearchConfig,
    #[serde(default)]
    pub models: LensModelsConfig,
    #[serde(default)]
    pub analyze: LensAnalyzeConfig,
    /// Directory where complaint records are appended.
    pub records_dir: Option<String>,
}

impl LensConfig {
    /// Records directory: JSON field → `RECORDS_DIR` env var → `~/.civic-lens/records`
    /// → `./records` when no home directory can be determined.
    pub fn resolve_records_dir(&self) -> PathBuf {
        if let Some(d) = &self.records_dir {
            if !d.trim().is_empty() {
                return PathBuf::from(d);
            }
        }
        if let Some(d) = std::env::var("RECORDS_DIR").ok().filter(|v| !v.trim().is_empty()) {
            return PathBuf::from(d);
        }
        match dirs::home_dir() {
            Some(home) => home.join(".civic-lens").join("records"),
            None => PathBuf::from("records"),
        }
    }
}

/// Load `civic-lens.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `CIVIC_LENS_CONFIG` env var path
/// 2. `./civic-lens.json`  (process cwd during `cargo run`)
/// 3. `../civic-lens.json` (one level up — repo root when running from a subdir)
///
/// Missing file → `LensConfig::default()` (silent, all env-var fallbacks apply).
/// Parse error → log a warning, return `LensConfig::default()`.
pub fn load_lens_config() -> LensConfig {
    let candidates: Vec<PathBuf> = {
        let mut v = vec![
            PathBuf::from("civic-lens.json"),
            PathBuf::from("../civic-lens.json"),
        ];
        if let Ok(env_path) = std::env::var("CIVIC_LENS_CONFIG") {
            v.insert(0, PathBuf::from(env_path));
        }
        v
    };

    for path in &candidates {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<LensConfig>(&contents) {
                Ok(cfg) => {
                    tracing::info!("civic-lens.json loaded from {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(
                        "civic-lens.json parse error at {}: {} — using defaults",
                        path.display(),
                        e
                    );
                    return LensConfig::default();
                }
            },
            Err(_) => continue, // file not found at this path — try next
        }
    }

    // No config file found anywhere — silently use defaults (all env-var fallbacks will apply).
    LensConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_parses_with_defaults() {
        let cfg: LensConfig = serde_json::from_str("{}").unwrap();
        assert!(cfg.llm.api_key.is_none());
        assert!(cfg.records_dir.is_none());
        assert_eq!(cfg.analyze.resolve_max_concurrent(), 4);
    }

    #[test]
    fn partial_sections_parse() {
        let cfg: LensConfig = serde_json::from_str(
            r#"{
                "llm": { "api_key": "", "model": "llama3" },
                "analyze": { "max_concurrent": 0 },
                "records_dir": "/tmp/records"
            }"#,
        )
        .unwrap();
        // Explicit empty key means "key-less local endpoint", not "disabled".
        assert_eq!(cfg.llm.resolve_api_key(), Some(String::new()));
        assert_eq!(cfg.llm.resolve_model(), "llama3");
        // Zero fan-out is clamped up to 1.
        assert_eq!(cfg.analyze.resolve_max_concurrent(), 1);
        assert_eq!(cfg.resolve_records_dir(), PathBuf::from("/tmp/records"));
    }

    #[test]
    fn explicit_fields_win_over_defaults() {
        let cfg: LensConfig = serde_json::from_str(
            r#"{ "fact_check": { "endpoint": "http://localhost:9090/claims", "api_key": " k1 " } }"#,
        )
        .unwrap();
        assert_eq!(cfg.fact_check.resolve_endpoint(), "http://localhost:9090/claims");
        assert_eq!(cfg.fact_check.resolve_api_key(), "k1");
    }
}
