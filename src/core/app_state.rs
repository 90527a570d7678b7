use std::env;

#[derive(Clone)]
pub struct AppState {
    pub http_client: reqwest::Client,
    // Concurrency control for external calls
    pub outbound_limit: std::sync::Arc<tokio::sync::Semaphore>,
    // Chat model for triage and summaries (optional; None when no key is configured)
    pub chat_model: Option<std::sync::Arc<dyn crate::triage::ChatModel>>,
    // Web search for condition-information lookups (optional)
    pub search_provider: Option<std::sync::Arc<dyn crate::health::SearchProvider>>,
    // Post analyzer — wired after the deepfake model warm-up succeeds.
    pub analyzer: Option<std::sync::Arc<crate::verify::PostAnalyzer>>,
    pub triage: std::sync::Arc<crate::triage::ComplaintTriage>,
    // Skin triage — wired after the skin model warm-up succeeds.
    pub skin: Option<std::sync::Arc<crate::health::SkinTriage>>,

    /// File-based config loaded from `civic-lens.json` (env-var fallback for all fields).
    pub lens_config: std::sync::Arc<crate::core::config::LensConfig>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("analyzer_enabled", &self.analyzer.is_some())
            .field("skin_enabled", &self.skin.is_some())
            .field("chat_enabled", &self.chat_model.is_some())
            .field("search_enabled", &self.search_provider.is_some())
            .finish()
    }
}

impl AppState {
    pub fn new(http_client: reqwest::Client) -> Self {
        let outbound_limit = env::var("OUTBOUND_LIMIT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(32);

        let lens_config = std::sync::Arc::new(crate::core::config::load_lens_config());

        let chat_model = crate::triage::OpenAiChatClient::from_config(
            http_client.clone(),
            &lens_config.llm,
        )
        .map(|c| std::sync::Arc::new(c) as std::sync::Arc<dyn crate::triage::ChatModel>);
        let search_provider = crate::health::SerperClient::from_config(
            http_client.clone(),
            &lens_config.search,
        )
        .map(|c| std::sync::Arc::new(c) as std::sync::Arc<dyn crate::health::SearchProvider>);

        let records = crate::triage::RecordStore::new(lens_config.resolve_records_dir());
        let mut triage = crate::triage::ComplaintTriage::new(records);
        if let Some(chat) = &chat_model {
            triage = triage.with_chat_model(std::sync::Arc::clone(chat));
        }

        Self {
            http_client,
            outbound_limit: std::sync::Arc::new(tokio::sync::Semaphore::new(outbound_limit)),
            chat_model,
            search_provider,
            analyzer: None, // Wired after the deepfake model warm-up
            triage: std::sync::Arc::new(triage),
            skin: None, // Wired after the skin model warm-up
            lens_config,
        }
    }

    pub fn with_analyzer(mut self, analyzer: std::sync::Arc<crate::verify::PostAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn with_skin_triage(mut self, skin: std::sync::Arc<crate::health::SkinTriage>) -> Self {
        self.skin = Some(skin);
        self
    }
}
