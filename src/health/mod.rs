pub mod search;

pub use search::{SearchProvider, SerperClient};

use crate::inference::{InferenceError, SkinClassifier, SkinPrediction};
use crate::triage::ChatModel;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Assessment returned by the health-check endpoint: the predicted
/// condition plus whatever topic summaries could be gathered.
#[derive(Debug, Clone, Serialize)]
pub struct SkinAssessment {
    pub condition: String,
    pub code: String,
    pub confidence: f32,
    pub info: BTreeMap<String, String>,
}

/// Skin-lesion health check: classify the image, then look up patient
/// information per topic. Lookups need both a chat model and a search
/// provider; without them the assessment ships with an empty info map.
pub struct SkinTriage {
    classifier: Arc<SkinClassifier>,
    chat: Option<Arc<dyn ChatModel>>,
    search: Option<Arc<dyn SearchProvider>>,
}

impl SkinTriage {
    pub fn new(classifier: Arc<SkinClassifier>) -> Self {
        Self {
            classifier,
            chat: None,
            search: None,
        }
    }

    pub fn with_chat_model(mut self, chat: Arc<dyn ChatModel>) -> Self {
        self.chat = Some(chat);
        self
    }

    pub fn with_search_provider(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    pub async fn assess(&self, image_path: &str) -> Result<SkinAssessment> {
        let bytes = tokio::fs::read(image_path)
            .await
            .with_context(|| format!("failed to read image at {image_path}"))?;

        let classifier = Arc::clone(&self.classifier);
        let prediction: SkinPrediction =
            tokio::task::spawn_blocking(move || -> Result<SkinPrediction, InferenceError> {
                let image = image::load_from_memory(&bytes)?;
                classifier.classify(&image)
            })
            .await
            .context("skin classification task panicked")??;
        debug!(
            condition = prediction.condition.as_str(),
            confidence = prediction.confidence,
            "skin lesion classified"
        );

        let info = match (self.chat.as_deref(), self.search.as_deref()) {
            (Some(chat), Some(search)) => {
                gather_condition_info(chat, search, &prediction.condition).await
            }
            _ => BTreeMap::new(),
        };

        Ok(SkinAssessment {
            condition: prediction.condition,
            code: prediction.code,
            confidence: prediction.confidence,
            info,
        })
    }
}

fn condition_queries(condition: &str) -> [(&'static str, String); 3] {
    [
        ("Symptoms", format!("What are the symptoms of {condition}?")),
        ("Treatment", format!("What are the treatments for {condition}?")),
        ("Prevention", format!("How to prevent {condition}?")),
    ]
}

/// Search and summarize each topic. A failed topic is dropped from the
/// map rather than failing the whole assessment.
async fn gather_condition_info(
    chat: &dyn ChatModel,
    search: &dyn SearchProvider,
    condition: &str,
) -> BTreeMap<String, String> {
    let mut info = BTreeMap::new();
    for (topic, query) in condition_queries(condition) {
        match lookup_topic(chat, search, &query).await {
            Ok(summary) => {
                info.insert(topic.to_string(), summary);
            }
            Err(e) => warn!(topic, "condition info lookup failed: {}", e),
        }
    }
    info
}

async fn lookup_topic(
    chat: &dyn ChatModel,
    search: &dyn SearchProvider,
    query: &str,
) -> Result<String> {
    let raw = search.search_snippets(query).await?;
    let prompt = format!(
        "Summarize this medical search result in 2-3 plain sentences for a patient. Don't use salutations.\n{raw}"
    );
    chat.complete(&prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoChat;

    #[async_trait]
    impl ChatModel for EchoChat {
        async fn complete(&self, prompt: &str) -> Result<String> {
            Ok(format!("summary of: {prompt}"))
        }
    }

    struct ScriptedSearch {
        replies: Mutex<Vec<Result<String, String>>>,
    }

    #[async_trait]
    impl SearchProvider for ScriptedSearch {
        async fn search_snippets(&self, _query: &str) -> Result<String> {
            match self.replies.lock().unwrap().remove(0) {
                Ok(s) => Ok(s),
                Err(e) => Err(anyhow::anyhow!(e)),
            }
        }
    }

    #[test]
    fn queries_embed_the_condition() {
        let queries = condition_queries("Melanoma");
        assert_eq!(queries[0].1, "What are the symptoms of Melanoma?");
        assert_eq!(queries[1].1, "What are the treatments for Melanoma?");
        assert_eq!(queries[2].1, "How to prevent Melanoma?");
    }

    #[tokio::test]
    async fn failed_topic_is_omitted() {
        let search = ScriptedSearch {
            replies: Mutex::new(vec![
                Ok("itching".to_string()),
                Err("search down".to_string()),
                Ok("sunscreen".to_string()),
            ]),
        };
        let info = gather_condition_info(&EchoChat, &search, "Melanoma").await;
        assert_eq!(info.len(), 2);
        assert!(info.contains_key("Symptoms"));
        assert!(!info.contains_key("Treatment"));
        assert!(info.contains_key("Prevention"));
    }

    #[tokio::test]
    async fn summary_prompt_carries_snippets() {
        let search = ScriptedSearch {
            replies: Mutex::new(vec![Ok("use sunscreen daily".to_string())]),
        };
        let summary = lookup_topic(&EchoChat, &search, "How to prevent Melanoma?")
            .await
            .unwrap();
        assert!(summary.contains("use sunscreen daily"));
    }
}
