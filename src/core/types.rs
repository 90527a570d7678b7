use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzePostRequest {
    #[serde(default)]
    pub post_text: Option<String>,
    /// Paths of images attached directly to the post (not scraped from pages).
    #[serde(default)]
    pub image_paths: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComplaintRequest {
    #[serde(default)]
    pub complaint: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComplaintResponse {
    pub complainer_view: String,
    pub officer_view: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckRequest {
    #[serde(default)]
    pub image_path: Option<String>,
}

/// Moderation outcome for one piece of evidence (a news URL or the post's
/// own image attachments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Allowed,
    Rejected,
}

/// A single verdict with its human-readable reason. `confidence` is the
/// belief that the content is fabricated (1.0 = certainly fake).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDecision {
    pub verdict: Verdict,
    pub reason: String,
    pub confidence: f64,
}

/// Full report for one post: per-source decisions plus the raw URL scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostAnalysisReport {
    pub results: BTreeMap<String, AnalysisDecision>,
    pub urls_found: Vec<String>,
    pub news_urls_found: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
