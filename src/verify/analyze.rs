use super::aggregate::{decide_local_images, decide_news_url, no_page_text};
use super::factcheck::FactCheckClient;
use super::images::classify_images;
use super::scrape::fetch_page;
use super::urls::{dedup_first_occurrence, extract_urls, is_news_url};
use crate::core::types::{AnalysisDecision, PostAnalysisReport};
use crate::inference::ImageScorer;
use crate::nlp::{claim_query, EntityTagger};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// Results key for the post's own attached images.
pub const LOCAL_IMAGES_KEY: &str = "local_images";

const DEFAULT_OUTBOUND_LIMIT: usize = 32;
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Verifies social posts: scans for news URLs, scrapes each one, checks the
/// page's main claim against a fact-check service, scores its images, and
/// folds everything into per-source verdicts. All dependencies come in
/// through the constructor so tests can swap them.
pub struct PostAnalyzer {
    http: reqwest::Client,
    scorer: Arc<dyn ImageScorer>,
    fact_check: FactCheckClient,
    tagger: Arc<dyn EntityTagger>,
    outbound_limit: Arc<Semaphore>,
    max_concurrent: usize,
}

impl PostAnalyzer {
    pub fn new(
        http: reqwest::Client,
        scorer: Arc<dyn ImageScorer>,
        fact_check: FactCheckClient,
        tagger: Arc<dyn EntityTagger>,
    ) -> Self {
        Self {
            http,
            scorer,
            fact_check,
            tagger,
            outbound_limit: Arc::new(Semaphore::new(DEFAULT_OUTBOUND_LIMIT)),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Share a process-wide outbound concurrency guard.
    pub fn with_outbound_limit(mut self, limit: Arc<Semaphore>) -> Self {
        self.outbound_limit = limit;
        self
    }

    /// News URLs processed concurrently per post (min 1).
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Analyze one post. Each news URL gets an independent decision; one
    /// source failing never aborts the others. Attached images, when
    /// present, contribute a decision under [`LOCAL_IMAGES_KEY`].
    pub async fn analyze(&self, post_text: &str, local_images: &[String]) -> PostAnalysisReport {
        let urls_found = extract_urls(post_text);
        let news_urls_found: Vec<String> = urls_found
            .iter()
            .filter(|u| is_news_url(u))
            .cloned()
            .collect();
        let unique_news = dedup_first_occurrence(&news_urls_found);
        info!(
            urls = urls_found.len(),
            news_urls = news_urls_found.len(),
            unique = unique_news.len(),
            local_images = local_images.len(),
            "analyzing post"
        );

        let decided: Vec<(String, AnalysisDecision)> = stream::iter(unique_news)
            .map(|url| async move {
                let decision = self.analyze_news_url(&url).await;
                (url, decision)
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;
        let mut results: BTreeMap<String, AnalysisDecision> = decided.into_iter().collect();

        if !local_images.is_empty() {
            let _permit = self.outbound_limit.acquire().await.expect("semaphore closed");
            let labels =
                classify_images(&self.http, &self.scorer, local_images, self.max_concurrent).await;
            results.insert(LOCAL_IMAGES_KEY.to_string(), decide_local_images(&labels));
        }

        PostAnalysisReport {
            results,
            urls_found,
            news_urls_found,
        }
    }

    /// Verify one news URL end to end. Unreachable pages and pages without
    /// paragraph text are rejected outright; otherwise the fact-check lookup
    /// and image scoring run concurrently and aggregate into the decision.
    pub async fn analyze_news_url(&self, url: &str) -> AnalysisDecision {
        // One permit per URL bounds outbound work across concurrent requests.
        let _permit = self.outbound_limit.acquire().await.expect("semaphore closed");

        let Some(page) = fetch_page(&self.http, url).await else {
            return no_page_text();
        };
        if page.text.is_empty() {
            return no_page_text();
        }

        let query = claim_query(self.tagger.as_ref(), &page.text);
        debug!(url, query = query.as_str(), images = page.images.len(), "verifying page");

        let (fact, labels) = tokio::join!(
            self.fact_check.check_claim(&query),
            classify_images(&self.http, &self.scorer, &page.images, self.max_concurrent),
        );
        decide_news_url(&fact, &labels)
    }
}
