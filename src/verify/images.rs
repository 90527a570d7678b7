use crate::inference::ImageScorer;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task;

/// Label for one image source. `Invalid` images still count toward the
/// image total during aggregation, diluting the fake ratio rather than
/// inflating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLabel {
    Real,
    Deepfake,
    /// Could not be fetched, decoded, or scored; the reason travels along.
    Invalid(String),
}

impl ImageLabel {
    pub fn is_deepfake(&self) -> bool {
        matches!(self, ImageLabel::Deepfake)
    }
}

const DEEPFAKE_THRESHOLD: f32 = 0.5;

/// Classify one image source. URL sources are fetched over HTTP; anything
/// else is read from local disk (relative `src` values scraped from pages
/// land here and fail as `Invalid`). Every failure becomes a label so one
/// bad image never sinks the batch.
pub async fn classify_image(
    http: &reqwest::Client,
    scorer: &Arc<dyn ImageScorer>,
    source: &str,
) -> ImageLabel {
    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        let response = match http.get(source).send().await {
            Ok(r) => r,
            Err(e) => return ImageLabel::Invalid(format!("Invalid Image ({e})")),
        };
        if response.status() != reqwest::StatusCode::OK {
            return ImageLabel::Invalid("Image not accessible".to_string());
        }
        match response.bytes().await {
            Ok(b) => b.to_vec(),
            Err(e) => return ImageLabel::Invalid(format!("Invalid Image ({e})")),
        }
    } else {
        match tokio::fs::read(source).await {
            Ok(b) => b,
            Err(e) => return ImageLabel::Invalid(format!("Invalid Image ({e})")),
        }
    };

    let scorer = Arc::clone(scorer);
    match task::spawn_blocking(move || score_bytes(scorer.as_ref(), &bytes)).await {
        Ok(label) => label,
        Err(e) => ImageLabel::Invalid(format!("Invalid Image ({e})")),
    }
}

fn score_bytes(scorer: &dyn ImageScorer, bytes: &[u8]) -> ImageLabel {
    let image = match image::load_from_memory(bytes) {
        Ok(i) => i,
        Err(e) => return ImageLabel::Invalid(format!("Invalid Image ({e})")),
    };
    match scorer.score(&image) {
        Ok(score) if score > DEEPFAKE_THRESHOLD => ImageLabel::Deepfake,
        Ok(_) => ImageLabel::Real,
        Err(e) => ImageLabel::Invalid(format!("Invalid Image ({e})")),
    }
}

/// Classify a batch of image sources with bounded fan-out. Duplicate
/// sources collapse to one entry.
pub async fn classify_images(
    http: &reqwest::Client,
    scorer: &Arc<dyn ImageScorer>,
    sources: &[String],
    max_concurrent: usize,
) -> BTreeMap<String, ImageLabel> {
    let labeled: Vec<(String, ImageLabel)> = stream::iter(sources.to_vec())
        .map(|source| {
            let http = http.clone();
            let scorer = Arc::clone(scorer);
            async move {
                let label = classify_image(&http, &scorer, &source).await;
                (source, label)
            }
        })
        .buffer_unordered(max_concurrent.max(1))
        .collect()
        .await;
    labeled.into_iter().collect()
}
