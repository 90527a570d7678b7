use super::factcheck::FactCheckVerdict;
use super::images::ImageLabel;
use crate::core::types::{AnalysisDecision, Verdict};
use std::collections::BTreeMap;

/// Confidence floor when the fact-check rating itself says the claim is fake.
pub const FAKE_RATING_CONFIDENCE_FLOOR: f64 = 0.7;
/// Weight applied when only image evidence points at fabrication.
pub const IMAGE_ONLY_CONFIDENCE_WEIGHT: f64 = 0.5;
/// Confidence above which content is rejected (strict).
pub const REJECT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Share of deepfake labels among all labeled images. `Invalid` labels stay
/// in the denominator, so unverifiable images dilute the ratio. Zero images
/// → ratio 0.
pub fn fake_image_ratio(labels: &BTreeMap<String, ImageLabel>) -> f64 {
    let deepfakes = labels.values().filter(|l| l.is_deepfake()).count();
    deepfakes as f64 / labels.len().max(1) as f64
}

fn rating_mentions_fake(fact: &FactCheckVerdict) -> bool {
    fact.rating_text()
        .map(|rating| rating.to_lowercase().contains("fake"))
        .unwrap_or(false)
}

/// Combine fact-check and image evidence for one news URL.
///
/// A rating that mentions "fake" lifts confidence to at least 0.7 (instant
/// rejection); otherwise image evidence alone is halved, so even a page
/// where every image is a deepfake cannot cross the 0.5 threshold without
/// textual corroboration.
pub fn decide_news_url(
    fact: &FactCheckVerdict,
    labels: &BTreeMap<String, ImageLabel>,
) -> AnalysisDecision {
    let ratio = fake_image_ratio(labels);
    let confidence = if rating_mentions_fake(fact) {
        ratio.max(FAKE_RATING_CONFIDENCE_FLOOR)
    } else {
        ratio * IMAGE_ONLY_CONFIDENCE_WEIGHT
    };
    if confidence > REJECT_CONFIDENCE_THRESHOLD {
        AnalysisDecision {
            verdict: Verdict::Rejected,
            reason: format!("Fake indicators detected (confidence {:.2}%)", confidence * 100.0),
            confidence,
        }
    } else {
        AnalysisDecision {
            verdict: Verdict::Allowed,
            reason: format!("Likely genuine (confidence {:.2}%)", (1.0 - confidence) * 100.0),
            confidence,
        }
    }
}

/// Decision for a page that was unreachable or had no paragraph text.
/// Nothing verifiable means rejection, with full confidence.
pub fn no_page_text() -> AnalysisDecision {
    AnalysisDecision {
        verdict: Verdict::Rejected,
        reason: "No text found on page".to_string(),
        confidence: 1.0,
    }
}

/// Decision for images attached directly to the post. Stricter than the
/// URL path: a single deepfake rejects outright.
pub fn decide_local_images(labels: &BTreeMap<String, ImageLabel>) -> AnalysisDecision {
    let ratio = fake_image_ratio(labels);
    if labels.values().any(|l| l.is_deepfake()) {
        AnalysisDecision {
            verdict: Verdict::Rejected,
            reason: "Deepfake detected in one or more local images.".to_string(),
            confidence: ratio,
        }
    } else {
        AnalysisDecision {
            verdict: Verdict::Allowed,
            reason: "Local images appear genuine.".to_string(),
            confidence: ratio,
        }
    }
}
