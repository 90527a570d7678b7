use serde::Deserialize;
use tracing::{debug, warn};

/// Outcome of one claim lookup. Lookup failures are states, not errors:
/// a post must still get a verdict when the fact-check service is down.
#[derive(Debug, Clone, PartialEq)]
pub enum FactCheckVerdict {
    /// The service returned at least one reviewed claim.
    Rated {
        /// Publisher's textual rating, e.g. "False", "Fake", "Mostly true".
        rating: String,
        /// Review headline, or "No additional details".
        detail: String,
    },
    /// The service answered but knows nothing about this claim.
    NoClaimFound,
    /// The service answered with a non-200 status (bad key, quota, outage).
    ServiceUnreachable,
    /// Transport or decode failure.
    Failed(String),
}

impl FactCheckVerdict {
    /// The publisher rating, when one exists. Sentinel states have none and
    /// therefore never count as fake evidence downstream.
    pub fn rating_text(&self) -> Option<&str> {
        match self {
            FactCheckVerdict::Rated { rating, .. } => Some(rating.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClaimSearchResponse {
    #[serde(default)]
    claims: Vec<Claim>,
}

#[derive(Debug, Deserialize)]
struct Claim {
    #[serde(default, rename = "claimReview")]
    claim_review: Vec<ClaimReview>,
}

#[derive(Debug, Deserialize)]
struct ClaimReview {
    #[serde(default, rename = "textualRating")]
    textual_rating: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Client for a Google Fact Check Tools-compatible claim-search endpoint.
#[derive(Debug, Clone)]
pub struct FactCheckClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl FactCheckClient {
    pub fn new(http: reqwest::Client, endpoint: String, api_key: String) -> Self {
        Self {
            http,
            endpoint,
            api_key,
        }
    }

    /// Look up a claim and classify the outcome. Never fails the caller.
    pub async fn check_claim(&self, query: &str) -> FactCheckVerdict {
        let response = match self
            .http
            .get(&self.endpoint)
            .query(&[("query", query), ("key", self.api_key.as_str())])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("fact-check request failed: {}", e);
                return FactCheckVerdict::Failed(e.to_string());
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            warn!("fact-check service returned status {}", response.status());
            return FactCheckVerdict::ServiceUnreachable;
        }

        let parsed: ClaimSearchResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                warn!("fact-check response decode failed: {}", e);
                return FactCheckVerdict::Failed(e.to_string());
            }
        };

        let Some(claim) = parsed.claims.first() else {
            debug!("no fact-check claims for query");
            return FactCheckVerdict::NoClaimFound;
        };

        let review = claim.claim_review.first();
        FactCheckVerdict::Rated {
            rating: review
                .and_then(|r| r.textual_rating.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            detail: review
                .and_then(|r| r.title.clone())
                .unwrap_or_else(|| "No additional details".to_string()),
        }
    }
}
