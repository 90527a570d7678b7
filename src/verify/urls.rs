use aho_corasick::AhoCorasick;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

static URL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn url_pattern() -> &'static Regex {
    URL_PATTERN.get_or_init(|| Regex::new(r"https?://\S+").expect("valid URL pattern"))
}

/// Extract every http(s) URL from free text, in order of appearance.
/// Duplicates are preserved; trailing punctuation is part of the match.
pub fn extract_urls(text: &str) -> Vec<String> {
    url_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

// Outlet names and generic news markers matched as substrings against the
// whole URL (host and path). Intentionally coarse: a false positive only
// costs one extra verification pass.
const NEWS_SOURCE_HINTS: &[&str] = &[
    "news",
    "bbc",
    "cnn",
    "nytimes",
    "theguardian",
    "reuters",
    "foxnews",
    "nbc",
    "abcnews",
    "usatoday",
    "washingtonpost",
    "latimes",
    "npr",
    "aljazeera",
    "economist",
    "bloomberg",
    "cnbc",
    "dailymail",
    "hindustantimes",
    "indiatimes",
    "timesofindia",
    "indianexpress",
    "thehindu",
    "dnaindia",
    "firstpost",
    "news18",
    "zeenews",
    "oneindia",
    "timesnow",
    "ibtimes",
    "expressindia",
    "thequint",
    "newsx",
    "aajtak",
    "tribune",
    "thetimes",
    "post",
    "herald",
    "channelnewsasia",
    "scmp",
    "telegraph",
    "thedaily",
    "guardian",
    "abc",
    "cbs",
    "msnbc",
    "usat",
    "global",
    "daily",
    "breaking",
    "bulletin",
    "chronicle",
];

static NEWS_MATCHER: OnceLock<AhoCorasick> = OnceLock::new();

fn news_matcher() -> &'static AhoCorasick {
    NEWS_MATCHER.get_or_init(|| {
        // Patterns are simple substrings; Aho-Corasick gives linear-time scan.
        AhoCorasick::new(NEWS_SOURCE_HINTS).expect("valid news-source patterns")
    })
}

/// Returns `true` if this URL looks like a news source.
pub fn is_news_url(url: &str) -> bool {
    let lowered = url.to_lowercase();
    news_matcher().is_match(&lowered)
}

/// Keep the first occurrence of each URL, preserving order.
pub fn dedup_first_occurrence(urls: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.iter()
        .filter(|u| seen.insert(u.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_urls_in_order_with_duplicates() {
        let text = "see https://bbc.com/a then http://x.io/b and again https://bbc.com/a";
        let urls = extract_urls(text);
        assert_eq!(urls, vec!["https://bbc.com/a", "http://x.io/b", "https://bbc.com/a"]);
    }

    #[test]
    fn url_match_runs_to_whitespace() {
        let urls = extract_urls("wrapped (https://bbc.com/story) here");
        // Trailing punctuation is part of the non-whitespace run.
        assert_eq!(urls, vec!["https://bbc.com/story)"]);
    }

    #[test]
    fn no_scheme_no_match() {
        assert!(extract_urls("visit bbc.com and www.cnn.com today").is_empty());
    }

    #[test]
    fn news_classification_is_case_insensitive_substring() {
        assert!(is_news_url("https://www.BBC.co.uk/article"));
        assert!(is_news_url("https://blog.site.io/breaking/story"));
        // "news" appears anywhere in the URL, including the path.
        assert!(is_news_url("https://totally-not-a-news-site.biz"));
        assert!(!is_news_url("https://example.com/items/42"));
        assert!(!is_news_url("https://shop.vendor.io/cart"));
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let urls: Vec<String> = ["https://a", "https://b", "https://a", "https://c", "https://b"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(dedup_first_occurrence(&urls), vec!["https://a", "https://b", "https://c"]);
    }
}
