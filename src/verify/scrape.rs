use scraper::{Html, Selector};
use tracing::debug;

/// What one page contributes to verification: its paragraph text and the
/// raw `src` of every image element, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub text: String,
    pub images: Vec<String>,
}

/// Fetch a page and extract its verifiable content.
///
/// Returns `None` on transport errors and on any non-200 status; the caller
/// treats an unreachable page the same as a page with no text.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Option<PageContent> {
    let response = match client.get(url).send().await {
        Ok(r) => r,
        Err(e) => {
            debug!("fetch failed for {}: {}", url, e);
            return None;
        }
    };
    if response.status() != reqwest::StatusCode::OK {
        debug!("fetch for {} returned status {}", url, response.status());
        return None;
    }
    let body = match response.text().await {
        Ok(b) => b,
        Err(e) => {
            debug!("body read failed for {}: {}", url, e);
            return None;
        }
    };
    Some(parse_page(&body))
}

/// Parse an HTML document into `PageContent`.
///
/// Text is the space-joined content of all `<p>` elements. Images are the
/// raw `src` attributes of `<img>` elements, skipping inline `data:` URIs;
/// relative `src` values are kept as-is and will fail classification later
/// rather than being resolved here.
pub fn parse_page(html: &str) -> PageContent {
    let document = Html::parse_document(html);

    let mut paragraphs: Vec<String> = Vec::new();
    if let Ok(selector) = Selector::parse("p") {
        for element in document.select(&selector) {
            paragraphs.push(element.text().collect::<String>());
        }
    }

    let mut images: Vec<String> = Vec::new();
    if let Ok(selector) = Selector::parse("img[src]") {
        for element in document.select(&selector) {
            if let Some(src) = element.value().attr("src") {
                if !src.starts_with("data:") {
                    images.push(src.to_string());
                }
            }
        }
    }

    PageContent {
        text: paragraphs.join(" "),
        images,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paragraphs_with_single_space() {
        let page = parse_page("<html><body><p>First.</p><div>skip</div><p>Second.</p></body></html>");
        assert_eq!(page.text, "First. Second.");
    }

    #[test]
    fn paragraph_text_includes_nested_elements() {
        let page = parse_page("<p>Officials <b>confirmed</b> the report.</p>");
        assert_eq!(page.text, "Officials confirmed the report.");
    }

    #[test]
    fn collects_image_sources_in_document_order() {
        let html = r#"
            <p>story</p>
            <img src="https://cdn.site/a.jpg">
            <img src="/relative/b.png">
            <img src="data:image/png;base64,AAAA">
            <img alt="no source">
            <img src="https://cdn.site/a.jpg">
        "#;
        let page = parse_page(html);
        assert_eq!(
            page.images,
            vec!["https://cdn.site/a.jpg", "/relative/b.png", "https://cdn.site/a.jpg"]
        );
    }

    #[test]
    fn tolerates_malformed_html() {
        let page = parse_page("<p>unclosed <img src='x.gif'><p>next");
        assert!(page.text.contains("unclosed"));
        assert!(page.text.contains("next"));
        assert_eq!(page.images, vec!["x.gif"]);
    }

    #[test]
    fn page_without_paragraphs_is_empty_text() {
        let page = parse_page("<div>only divs here</div>");
        assert!(page.text.is_empty());
        assert!(page.images.is_empty());
    }

    // Network-dependent; run with `cargo test -- --ignored` when online.
    #[tokio::test]
    #[ignore]
    async fn fetch_page_returns_none_for_error_status() {
        let client = reqwest::Client::new();
        let page = fetch_page(&client, "https://httpbin.org/status/404").await;
        assert!(page.is_none());
    }
}
