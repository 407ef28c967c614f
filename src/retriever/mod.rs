//! Web narrative retrieval
//!
//! Turns a URL pointing at a threat write-up into plain narrative text:
//! fetch the page, keep the text of its paragraph elements, drop everything
//! else. The original reference URL stays the caller's concern.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

/// UA string sent when fetching pages; some publishers reject obvious bots.
const USER_AGENT: &str = "Mozilla/5.0";

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://\S+").expect("URL pattern is valid"));

/// Classify an input string as a URL or plain narrative text
///
/// Only a leading `http://` or `https://` followed by non-whitespace counts;
/// URLs embedded later in the text do not.
pub fn is_url(input: &str) -> bool {
    URL_PATTERN.is_match(input)
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RetrieverError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status} fetching {url}")]
    ErrorStatus {
        status: reqwest::StatusCode,
        url: String,
    },
}

/// Trait for fetching narrative text from a web page
#[async_trait]
pub trait PageRetriever: Send + Sync {
    /// Fetch the page and reduce it to narrative text
    async fn fetch_text(&self, url: &Url) -> Result<String, RetrieverError>;
}

/// Paragraph-text page retriever backed by reqwest
pub struct WebPageRetriever {
    client: Client,
}

impl WebPageRetriever {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

impl Default for WebPageRetriever {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageRetriever for WebPageRetriever {
    async fn fetch_text(&self, url: &Url) -> Result<String, RetrieverError> {
        tracing::debug!(url = %url, "Fetching narrative web page");

        let response = self.client.get(url.as_str()).send().await?;

        if !response.status().is_success() {
            return Err(RetrieverError::ErrorStatus {
                status: response.status(),
                url: url.to_string(),
            });
        }

        let html = response.text().await?;
        let text = extract_paragraph_text(&html);

        tracing::info!(
            url = %url,
            html_length = html.len(),
            text_length = text.len(),
            "Extracted narrative text from page"
        );

        Ok(text)
    }
}

/// Reduce an HTML document to the space-joined text of its `<p>` elements
pub fn extract_paragraph_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut paragraphs = Vec::new();
    if let Ok(selector) = Selector::parse("p") {
        for element in document.select(&selector) {
            let text = element.text().collect::<String>();
            let text = text.trim();
            if !text.is_empty() {
                paragraphs.push(text.to_string());
            }
        }
    }

    paragraphs.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url_http_and_https() {
        assert!(is_url("http://example.com/report"));
        assert!(is_url("https://example.com/report"));
    }

    #[test]
    fn test_is_url_requires_leading_scheme() {
        assert!(!is_url("The attacker hosted payloads on https://example.com"));
        assert!(!is_url("example.com/report"));
        assert!(!is_url("Attacker used PowerShell to download a payload"));
    }

    #[test]
    fn test_is_url_requires_non_whitespace_after_scheme() {
        assert!(!is_url("https:// example.com"));
        assert!(!is_url("http://"));
    }

    #[test]
    fn test_extract_paragraph_text_joins_paragraphs() {
        let html = "<html><body>\
            <h1>APT Report</h1>\
            <p>The actor used PowerShell.</p>\
            <script>ignored()</script>\
            <p>Payloads were staged on a free host.</p>\
            </body></html>";

        assert_eq!(
            extract_paragraph_text(html),
            "The actor used PowerShell. Payloads were staged on a free host."
        );
    }

    #[test]
    fn test_extract_paragraph_text_without_paragraphs() {
        assert_eq!(extract_paragraph_text("<html><body><div>no p tags</div></body></html>"), "");
    }

    #[test]
    fn test_extract_paragraph_text_nested_markup() {
        let html = "<p>Used <code>rundll32.exe</code> for execution.</p>";
        assert_eq!(extract_paragraph_text(html), "Used rundll32.exe for execution.");
    }
}
