//! Runtime ingestion — fetch a page and add it to the retriever's corpus.
//!
//! Pages are parsed with `scraper`: the `<title>` element gives the title,
//! visible body text (script, style and similar elements skipped) gives the
//! first 400 characters of snippet, and long title words become keywords.
//! Anything unusable is rejected here, before `add_runtime`.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use renter_aid_knowledge::LawSearchResult;
use reqwest::{Client, Url};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::LawRetriever;

const SNIPPET_CHARS: usize = 400;
const MAX_KEYWORDS: usize = 8;

/// Errors at the ingestion boundary.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to fetch URL: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("fetch returned status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("page at {0} has no text content")]
    EmptyPage(String),

    #[error("invalid CSS selector: {0}")]
    Selector(String),
}

/// Outcome of a successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawIngestResponse {
    pub added: bool,
    pub result: LawSearchResult,
}

/// A page reduced to what the retriever indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub result: LawSearchResult,
    pub keywords: Vec<String>,
}

/// Accept only absolute http(s) URLs.
pub fn validate_url(url: &str) -> Result<Url, IngestError> {
    let parsed = Url::parse(url).map_err(|e| IngestError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(IngestError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// Elements whose text never reaches the snippet.
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "iframe", "svg", "template"];

fn selector(css: &str) -> Result<Selector, IngestError> {
    Selector::parse(css).map_err(|e| IngestError::Selector(format!("{css}: {e:?}")))
}

/// Collect text nodes under `element`, skipping non-visible subtrees.
fn visible_text(element: ElementRef<'_>, parts: &mut Vec<String>) {
    if SKIPPED_ELEMENTS.contains(&element.value().name()) {
        return;
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    visible_text(child_element, parts);
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reduce a fetched page to a runtime entry.
pub fn extract_page(url: &str, html: &str, as_of: NaiveDate) -> Result<ExtractedPage, IngestError> {
    let document = Html::parse_document(html);

    // The parser always synthesizes <html> and <body>, so one of these matches.
    let mut parts = Vec::new();
    let root = document
        .select(&selector("body")?)
        .next()
        .unwrap_or_else(|| document.root_element());
    visible_text(root, &mut parts);
    let text = collapse_whitespace(&parts.join(" "));
    if text.is_empty() {
        return Err(IngestError::EmptyPage(url.to_string()));
    }

    let title = document
        .select(&selector("title")?)
        .next()
        .map(|t| collapse_whitespace(&t.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| url.to_string());

    let keywords: Vec<String> = title
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .map(str::to_lowercase)
        .take(MAX_KEYWORDS)
        .collect();

    let snippet: String = text.chars().take(SNIPPET_CHARS).collect();

    Ok(ExtractedPage {
        result: LawSearchResult {
            source_url: url.to_string(),
            title,
            snippet,
            as_of_date: as_of,
        },
        keywords,
    })
}

/// Fetches pages and registers them with a retriever.
pub struct PageIngestor {
    http: Client,
}

impl PageIngestor {
    /// `timeout` bounds each fetch.
    pub fn new(timeout: Duration) -> Result<Self, IngestError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Fetch `url`, extract it, and add it to `retriever`'s runtime corpus.
    pub async fn ingest(
        &self,
        retriever: &LawRetriever,
        url: &str,
    ) -> Result<LawIngestResponse, IngestError> {
        let parsed = validate_url(url)?;
        let response = self.http.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        let html = String::from_utf8_lossy(&bytes);

        let page = extract_page(url, &html, Utc::now().date_naive())?;
        info!(url, title = %page.result.title, keywords = page.keywords.len(), "ingested law page");

        let result = page.result.clone();
        retriever.add_runtime(page.result, page.keywords);
        Ok(LawIngestResponse {
            added: true,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::expander::QueryExpander;

    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()
    }

    const PAGE: &str = "<html><head><title>\n  Bond Refunds and Claims for Renters \n</title></head>\
                        <body><h1>Bonds</h1><p>Your   bond must be\nreturned within 14 days.</p></body></html>";

    #[test]
    fn extracts_title_snippet_keywords() {
        let page = extract_page("https://example.org/bond", PAGE, day()).unwrap();
        assert_eq!(page.result.title, "Bond Refunds and Claims for Renters");
        assert_eq!(page.keywords, vec!["bond", "refunds", "claims", "renters"]);
        assert_eq!(page.result.snippet, "Bonds Your bond must be returned within 14 days.");
        assert_eq!(page.result.as_of_date, day());
        assert_eq!(page.result.source_url, "https://example.org/bond");
    }

    #[test]
    fn missing_title_falls_back_to_url() {
        let page = extract_page("https://example.org/x", "<p>plain body</p>", day()).unwrap();
        assert_eq!(page.result.title, "https://example.org/x");
        assert_eq!(page.keywords, vec!["https://example.org/x"]);
    }

    #[test]
    fn snippet_is_capped() {
        let body = format!("<p>{}</p>", "word ".repeat(200));
        let page = extract_page("https://example.org/long", &body, day()).unwrap();
        assert_eq!(page.result.snippet.chars().count(), SNIPPET_CHARS);
    }

    #[test]
    fn keywords_capped_at_eight() {
        let html = "<title>alpha bravo the charlie delta echo foxtrot hotel india juliet</title><p>body</p>";
        let page = extract_page("https://example.org/k", html, day()).unwrap();
        assert_eq!(page.keywords.len(), MAX_KEYWORDS);
        assert_eq!(page.keywords[0], "alpha");
        assert!(!page.keywords.contains(&"the".to_string()));
        assert_eq!(page.keywords[7], "india");
    }

    #[test]
    fn uppercase_title_and_entities_decoded() {
        let html = "<TITLE>Bonds &amp; Deposits</TITLE><p>Your bond &amp; rights</p>";
        let page = extract_page("https://example.org/p", html, day()).unwrap();
        assert_eq!(page.result.title, "Bonds & Deposits");
        assert_eq!(page.result.snippet, "Your bond & rights");
        assert_eq!(page.keywords, vec!["bonds", "deposits"]);
    }

    #[test]
    fn title_with_attributes() {
        let html = "<html><head><title lang=\"en\">Rent   Increases</title></head><body>Notice rules</body></html>";
        let page = extract_page("https://example.org/r", html, day()).unwrap();
        assert_eq!(page.result.title, "Rent Increases");
        assert_eq!(page.keywords, vec!["rent", "increases"]);
    }

    #[test]
    fn script_and_style_skipped() {
        let html = "<html><head><style>body{color:red}</style></head><body>\
                    <script>var tracking = 1;</script><p>Entry needs 24 hours notice.</p>\
                    <noscript>Enable JavaScript</noscript><style>.x{}</style></body></html>";
        let page = extract_page("https://example.org/s", html, day()).unwrap();
        assert_eq!(page.result.snippet, "Entry needs 24 hours notice.");
    }

    #[test]
    fn title_only_page_rejected() {
        let err = extract_page("https://example.org/t", "<title>Only a title</title>", day()).unwrap_err();
        assert!(matches!(err, IngestError::EmptyPage(_)));
    }

    #[test]
    fn empty_page_rejected() {
        let err = extract_page("https://example.org/e", "<html> <body></body> </html>", day()).unwrap_err();
        assert!(matches!(err, IngestError::EmptyPage(_)));
    }

    #[test]
    fn validate_url_rejects_bad_input() {
        assert!(validate_url("https://www.vcat.vic.gov.au/fees").is_ok());
        assert!(matches!(
            validate_url("ftp://example.org/file"),
            Err(IngestError::InvalidUrl { .. })
        ));
        assert!(matches!(
            validate_url("not a url"),
            Err(IngestError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn invalid_url_never_reaches_corpus() {
        let retriever = LawRetriever::new(QueryExpander::offline());
        let ingestor = PageIngestor::new(Duration::from_secs(1)).unwrap();
        let err = ingestor.ingest(&retriever, "file:///etc/passwd").await.unwrap_err();
        assert!(matches!(err, IngestError::InvalidUrl { .. }));
        assert_eq!(retriever.runtime_len(), 0);
    }

    #[test]
    fn ingest_response_serializes() {
        let page = extract_page("https://example.org/bond", PAGE, day()).unwrap();
        let response = LawIngestResponse {
            added: true,
            result: page.result,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["added"], true);
        assert_eq!(json["result"]["source_url"], "https://example.org/bond");
        assert_eq!(json["result"]["as_of_date"], "2025-08-01");
    }

    #[tokio::test]
    async fn extracted_page_is_searchable() {
        let retriever = LawRetriever::new(QueryExpander::offline());
        let page = extract_page("https://example.org/bond", PAGE, day()).unwrap();
        retriever.add_runtime(page.result, page.keywords);

        let ctx = retriever.retrieve("bond refund", None, 3).await;
        assert_eq!(ctx.results[0].source_url, "https://example.org/bond");
    }
}
