//! Page fetching capability.
//!
//! Site scrapers depend on the [`PageFetcher`] trait only. Two
//! implementations exist: [`HttpFetcher`] for portals that serve usable
//! markup directly, and [`BrowserFetcher`] for portals that only render
//! their listings through JavaScript. Each site's extraction plan says
//! which one it needs.

pub mod browser;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::FetchError;

pub use browser::BrowserFetcher;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// What the caller expects the response body to be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AcceptFormat {
    #[default]
    Html,
    Json,
}

#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub accept: AcceptFormat,
    /// Extra request headers, e.g. Accept-Language.
    pub headers: Vec<(&'static str, &'static str)>,
}

impl FetchOptions {
    pub fn html() -> Self {
        Self::default()
    }

    pub fn json() -> Self {
        Self {
            accept: AcceptFormat::Json,
            ..Self::default()
        }
    }

    pub fn with_headers(mut self, headers: &[(&'static str, &'static str)]) -> Self {
        self.headers.extend_from_slice(headers);
        self
    }
}

/// A successfully fetched page body.
#[derive(Debug, Clone)]
pub enum Document {
    Html(String),
    Json(serde_json::Value),
}

impl Document {
    pub fn as_html(&self) -> Option<&str> {
        match self {
            Document::Html(html) => Some(html),
            Document::Json(_) => None,
        }
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Retrieve one page. Network failures, non-2xx statuses and
    /// unparseable structured bodies all come back as [`FetchError`]; the
    /// caller decides whether to skip or abort.
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Document, FetchError>;
}

/// Plain HTTP fetcher backed by reqwest.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Document, FetchError> {
        debug!("Fetching {}", url);

        let mut request = self.client.get(url);
        for (name, value) in &options.headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        interpret_body(body, options.accept)
    }
}

/// Apply the accept hint to a response body.
///
/// A Json hint tries structured parsing first; if that fails but the body is
/// plainly markup (some portals answer an API path with an HTML page), it
/// degrades to an Html document instead of failing the fetch.
fn interpret_body(body: String, accept: AcceptFormat) -> Result<Document, FetchError> {
    match accept {
        AcceptFormat::Html => Ok(Document::Html(body)),
        AcceptFormat::Json => match serde_json::from_str(&body) {
            Ok(value) => Ok(Document::Json(value)),
            Err(_) if looks_like_markup(&body) => Ok(Document::Html(body)),
            Err(e) => Err(FetchError::Parse(e)),
        },
    }
}

fn looks_like_markup(body: &str) -> bool {
    let head = body.trim_start();
    head.get(..9)
        .is_some_and(|h| h.eq_ignore_ascii_case("<!doctype"))
        || head.get(..5).is_some_and(|h| h.eq_ignore_ascii_case("<html"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_hint_passes_body_through() {
        let doc = interpret_body("<div>hello</div>".into(), AcceptFormat::Html).unwrap();
        assert_eq!(doc.as_html(), Some("<div>hello</div>"));
    }

    #[test]
    fn json_hint_parses_structured_body() {
        let doc = interpret_body(r#"{"ads": []}"#.into(), AcceptFormat::Json).unwrap();
        assert!(matches!(doc, Document::Json(_)));
    }

    #[test]
    fn json_hint_falls_back_on_markup() {
        let body = "<!DOCTYPE html><html><body>blocked</body></html>";
        let doc = interpret_body(body.into(), AcceptFormat::Json).unwrap();
        assert_eq!(doc.as_html(), Some(body));
    }

    #[test]
    fn json_hint_propagates_garbage() {
        let result = interpret_body("not json, not html".into(), AcceptFormat::Json);
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }

    #[test]
    fn markup_heuristic() {
        assert!(looks_like_markup("  <!doctype html><html>"));
        assert!(looks_like_markup("<HTML lang=\"fr\">"));
        assert!(!looks_like_markup("{\"a\": 1}"));
        assert!(!looks_like_markup("<div>fragment</div>"));
    }
}
