//! # wiki-client
//!
//! Looks up a Wikipedia page by title through the MediaWiki action API and condenses its
//! plain-text body into a short summary. [`WikiClient::lookup`] never fails: any error becomes
//! a fixed user-facing fallback message.

mod error;
mod summary;

pub use error::{Result, WikiError};
pub use summary::{summarize, SUMMARY_SOURCE_CHARS};

use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Reply used whenever no summary can be produced.
pub const FALLBACK_MESSAGE: &str = "В энциклопедии нет информации об этом";
pub const DEFAULT_LANG: &str = "ru";

const CLIENT_USER_AGENT: &str = concat!("dbot/", env!("CARGO_PKG_VERSION"), " (telegram bot)");

/// Wikipedia client bound to one language edition.
#[derive(Debug, Clone)]
pub struct WikiClient {
    client: Client,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<QueryBody>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    info: String,
}

#[derive(Debug, Default, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: Vec<Page>,
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    extract: Option<String>,
    pageprops: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

impl WikiClient {
    /// Creates a client for `https://<lang>.wikipedia.org`.
    pub fn new(lang: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: format!("https://{}.wikipedia.org/w/api.php", lang),
        }
    }

    /// Points the client at another `api.php` endpoint (e.g. a mock server).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Returns a short summary of the page for `query`, or [`FALLBACK_MESSAGE`].
    #[instrument(skip(self))]
    pub async fn lookup(&self, query: &str) -> String {
        match self.fetch_page(query).await {
            Ok(content) => {
                let summary = summarize(&content);
                if summary.trim().is_empty() {
                    warn!(query = %query, "Encyclopedia page produced an empty summary");
                    return FALLBACK_MESSAGE.to_string();
                }
                info!(query = %query, summary_len = summary.chars().count(), "step: encyclopedia lookup done");
                summary
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Encyclopedia lookup failed");
                FALLBACK_MESSAGE.to_string()
            }
        }
    }

    /// Fetches the plain-text body of the page titled `title`.
    ///
    /// Follows redirects. When the exact title does not exist, the best full-text search hit is tried once.
    pub async fn fetch_page(&self, title: &str) -> Result<String> {
        let title = title.trim();
        if title.is_empty() {
            return Err(WikiError::NotFound(String::new()));
        }

        match self.fetch_extract(title).await {
            Err(WikiError::NotFound(_)) => match self.search_title(title).await? {
                Some(found) if found != title => {
                    debug!(query = %title, found = %found, "Using search suggestion");
                    self.fetch_extract(&found).await
                }
                _ => Err(WikiError::NotFound(title.to_string())),
            },
            other => other,
        }
    }

    async fn fetch_extract(&self, title: &str) -> Result<String> {
        let body = self
            .query(&[
                ("prop", "extracts|pageprops"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("exlimit", "1"),
                ("titles", title),
            ])
            .await?;

        let page = body
            .pages
            .into_iter()
            .next()
            .ok_or_else(|| WikiError::Provider("response has no pages".to_string()))?;

        if page.missing || page.invalid {
            return Err(WikiError::NotFound(page.title));
        }
        if page
            .pageprops
            .as_ref()
            .is_some_and(|props| props.contains_key("disambiguation"))
        {
            return Err(WikiError::Ambiguous(page.title));
        }

        match page.extract {
            Some(extract) if !extract.trim().is_empty() => Ok(extract),
            _ => Err(WikiError::NotFound(page.title)),
        }
    }

    async fn search_title(&self, query: &str) -> Result<Option<String>> {
        let body = self
            .query(&[("list", "search"), ("srsearch", query), ("srlimit", "1")])
            .await?;
        Ok(body.search.into_iter().next().map(|hit| hit.title))
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<QueryBody> {
        let response = self
            .client
            .get(&self.api_url)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .query(&[("action", "query"), ("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WikiError::Provider(format!("request failed ({})", status)));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| WikiError::Provider(format!("malformed response: {}", e)))?;

        if let Some(error) = parsed.error {
            return Err(WikiError::Provider(error.info));
        }
        Ok(parsed.query.unwrap_or_default())
    }
}

impl Default for WikiClient {
    fn default() -> Self {
        Self::new(DEFAULT_LANG)
    }
}
