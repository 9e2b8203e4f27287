//! Typed errors for the scraping core.
//!
//! Each variant maps to a recovery level: fetch errors are recovered per
//! city, store errors on a single candidate per block, commit errors fail
//! the whole site run. Nothing here is allowed to escape the refresh
//! endpoint as an HTTP 500.

use thiserror::Error;

use crate::models::Source;

/// A single page fetch failed. Fatal to that fetch only; the site scraper
/// skips the city and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("structured response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("browser rendering failed: {0}")]
    Render(String),
}

/// Listing store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid stored record: {0}")]
    InvalidRecord(String),
}

/// A whole site run failed. City-level and block-level problems never
/// surface here; only the batch commit (or failing to start the scraper at
/// all) takes a site down.
#[derive(Debug, Error)]
pub enum SiteRunError {
    #[error("{site}: commit failed after staging {staged} listings: {source}")]
    Commit {
        site: Source,
        staged: usize,
        source: StoreError,
    },

    #[error("{site}: scraper could not start: {reason}")]
    Startup { site: Source, reason: String },
}
