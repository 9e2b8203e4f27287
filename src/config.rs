//! Environment configuration.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Listing store connection string.
    pub database_url: String,
    /// Port the API listens on.
    pub port: u16,
    /// Bounds for the randomized pause between city fetches, in seconds.
    pub delay_min_secs: u64,
    pub delay_max_secs: u64,
}

impl Config {
    /// Read configuration from the environment, with `.env` support.
    /// Every value has a default suitable for local use.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:annonces.db?mode=rwc".to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT is not a valid port number")?,
            Err(_) => 5000,
        };

        let delay_min_secs = parse_or("SCRAPE_DELAY_MIN_SECS", 1)?;
        let delay_max_secs = parse_or("SCRAPE_DELAY_MAX_SECS", 3)?;

        Ok(Self {
            database_url,
            port,
            delay_min_secs,
            delay_max_secs,
        })
    }
}

fn parse_or(name: &str, default: u64) -> Result<u64> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} is not a valid number of seconds")),
        Err(_) => Ok(default),
    }
}
