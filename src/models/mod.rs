use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source portal of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    SeLoger,
    LeBonCoin,
    BienIci,
}

impl Source {
    /// Tag stored in the database and shown in API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::SeLoger => "SeLoger",
            Source::LeBonCoin => "LeBonCoin",
            Source::BienIci => "BienIci",
        }
    }

    pub fn parse(tag: &str) -> Option<Source> {
        match tag {
            "SeLoger" => Some(Source::SeLoger),
            "LeBonCoin" => Some(Source::LeBonCoin),
            "BienIci" => Some(Source::BienIci),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored listing. Price, surface and location keep the exact text the
/// portal published; numeric filtering happens at query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub price: String,
    pub surface: String,
    pub location: String,
    pub description: Option<String>,
    pub source: Source,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Raw extraction result for one listing block, before dedup.
///
/// Lives only for the duration of a single site run; either staged as a new
/// listing or discarded.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub title: String,
    pub price: String,
    pub surface: String,
    pub location: String,
    pub url: String,
}
