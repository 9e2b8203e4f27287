//! Listing storage.
//!
//! The scraping core and the search handlers only see the [`ListingStore`]
//! trait: find-by-dedup-key, batch insert, and a location-filtered search.
//! [`SqliteStore`] is the production backend; [`MemoryStore`] backs tests.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Listing, Source};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// A listing ready to be committed. The store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub price: String,
    pub surface: String,
    pub location: String,
    pub description: Option<String>,
    pub source: Source,
    pub url: String,
}

#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Dedup lookup: is there already a listing with this (title, source)?
    async fn find_by_title_and_source(
        &self,
        title: &str,
        source: Source,
    ) -> Result<Option<Listing>, StoreError>;

    /// Commit a batch of new listings atomically. Listings whose
    /// (title, source) already exists are silently skipped. Returns the
    /// number actually inserted.
    async fn insert_batch(&self, listings: &[NewListing]) -> Result<u64, StoreError>;

    /// All listings, newest first, optionally filtered by a location
    /// substring (see [`location_query_forms`]).
    async fn search(&self, location: Option<&str>) -> Result<Vec<Listing>, StoreError>;
}

/// The three spellings a location query is tried under: as typed,
/// capitalized, and uppercase. Keeps substring matching effectively
/// case-insensitive for accented city names too, where a plain ASCII
/// case-fold would miss.
pub fn location_query_forms(query: &str) -> [String; 3] {
    let capitalized = {
        let mut chars = query.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    };
    [query.to_string(), capitalized, query.to_uppercase()]
}
