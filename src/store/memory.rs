//! In-memory listing store for tests.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::RwLock;

use crate::error::StoreError;
use crate::models::{Listing, Source};
use crate::store::{ListingStore, NewListing};

/// Stores listings in a `Vec` behind a lock. Data is lost on drop; useful
/// for tests and local experiments only.
pub struct MemoryStore {
    listings: RwLock<Vec<Listing>>,
    /// When set, the next `insert_batch` fails once. Lets tests exercise
    /// the commit-failure path.
    fail_next_commit: RwLock<bool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            listings: RwLock::new(Vec::new()),
            fail_next_commit: RwLock::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.listings.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.read().unwrap().is_empty()
    }

    pub fn fail_next_commit(&self) {
        *self.fail_next_commit.write().unwrap() = true;
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn find_by_title_and_source(
        &self,
        title: &str,
        source: Source,
    ) -> Result<Option<Listing>, StoreError> {
        Ok(self
            .listings
            .read()
            .unwrap()
            .iter()
            .find(|l| l.title == title && l.source == source)
            .cloned())
    }

    async fn insert_batch(&self, batch: &[NewListing]) -> Result<u64, StoreError> {
        if std::mem::take(&mut *self.fail_next_commit.write().unwrap()) {
            return Err(StoreError::InvalidRecord("injected commit failure".into()));
        }

        let mut listings = self.listings.write().unwrap();
        let mut inserted = 0;

        for new in batch {
            let exists = listings
                .iter()
                .any(|l| l.title == new.title && l.source == new.source);
            if exists {
                continue;
            }
            let id = listings.len() as i64 + 1;
            listings.push(Listing {
                id,
                title: new.title.clone(),
                price: new.price.clone(),
                surface: new.surface.clone(),
                location: new.location.clone(),
                description: new.description.clone(),
                source: new.source,
                url: new.url.clone(),
                created_at: Utc::now(),
            });
            inserted += 1;
        }

        Ok(inserted)
    }

    async fn search(&self, location: Option<&str>) -> Result<Vec<Listing>, StoreError> {
        let query = location.map(str::to_lowercase);
        let mut hits: Vec<Listing> = self
            .listings
            .read()
            .unwrap()
            .iter()
            .filter(|l| match &query {
                Some(q) => l.location.to_lowercase().contains(q),
                None => true,
            })
            .cloned()
            .collect();

        // newest first, matching the sqlite ordering
        hits.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(title: &str, location: &str) -> NewListing {
        NewListing {
            title: title.to_string(),
            price: "300 000 €".to_string(),
            surface: "60 m²".to_string(),
            location: location.to_string(),
            description: None,
            source: Source::SeLoger,
            url: String::new(),
        }
    }

    #[tokio::test]
    async fn dedup_on_title_and_source() {
        let store = MemoryStore::new();
        let n = store
            .insert_batch(&[listing("A", "Paris"), listing("A", "Paris")])
            .await
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn search_filters_and_orders() {
        let store = MemoryStore::new();
        store
            .insert_batch(&[listing("A", "Paris 11e"), listing("B", "Lyon")])
            .await
            .unwrap();
        store.insert_batch(&[listing("C", "Paris 18e")]).await.unwrap();

        let paris = store.search(Some("paris")).await.unwrap();
        let titles: Vec<&str> = paris.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A"]);
    }

    #[tokio::test]
    async fn injected_commit_failure_fires_once() {
        let store = MemoryStore::new();
        store.fail_next_commit();
        assert!(store.insert_batch(&[listing("A", "Paris")]).await.is_err());
        assert!(store.insert_batch(&[listing("A", "Paris")]).await.is_ok());
    }
}
