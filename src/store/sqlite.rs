//! SQLite listing store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use crate::error::StoreError;
use crate::models::{Listing, Source};
use crate::store::{location_query_forms, ListingStore, NewListing};

/// SQLite-backed store.
///
/// The connection pool is created once and shared process-wide. Concurrent
/// refreshes are not supported; the orchestrator serializes refresh
/// triggers.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `database_url` and ensure the
    /// schema exists.
    ///
    /// # Example URLs
    /// - `sqlite:annonces.db?mode=rwc` - file database, created if missing
    /// - `sqlite::memory:` - ephemeral in-memory database
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// In-memory store for tests.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::new("sqlite::memory:").await
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS listings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                price TEXT NOT NULL,
                surface TEXT NOT NULL,
                location TEXT NOT NULL,
                description TEXT,
                source TEXT NOT NULL,
                url TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_listings_title_source
                ON listings(title, source);
            CREATE INDEX IF NOT EXISTS idx_listings_location
                ON listings(location);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct ListingRow {
    id: i64,
    title: String,
    price: String,
    surface: String,
    location: String,
    description: Option<String>,
    source: String,
    url: String,
    created_at: String,
}

impl ListingRow {
    fn into_listing(self) -> Result<Listing, StoreError> {
        let source = Source::parse(&self.source)
            .ok_or_else(|| StoreError::InvalidRecord(format!("unknown source: {}", self.source)))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| StoreError::InvalidRecord(format!("invalid timestamp: {e}")))?
            .with_timezone(&Utc);

        Ok(Listing {
            id: self.id,
            title: self.title,
            price: self.price,
            surface: self.surface,
            location: self.location,
            description: self.description,
            source,
            url: self.url,
            created_at,
        })
    }
}

#[async_trait]
impl ListingStore for SqliteStore {
    async fn find_by_title_and_source(
        &self,
        title: &str,
        source: Source,
    ) -> Result<Option<Listing>, StoreError> {
        let row: Option<ListingRow> = sqlx::query_as(
            "SELECT id, title, price, surface, location, description, source, url, created_at
             FROM listings WHERE title = ?1 AND source = ?2",
        )
        .bind(title)
        .bind(source.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ListingRow::into_listing).transpose()
    }

    async fn insert_batch(&self, listings: &[NewListing]) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for listing in listings {
            let now = Utc::now().to_rfc3339();
            // The unique index backstops the pre-insert dedup lookup.
            let result = sqlx::query(
                "INSERT INTO listings
                     (title, price, surface, location, description, source, url, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(title, source) DO NOTHING",
            )
            .bind(&listing.title)
            .bind(&listing.price)
            .bind(&listing.surface)
            .bind(&listing.location)
            .bind(&listing.description)
            .bind(listing.source.as_str())
            .bind(&listing.url)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn search(&self, location: Option<&str>) -> Result<Vec<Listing>, StoreError> {
        let rows: Vec<ListingRow> = match location {
            // SQLite LIKE only folds ASCII case, so the query is tried in
            // its raw, capitalized and uppercase spellings.
            Some(query) => {
                let [raw, capitalized, upper] = location_query_forms(query);
                sqlx::query_as(
                    "SELECT id, title, price, surface, location, description, source, url, created_at
                     FROM listings
                     WHERE location LIKE '%' || ?1 || '%'
                        OR location LIKE '%' || ?2 || '%'
                        OR location LIKE '%' || ?3 || '%'
                     ORDER BY created_at DESC, id DESC",
                )
                .bind(raw)
                .bind(capitalized)
                .bind(upper)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT id, title, price, surface, location, description, source, url, created_at
                     FROM listings ORDER BY created_at DESC, id DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(ListingRow::into_listing).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(title: &str, source: Source) -> NewListing {
        NewListing {
            title: title.to_string(),
            price: "450 000 €".to_string(),
            surface: "85 m²".to_string(),
            location: "Paris".to_string(),
            description: None,
            source,
            url: "https://example.com/1".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_find() {
        let store = SqliteStore::in_memory().await.unwrap();
        let inserted = store
            .insert_batch(&[listing("Appartement 3 pièces", Source::SeLoger)])
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        let found = store
            .find_by_title_and_source("Appartement 3 pièces", Source::SeLoger)
            .await
            .unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().price, "450 000 €");

        let missing = store
            .find_by_title_and_source("Appartement 3 pièces", Source::LeBonCoin)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn unique_index_backstops_dedup() {
        let store = SqliteStore::in_memory().await.unwrap();
        let batch = [
            listing("Maison avec jardin", Source::SeLoger),
            listing("Maison avec jardin", Source::SeLoger),
            listing("Maison avec jardin", Source::LeBonCoin),
        ];
        let inserted = store.insert_batch(&batch).await.unwrap();
        // same title on another source is a different listing
        assert_eq!(inserted, 2);

        let again = store
            .insert_batch(&[listing("Maison avec jardin", Source::SeLoger)])
            .await
            .unwrap();
        assert_eq!(again, 0);
    }

    #[tokio::test]
    async fn search_is_newest_first() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .insert_batch(&[
                listing("Premier", Source::SeLoger),
                listing("Deuxième", Source::SeLoger),
            ])
            .await
            .unwrap();
        store
            .insert_batch(&[listing("Troisième", Source::SeLoger)])
            .await
            .unwrap();

        let all = store.search(None).await.unwrap();
        let titles: Vec<&str> = all.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Troisième", "Deuxième", "Premier"]);
    }

    #[tokio::test]
    async fn search_filters_location_case_insensitively() {
        let store = SqliteStore::in_memory().await.unwrap();
        let mut lyon = listing("T2 presqu'île", Source::SeLoger);
        lyon.location = "Lyon 2e".to_string();
        store
            .insert_batch(&[listing("Studio centre", Source::SeLoger), lyon])
            .await
            .unwrap();

        let hits = store.search(Some("lyon")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "T2 presqu'île");

        assert!(store.search(Some("toulouse")).await.unwrap().is_empty());
    }
}
