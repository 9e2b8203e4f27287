//! Generic site scraper: drives one portal through the full city list.
//!
//! Failure containment, from narrowest to widest:
//! - a block that extracts badly or whose dedup lookup fails is skipped;
//! - a city whose page cannot be fetched is skipped, the run continues;
//! - only the final batch commit can fail the whole site run, and then the
//!   staged work is discarded rather than partially committed.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::error::SiteRunError;
use crate::fetch::PageFetcher;
use crate::models::{Candidate, Source};
use crate::pacing::Pacer;
use crate::scrapers::extract::extract_candidate;
use crate::scrapers::plan::SitePlan;
use crate::store::{ListingStore, NewListing};

/// Outcome of one successful site run.
#[derive(Debug)]
pub struct ScrapeReport {
    pub site: Source,
    pub listings_added: u64,
    pub cities_failed: Vec<String>,
}

pub struct SiteScraper<'a> {
    plan: &'a SitePlan,
    fetcher: &'a dyn PageFetcher,
    store: &'a dyn ListingStore,
    pacer: &'a dyn Pacer,
}

impl<'a> SiteScraper<'a> {
    pub fn new(
        plan: &'a SitePlan,
        fetcher: &'a dyn PageFetcher,
        store: &'a dyn ListingStore,
        pacer: &'a dyn Pacer,
    ) -> Self {
        Self {
            plan,
            fetcher,
            store,
            pacer,
        }
    }

    /// Scrape every city in order, then commit all new listings as one
    /// batch. Returns the number of listings actually added.
    pub async fn run(&self, cities: &[&str]) -> Result<ScrapeReport, SiteRunError> {
        let site = self.plan.source;
        info!("Starting {} scrape over {} cities", site, cities.len());

        let mut staged: Vec<NewListing> = Vec::new();
        let mut cities_failed: Vec<String> = Vec::new();

        for (i, &city) in cities.iter().enumerate() {
            if i > 0 {
                self.pacer.pause().await;
            }

            let url = self.plan.city_url(city);
            let document = match self.fetcher.fetch(&url, &self.plan.fetch_options()).await {
                Ok(document) => document,
                Err(e) => {
                    warn!(site = %site, city, "Skipping city, fetch failed: {}", e);
                    cities_failed.push(city.to_string());
                    continue;
                }
            };

            let Some(html) = document.as_html() else {
                warn!(site = %site, city, "Skipping city, structured response has no markup to extract from");
                cities_failed.push(city.to_string());
                continue;
            };

            // The parsed DOM is not Send, so extraction must finish before
            // any store await below.
            let candidates: Vec<Candidate> = {
                let page = Html::parse_document(html);
                let blocks = listing_blocks(&page, self.plan);
                debug!(site = %site, city, "Found {} listing blocks", blocks.len());
                blocks
                    .into_iter()
                    .filter_map(|block| extract_candidate(block, self.plan, city))
                    .collect()
            };

            for candidate in candidates {
                match self.stage_if_new(candidate, &mut staged).await {
                    Ok(()) => {}
                    Err(e) => {
                        // block-level store trouble must not kill the city
                        warn!(site = %site, city, "Skipping block, dedup lookup failed: {}", e);
                    }
                }
            }
        }

        let staged_count = staged.len();
        let listings_added =
            self.store
                .insert_batch(&staged)
                .await
                .map_err(|source| SiteRunError::Commit {
                    site,
                    staged: staged_count,
                    source,
                })?;

        info!(
            "{}: committed {} new listings ({} cities failed)",
            site,
            listings_added,
            cities_failed.len()
        );

        Ok(ScrapeReport {
            site,
            listings_added,
            cities_failed,
        })
    }

    /// Dedup against the store and against what this run already staged,
    /// e.g. the same listing showing up on two city pages.
    async fn stage_if_new(
        &self,
        candidate: Candidate,
        staged: &mut Vec<NewListing>,
    ) -> Result<(), crate::error::StoreError> {
        let site = self.plan.source;

        let existing = self
            .store
            .find_by_title_and_source(&candidate.title, site)
            .await?;
        if existing.is_some() {
            debug!(site = %site, title = %candidate.title, "Already stored, dropping candidate");
            return Ok(());
        }

        if staged.iter().any(|n| n.title == candidate.title) {
            debug!(site = %site, title = %candidate.title, "Already staged this run, dropping candidate");
            return Ok(());
        }

        staged.push(NewListing {
            title: candidate.title,
            price: candidate.price,
            surface: candidate.surface,
            location: candidate.location,
            description: None,
            source: site,
            url: candidate.url,
        });
        Ok(())
    }
}

/// Locate listing blocks on a city page, trying the plan's block selectors
/// in order until one matches anything.
fn listing_blocks<'b>(page: &'b Html, plan: &SitePlan) -> Vec<ElementRef<'b>> {
    for css in plan.blocks {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        let blocks: Vec<ElementRef<'b>> = page.select(&selector).collect();
        if !blocks.is_empty() {
            return blocks;
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::fetch::{Document, FetchOptions};
    use crate::pacing::NoDelay;
    use crate::scrapers::plan::{Rendering, SelectorStrategy};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::collections::HashMap;

    const PLAN: SitePlan = SitePlan {
        source: Source::SeLoger,
        rendering: Rendering::Http,
        base_url: "https://portal.test",
        search_path: "/achat/{city}/",
        headers: &[],
        blocks: &["div.card"],
        title: &[SelectorStrategy::Css("div.title")],
        price: &[SelectorStrategy::Css("div.price")],
        surface: &[SelectorStrategy::Css("div.surface")],
        location: &[SelectorStrategy::Css("div.city")],
    };

    /// Serves canned responses per URL; unknown URLs fail the fetch.
    struct ScriptedFetcher {
        pages: HashMap<String, String>,
    }

    impl ScriptedFetcher {
        fn new(pages: &[(&str, String)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(city, html)| (PLAN.city_url(city), html.clone()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str, _options: &FetchOptions) -> Result<Document, FetchError> {
            match self.pages.get(url) {
                Some(html) => Ok(Document::Html(html.clone())),
                None => Err(FetchError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE)),
            }
        }
    }

    fn card(title: &str) -> String {
        format!(
            r#"<div class="card">
                 <div class="title">{title}</div>
                 <div class="price">400 000 €</div>
                 <div class="surface">80 m²</div>
               </div>"#
        )
    }

    #[tokio::test]
    async fn city_failure_does_not_abort_the_run() {
        let store = MemoryStore::new();
        // "Lyon" is not scripted, so its fetch fails
        let fetcher = ScriptedFetcher::new(&[
            ("Paris", card("Avant la panne")),
            ("Marseille", card("Après la panne")),
        ]);
        let scraper = SiteScraper::new(&PLAN, &fetcher, &store, &NoDelay);

        let report = scraper.run(&["Paris", "Lyon", "Marseille"]).await.unwrap();
        assert_eq!(report.listings_added, 2);
        assert_eq!(report.cities_failed, vec!["Lyon".to_string()]);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn same_listing_on_two_city_pages_is_staged_once() {
        let store = MemoryStore::new();
        let fetcher = ScriptedFetcher::new(&[
            ("Paris", card("Doublon")),
            ("Lyon", card("Doublon")),
        ]);
        let scraper = SiteScraper::new(&PLAN, &fetcher, &store, &NoDelay);

        let report = scraper.run(&["Paris", "Lyon"]).await.unwrap();
        assert_eq!(report.listings_added, 1);
    }

    #[tokio::test]
    async fn rerun_adds_nothing_new() {
        let store = MemoryStore::new();
        let fetcher = ScriptedFetcher::new(&[("Paris", card("Stable"))]);
        let scraper = SiteScraper::new(&PLAN, &fetcher, &store, &NoDelay);

        assert_eq!(scraper.run(&["Paris"]).await.unwrap().listings_added, 1);
        assert_eq!(scraper.run(&["Paris"]).await.unwrap().listings_added, 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn commit_failure_reports_staged_count() {
        let store = MemoryStore::new();
        store.fail_next_commit();
        let fetcher = ScriptedFetcher::new(&[("Paris", card("Perdu"))]);
        let scraper = SiteScraper::new(&PLAN, &fetcher, &store, &NoDelay);

        let err = scraper.run(&["Paris"]).await.unwrap_err();
        match err {
            SiteRunError::Commit { site, staged, .. } => {
                assert_eq!(site, Source::SeLoger);
                assert_eq!(staged, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn run_future_is_send() {
        // the run future crosses threads inside the web server, so it must
        // stay Send even though the HTML parser types are not
        fn assert_send<F: std::future::Future + Send>(future: F) -> F {
            future
        }

        let store = MemoryStore::new();
        let fetcher = ScriptedFetcher::new(&[("Paris", card("Envoyable"))]);
        let scraper = SiteScraper::new(&PLAN, &fetcher, &store, &NoDelay);

        let report = assert_send(scraper.run(&["Paris"])).await.unwrap();
        assert_eq!(report.listings_added, 1);
    }

    #[tokio::test]
    async fn block_selector_fallback_is_tried_in_order() {
        let store = MemoryStore::new();
        let html = r#"<div class="listing-row">
                        <div class="title">Nouveau markup</div>
                        <div class="price">250 000 €</div>
                        <div class="surface">55 m²</div>
                      </div>"#;
        let fetcher = ScriptedFetcher::new(&[("Paris", html.to_string())]);

        let drifted = SitePlan {
            blocks: &["div.card", "div.listing-row"],
            ..PLAN
        };
        let scraper = SiteScraper::new(&drifted, &fetcher, &store, &NoDelay);
        assert_eq!(scraper.run(&["Paris"]).await.unwrap().listings_added, 1);
    }
}
