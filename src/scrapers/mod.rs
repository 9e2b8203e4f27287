//! Multi-site refresh orchestration.
//!
//! Sites run strictly one after another, each over the full city list. A
//! failing site is recorded and the next one still runs; whatever a site
//! committed before a later failure stays committed.

pub mod extract;
pub mod plan;
pub mod site;
pub mod sites;

use tracing::{info, warn};

pub use site::{ScrapeReport, SiteScraper};

use crate::error::SiteRunError;
use crate::fetch::PageFetcher;
use crate::models::Source;
use crate::pacing::Pacer;
use crate::scrapers::plan::Rendering;
use crate::store::ListingStore;

/// The fetchers a refresh can hand to site scrapers. `browser` is absent
/// when headless Chrome could not be launched; browser-rendered sites then
/// fail with a startup error instead of taking the refresh down.
pub struct Fetchers<'a> {
    pub http: &'a dyn PageFetcher,
    pub browser: Option<&'a dyn PageFetcher>,
}

#[derive(Debug)]
pub struct SiteOutcome {
    pub site: Source,
    pub result: Result<ScrapeReport, SiteRunError>,
}

#[derive(Debug, Default)]
pub struct RefreshSummary {
    pub outcomes: Vec<SiteOutcome>,
}

impl RefreshSummary {
    pub fn listings_added(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|r| r.listings_added)
            .sum()
    }

    pub fn failures(&self) -> Vec<&SiteRunError> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err())
            .collect()
    }
}

/// Run every supported site in declared order. Never fails as a whole;
/// per-site failures end up in the summary.
pub async fn refresh_all(
    store: &dyn ListingStore,
    fetchers: Fetchers<'_>,
    pacer: &dyn Pacer,
    cities: &[&str],
) -> RefreshSummary {
    let mut summary = RefreshSummary::default();

    for plan in sites::all_plans() {
        let site = plan.source;
        let fetcher = match plan.rendering {
            Rendering::Http => Some(fetchers.http),
            Rendering::Browser => fetchers.browser,
        };

        let result = match fetcher {
            Some(fetcher) => {
                let scraper = SiteScraper::new(&plan, fetcher, store, pacer);
                scraper.run(cities).await
            }
            None => Err(SiteRunError::Startup {
                site,
                reason: "no browser available for a JavaScript-rendered site".into(),
            }),
        };

        match &result {
            Ok(report) => info!(
                "{}: site run finished, {} listings added",
                site, report.listings_added
            ),
            Err(e) => warn!("{}: site run failed: {}", site, e),
        }

        summary.outcomes.push(SiteOutcome { site, result });
    }

    summary
}
