//! JSON web API.
//!
//! Three endpoints, mirroring the public surface of the aggregator:
//! `/recherche` filters stored listings, `/actualiser` runs a full
//! sequential multi-site refresh, `/suggestions` autocompletes city names.
//! Scraping-internal faults never become HTTP 500s; `/actualiser` always
//! answers with a definitive status payload.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::Config;
use crate::fetch::{BrowserFetcher, HttpFetcher, PageFetcher};
use crate::locations::{suggest, CITY_TARGETS};
use crate::models::Listing;
use crate::normalize::leading_number;
use crate::pacing::RandomDelay;
use crate::scrapers::{refresh_all, Fetchers};
use crate::store::ListingStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ListingStore>,
    pub config: Arc<Config>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/recherche", get(recherche))
        .route("/actualiser", get(actualiser))
        .route("/suggestions", get(suggestions))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct RechercheParams {
    pub prix_min: Option<String>,
    pub prix_max: Option<String>,
    pub surface_min: Option<String>,
    pub surface_max: Option<String>,
    pub localisation: Option<String>,
}

/// One search hit, with the field names the frontend expects.
#[derive(Debug, Serialize)]
pub struct AnnonceOut {
    pub titre: String,
    pub prix: String,
    pub surface: String,
    pub localisation: String,
    pub source: String,
    pub url: String,
}

impl From<Listing> for AnnonceOut {
    fn from(listing: Listing) -> Self {
        Self {
            titre: listing.title,
            prix: listing.price,
            surface: listing.surface,
            localisation: listing.location,
            source: listing.source.as_str().to_string(),
            url: listing.url,
        }
    }
}

async fn recherche(
    State(state): State<AppState>,
    Query(params): Query<RechercheParams>,
) -> Result<Json<Vec<AnnonceOut>>, (StatusCode, Json<Value>)> {
    let location = params
        .localisation
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty());

    let listings = state.store.search(location).await.map_err(|e| {
        error!("Search failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"status": "error", "message": e.to_string()})),
        )
    })?;

    let hits = filter_by_ranges(listings, &params);
    Ok(Json(hits.into_iter().map(AnnonceOut::from).collect()))
}

/// Apply the numeric range criteria in memory. Prices and surfaces are
/// stored as published text, so both sides go through the normalizer:
/// "400 000" or "85,5" are as acceptable in a criterion as in stored data.
/// A criterion with no digit at all is ignored.
fn filter_by_ranges(listings: Vec<Listing>, params: &RechercheParams) -> Vec<Listing> {
    let parse = |raw: &Option<String>| {
        raw.as_deref()
            .filter(|s| s.chars().any(|c| c.is_ascii_digit()))
            .map(leading_number)
    };
    let prix_min = parse(&params.prix_min);
    let prix_max = parse(&params.prix_max);
    let surface_min = parse(&params.surface_min);
    let surface_max = parse(&params.surface_max);

    listings
        .into_iter()
        .filter(|listing| {
            let prix = leading_number(&listing.price);
            let surface = leading_number(&listing.surface);
            prix_min.is_none_or(|min| prix >= min)
                && prix_max.is_none_or(|max| prix <= max)
                && surface_min.is_none_or(|min| surface >= min)
                && surface_max.is_none_or(|max| surface <= max)
        })
        .collect()
}

/// Run the full sequential refresh. Always answers 200 with a definitive
/// status; per-site failures are folded into the error message and the data
/// committed before a failure stays.
async fn actualiser(State(state): State<AppState>) -> Json<Value> {
    info!("Refresh requested");

    let http = match HttpFetcher::new() {
        Ok(http) => http,
        Err(e) => {
            error!("Refresh aborted, HTTP client unavailable: {}", e);
            return Json(json!({"status": "error", "message": e.to_string()}));
        }
    };

    // A missing browser only takes down the JavaScript-rendered sites.
    let browser = match BrowserFetcher::new() {
        Ok(browser) => Some(browser),
        Err(e) => {
            error!("Browser unavailable, JavaScript-rendered sites will be skipped: {}", e);
            None
        }
    };

    let pacer = RandomDelay::new(state.config.delay_min_secs, state.config.delay_max_secs);
    let fetchers = Fetchers {
        http: &http,
        browser: browser.as_ref().map(|b| b as &dyn PageFetcher),
    };

    let summary = refresh_all(state.store.as_ref(), fetchers, &pacer, CITY_TARGETS).await;

    let failures = summary.failures();
    if failures.is_empty() {
        Json(json!({
            "status": "success",
            "listings_added": summary.listings_added(),
        }))
    } else {
        let message = failures
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Json(json!({
            "status": "error",
            "message": message,
            "listings_added": summary.listings_added(),
        }))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionsParams {
    pub q: Option<String>,
}

async fn suggestions(Query(params): Query<SuggestionsParams>) -> Json<Vec<&'static str>> {
    Json(suggest(params.q.as_deref().unwrap_or_default()))
}
