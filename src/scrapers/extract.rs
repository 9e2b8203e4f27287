//! Generic field extraction over one listing block.
//!
//! Pure transform: a block fragment plus a site plan either yields a
//! [`Candidate`] or is dropped. Title, price and surface are mandatory; a
//! block missing any of them is skipped with a debug log, never an error.
//! Location is optional and falls back to the city being scraped. The
//! anchor URL is best-effort and may come back empty.

use scraper::{ElementRef, Selector};
use tracing::debug;

use crate::models::Candidate;
use crate::scrapers::plan::{SelectorChain, SelectorStrategy, SitePlan};

pub fn extract_candidate(block: ElementRef<'_>, plan: &SitePlan, city: &str) -> Option<Candidate> {
    let Some(title) = select_field(block, plan.title) else {
        debug!(site = %plan.source, city, "Block skipped: no title matched");
        return None;
    };
    let Some(price) = select_field(block, plan.price) else {
        debug!(site = %plan.source, city, title = %title, "Block skipped: no price matched");
        return None;
    };
    let Some(surface) = select_field(block, plan.surface) else {
        debug!(site = %plan.source, city, title = %title, "Block skipped: no surface matched");
        return None;
    };
    let location = select_field(block, plan.location).unwrap_or_else(|| city.to_string());

    Some(Candidate {
        title,
        price,
        surface,
        location,
        url: anchor_url(block, plan.base_url),
    })
}

/// First non-empty text produced by the chain, in declared priority order.
fn select_field(block: ElementRef<'_>, chain: SelectorChain) -> Option<String> {
    chain.iter().find_map(|strategy| apply(block, strategy))
}

fn apply(block: ElementRef<'_>, strategy: &SelectorStrategy) -> Option<String> {
    match strategy {
        SelectorStrategy::Css(css) => {
            let selector = Selector::parse(css).ok()?;
            block
                .select(&selector)
                .map(text_of)
                .find(|text| !text.is_empty())
        }
        SelectorStrategy::TagContains { tag, fragment } => {
            let selector = Selector::parse(tag).ok()?;
            block
                .select(&selector)
                .map(text_of)
                .find(|text| !text.is_empty() && text.contains(fragment))
        }
    }
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// First anchor href in the block, absolutized against the site base URL.
/// Listing cards are often themselves the anchor, so the block element is
/// checked before its descendants. Absence is an empty string, not an
/// error.
fn anchor_url(block: ElementRef<'_>, base_url: &str) -> String {
    if block.value().name() == "a" {
        if let Some(href) = block.value().attr("href") {
            return absolutize(base_url, href);
        }
    }

    let selector = Selector::parse("a[href]").ok();
    if let Some(selector) = selector {
        if let Some(anchor) = block.select(&selector).next() {
            if let Some(href) = anchor.value().attr("href") {
                return absolutize(base_url, href);
            }
        }
    }

    String::new()
}

fn absolutize(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{base_url}{href}")
    } else {
        format!("{base_url}/{href}")
    }
}
