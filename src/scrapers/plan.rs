//! Declarative per-site extraction plans.
//!
//! Portals restyle their listing markup regularly, and each restyle used to
//! mean touching scraper code. A plan instead declares, per field, an
//! ordered chain of selector strategies; the generic extractor tries them in
//! priority order and takes the first hit. Onboarding a new portal is a new
//! plan, not new code.

use crate::fetch::FetchOptions;
use crate::models::Source;

/// One way of locating a field inside a listing block.
#[derive(Debug, Clone, Copy)]
pub enum SelectorStrategy {
    /// Structural match: a CSS selector (tag, class, attribute equality).
    Css(&'static str),
    /// Content match: first element of `tag` whose text contains
    /// `fragment`. Useful when class names drift but "€" or "m²" stay.
    TagContains {
        tag: &'static str,
        fragment: &'static str,
    },
}

/// Ordered fallback chain for one field.
pub type SelectorChain = &'static [SelectorStrategy];

/// How a site's pages are retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    /// Plain HTTP; the markup is usable as served.
    Http,
    /// Listings only appear after client-side JavaScript runs.
    Browser,
}

/// Everything the generic site scraper needs to know about one portal.
pub struct SitePlan {
    pub source: Source,
    pub rendering: Rendering,
    /// Scheme + host, also used to absolutize relative listing links.
    pub base_url: &'static str,
    /// Search path with a `{city}` placeholder, relative to `base_url`.
    pub search_path: &'static str,
    /// Extra request headers sent with every fetch.
    pub headers: &'static [(&'static str, &'static str)],
    /// Selectors for the listing blocks on a city page, tried in order
    /// until one matches anything.
    pub blocks: &'static [&'static str],
    pub title: SelectorChain,
    pub price: SelectorChain,
    pub surface: SelectorChain,
    pub location: SelectorChain,
}

impl SitePlan {
    /// Listing-page URL for one city.
    pub fn city_url(&self, city: &str) -> String {
        let slug = city_slug(city);
        format!("{}{}", self.base_url, self.search_path.replace("{city}", &slug))
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions::html().with_headers(self.headers)
    }
}

/// Lowercase, hyphenated, unaccented form used in portal URLs.
fn city_slug(city: &str) -> String {
    city.to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' => '-',
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs() {
        assert_eq!(city_slug("Paris"), "paris");
        assert_eq!(city_slug("Orléans"), "orleans");
        assert_eq!(city_slug("Aix en Provence"), "aix-en-provence");
    }

    #[test]
    fn city_url_substitutes_slug() {
        let plan = crate::scrapers::sites::seloger();
        let url = plan.city_url("Lyon");
        assert!(url.starts_with(plan.base_url));
        assert!(url.contains("lyon"));
        assert!(!url.contains("{city}"));
    }
}
