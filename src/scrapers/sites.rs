//! Extraction plans for the supported portals, in refresh order.
//!
//! Selector chains lead with the structural selector observed on the live
//! site and fall back to content-based matches ("contains €", "contains
//! m²") that survive class-name drift.

use crate::models::Source;
use crate::scrapers::plan::{Rendering, SelectorStrategy, SitePlan};

const FRENCH_HEADERS: &[(&str, &str)] = &[("Accept-Language", "fr-FR,fr;q=0.9")];

pub fn seloger() -> SitePlan {
    SitePlan {
        source: Source::SeLoger,
        // listing cards are injected client-side
        rendering: Rendering::Browser,
        base_url: "https://www.seloger.com",
        search_path: "/immobilier/achat/{city}/",
        headers: FRENCH_HEADERS,
        blocks: &["div.c-pa-list", "div[data-testid=\"serp-core-announcement-card\"]"],
        title: &[
            SelectorStrategy::Css("div.c-pa-title"),
            SelectorStrategy::Css("a[data-testid=\"card-title\"]"),
        ],
        price: &[
            SelectorStrategy::Css("div.c-pa-price"),
            SelectorStrategy::TagContains {
                tag: "div",
                fragment: "€",
            },
        ],
        surface: &[
            SelectorStrategy::Css("div.c-pa-criterion"),
            SelectorStrategy::TagContains {
                tag: "div",
                fragment: "m²",
            },
        ],
        location: &[
            SelectorStrategy::Css("div.c-pa-city"),
            SelectorStrategy::Css("div[data-testid=\"card-address\"]"),
        ],
    }
}

pub fn leboncoin() -> SitePlan {
    SitePlan {
        source: Source::LeBonCoin,
        rendering: Rendering::Http,
        base_url: "https://www.leboncoin.fr",
        search_path: "/recherche?category=9&locations={city}",
        headers: FRENCH_HEADERS,
        blocks: &["a[data-qa-id=\"aditem_container\"]", "li[data-qa-id=\"aditem\"]"],
        title: &[
            SelectorStrategy::Css("p[data-qa-id=\"aditem_title\"]"),
            SelectorStrategy::Css("h2"),
        ],
        price: &[
            SelectorStrategy::Css("span[data-qa-id=\"aditem_price\"]"),
            SelectorStrategy::TagContains {
                tag: "span",
                fragment: "€",
            },
        ],
        surface: &[SelectorStrategy::TagContains {
            tag: "p",
            fragment: "m²",
        }],
        location: &[SelectorStrategy::Css("p[data-qa-id=\"aditem_location\"]")],
    }
}

pub fn bienici() -> SitePlan {
    SitePlan {
        source: Source::BienIci,
        // results list is a JavaScript application
        rendering: Rendering::Browser,
        base_url: "https://www.bienici.com",
        search_path: "/recherche/achat/{city}",
        headers: FRENCH_HEADERS,
        blocks: &["article.sideListItem", "div.resultsListContainer article"],
        title: &[
            SelectorStrategy::Css("span.ad-overview-details__ad-title"),
            SelectorStrategy::Css("h3"),
        ],
        price: &[
            SelectorStrategy::Css("span.ad-price__the-price"),
            SelectorStrategy::TagContains {
                tag: "span",
                fragment: "€",
            },
        ],
        surface: &[SelectorStrategy::TagContains {
            tag: "span",
            fragment: "m²",
        }],
        location: &[SelectorStrategy::Css("span.ad-overview-details__address-title")],
    }
}

/// All supported portals in the order a refresh runs them.
pub fn all_plans() -> Vec<SitePlan> {
    vec![seloger(), leboncoin(), bienici()]
}
