//! City targets and autocomplete suggestions.
//!
//! `CITY_TARGETS` is the fixed list of cities every site scraper iterates
//! over. The alias table backs the `/suggestions` endpoint: each canonical
//! city maps to lowercase fragments (full name, short form, common variants)
//! that a partial query is matched against.

/// Cities scraped on every refresh, in scrape order. Shared by all sites.
pub const CITY_TARGETS: &[&str] = &[
    "Paris",
    "Lyon",
    "Marseille",
    "Toulouse",
    "Bordeaux",
    "Nantes",
    "Lille",
    "Nice",
    "Montpellier",
    "Strasbourg",
];

const MIN_QUERY_LEN: usize = 2;
const MAX_SUGGESTIONS: usize = 5;

/// Canonical city name plus the lowercase fragments it can be found under.
struct CityAliases {
    city: &'static str,
    fragments: &'static [&'static str],
}

// Declaration order is answer order.
const ALIAS_TABLE: &[CityAliases] = &[
    CityAliases {
        city: "Paris",
        fragments: &["paris", "par", "75"],
    },
    CityAliases {
        city: "Lyon",
        fragments: &["lyon", "69"],
    },
    CityAliases {
        city: "Marseille",
        fragments: &["marseille", "mars", "13"],
    },
    CityAliases {
        city: "Toulouse",
        fragments: &["toulouse", "tlse", "31"],
    },
    CityAliases {
        city: "Bordeaux",
        fragments: &["bordeaux", "bdx", "33"],
    },
    CityAliases {
        city: "Nantes",
        fragments: &["nantes", "44"],
    },
    CityAliases {
        city: "Lille",
        fragments: &["lille", "59"],
    },
    CityAliases {
        city: "Nice",
        fragments: &["nice", "06"],
    },
    CityAliases {
        city: "Montpellier",
        fragments: &["montpellier", "montp", "34"],
    },
    CityAliases {
        city: "Strasbourg",
        fragments: &["strasbourg", "strasb", "67"],
    },
];

/// Return up to five canonical city names matching `query`, in table order.
///
/// Matching is plain substring containment against the lowercase alias
/// fragments. Queries shorter than two characters yield nothing.
pub fn suggest(query: &str) -> Vec<&'static str> {
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }
    let query = query.to_lowercase();

    ALIAS_TABLE
        .iter()
        .filter(|entry| entry.fragments.iter().any(|f| f.contains(&query)))
        .map(|entry| entry.city)
        .take(MAX_SUGGESTIONS)
        .collect()
}
