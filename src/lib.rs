//! immo-scout: aggregates listings from several French property portals
//! into one searchable local store, behind a small JSON API.

pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod locations;
pub mod models;
pub mod normalize;
pub mod pacing;
pub mod scrapers;
pub mod store;
