//! Wikidata as the authoritative source for countries and places.

mod client;
pub mod sparql;

pub use client::WikidataClient;
