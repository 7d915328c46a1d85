//! Authoritative sources for reference data and call throttling.
//!
//! Sources implement the same read traits as the stores, so a lookup can
//! take a bare client, a throttled one, or another lookup.

mod rate_limit;
pub mod wikidata;

pub use rate_limit::{RateLimited, RateLimiter};
pub use wikidata::WikidataClient;
