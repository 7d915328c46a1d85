//! Tiered lookups for country, place and language reference data.
//!
//! Lookups check a persistent store first and fall back to an authoritative
//! source on a miss, writing the answer back so the source is asked once.

pub mod config;
pub mod lookup;
pub mod source;
pub mod storage;
pub mod telemetry;
