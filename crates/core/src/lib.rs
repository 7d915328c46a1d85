//! Functional core of the refdata lookup layer.
//!
//! Holds the domain types for countries, places and languages, the text
//! canonicalizer used to key free-text place descriptions, and the
//! capability traits implemented by both persistent stores and
//! authoritative sources.

pub mod places;
pub mod storage;
