use async_trait::async_trait;

use crate::places::{Country, Language, Place, PlaceDescription};

use super::Result;

/// Read access to countries.
///
/// Implemented by persistent stores, by authoritative sources and by the
/// cache-aside lookup, so any of them can stand in for another.
#[async_trait]
pub trait CountrySource: Send + Sync {
    /// Gets a country by its QID.
    async fn get_country_by_qid(&self, qid: &str) -> Result<Option<Country>>;

    /// Gets a country by its ISO code.
    async fn get_country_by_code(&self, code: &str) -> Result<Option<Country>>;
}

/// Country storage.
#[async_trait]
pub trait CountryStore: CountrySource {
    /// Inserts a new country. Fails with `DuplicateKey` if the QID is present.
    async fn set_country(&self, country: &Country) -> Result<()>;
}

/// Read access to places.
#[async_trait]
pub trait PlaceSource: Send + Sync {
    /// Gets a place by its QID.
    async fn get_place_by_qid(&self, qid: &str) -> Result<Option<Place>>;
}

/// Place storage.
#[async_trait]
pub trait PlaceStore: PlaceSource {
    /// Returns true if a country with this QID is stored.
    async fn country_exists(&self, qid: &str) -> Result<bool>;

    /// Returns true if a place with this QID is stored.
    async fn place_exists(&self, qid: &str) -> Result<bool>;

    /// Inserts a new place.
    ///
    /// Fails with `PreconditionViolation` if the place's country is not
    /// stored, and with `DuplicateKey` if the QID is present.
    async fn set_place(&self, place: &Place) -> Result<()>;
}

/// Storage for free-text place descriptions awaiting or carrying a resolution.
///
/// All `text` arguments are expected in canonical form; matching is
/// case-insensitive.
#[async_trait]
pub trait PlaceDescriptionStore: Send + Sync {
    /// Records a description unless one with the same key already exists.
    async fn register_place_description(&self, text: &str) -> Result<()>;

    /// Gets a description by its text.
    async fn get_place_description(&self, text: &str) -> Result<Option<PlaceDescription>>;

    /// Resolves a description to a stored place and clears its error flag.
    async fn resolve_place_description(&self, text: &str, place_qid: &str) -> Result<()>;

    /// Flags a description as not confidently resolvable.
    async fn mark_place_description_error(&self, text: &str) -> Result<()>;

    /// Lists descriptions that are unresolved or flagged, ordered by text.
    async fn list_unresolved_place_descriptions(&self) -> Result<Vec<PlaceDescription>>;
}

/// Language reference data.
#[async_trait]
pub trait LanguageStore: Send + Sync {
    /// Gets the language codes associated with a country.
    ///
    /// Ranked languages come first in rank order, then unranked ones by code.
    async fn get_languages_for_country(&self, country_qid: &str) -> Result<Vec<String>>;

    /// Gets all ranked language codes in ascending rank order.
    async fn get_sorted_languages(&self) -> Result<Vec<String>>;

    /// Gets the Wikipedia project QID for a language.
    async fn get_wikipedia_qid(&self, code: &str) -> Result<Option<String>>;

    /// Inserts a new language. Fails with `DuplicateKey` if the code is present.
    async fn add_language(&self, language: &Language) -> Result<()>;

    /// Associates a stored language with a country. Repeated links are a no-op.
    async fn link_country_language(&self, country_qid: &str, code: &str) -> Result<()>;
}
