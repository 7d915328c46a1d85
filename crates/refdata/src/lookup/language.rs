//! Cached language lookup.

use std::sync::Arc;

use refdata_core::storage::{CountrySource, LanguageStore, Result};

/// Language lookup over a store that is loaded out of band.
///
/// Language data has no source of its own. A country with no languages is
/// resolved through `countries` so that it gets materialised in the store,
/// but the (empty) language list is returned as read.
pub struct CachedLanguageLookup {
    store: Arc<dyn LanguageStore>,
    countries: Arc<dyn CountrySource>,
}

impl CachedLanguageLookup {
    pub fn new(store: Arc<dyn LanguageStore>, countries: Arc<dyn CountrySource>) -> Self {
        Self { store, countries }
    }

    /// Gets the language codes for a country, ranked languages first.
    pub async fn get_languages_for_country(&self, country_qid: &str) -> Result<Vec<String>> {
        let languages = self.store.get_languages_for_country(country_qid).await?;
        if languages.is_empty() && !country_qid.is_empty() {
            tracing::debug!(country_qid = %country_qid, "No languages for country");
            self.countries.get_country_by_qid(country_qid).await?;
        }
        Ok(languages)
    }

    /// Gets all ranked language codes in ascending rank order.
    pub async fn get_sorted_languages(&self) -> Result<Vec<String>> {
        self.store.get_sorted_languages().await
    }

    /// Gets the Wikipedia project QID for a language code.
    pub async fn get_wikipedia_qid(&self, code: &str) -> Result<Option<String>> {
        if code.is_empty() {
            return Ok(None);
        }
        self.store.get_wikipedia_qid(code).await
    }
}
