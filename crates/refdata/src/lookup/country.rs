//! Cached country lookup.

use std::sync::Arc;

use async_trait::async_trait;

use refdata_core::places::Country;
use refdata_core::storage::{CountrySource, CountryStore, Result};

use super::DuplicatePolicy;

/// Country lookup with cache-aside over a persistent store.
///
/// The by-QID and by-code paths are independent pipelines: each checks the
/// store, falls back to the source on miss, and writes a source hit back.
/// Without a source the lookup only reads the store.
pub struct CachedCountryLookup {
    store: Arc<dyn CountryStore>,
    source: Option<Arc<dyn CountrySource>>,
    duplicates: DuplicatePolicy,
}

impl CachedCountryLookup {
    /// Creates a lookup that falls back to `source` on a store miss.
    pub fn new(store: Arc<dyn CountryStore>, source: Arc<dyn CountrySource>) -> Self {
        Self {
            store,
            source: Some(source),
            duplicates: DuplicatePolicy::default(),
        }
    }

    /// Creates a lookup without a source.
    pub fn read_through(store: Arc<dyn CountryStore>) -> Self {
        Self {
            store,
            source: None,
            duplicates: DuplicatePolicy::default(),
        }
    }

    /// Sets how duplicate keys during write-back are reported.
    pub fn with_duplicate_policy(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    async fn write_back(&self, country: &Country) -> Result<()> {
        let result = self.store.set_country(country).await;
        self.duplicates.absorb(result, "Country", &country.qid)?;
        tracing::debug!(
            country_qid = %country.qid,
            label = %country.label,
            "Country stored from source"
        );
        Ok(())
    }
}

#[async_trait]
impl CountrySource for CachedCountryLookup {
    async fn get_country_by_qid(&self, qid: &str) -> Result<Option<Country>> {
        if qid.is_empty() {
            return Ok(None);
        }

        if let Some(country) = self.store.get_country_by_qid(qid).await? {
            tracing::trace!(country_qid = %qid, "Store hit for country");
            return Ok(Some(country));
        }

        tracing::trace!(country_qid = %qid, "Store miss for country");
        let Some(source) = &self.source else {
            return Ok(None);
        };

        let country = source.get_country_by_qid(qid).await?;
        if let Some(ref c) = country {
            self.write_back(c).await?;
        }
        Ok(country)
    }

    async fn get_country_by_code(&self, code: &str) -> Result<Option<Country>> {
        if code.is_empty() {
            return Ok(None);
        }

        if let Some(country) = self.store.get_country_by_code(code).await? {
            tracing::trace!(country_code = %code, "Store hit for country code");
            return Ok(Some(country));
        }

        tracing::trace!(country_code = %code, "Store miss for country code");
        let Some(source) = &self.source else {
            return Ok(None);
        };

        let country = source.get_country_by_code(code).await?;
        if let Some(ref c) = country {
            self.write_back(c).await?;
        }
        Ok(country)
    }
}

#[async_trait]
impl CountryStore for CachedCountryLookup {
    async fn set_country(&self, country: &Country) -> Result<()> {
        self.store.set_country(country).await
    }
}
