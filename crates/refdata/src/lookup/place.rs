//! Cached place lookup.

use std::sync::Arc;

use async_trait::async_trait;

use refdata_core::places::{canonicalize, Place};
use refdata_core::storage::{
    CountrySource, LookupError, PlaceDescriptionStore, PlaceSource, PlaceStore, Result,
};

use super::DuplicatePolicy;

/// Place lookup with cache-aside over a persistent store.
///
/// A place is only ever written after its country is present in the store.
/// On a source hit the country is resolved through `countries` first, which
/// is expected to be a cache-aside country lookup over the same store.
pub struct CachedPlaceLookup {
    store: Arc<dyn PlaceStore>,
    descriptions: Arc<dyn PlaceDescriptionStore>,
    countries: Arc<dyn CountrySource>,
    source: Option<Arc<dyn PlaceSource>>,
    duplicates: DuplicatePolicy,
}

impl CachedPlaceLookup {
    /// Creates a lookup that falls back to `source` on a store miss.
    pub fn new<S>(
        store: Arc<S>,
        countries: Arc<dyn CountrySource>,
        source: Arc<dyn PlaceSource>,
    ) -> Self
    where
        S: PlaceStore + PlaceDescriptionStore + 'static,
    {
        Self {
            store: store.clone(),
            descriptions: store,
            countries,
            source: Some(source),
            duplicates: DuplicatePolicy::default(),
        }
    }

    /// Creates a lookup without a source.
    pub fn read_through<S>(store: Arc<S>, countries: Arc<dyn CountrySource>) -> Self
    where
        S: PlaceStore + PlaceDescriptionStore + 'static,
    {
        Self {
            store: store.clone(),
            descriptions: store,
            countries,
            source: None,
            duplicates: DuplicatePolicy::default(),
        }
    }

    /// Sets how duplicate keys during write-back are reported.
    pub fn with_duplicate_policy(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    /// Resolves a free-text place description to a place QID.
    ///
    /// The canonical form of `text` is registered for later triage even when
    /// it cannot be resolved yet. Unresolved descriptions and descriptions
    /// flagged as erroneous both report `None`.
    pub async fn get_place_qid_by_desc(&self, text: &str) -> Result<Option<String>> {
        let canonical = canonicalize(text);
        if canonical.is_empty() {
            return Ok(None);
        }

        self.descriptions
            .register_place_description(&canonical)
            .await?;

        let Some(desc) = self.descriptions.get_place_description(&canonical).await? else {
            return Ok(None);
        };

        match desc.usable_place_qid() {
            Some(qid) => Ok(Some(qid.to_string())),
            None => {
                tracing::debug!(
                    description = %canonical,
                    has_error = desc.has_error,
                    "Place description awaiting review"
                );
                Ok(None)
            }
        }
    }

    async fn ensure_country(&self, place: &Place) -> Result<()> {
        match self.countries.get_country_by_qid(&place.country_qid).await? {
            Some(_) => Ok(()),
            None => {
                tracing::warn!(
                    place_qid = %place.qid,
                    country_qid = %place.country_qid,
                    "Country for place could not be resolved"
                );
                Err(LookupError::missing_country(&place.qid, &place.country_qid))
            }
        }
    }
}

#[async_trait]
impl PlaceSource for CachedPlaceLookup {
    async fn get_place_by_qid(&self, qid: &str) -> Result<Option<Place>> {
        if qid.is_empty() {
            return Ok(None);
        }

        if let Some(place) = self.store.get_place_by_qid(qid).await? {
            tracing::trace!(place_qid = %qid, "Store hit for place");
            return Ok(Some(place));
        }

        tracing::trace!(place_qid = %qid, "Store miss for place");
        let Some(source) = &self.source else {
            return Ok(None);
        };

        let Some(place) = source.get_place_by_qid(qid).await? else {
            return Ok(None);
        };

        // The country must be materialised before the place row is written.
        self.ensure_country(&place).await?;
        let result = self.store.set_place(&place).await;
        self.duplicates.absorb(result, "Place", &place.qid)?;
        tracing::debug!(
            place_qid = %place.qid,
            country_qid = %place.country_qid,
            "Place stored from source"
        );

        Ok(Some(place))
    }
}

#[async_trait]
impl PlaceStore for CachedPlaceLookup {
    async fn country_exists(&self, qid: &str) -> Result<bool> {
        self.store.country_exists(qid).await
    }

    async fn place_exists(&self, qid: &str) -> Result<bool> {
        self.store.place_exists(qid).await
    }

    async fn set_place(&self, place: &Place) -> Result<()> {
        if !self.store.country_exists(&place.country_qid).await? {
            return Err(LookupError::missing_country(&place.qid, &place.country_qid));
        }
        self.store.set_place(place).await
    }
}
