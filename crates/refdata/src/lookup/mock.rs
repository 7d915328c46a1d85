//! Test doubles shared by the lookup tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use refdata_core::places::{Country, Place};
use refdata_core::storage::{CountrySource, LookupError, PlaceSource, Result};

/// Authoritative source that counts calls and can be made slow or unreachable.
#[derive(Default)]
pub struct MockSource {
    countries: HashMap<String, Country>,
    places: HashMap<String, Place>,
    delay: Option<Duration>,
    unavailable: bool,
    country_calls: AtomicUsize,
    place_calls: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_country(mut self, country: Country) -> Self {
        self.countries.insert(country.qid.clone(), country);
        self
    }

    pub fn with_place(mut self, place: Place) -> Self {
        self.places.insert(place.qid.clone(), place);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn country_calls(&self) -> usize {
        self.country_calls.load(Ordering::SeqCst)
    }

    pub fn place_calls(&self) -> usize {
        self.place_calls.load(Ordering::SeqCst)
    }

    async fn respond(&self) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unavailable {
            return Err(LookupError::SourceUnavailable {
                source_name: "Mock",
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CountrySource for MockSource {
    async fn get_country_by_qid(&self, qid: &str) -> Result<Option<Country>> {
        self.country_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        Ok(self.countries.get(qid).cloned())
    }

    async fn get_country_by_code(&self, code: &str) -> Result<Option<Country>> {
        self.country_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        Ok(self
            .countries
            .values()
            .find(|c| c.code.as_deref() == Some(code))
            .cloned())
    }
}

#[async_trait]
impl PlaceSource for MockSource {
    async fn get_place_by_qid(&self, qid: &str) -> Result<Option<Place>> {
        self.place_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        Ok(self.places.get(qid).cloned())
    }
}
