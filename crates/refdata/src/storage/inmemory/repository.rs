//! In-memory store implementation.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use refdata_core::places::{description_key, Country, Language, Place, PlaceDescription};
use refdata_core::storage::{
    CountrySource, CountryStore, LanguageStore, LookupError, PlaceDescriptionStore, PlaceSource,
    PlaceStore, Result,
};

/// In-memory store with the same semantics as the SQLite store.
///
/// Uses HashMaps wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the store is dropped.
///
/// Writes that check another table take the locks in a fixed order
/// (countries, places, descriptions) so the check and the insert are atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    countries: Arc<RwLock<HashMap<String, Country>>>,
    places: Arc<RwLock<HashMap<String, Place>>>,
    descriptions: Arc<RwLock<HashMap<String, PlaceDescription>>>,
    languages: Arc<RwLock<HashMap<String, Language>>>,
    country_languages: Arc<RwLock<HashMap<String, BTreeSet<String>>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CountrySource for InMemoryStore {
    async fn get_country_by_qid(&self, qid: &str) -> Result<Option<Country>> {
        let countries = self.countries.read().await;
        Ok(countries.get(qid).cloned())
    }

    async fn get_country_by_code(&self, code: &str) -> Result<Option<Country>> {
        if code.is_empty() {
            return Ok(None);
        }
        let countries = self.countries.read().await;
        Ok(countries
            .values()
            .filter(|c| c.code.as_deref() == Some(code))
            .min_by(|a, b| a.qid.cmp(&b.qid))
            .cloned())
    }
}

#[async_trait]
impl CountryStore for InMemoryStore {
    async fn set_country(&self, country: &Country) -> Result<()> {
        if country.qid.is_empty() {
            return Err(LookupError::InvalidData("No country qid".to_string()));
        }
        let mut countries = self.countries.write().await;
        if countries.contains_key(&country.qid) {
            return Err(LookupError::DuplicateKey {
                entity_type: "Country",
                id: country.qid.clone(),
            });
        }
        let stored = Country::new(&country.qid, country.code.as_deref(), &country.label);
        countries.insert(country.qid.clone(), stored);
        Ok(())
    }
}

#[async_trait]
impl PlaceSource for InMemoryStore {
    async fn get_place_by_qid(&self, qid: &str) -> Result<Option<Place>> {
        let places = self.places.read().await;
        Ok(places.get(qid).cloned())
    }
}

#[async_trait]
impl PlaceStore for InMemoryStore {
    async fn country_exists(&self, qid: &str) -> Result<bool> {
        Ok(self.countries.read().await.contains_key(qid))
    }

    async fn place_exists(&self, qid: &str) -> Result<bool> {
        Ok(self.places.read().await.contains_key(qid))
    }

    async fn set_place(&self, place: &Place) -> Result<()> {
        if place.qid.is_empty() {
            return Err(LookupError::InvalidData("No place qid".to_string()));
        }
        let countries = self.countries.read().await;
        let mut places = self.places.write().await;

        if !countries.contains_key(&place.country_qid) {
            return Err(LookupError::missing_country(&place.qid, &place.country_qid));
        }
        if places.contains_key(&place.qid) {
            return Err(LookupError::DuplicateKey {
                entity_type: "Place",
                id: place.qid.clone(),
            });
        }
        places.insert(place.qid.clone(), place.clone());
        Ok(())
    }
}

#[async_trait]
impl PlaceDescriptionStore for InMemoryStore {
    async fn register_place_description(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Err(LookupError::InvalidData("Empty place description".to_string()));
        }
        let mut descriptions = self.descriptions.write().await;
        descriptions
            .entry(description_key(text))
            .or_insert_with(|| PlaceDescription::unresolved(text));
        Ok(())
    }

    async fn get_place_description(&self, text: &str) -> Result<Option<PlaceDescription>> {
        let descriptions = self.descriptions.read().await;
        Ok(descriptions.get(&description_key(text)).cloned())
    }

    async fn resolve_place_description(&self, text: &str, place_qid: &str) -> Result<()> {
        let places = self.places.read().await;
        let mut descriptions = self.descriptions.write().await;

        if !places.contains_key(place_qid) {
            return Err(LookupError::PreconditionViolation {
                entity_type: "PlaceDescription",
                id: text.to_string(),
                reason: format!("place {place_qid} is not present"),
            });
        }
        let desc = descriptions
            .get_mut(&description_key(text))
            .ok_or_else(|| LookupError::NotFound {
                entity_type: "PlaceDescription",
                id: text.to_string(),
            })?;
        desc.place_qid = Some(place_qid.to_string());
        desc.has_error = false;
        Ok(())
    }

    async fn mark_place_description_error(&self, text: &str) -> Result<()> {
        let mut descriptions = self.descriptions.write().await;
        let desc = descriptions
            .get_mut(&description_key(text))
            .ok_or_else(|| LookupError::NotFound {
                entity_type: "PlaceDescription",
                id: text.to_string(),
            })?;
        desc.has_error = true;
        Ok(())
    }

    async fn list_unresolved_place_descriptions(&self) -> Result<Vec<PlaceDescription>> {
        let descriptions = self.descriptions.read().await;
        let mut unresolved: Vec<_> = descriptions
            .values()
            .filter(|d| d.needs_review())
            .cloned()
            .collect();
        unresolved.sort_by(|a, b| a.text.cmp(&b.text));
        Ok(unresolved)
    }
}

#[async_trait]
impl LanguageStore for InMemoryStore {
    async fn get_languages_for_country(&self, country_qid: &str) -> Result<Vec<String>> {
        let links = self.country_languages.read().await;
        let languages = self.languages.read().await;

        let mut linked: Vec<&Language> = links
            .get(country_qid)
            .into_iter()
            .flatten()
            .filter_map(|code| languages.get(code))
            .collect();
        // Ranked first in rank order, unranked last, ties by code.
        linked.sort_by(|a, b| {
            (a.sort_order.is_none(), a.sort_order, &a.code).cmp(&(
                b.sort_order.is_none(),
                b.sort_order,
                &b.code,
            ))
        });
        Ok(linked.into_iter().map(|l| l.code.clone()).collect())
    }

    async fn get_sorted_languages(&self) -> Result<Vec<String>> {
        let languages = self.languages.read().await;
        let mut ranked: Vec<(i64, &str)> = languages
            .values()
            .filter_map(|l| l.sort_order.map(|rank| (rank, l.code.as_str())))
            .collect();
        ranked.sort();
        Ok(ranked.into_iter().map(|(_, code)| code.to_string()).collect())
    }

    async fn get_wikipedia_qid(&self, code: &str) -> Result<Option<String>> {
        let languages = self.languages.read().await;
        Ok(languages.get(code).and_then(|l| l.wikipedia_qid.clone()))
    }

    async fn add_language(&self, language: &Language) -> Result<()> {
        let mut languages = self.languages.write().await;
        if languages.contains_key(&language.code) {
            return Err(LookupError::DuplicateKey {
                entity_type: "Language",
                id: language.code.clone(),
            });
        }
        languages.insert(language.code.clone(), language.clone());
        Ok(())
    }

    async fn link_country_language(&self, country_qid: &str, code: &str) -> Result<()> {
        let mut links = self.country_languages.write().await;
        let languages = self.languages.read().await;

        if !languages.contains_key(code) {
            return Err(LookupError::PreconditionViolation {
                entity_type: "Language",
                id: code.to_string(),
                reason: "language is not present".to_string(),
            });
        }
        links
            .entry(country_qid.to_string())
            .or_default()
            .insert(code.to_string());
        Ok(())
    }
}
