//! SQLite store implementation.
//!
//! Implements the store traits from `refdata_core::storage` using SQLite.
//! All statements run on the single `tokio-rusqlite` connection thread, so
//! every call observes a consistent database state.

use std::time::Duration;

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use refdata_core::places::{description_key, Country, Language, Place, PlaceDescription};
use refdata_core::storage::{
    CountrySource, CountryStore, LanguageStore, LookupError, PlaceDescriptionStore, PlaceSource,
    PlaceStore, Result,
};

use super::conversions::{row_to_country, row_to_place, row_to_place_description};
use super::error::map_tokio_rusqlite_error;
use super::schema;
use crate::config::Config;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

fn first_column(row: &rusqlite::Row) -> rusqlite::Result<String> {
    row.get(0)
}

/// Outcome of a write that depends on other rows being present.
enum Guarded {
    Written,
    MissingReference,
    MissingRow,
}

/// SQLite-backed persistent store for all reference data.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a file-based store.
    ///
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| LookupError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;
        tracing::info!(path, "Opened SQLite reference data store");

        Ok(Self { conn })
    }

    /// Opens the store at the configured path.
    pub async fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.sqlite_path).await
    }

    /// Creates a store backed by an in-memory database.
    ///
    /// Data is lost when the store is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| LookupError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Initialize the database schema.
    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.pragma_update(None, "foreign_keys", true)
                .map_err(wrap_err)?;
            conn.busy_timeout(Duration::from_millis(schema::BUSY_TIMEOUT_MS))
                .map_err(wrap_err)?;
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| map_tokio_rusqlite_error(e, "Schema", ""))
    }

    async fn exists(&self, sql: &'static str, entity_type: &'static str, id: &str) -> Result<bool> {
        let id_owned = id.to_string();

        self.conn
            .call(move |conn| {
                conn.query_row(sql, [&id_owned], |row| row.get::<_, bool>(0))
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, entity_type, id))
    }

    async fn get_country(&self, sql: &'static str, key: &str) -> Result<Option<Country>> {
        if key.is_empty() {
            return Ok(None);
        }
        let key_owned = key.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(sql).map_err(wrap_err)?;
                match stmt.query_row([&key_owned], row_to_country) {
                    Ok(country) => Ok(Some(country)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Country", key))
    }

    async fn read_codes(
        &self,
        sql: &'static str,
        param: Option<String>,
        id: &str,
    ) -> Result<Vec<String>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(sql).map_err(wrap_err)?;
                let rows = stmt
                    .query_map(rusqlite::params_from_iter(param.iter()), first_column)
                    .map_err(wrap_err)?;

                let mut codes = Vec::new();
                for row_result in rows {
                    codes.push(row_result.map_err(wrap_err)?);
                }
                Ok(codes)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Language", id))
    }
}

// ============================================================================
// Country implementation
// ============================================================================

#[async_trait]
impl CountrySource for SqliteStore {
    async fn get_country_by_qid(&self, qid: &str) -> Result<Option<Country>> {
        self.get_country(schema::SELECT_COUNTRY_BY_QID, qid).await
    }

    async fn get_country_by_code(&self, code: &str) -> Result<Option<Country>> {
        self.get_country(schema::SELECT_COUNTRY_BY_CODE, code).await
    }
}

#[async_trait]
impl CountryStore for SqliteStore {
    async fn set_country(&self, country: &Country) -> Result<()> {
        if country.qid.is_empty() {
            return Err(LookupError::InvalidData("No country qid".to_string()));
        }
        let qid = country.qid.clone();
        let code = country.code.clone().filter(|c| !c.is_empty());
        let label = country.label.clone();

        self.conn
            .call(move |conn| {
                conn.execute(schema::INSERT_COUNTRY, rusqlite::params![qid, code, label])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Country", country.qid.as_str()))
    }
}

// ============================================================================
// Place implementation
// ============================================================================

#[async_trait]
impl PlaceSource for SqliteStore {
    async fn get_place_by_qid(&self, qid: &str) -> Result<Option<Place>> {
        if qid.is_empty() {
            return Ok(None);
        }
        let qid_owned = qid.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_PLACE_BY_QID).map_err(wrap_err)?;
                match stmt.query_row([&qid_owned], row_to_place) {
                    Ok(place) => Ok(Some(place)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Place", qid))
    }
}

#[async_trait]
impl PlaceStore for SqliteStore {
    async fn country_exists(&self, qid: &str) -> Result<bool> {
        self.exists(schema::COUNTRY_EXISTS, "Country", qid).await
    }

    async fn place_exists(&self, qid: &str) -> Result<bool> {
        self.exists(schema::PLACE_EXISTS, "Place", qid).await
    }

    async fn set_place(&self, place: &Place) -> Result<()> {
        if place.qid.is_empty() {
            return Err(LookupError::InvalidData("No place qid".to_string()));
        }
        let qid = place.qid.clone();
        let country_qid = place.country_qid.clone();
        let label = place.label.clone();

        let outcome = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                let country_present: bool = tx
                    .query_row(schema::COUNTRY_EXISTS, [&country_qid], |row| row.get(0))
                    .map_err(wrap_err)?;
                if !country_present {
                    return Ok(Guarded::MissingReference);
                }
                tx.execute(schema::INSERT_PLACE, rusqlite::params![qid, country_qid, label])
                    .map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;
                Ok(Guarded::Written)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Place", place.qid.as_str()))?;

        match outcome {
            Guarded::Written => Ok(()),
            _ => Err(LookupError::missing_country(&place.qid, &place.country_qid)),
        }
    }
}

// ============================================================================
// PlaceDescriptionStore implementation
// ============================================================================

#[async_trait]
impl PlaceDescriptionStore for SqliteStore {
    async fn register_place_description(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Err(LookupError::InvalidData("Empty place description".to_string()));
        }
        let key = description_key(text);
        let text_owned = text.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_PLACE_DESCRIPTION_IF_ABSENT,
                    rusqlite::params![key, text_owned],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "PlaceDescription", text))
    }

    async fn get_place_description(&self, text: &str) -> Result<Option<PlaceDescription>> {
        if text.is_empty() {
            return Ok(None);
        }
        let key = description_key(text);

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_PLACE_DESCRIPTION)
                    .map_err(wrap_err)?;
                match stmt.query_row([&key], row_to_place_description) {
                    Ok(desc) => Ok(Some(desc)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "PlaceDescription", text))
    }

    async fn resolve_place_description(&self, text: &str, place_qid: &str) -> Result<()> {
        let key = description_key(text);
        let place_qid_owned = place_qid.to_string();

        let outcome = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                let place_present: bool = tx
                    .query_row(schema::PLACE_EXISTS, [&place_qid_owned], |row| row.get(0))
                    .map_err(wrap_err)?;
                if !place_present {
                    return Ok(Guarded::MissingReference);
                }
                let rows = tx
                    .execute(
                        schema::RESOLVE_PLACE_DESCRIPTION,
                        rusqlite::params![key, place_qid_owned],
                    )
                    .map_err(wrap_err)?;
                if rows == 0 {
                    return Ok(Guarded::MissingRow);
                }
                tx.commit().map_err(wrap_err)?;
                Ok(Guarded::Written)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "PlaceDescription", text))?;

        match outcome {
            Guarded::Written => Ok(()),
            Guarded::MissingReference => Err(LookupError::PreconditionViolation {
                entity_type: "PlaceDescription",
                id: text.to_string(),
                reason: format!("place {place_qid} is not present"),
            }),
            Guarded::MissingRow => Err(LookupError::NotFound {
                entity_type: "PlaceDescription",
                id: text.to_string(),
            }),
        }
    }

    async fn mark_place_description_error(&self, text: &str) -> Result<()> {
        let key = description_key(text);

        let rows = self
            .conn
            .call(move |conn| {
                conn.execute(schema::MARK_PLACE_DESCRIPTION_ERROR, [&key])
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "PlaceDescription", text))?;

        if rows == 0 {
            return Err(LookupError::NotFound {
                entity_type: "PlaceDescription",
                id: text.to_string(),
            });
        }
        Ok(())
    }

    async fn list_unresolved_place_descriptions(&self) -> Result<Vec<PlaceDescription>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_UNRESOLVED_PLACE_DESCRIPTIONS)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([], row_to_place_description)
                    .map_err(wrap_err)?;

                let mut descriptions = Vec::new();
                for row_result in rows {
                    descriptions.push(row_result.map_err(wrap_err)?);
                }
                Ok(descriptions)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "PlaceDescription", ""))
    }
}

// ============================================================================
// LanguageStore implementation
// ============================================================================

#[async_trait]
impl LanguageStore for SqliteStore {
    async fn get_languages_for_country(&self, country_qid: &str) -> Result<Vec<String>> {
        self.read_codes(
            schema::SELECT_LANGUAGES_FOR_COUNTRY,
            Some(country_qid.to_string()),
            country_qid,
        )
        .await
    }

    async fn get_sorted_languages(&self) -> Result<Vec<String>> {
        self.read_codes(schema::SELECT_SORTED_LANGUAGES, None, "")
            .await
    }

    async fn get_wikipedia_qid(&self, code: &str) -> Result<Option<String>> {
        let code_owned = code.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_WIKIPEDIA_QID).map_err(wrap_err)?;
                match stmt.query_row([&code_owned], |row| row.get::<_, Option<String>>(0)) {
                    Ok(qid) => Ok(qid),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Language", code))
    }

    async fn add_language(&self, language: &Language) -> Result<()> {
        let code = language.code.clone();
        let wikipedia_qid = language.wikipedia_qid.clone();
        let sort_order = language.sort_order;

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_LANGUAGE,
                    rusqlite::params![code, wikipedia_qid, sort_order],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Language", language.code.as_str()))
    }

    async fn link_country_language(&self, country_qid: &str, code: &str) -> Result<()> {
        let country_qid_owned = country_qid.to_string();
        let code_owned = code.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_COUNTRY_LANGUAGE,
                    rusqlite::params![country_qid_owned, code_owned],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Language", code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_france() -> SqliteStore {
        let store = SqliteStore::new_in_memory().await.unwrap();
        store
            .set_country(&Country::new("Q142", Some("FRA"), "France"))
            .await
            .unwrap();
        store
    }

    // ==================== Country Tests ====================

    #[tokio::test]
    async fn test_country_set_and_get() {
        let store = store_with_france().await;

        let by_qid = store.get_country_by_qid("Q142").await.unwrap();
        let by_code = store.get_country_by_code("FRA").await.unwrap();

        let expected = Country::new("Q142", Some("FRA"), "France");
        assert_eq!(by_qid, Some(expected.clone()));
        assert_eq!(by_code, Some(expected));
    }

    #[tokio::test]
    async fn test_country_without_code() {
        let store = SqliteStore::new_in_memory().await.unwrap();
        store
            .set_country(&Country::new("Q1", Some(""), "Somewhere"))
            .await
            .unwrap();

        let country = store.get_country_by_qid("Q1").await.unwrap().unwrap();
        assert_eq!(country.code, None);
        assert_eq!(store.get_country_by_code("").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_country_duplicate_is_rejected() {
        let store = store_with_france().await;

        let result = store
            .set_country(&Country::new("Q142", Some("FRA"), "France again"))
            .await;

        assert_eq!(
            result,
            Err(LookupError::DuplicateKey {
                entity_type: "Country",
                id: "Q142".to_string(),
            })
        );
        let stored = store.get_country_by_qid("Q142").await.unwrap().unwrap();
        assert_eq!(stored.label, "France");
    }

    #[tokio::test]
    async fn test_country_empty_qid_is_invalid() {
        let store = SqliteStore::new_in_memory().await.unwrap();
        let result = store.set_country(&Country::new("", None::<String>, "x")).await;
        assert!(matches!(result, Err(LookupError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_country_get_nonexistent() {
        let store = SqliteStore::new_in_memory().await.unwrap();
        assert_eq!(store.get_country_by_qid("Q404").await.unwrap(), None);
        assert_eq!(store.get_country_by_qid("").await.unwrap(), None);
    }

    // ==================== Place Tests ====================

    #[tokio::test]
    async fn test_place_set_and_get() {
        let store = store_with_france().await;
        let paris = Place::new("Q90", "Q142", "Paris");

        store.set_place(&paris).await.unwrap();

        assert_eq!(store.get_place_by_qid("Q90").await.unwrap(), Some(paris));
        assert!(store.place_exists("Q90").await.unwrap());
    }

    #[tokio::test]
    async fn test_place_without_country_is_rejected() {
        let store = SqliteStore::new_in_memory().await.unwrap();

        let result = store.set_place(&Place::new("P1", "C1", "London")).await;

        assert_eq!(result, Err(LookupError::missing_country("P1", "C1")));
        assert_eq!(store.get_place_by_qid("P1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_place_duplicate_is_rejected() {
        let store = store_with_france().await;
        store
            .set_place(&Place::new("Q90", "Q142", "Paris"))
            .await
            .unwrap();

        let result = store.set_place(&Place::new("Q90", "Q142", "Parijs")).await;

        assert!(matches!(result, Err(LookupError::DuplicateKey { .. })));
    }

    // ==================== Description Tests ====================

    #[tokio::test]
    async fn test_description_register_is_insert_if_absent() {
        let store = store_with_france().await;
        store
            .set_place(&Place::new("Q90", "Q142", "Paris"))
            .await
            .unwrap();

        store.register_place_description("Paris, France").await.unwrap();
        store
            .resolve_place_description("Paris, France", "Q90")
            .await
            .unwrap();
        store.register_place_description("PARIS, FRANCE").await.unwrap();

        let desc = store
            .get_place_description("paris, france")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(desc.text, "Paris, France");
        assert_eq!(desc.place_qid.as_deref(), Some("Q90"));
        assert!(!desc.has_error);
    }

    #[tokio::test]
    async fn test_description_resolve_requires_place() {
        let store = SqliteStore::new_in_memory().await.unwrap();
        store.register_place_description("Atlantis").await.unwrap();

        let result = store.resolve_place_description("Atlantis", "Q404").await;

        assert!(matches!(
            result,
            Err(LookupError::PreconditionViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_description_mark_error_and_list() {
        let store = store_with_france().await;
        store
            .set_place(&Place::new("Q90", "Q142", "Paris"))
            .await
            .unwrap();
        store.register_place_description("Paris").await.unwrap();
        store.register_place_description("Lyon").await.unwrap();
        store.register_place_description("Atlantis").await.unwrap();
        store.resolve_place_description("Paris", "Q90").await.unwrap();
        store.mark_place_description_error("Atlantis").await.unwrap();

        let unresolved = store.list_unresolved_place_descriptions().await.unwrap();

        let texts: Vec<_> = unresolved.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, vec!["Atlantis", "Lyon"]);
        assert!(unresolved[0].has_error);
    }

    #[tokio::test]
    async fn test_description_mark_error_nonexistent() {
        let store = SqliteStore::new_in_memory().await.unwrap();
        let result = store.mark_place_description_error("Nowhere").await;
        assert!(matches!(result, Err(LookupError::NotFound { .. })));
    }

    // ==================== Language Tests ====================

    #[tokio::test]
    async fn test_languages_ordering() {
        let store = SqliteStore::new_in_memory().await.unwrap();
        store
            .add_language(&Language::new("fr").with_sort_order(2).with_wikipedia_qid("Q8447"))
            .await
            .unwrap();
        store
            .add_language(&Language::new("en").with_sort_order(1))
            .await
            .unwrap();
        store.add_language(&Language::new("br")).await.unwrap();
        store.link_country_language("Q142", "br").await.unwrap();
        store.link_country_language("Q142", "fr").await.unwrap();
        store.link_country_language("Q142", "fr").await.unwrap();

        assert_eq!(
            store.get_languages_for_country("Q142").await.unwrap(),
            vec!["fr", "br"]
        );
        assert_eq!(store.get_sorted_languages().await.unwrap(), vec!["en", "fr"]);
        assert_eq!(
            store.get_wikipedia_qid("fr").await.unwrap().as_deref(),
            Some("Q8447")
        );
        assert_eq!(store.get_wikipedia_qid("en").await.unwrap(), None);
        assert_eq!(store.get_wikipedia_qid("xx").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_language_duplicate_is_rejected() {
        let store = SqliteStore::new_in_memory().await.unwrap();
        store.add_language(&Language::new("nl")).await.unwrap();

        let result = store.add_language(&Language::new("nl")).await;

        assert!(matches!(result, Err(LookupError::DuplicateKey { .. })));
    }

    #[tokio::test]
    async fn test_file_store_persists_across_reopen() {
        let path = std::env::temp_dir().join(format!(
            "refdata-sqlite-test-{}.db",
            std::process::id()
        ));
        let path_str = path.to_string_lossy().to_string();
        let _ = std::fs::remove_file(&path);

        {
            let store = SqliteStore::new(&path_str).await.unwrap();
            store
                .set_country(&Country::new("Q55", Some("NLD"), "Netherlands"))
                .await
                .unwrap();
        }

        let reopened = SqliteStore::new(&path_str).await.unwrap();
        let country = reopened.get_country_by_code("NLD").await.unwrap();
        assert_eq!(country.map(|c| c.qid), Some("Q55".to_string()));

        drop(reopened);
        let _ = std::fs::remove_file(&path);
    }
}
