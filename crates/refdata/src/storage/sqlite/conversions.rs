//! SQLite row conversion functions.
//!
//! Pure functions for converting SQLite rows into domain types.

use refdata_core::places::{Country, Place, PlaceDescription};
use rusqlite::Row;

/// Convert a SQLite row to a Country.
///
/// Expected columns: country_qid, country_code, country_label
pub fn row_to_country(row: &Row) -> rusqlite::Result<Country> {
    let qid: String = row.get(0)?;
    let code: Option<String> = row.get(1)?;
    let label: String = row.get(2)?;

    Ok(Country::new(qid, code, label))
}

/// Convert a SQLite row to a Place.
///
/// Expected columns: place_qid, country_qid, place_label
pub fn row_to_place(row: &Row) -> rusqlite::Result<Place> {
    Ok(Place {
        qid: row.get(0)?,
        country_qid: row.get(1)?,
        label: row.get(2)?,
    })
}

/// Convert a SQLite row to a PlaceDescription.
///
/// Expected columns: external_text, place_qid, has_error
pub fn row_to_place_description(row: &Row) -> rusqlite::Result<PlaceDescription> {
    Ok(PlaceDescription {
        text: row.get(0)?,
        place_qid: row.get(1)?,
        has_error: row.get(2)?,
    })
}
