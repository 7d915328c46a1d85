//! SQLite error mapping.
//!
//! Maps `tokio_rusqlite::Error` and `rusqlite::Error` to `LookupError` from
//! `refdata_core::storage`, keeping duplicate keys, broken references and
//! transient faults apart.

use refdata_core::storage::LookupError;

/// Maps a rusqlite error to a LookupError.
///
/// # Error Mapping
///
/// - `SQLITE_CONSTRAINT_UNIQUE` / `SQLITE_CONSTRAINT_PRIMARYKEY` → `LookupError::DuplicateKey`
/// - `SQLITE_CONSTRAINT_FOREIGNKEY` → `LookupError::PreconditionViolation`
/// - `SQLITE_BUSY` / `SQLITE_LOCKED` → `LookupError::Busy`
/// - Cannot open → `LookupError::ConnectionFailed`
/// - All other errors → `LookupError::QueryFailed`
fn map_rusqlite_error(err: &rusqlite::Error, entity_type: &'static str, id: &str) -> LookupError {
    match err {
        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            LookupError::DuplicateKey {
                entity_type,
                id: id.to_string(),
            }
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            LookupError::PreconditionViolation {
                entity_type,
                id: id.to_string(),
                reason: "referenced row is not present".to_string(),
            }
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if matches!(
                sqlite_err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ) =>
        {
            LookupError::Busy(err.to_string())
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.code == rusqlite::ErrorCode::CannotOpen =>
        {
            LookupError::ConnectionFailed(format!("Cannot open database: {err}"))
        }

        _ => LookupError::QueryFailed(err.to_string()),
    }
}

/// Maps a tokio_rusqlite error to a LookupError.
///
/// `id` names the key the failing statement was working on, so duplicate
/// and precondition errors can report it.
pub fn map_tokio_rusqlite_error(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
    id: impl Into<String>,
) -> LookupError {
    let id = id.into();
    match &err {
        tokio_rusqlite::Error::Rusqlite(rusqlite_err) => {
            map_rusqlite_error(rusqlite_err, entity_type, &id)
        }
        tokio_rusqlite::Error::ConnectionClosed | tokio_rusqlite::Error::Close(_) => {
            LookupError::ConnectionFailed("Connection closed unexpectedly".to_string())
        }
        _ => LookupError::QueryFailed(err.to_string()),
    }
}
