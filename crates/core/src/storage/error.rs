use thiserror::Error;

/// Errors that can occur while looking up or storing reference data.
///
/// A key that is absent from both the store and the source is not an error:
/// lookups report it as `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    DuplicateKey {
        entity_type: &'static str,
        id: String,
    },
    #[error("Precondition violated for {entity_type} {id}: {reason}")]
    PreconditionViolation {
        entity_type: &'static str,
        id: String,
        reason: String,
    },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Store busy: {0}")]
    Busy(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Source {source_name} unavailable: {message}")]
    SourceUnavailable {
        source_name: &'static str,
        message: String,
    },
}

impl LookupError {
    /// Builds the error raised when a place refers to a country that is not stored.
    pub fn missing_country(place_qid: &str, country_qid: &str) -> Self {
        Self::PreconditionViolation {
            entity_type: "Place",
            id: place_qid.to_string(),
            reason: format!("country {country_qid} is not present"),
        }
    }

    /// Returns true for store faults that a caller may retry with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionFailed(_) | Self::Busy(_))
    }

    /// Returns true if this error reports an already-present key.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }
}

/// Result type for lookup and store operations.
pub type Result<T> = std::result::Result<T, LookupError>;
