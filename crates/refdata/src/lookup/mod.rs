//! Cache-aside lookups over a persistent store and an optional source.
//!
//! - **Reads**: check the store first; on miss ask the source and write the
//!   result back to the store
//! - **Writes**: go straight to the store; duplicates are the caller's error
//!
//! Two callers missing on the same key may both write back. The second
//! write then fails with a duplicate key, which the lookups absorb according
//! to their [`DuplicatePolicy`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! let config = Config::from_env();
//! let store = Arc::new(SqliteStore::from_config(&config).await?);
//! let source = Arc::new(RateLimited::new(WikidataClient::new(&config)?, config.rate_limit()));
//!
//! let countries = Arc::new(
//!     CachedCountryLookup::new(store.clone(), source.clone())
//!         .with_duplicate_policy(config.duplicate_policy()),
//! );
//! let places = CachedPlaceLookup::new(store.clone(), countries.clone(), source);
//! let languages = CachedLanguageLookup::new(store, countries);
//! ```

mod country;
mod language;
mod place;

#[cfg(test)]
pub(crate) mod mock;

pub use country::CachedCountryLookup;
pub use language::CachedLanguageLookup;
pub use place::CachedPlaceLookup;

use refdata_core::storage::Result;

/// How a duplicate key during cache-aside write-back is handled.
///
/// Write-back duplicates are always absorbed; the policy only decides
/// whether they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Absorb and log a warning.
    #[default]
    Log,
    /// Absorb without logging.
    Silent,
}

impl DuplicatePolicy {
    /// Absorbs a duplicate-key failure from a write-back, passing every
    /// other outcome through unchanged.
    pub(crate) fn absorb(self, result: Result<()>, entity_type: &str, id: &str) -> Result<()> {
        match result {
            Err(err) if err.is_duplicate() => {
                if self == Self::Log {
                    tracing::warn!(
                        entity_type,
                        id,
                        "Duplicate key on write-back, another writer got there first"
                    );
                }
                Ok(())
            }
            other => other,
        }
    }
}
