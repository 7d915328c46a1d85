//! Persistent store implementations.
//!
//! Both backends implement every store trait from `refdata_core::storage`
//! with the same semantics:
//!
//! - `sqlite` (default feature): durable SQLite store using `rusqlite` and `tokio-rusqlite`
//! - `inmemory`: HashMap-backed store for tests and throwaway runs

pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use inmemory::InMemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
