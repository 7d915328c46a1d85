//! In-memory storage backend.
//!
//! Stores all data in HashMaps wrapped in `Arc<RwLock<_>>`. Useful for tests
//! and one-off batch runs where persistence is not required.
//!
//! # Example
//!
//! ```rust,ignore
//! use refdata::storage::inmemory::InMemoryStore;
//!
//! let store = InMemoryStore::new();
//! ```

mod repository;

pub use repository::InMemoryStore;
