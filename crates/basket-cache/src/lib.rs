//! Type-safe Key-Value storage layer for basket.
//!
//! Provides a small, ergonomic API for keeping JSON values in a durable
//! key-value slot. The byte-level storage is pluggable through [`Store`]:
//! [`MemoryStore`] keeps everything in the process, [`FileStore`] keeps one
//! file per key inside a directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use basket_cache::{Cache, FileStore};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Entry {
//!     id: u64,
//!     amount: u32,
//! }
//!
//! let cache = Cache::new(FileStore::open("./.basket")?);
//!
//! // Store a value
//! cache.set("basket:cart", &vec![Entry { id: 1, amount: 2 }])?;
//!
//! // Retrieve a value
//! let cart: Option<Vec<Entry>> = cache.get("basket:cart")?;
//!
//! // Delete a value
//! cache.delete("basket:cart")?;
//! ```

mod error;
mod kv;
mod store;

pub use error::CacheError;
pub use kv::Cache;
pub use store::{FileStore, MemoryStore, Store};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, MemoryStore, Store};
}
