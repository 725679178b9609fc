//! Shopping cart state for basket.
//!
//! This crate keeps a shopper's cart consistent with a remote catalog and a
//! durable key-value slot:
//!
//! - **Catalog**: product descriptors and stock levels behind the [`Catalog`]
//!   trait, served over HTTP or from an in-memory fixture
//! - **Cart**: the [`CartStore`] with its add, remove and update operations,
//!   per-product locking and failure notices
//! - **Persistence**: whole-cart snapshots written through a [`CartRepository`]
//!
//! # Example
//!
//! ```rust,ignore
//! use basket_cache::{Cache, FileStore};
//! use basket_commerce::prelude::*;
//! use basket_data::{FetchClient, ReqwestTransport};
//!
//! let transport = ReqwestTransport::with_timeout(std::time::Duration::from_secs(5))?;
//! let catalog = HttpCatalog::new(FetchClient::with_transport(transport).with_base_url("http://localhost:3333"));
//! let repository = KvCartRepository::new(Cache::new(FileStore::open("./.basket")?));
//! let store = CartStore::load(catalog, repository, LogNotifier);
//!
//! store.add(ProductId::new(1)).await?;
//! store.update_amount(ProductId::new(1), 3).await?;
//! println!("{} items", store.item_count());
//! ```
//!
//! [`Catalog`]: catalog::Catalog
//! [`CartStore`]: cart::CartStore
//! [`CartRepository`]: cart::CartRepository

pub mod error;
pub mod ids;

pub mod cart;
pub mod catalog;

pub use error::CommerceError;
pub use ids::{ParseProductIdError, ProductId};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::ProductId;

    // Catalog
    #[cfg(feature = "remote")]
    pub use crate::catalog::HttpCatalog;
    pub use crate::catalog::{Catalog, CatalogError, MemoryCatalog, Product, StockRecord};

    // Cart
    pub use crate::cart::{
        Cart, CartEntry, CartRepository, CartStore, KvCartRepository, LogNotifier, Notice,
        Notifier, RecordingNotifier,
    };
}
