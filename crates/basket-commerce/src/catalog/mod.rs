//! Product catalog module.
//!
//! The catalog is the remote source of product descriptors and stock
//! levels. The cart only reads from it, through the [`Catalog`] trait.

mod memory;
mod product;
#[cfg(feature = "remote")]
mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::ids::ProductId;

pub use memory::MemoryCatalog;
pub use product::{Product, StockRecord};
#[cfg(feature = "remote")]
pub use remote::HttpCatalog;

/// Errors from a catalog lookup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// The catalog has no such resource.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The catalog could not be reached or answered with a failure.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// The catalog answered with something that is not the expected shape.
    #[error("Invalid catalog response: {0}")]
    InvalidResponse(String),
}

/// Read-only access to product descriptors and stock levels.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Descriptor of a single product.
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError>;

    /// Current stock record of a single product.
    async fn stock(&self, id: ProductId) -> Result<StockRecord, CatalogError>;

    /// Every product on offer, in catalog order.
    async fn products(&self) -> Result<Vec<Product>, CatalogError>;
}

#[async_trait]
impl<T: Catalog + ?Sized> Catalog for Box<T> {
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        (**self).product(id).await
    }

    async fn stock(&self, id: ProductId) -> Result<StockRecord, CatalogError> {
        (**self).stock(id).await
    }

    async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        (**self).products().await
    }
}

#[async_trait]
impl<T: Catalog + ?Sized> Catalog for Arc<T> {
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        (**self).product(id).await
    }

    async fn stock(&self, id: ProductId) -> Result<StockRecord, CatalogError> {
        (**self).stock(id).await
    }

    async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        (**self).products().await
    }
}
