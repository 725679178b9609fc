//! Commerce error types.

use thiserror::Error;

use crate::ids::ProductId;

/// Errors returned by cart operations.
///
/// Every variant leaves the cart exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// The catalog could not provide the product (missing or unreachable).
    #[error("Failed to fetch product {id}: {reason}")]
    ProductFetch { id: ProductId, reason: String },

    /// The stock service could not provide the stock record.
    #[error("Failed to fetch stock for product {id}: {reason}")]
    StockFetch { id: ProductId, reason: String },

    /// Product is not in the cart.
    #[error("Product not in cart: {0}")]
    ProductNotFound(ProductId),

    /// Requested quantity is above what is in stock.
    #[error("Insufficient stock for {id}: requested {requested}, available {available}")]
    InsufficientStock {
        id: ProductId,
        requested: i64,
        available: u32,
    },

    /// A second entry for a product already in the cart.
    #[error("Duplicate cart entry: {0}")]
    DuplicateEntry(ProductId),

    /// A cart entry with a quantity below one.
    #[error("Invalid amount {amount} for product {id}")]
    InvalidAmount { id: ProductId, amount: u32 },

    /// Writing the cart snapshot failed.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<basket_cache::CacheError> for CommerceError {
    fn from(e: basket_cache::CacheError) -> Self {
        CommerceError::Persistence(e.to_string())
    }
}
