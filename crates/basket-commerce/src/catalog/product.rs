//! Catalog record types.

use crate::ids::ProductId;
use serde::{Deserialize, Serialize};

/// A product as described by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Catalog identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price as published by the catalog.
    pub price: f64,
    /// Image URL.
    pub image: String,
}

/// How many units of a product can be bought right now.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockRecord {
    /// Catalog identifier.
    pub id: ProductId,
    /// Maximum purchasable quantity.
    pub amount: u32,
}

impl StockRecord {
    /// Whether `quantity` units fit within this stock level.
    pub fn covers(&self, quantity: i64) -> bool {
        quantity <= i64::from(self.amount)
    }
}
