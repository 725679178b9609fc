//! Cart and cart entry types.

use std::collections::HashMap;

use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::ProductId;
use serde::{Deserialize, Serialize};

/// One product in the cart together with its quantity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartEntry {
    /// Catalog identifier.
    pub id: ProductId,
    /// Product title (denormalized for display).
    pub title: String,
    /// Unit price at the time the product was added.
    pub price: f64,
    /// Image URL.
    pub image: String,
    /// Quantity, never below one.
    pub amount: u32,
}

impl CartEntry {
    /// Entry for `product` with the given quantity.
    pub fn new(product: Product, amount: u32) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount,
        }
    }
}

/// A shopping cart: entries in insertion order, one per product.
///
/// Serialized as a plain JSON array of entries. Deserialization rejects
/// arrays that repeat a product or hold a zero quantity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<CartEntry>", into = "Vec<CartEntry>")]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from entries, checking uniqueness and quantities.
    pub fn from_entries(entries: Vec<CartEntry>) -> Result<Self, CommerceError> {
        let mut cart = Self::new();
        for entry in entries {
            cart.push(entry)?;
        }
        Ok(cart)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Get the entry for a product.
    pub fn get(&self, id: ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Check whether a product is in the cart.
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Quantity of a product; zero when absent.
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |e| e.amount)
    }

    /// Quantity per product.
    pub fn amounts(&self) -> HashMap<ProductId, u32> {
        self.entries.iter().map(|e| (e.id, e.amount)).collect()
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.amount)).sum()
    }

    /// Get number of distinct products.
    pub fn unique_item_count(&self) -> usize {
        self.entries.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry for a product not yet in the cart.
    pub(crate) fn push(&mut self, entry: CartEntry) -> Result<(), CommerceError> {
        if entry.amount == 0 {
            return Err(CommerceError::InvalidAmount {
                id: entry.id,
                amount: entry.amount,
            });
        }
        if self.contains(entry.id) {
            return Err(CommerceError::DuplicateEntry(entry.id));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Replace the quantity of an existing entry.
    pub(crate) fn set_amount(&mut self, id: ProductId, amount: u32) -> Result<(), CommerceError> {
        if amount == 0 {
            return Err(CommerceError::InvalidAmount { id, amount });
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(CommerceError::ProductNotFound(id))?;
        entry.amount = amount;
        Ok(())
    }

    /// Drop the entry for a product, filtering by id.
    pub(crate) fn remove(&mut self, id: ProductId) -> Result<(), CommerceError> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            return Err(CommerceError::ProductNotFound(id));
        }
        Ok(())
    }
}

impl TryFrom<Vec<CartEntry>> for Cart {
    type Error = CommerceError;

    fn try_from(entries: Vec<CartEntry>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl From<Cart> for Vec<CartEntry> {
    fn from(cart: Cart) -> Self {
        cart.entries
    }
}
