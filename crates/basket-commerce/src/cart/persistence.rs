//! Durable cart snapshots.

use std::sync::Arc;

use basket_cache::Cache;

use crate::cart::{Cart, CartEntry};
use crate::error::CommerceError;

/// Key the cart snapshot lives under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "basket:cart";

/// Loads and saves the whole cart as one snapshot.
pub trait CartRepository: Send + Sync {
    /// The last saved cart. A missing or unreadable snapshot is an empty cart.
    fn load(&self) -> Cart;

    /// Replace the stored snapshot with `entries`.
    fn save(&self, entries: &[CartEntry]) -> Result<(), CommerceError>;
}

impl<T: CartRepository + ?Sized> CartRepository for Arc<T> {
    fn load(&self) -> Cart {
        (**self).load()
    }

    fn save(&self, entries: &[CartEntry]) -> Result<(), CommerceError> {
        (**self).save(entries)
    }
}

/// [`CartRepository`] storing the cart as a JSON array in a [`Cache`].
#[derive(Debug, Clone)]
pub struct KvCartRepository {
    cache: Cache,
    key: String,
}

impl KvCartRepository {
    /// Repository using [`DEFAULT_CART_KEY`].
    pub fn new(cache: Cache) -> Self {
        Self::with_key(cache, DEFAULT_CART_KEY)
    }

    /// Repository using a custom key.
    pub fn with_key(cache: Cache, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    /// Key the snapshot is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Remove the stored snapshot.
    pub fn clear(&self) -> Result<(), CommerceError> {
        self.cache.delete(&self.key)?;
        Ok(())
    }
}

impl CartRepository for KvCartRepository {
    fn load(&self) -> Cart {
        match self.cache.get::<Cart>(&self.key) {
            Ok(Some(cart)) => {
                tracing::debug!(key = %self.key, entries = cart.unique_item_count(), "cart restored");
                cart
            }
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "discarding unreadable cart snapshot");
                Cart::new()
            }
        }
    }

    fn save(&self, entries: &[CartEntry]) -> Result<(), CommerceError> {
        self.cache.set(&self.key, entries)?;
        Ok(())
    }
}
