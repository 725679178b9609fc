//! Per-product mutual exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::ids::ProductId;

/// Guard held for the duration of one operation on one product.
pub type ProductGuard = OwnedMutexGuard<()>;

/// One async lock per product id.
///
/// Operations on the same product queue behind each other; operations on
/// different products do not contend. Slots nobody holds or waits on are
/// dropped on the next acquisition.
#[derive(Debug, Default)]
pub struct ProductLocks {
    slots: Mutex<HashMap<ProductId, Arc<AsyncMutex<()>>>>,
}

impl ProductLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`.
    pub async fn acquire(&self, id: ProductId) -> ProductGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            Arc::clone(slots.entry(id).or_default())
        };
        slot.lock_owned().await
    }

    /// Number of products with a live lock slot.
    pub fn tracked(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_product_waits() {
        let locks = Arc::new(ProductLocks::new());
        let guard = locks.acquire(ProductId::new(1)).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire(ProductId::new(1)).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_other_product_does_not_wait() {
        let locks = ProductLocks::new();
        let _one = locks.acquire(ProductId::new(1)).await;

        let two = tokio::time::timeout(
            Duration::from_millis(100),
            locks.acquire(ProductId::new(2)),
        )
        .await;
        assert!(two.is_ok());
    }

    #[tokio::test]
    async fn test_released_slots_are_pruned() {
        let locks = ProductLocks::new();
        drop(locks.acquire(ProductId::new(1)).await);
        drop(locks.acquire(ProductId::new(2)).await);

        let _three = locks.acquire(ProductId::new(3)).await;
        assert_eq!(locks.tracked(), 1);
    }
}
