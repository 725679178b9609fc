//! The cart store: sole owner of the cart and entry point for every mutation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::instrument;

use crate::cart::locks::ProductLocks;
use crate::cart::notice::{Notice, Notifier};
use crate::cart::persistence::CartRepository;
use crate::cart::{Cart, CartEntry};
use crate::catalog::Catalog;
use crate::error::CommerceError;
use crate::ids::ProductId;

/// Holds the shopper's cart and keeps it consistent with stock and storage.
///
/// Every mutation either changes the visible cart and writes the new snapshot
/// through the repository, or leaves both untouched and reports a [`Notice`].
/// Operations on the same product run one at a time; operations on different
/// products may overlap.
pub struct CartStore<C, R, N> {
    catalog: C,
    repository: R,
    notifier: N,
    cart: Mutex<Cart>,
    locks: ProductLocks,
    updates: watch::Sender<Cart>,
}

impl<C, R, N> CartStore<C, R, N>
where
    C: Catalog,
    R: CartRepository,
    N: Notifier,
{
    /// Build a store around the last snapshot saved in `repository`.
    pub fn load(catalog: C, repository: R, notifier: N) -> Self {
        let cart = repository.load();
        tracing::debug!(entries = cart.unique_item_count(), "cart store ready");
        let (updates, _) = watch::channel(cart.clone());
        Self {
            catalog,
            repository,
            notifier,
            cart: Mutex::new(cart),
            locks: ProductLocks::new(),
            updates,
        }
    }

    /// Put one more unit of `id` in the cart.
    ///
    /// A product already in the cart goes through [`update_amount`] with its
    /// quantity plus one, stock check included. A new product is looked up
    /// in the catalog and appended with quantity one.
    ///
    /// [`update_amount`]: CartStore::update_amount
    #[instrument(skip(self))]
    pub async fn add(&self, id: ProductId) -> Result<(), CommerceError> {
        let _guard = self.locks.acquire(id).await;

        let existing = self.lock_cart().amount_of(id);
        if existing > 0 {
            return self.update_locked(id, i64::from(existing) + 1).await;
        }

        let result = self.append(id).await;
        self.report(Notice::AddFailed, result)
    }

    /// Drop `id` from the cart.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: ProductId) -> Result<(), CommerceError> {
        let _guard = self.locks.acquire(id).await;

        let result = self.commit(|cart| cart.remove(id));
        if result.is_ok() {
            tracing::debug!(product = %id, "product removed");
        }
        self.report(Notice::RemoveFailed, result)
    }

    /// Set the quantity of `id` to `amount`.
    ///
    /// An `amount` of zero or below is ignored: nothing is checked, written
    /// or reported. Otherwise the product must already be in the cart and
    /// the catalog must hold at least `amount` units.
    #[instrument(skip(self))]
    pub async fn update_amount(&self, id: ProductId, amount: i64) -> Result<(), CommerceError> {
        if amount <= 0 {
            tracing::trace!(product = %id, amount, "ignoring non-positive amount");
            return Ok(());
        }

        let _guard = self.locks.acquire(id).await;
        self.update_locked(id, amount).await
    }

    /// Snapshot of the cart.
    pub fn cart(&self) -> Cart {
        self.lock_cart().clone()
    }

    /// Snapshot of the entries in insertion order.
    pub fn entries(&self) -> Vec<CartEntry> {
        self.lock_cart().entries().to_vec()
    }

    /// Quantity of `id`; zero when absent.
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.lock_cart().amount_of(id)
    }

    /// Quantity per product in the cart.
    pub fn amounts(&self) -> HashMap<ProductId, u32> {
        self.lock_cart().amounts()
    }

    /// Sum of all quantities.
    pub fn item_count(&self) -> u64 {
        self.lock_cart().item_count()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_cart().is_empty()
    }

    /// Receiver that sees every committed cart.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.updates.subscribe()
    }

    /// The catalog this store checks against.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Caller must hold the lock for `id`.
    async fn update_locked(&self, id: ProductId, amount: i64) -> Result<(), CommerceError> {
        let result = self.apply_amount(id, amount).await;
        self.report(Notice::UpdateFailed, result)
    }

    async fn apply_amount(&self, id: ProductId, amount: i64) -> Result<(), CommerceError> {
        let present = self.lock_cart().contains(id);
        if !present {
            return Err(CommerceError::ProductNotFound(id));
        }

        let stock = self
            .catalog
            .stock(id)
            .await
            .map_err(|e| CommerceError::StockFetch {
                id,
                reason: e.to_string(),
            })?;

        let insufficient = CommerceError::InsufficientStock {
            id,
            requested: amount,
            available: stock.amount,
        };
        if !stock.covers(amount) {
            return Err(insufficient);
        }
        let amount = u32::try_from(amount).map_err(|_| insufficient)?;

        self.commit(|cart| cart.set_amount(id, amount))?;
        tracing::debug!(product = %id, amount, "amount updated");
        Ok(())
    }

    async fn append(&self, id: ProductId) -> Result<(), CommerceError> {
        let product = self
            .catalog
            .product(id)
            .await
            .map_err(|e| CommerceError::ProductFetch {
                id,
                reason: e.to_string(),
            })?;

        self.commit(|cart| cart.push(CartEntry::new(product, 1)))?;
        tracing::debug!(product = %id, "product added");
        Ok(())
    }

    /// Apply `change` to a copy of the current cart, persist the copy, then
    /// make it the current cart. On any error the current cart is untouched.
    fn commit<F>(&self, change: F) -> Result<(), CommerceError>
    where
        F: FnOnce(&mut Cart) -> Result<(), CommerceError>,
    {
        let mut cart = self.lock_cart();
        let mut next = cart.clone();
        change(&mut next)?;
        self.repository.save(next.entries())?;
        *cart = next;
        self.updates.send_replace(cart.clone());
        Ok(())
    }

    fn report(
        &self,
        fallback: Notice,
        result: Result<(), CommerceError>,
    ) -> Result<(), CommerceError> {
        if let Err(e) = &result {
            let notice = Notice::for_error(fallback, e);
            tracing::warn!(error = %e, notice = %notice, "cart operation failed");
            self.notifier.notify(notice);
        }
        result
    }

    fn lock_cart(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{KvCartRepository, RecordingNotifier, DEFAULT_CART_KEY};
    use crate::catalog::{MemoryCatalog, Product};
    use basket_cache::Cache;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    type TestStore = CartStore<Arc<MemoryCatalog>, KvCartRepository, RecordingNotifier>;

    struct Harness {
        store: TestStore,
        catalog: Arc<MemoryCatalog>,
        cache: Cache,
        notices: RecordingNotifier,
    }

    impl Harness {
        fn new(catalog: MemoryCatalog) -> Self {
            Self::with_cache(catalog, Cache::in_memory())
        }

        fn with_cache(catalog: MemoryCatalog, cache: Cache) -> Self {
            let catalog = Arc::new(catalog);
            let notices = RecordingNotifier::new();
            let store = CartStore::load(
                Arc::clone(&catalog),
                KvCartRepository::new(cache.clone()),
                notices.clone(),
            );
            Self {
                store,
                catalog,
                cache,
                notices,
            }
        }

        fn saved(&self) -> Option<Vec<CartEntry>> {
            self.cache.get(DEFAULT_CART_KEY).unwrap()
        }
    }

    fn product(id: u64, title: &str, price: f64) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price,
            image: format!("https://img/{id}.jpg"),
        }
    }

    fn tenis() -> Product {
        product(1, "Tênis de Caminhada Leve Confortável", 179.9)
    }

    fn id(raw: u64) -> ProductId {
        ProductId::new(raw)
    }

    /// Repository whose writes can be switched off.
    #[derive(Default)]
    struct FlakyRepository {
        inner: Mutex<Vec<CartEntry>>,
        failing: AtomicBool,
    }

    impl CartRepository for FlakyRepository {
        fn load(&self) -> Cart {
            Cart::from_entries(self.inner.lock().unwrap().clone()).unwrap()
        }

        fn save(&self, entries: &[CartEntry]) -> Result<(), CommerceError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(CommerceError::Persistence("disk full".to_string()));
            }
            *self.inner.lock().unwrap() = entries.to_vec();
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_add_new_product() {
        let h = Harness::new(MemoryCatalog::new().with_product(tenis(), 5));

        h.store.add(id(1)).await.unwrap();

        let entries = h.store.entries();
        assert_eq!(entries, vec![CartEntry::new(tenis(), 1)]);
        assert_eq!(entries[0].price, 179.9);
        assert_eq!(h.saved(), Some(entries));
        assert!(h.notices.notices().is_empty());
    }

    #[tokio::test]
    async fn test_add_existing_increments() {
        let h = Harness::new(MemoryCatalog::new().with_product(tenis(), 5));

        h.store.add(id(1)).await.unwrap();
        h.store.add(id(1)).await.unwrap();

        assert_eq!(h.store.amount_of(id(1)), 2);
        assert_eq!(h.store.entries().len(), 1);
        assert_eq!(h.saved().unwrap()[0].amount, 2);
    }

    #[tokio::test]
    async fn test_add_existing_respects_stock() {
        let h = Harness::new(MemoryCatalog::new().with_product(tenis(), 1));
        h.store.add(id(1)).await.unwrap();

        let err = h.store.add(id(1)).await.unwrap_err();

        assert_eq!(
            err,
            CommerceError::InsufficientStock {
                id: id(1),
                requested: 2,
                available: 1
            }
        );
        assert_eq!(h.store.amount_of(id(1)), 1);
        assert_eq!(h.notices.notices(), vec![Notice::OutOfStock]);
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let h = Harness::new(MemoryCatalog::new());

        let err = h.store.add(id(42)).await.unwrap_err();

        assert!(matches!(err, CommerceError::ProductFetch { id: p, .. } if p == id(42)));
        assert!(h.store.is_empty());
        assert_eq!(h.saved(), None);
        assert_eq!(h.notices.notices(), vec![Notice::AddFailed]);
    }

    #[tokio::test]
    async fn test_add_existing_with_stock_offline() {
        let h = Harness::new(MemoryCatalog::new().with_product(tenis(), 5));
        h.store.add(id(1)).await.unwrap();
        h.catalog.set_unavailable(true);

        let err = h.store.add(id(1)).await.unwrap_err();

        assert!(matches!(err, CommerceError::StockFetch { .. }));
        assert_eq!(h.notices.notices(), vec![Notice::UpdateFailed]);
    }

    #[tokio::test]
    async fn test_update_within_stock() {
        let h = Harness::new(MemoryCatalog::new().with_product(tenis(), 5));
        h.store.add(id(1)).await.unwrap();

        h.store.update_amount(id(1), 5).await.unwrap();

        assert_eq!(h.store.amount_of(id(1)), 5);
        assert_eq!(h.saved().unwrap()[0].amount, 5);
    }

    #[tokio::test]
    async fn test_update_above_stock() {
        let h = Harness::new(MemoryCatalog::new().with_product(tenis(), 2));
        h.store.add(id(1)).await.unwrap();
        h.store.update_amount(id(1), 2).await.unwrap();
        assert_eq!(h.saved().unwrap()[0].amount, 2);

        let err = h.store.update_amount(id(1), 3).await.unwrap_err();

        assert!(matches!(
            err,
            CommerceError::InsufficientStock { requested: 3, available: 2, .. }
        ));
        assert_eq!(h.store.amount_of(id(1)), 2);
        assert_eq!(h.saved().unwrap()[0].amount, 2);
        assert_eq!(h.notices.notices(), vec![Notice::OutOfStock]);
    }

    #[tokio::test]
    async fn test_update_beyond_u32_is_out_of_stock() {
        let h = Harness::new(MemoryCatalog::new().with_product(tenis(), u32::MAX));
        h.store.add(id(1)).await.unwrap();

        let err = h.store.update_amount(id(1), i64::MAX).await.unwrap_err();

        assert!(matches!(err, CommerceError::InsufficientStock { .. }));
        assert_eq!(h.store.amount_of(id(1)), 1);
    }

    #[tokio::test]
    async fn test_update_non_positive_is_ignored() {
        let h = Harness::new(MemoryCatalog::new().with_product(tenis(), 5));

        h.store.update_amount(id(1), 0).await.unwrap();
        h.store.update_amount(id(1), -5).await.unwrap();

        assert_eq!(h.catalog.lookups(), 0);
        assert_eq!(h.saved(), None);
        assert!(h.notices.notices().is_empty());

        h.store.add(id(1)).await.unwrap();
        let lookups = h.catalog.lookups();
        let saved = h.saved();

        h.store.update_amount(id(1), 0).await.unwrap();
        h.store.update_amount(id(1), -5).await.unwrap();

        assert_eq!(h.store.amount_of(id(1)), 1);
        assert_eq!(h.saved(), saved);
        assert_eq!(h.saved().unwrap()[0].amount, 1);
        assert_eq!(h.catalog.lookups(), lookups);
        assert!(h.notices.notices().is_empty());
    }

    #[tokio::test]
    async fn test_update_absent_product() {
        let h = Harness::new(MemoryCatalog::new().with_product(tenis(), 5));

        let err = h.store.update_amount(id(1), 2).await.unwrap_err();

        assert_eq!(err, CommerceError::ProductNotFound(id(1)));
        assert_eq!(h.catalog.lookups(), 0);
        assert_eq!(h.notices.notices(), vec![Notice::UpdateFailed]);
    }

    #[tokio::test]
    async fn test_update_missing_stock_record() {
        let h = Harness::new(MemoryCatalog::new().with_product(tenis(), 5));
        h.store.add(id(1)).await.unwrap();
        h.catalog.set_unavailable(true);

        let err = h.store.update_amount(id(1), 2).await.unwrap_err();

        assert!(matches!(err, CommerceError::StockFetch { .. }));
        assert_eq!(h.store.amount_of(id(1)), 1);
        assert_eq!(h.notices.notices(), vec![Notice::UpdateFailed]);
    }

    #[tokio::test]
    async fn test_remove_leaves_empty_array() {
        let h = Harness::new(MemoryCatalog::new().with_product(tenis(), 5));
        h.store.add(id(1)).await.unwrap();

        h.store.remove(id(1)).await.unwrap();

        assert!(h.store.is_empty());
        assert_eq!(h.saved(), Some(Vec::new()));
        assert_eq!(
            h.cache.get::<serde_json::Value>(DEFAULT_CART_KEY).unwrap(),
            Some(serde_json::json!([]))
        );
    }

    #[tokio::test]
    async fn test_remove_absent_product() {
        let h = Harness::new(MemoryCatalog::new());

        let err = h.store.remove(id(99)).await.unwrap_err();

        assert_eq!(err, CommerceError::ProductNotFound(id(99)));
        assert_eq!(h.saved(), None);
        assert_eq!(h.notices.notices(), vec![Notice::RemoveFailed]);
    }

    #[tokio::test]
    async fn test_remove_keeps_other_entries_in_order() {
        let catalog = MemoryCatalog::new()
            .with_product(product(1, "A", 1.0), 5)
            .with_product(product(2, "B", 2.0), 5)
            .with_product(product(3, "C", 3.0), 5);
        let h = Harness::new(catalog);
        for raw in [3, 1, 2] {
            h.store.add(id(raw)).await.unwrap();
        }

        h.store.remove(id(1)).await.unwrap();

        let ids: Vec<u64> = h.store.entries().iter().map(|e| e.id.get()).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cart_unchanged() {
        let catalog = Arc::new(MemoryCatalog::new().with_product(tenis(), 5));
        let repository = Arc::new(FlakyRepository::default());
        let notices = RecordingNotifier::new();
        let store = CartStore::load(
            Arc::clone(&catalog),
            Arc::clone(&repository),
            notices.clone(),
        );

        store.add(id(1)).await.unwrap();
        repository.failing.store(true, Ordering::SeqCst);

        assert!(matches!(
            store.add(id(1)).await,
            Err(CommerceError::Persistence(_))
        ));
        assert!(matches!(
            store.remove(id(1)).await,
            Err(CommerceError::Persistence(_))
        ));

        assert_eq!(store.amount_of(id(1)), 1);
        assert_eq!(repository.load(), store.cart());
        assert_eq!(
            notices.notices(),
            vec![Notice::UpdateFailed, Notice::RemoveFailed]
        );
    }

    #[tokio::test]
    async fn test_load_restores_snapshot() {
        let cache = Cache::in_memory();
        cache
            .set(DEFAULT_CART_KEY, &[CartEntry::new(tenis(), 2)])
            .unwrap();

        let h = Harness::with_cache(MemoryCatalog::new().with_product(tenis(), 5), cache);

        assert_eq!(h.store.amount_of(id(1)), 2);
        assert_eq!(h.store.item_count(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_starts_empty() {
        let cache = Cache::in_memory();
        cache.set(DEFAULT_CART_KEY, &serde_json::json!({"cart": 1})).unwrap();

        let h = Harness::with_cache(MemoryCatalog::new(), cache);

        assert!(h.store.is_empty());
        assert!(h.notices.notices().is_empty());
    }

    #[tokio::test]
    async fn test_views() {
        let catalog = MemoryCatalog::new()
            .with_product(product(1, "A", 1.0), 5)
            .with_product(product(2, "B", 2.0), 5);
        let h = Harness::new(catalog);
        h.store.add(id(1)).await.unwrap();
        h.store.add(id(2)).await.unwrap();
        h.store.update_amount(id(2), 4).await.unwrap();

        assert_eq!(h.store.item_count(), 5);
        assert_eq!(h.store.amounts().get(&id(2)), Some(&4));
        assert_eq!(h.store.amount_of(id(3)), 0);
        assert!(!h.store.is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_commits() {
        let h = Harness::new(MemoryCatalog::new().with_product(tenis(), 5));
        let mut updates = h.store.subscribe();

        h.store.add(id(1)).await.unwrap();

        assert!(updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().item_count(), 1);

        h.store.update_amount(id(1), -1).await.unwrap();
        let _ = h.store.remove(id(7)).await;
        assert!(!updates.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_adds_same_product() {
        let catalog = MemoryCatalog::new()
            .with_product(tenis(), 5)
            .with_latency(Duration::from_millis(20));
        let h = Harness::new(catalog);

        let (a, b) = futures::join!(h.store.add(id(1)), h.store.add(id(1)));
        a.unwrap();
        b.unwrap();

        assert_eq!(h.store.entries().len(), 1);
        assert_eq!(h.store.amount_of(id(1)), 2);
        assert_eq!(h.saved().unwrap()[0].amount, 2);
    }

    #[tokio::test]
    async fn test_concurrent_adds_different_products() {
        let catalog = MemoryCatalog::new()
            .with_product(product(1, "A", 1.0), 5)
            .with_product(product(2, "B", 2.0), 5)
            .with_latency(Duration::from_millis(10));
        let h = Arc::new(Harness::new(catalog));

        let tasks: Vec<_> = [1, 2, 1, 2]
            .into_iter()
            .map(|raw| {
                let h = Arc::clone(&h);
                tokio::spawn(async move { h.store.add(id(raw)).await })
            })
            .collect();
        for result in futures::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        assert_eq!(h.store.amount_of(id(1)), 2);
        assert_eq!(h.store.amount_of(id(2)), 2);
        assert_eq!(h.store.repository().load(), h.store.cart());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u64),
        Remove(u64),
        Update(u64, i64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u64..=5).prop_map(Op::Add),
            (1u64..=5).prop_map(Op::Remove),
            (1u64..=5, -2i64..=6).prop_map(|(id, amount)| Op::Update(id, amount)),
        ]
    }

    proptest! {
        #[test]
        fn prop_unique_entries_within_stock_and_persisted(ops in prop::collection::vec(op(), 0..40)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();

            runtime.block_on(async {
                let mut catalog = MemoryCatalog::new();
                for raw in 1..=4 {
                    catalog = catalog.with_product(product(raw, "P", 1.0), 3);
                }
                let h = Harness::new(catalog);

                for op in ops {
                    let _ = match op {
                        Op::Add(raw) => h.store.add(id(raw)).await,
                        Op::Remove(raw) => h.store.remove(id(raw)).await,
                        Op::Update(raw, amount) => h.store.update_amount(id(raw), amount).await,
                    };

                    let entries = h.store.entries();
                    let mut ids: Vec<ProductId> = entries.iter().map(|e| e.id).collect();
                    ids.sort();
                    ids.dedup();
                    assert_eq!(ids.len(), entries.len());
                    assert!(entries.iter().all(|e| (1..=3).contains(&e.amount)));
                    assert!(!h.store.amounts().contains_key(&id(5)));
                    assert_eq!(h.store.repository().load(), h.store.cart());
                }
            });
        }
    }
}
