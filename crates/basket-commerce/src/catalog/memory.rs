//! In-process catalog, loadable from a json-server style fixture.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogError, Product, StockRecord};
use crate::ids::ProductId;

/// Fixture layout: `{ "products": [...], "stock": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Fixture {
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    stock: Vec<StockRecord>,
}

/// Catalog held entirely in memory.
///
/// Serves the offline mode of the CLI and the tests. Lookups can be slowed
/// down with [`MemoryCatalog::with_latency`] and made to fail with
/// [`MemoryCatalog::set_unavailable`].
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    fixture: RwLock<Fixture>,
    latency: Option<Duration>,
    unavailable: AtomicBool,
    lookups: AtomicUsize,
}

impl MemoryCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product together with its stock level.
    pub fn with_product(self, product: Product, stock: u32) -> Self {
        self.insert(product, stock);
        self
    }

    /// Delay every lookup by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Parse a fixture document.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let fixture: Fixture = serde_json::from_str(json)
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
        Ok(Self {
            fixture: RwLock::new(fixture),
            ..Self::default()
        })
    }

    /// Read and parse a fixture file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Unavailable(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Insert or replace a product and its stock level.
    pub fn insert(&self, product: Product, stock: u32) {
        let mut fixture = self.write();
        let id = product.id;
        match fixture.products.iter_mut().find(|p| p.id == id) {
            Some(existing) => *existing = product,
            None => fixture.products.push(product),
        }
        fixture.stock.retain(|s| s.id != id);
        fixture.stock.push(StockRecord { id, amount: stock });
    }

    /// Change the stock level of a product.
    pub fn set_stock(&self, id: ProductId, amount: u32) {
        let mut fixture = self.write();
        fixture.stock.retain(|s| s.id != id);
        fixture.stock.push(StockRecord { id, amount });
    }

    /// Make every lookup fail with [`CatalogError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of lookups served or refused so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Fixture> {
        self.fixture
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Fixture> {
        self.fixture
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn begin_lookup(&self) -> Result<(), CatalogError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable("catalog offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.begin_lookup().await?;
        self.read()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("products/{id}")))
    }

    async fn stock(&self, id: ProductId) -> Result<StockRecord, CatalogError> {
        self.begin_lookup().await?;
        self.read()
            .stock
            .iter()
            .find(|s| s.id == id)
            .copied()
            .ok_or_else(|| CatalogError::NotFound(format!("stock/{id}")))
    }

    async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        self.begin_lookup().await?;
        Ok(self.read().products.clone())
    }
}
