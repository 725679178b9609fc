//! Catalog served over HTTP (json-server compatible routes).

use async_trait::async_trait;
use basket_data::{FetchClient, FetchError};
use serde::de::DeserializeOwned;

use crate::catalog::{Catalog, CatalogError, Product, StockRecord};
use crate::ids::ProductId;

/// Catalog reached through `GET /products`, `GET /products/{id}` and
/// `GET /stock/{id}` relative to the client's base URL.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: FetchClient,
}

impl HttpCatalog {
    /// Wrap a client whose base URL points at the catalog service.
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let response = self
            .client
            .get(path)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(unavailable)?;

        if response.is_not_found() {
            return Err(CatalogError::NotFound(path.trim_start_matches('/').to_string()));
        }

        response
            .error_for_status()
            .map_err(unavailable)?
            .json()
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))
    }
}

fn unavailable(e: FetchError) -> CatalogError {
    CatalogError::Unavailable(e.to_string())
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let product: Product = self.fetch(&format!("/products/{id}")).await?;
        if product.id != id {
            return Err(CatalogError::InvalidResponse(format!(
                "asked for product {id}, got {}",
                product.id
            )));
        }
        Ok(product)
    }

    async fn stock(&self, id: ProductId) -> Result<StockRecord, CatalogError> {
        let stock: StockRecord = self.fetch(&format!("/stock/{id}")).await?;
        if stock.id != id {
            return Err(CatalogError::InvalidResponse(format!(
                "asked for stock of {id}, got {}",
                stock.id
            )));
        }
        Ok(stock)
    }

    async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        self.fetch("/products").await
    }
}
