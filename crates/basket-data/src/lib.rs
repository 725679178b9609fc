//! HTTP client utilities for basket.
//!
//! Issues GET requests against a base URL with a fixed set of default
//! headers. Delivery goes through a [`Transport`]; the default is
//! [`ReqwestTransport`], tests plug in their own.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use basket_data::{FetchClient, ReqwestTransport};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Product {
//!     id: u64,
//!     title: String,
//!     price: f64,
//! }
//!
//! let transport = ReqwestTransport::with_timeout(Duration::from_secs(5))?;
//! let client = FetchClient::with_transport(transport).with_base_url("http://localhost:3333");
//!
//! let product: Product = client
//!     .get("/products/1")
//!     .send()
//!     .await?
//!     .error_for_status()?
//!     .json()?;
//! ```

mod error;
mod request;
mod response;
mod transport;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use error::FetchError;
pub use request::RequestBuilder;
pub use response::Response;
pub use transport::{ReqwestTransport, Transport};

/// HTTP client for making outbound requests.
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct FetchClient {
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers.len())
            .finish_non_exhaustive()
    }
}

impl FetchClient {
    /// Create a client that delivers requests through `transport`.
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            base_url: None,
            default_headers: HashMap::new(),
            transport: Arc::new(transport),
        }
    }

    /// Create a client with a base URL that will be prepended to all requests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Create a GET request. Relative paths are joined to the base URL.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder {
        let url = url.into();
        let full_url = match &self.base_url {
            Some(base) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                format!(
                    "{}/{}",
                    base.trim_end_matches('/'),
                    url.trim_start_matches('/')
                )
            }
            _ => url,
        };

        let mut builder = RequestBuilder::new(full_url);
        for (key, value) in &self.default_headers {
            builder = builder.header(key.clone(), value.clone());
        }

        ClientRequestBuilder {
            builder,
            transport: Arc::clone(&self.transport),
        }
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder {
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
}

impl ClientRequestBuilder {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Send the request and return the response.
    pub async fn send(self) -> Result<Response, FetchError> {
        self.transport.send(self.builder).await
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, RequestBuilder, Response, Transport};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records requests and answers every one with the same body.
    #[derive(Default)]
    struct EchoTransport {
        seen: Mutex<Vec<RequestBuilder>>,
    }

    #[async_trait]
    impl Transport for Arc<EchoTransport> {
        async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError> {
            self.seen.lock().unwrap().push(request);
            Ok(Response::new(200, "[]"))
        }
    }

    #[tokio::test]
    async fn test_base_url_joined_with_single_slash() {
        let transport = Arc::new(EchoTransport::default());
        let client = FetchClient::with_transport(Arc::clone(&transport))
            .with_base_url("http://localhost:3333/");

        client.get("/products/1").send().await.unwrap();
        client.get("stock/1").send().await.unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].url(), "http://localhost:3333/products/1");
        assert_eq!(seen[1].url(), "http://localhost:3333/stock/1");
    }

    #[tokio::test]
    async fn test_absolute_url_ignores_base() {
        let transport = Arc::new(EchoTransport::default());
        let client = FetchClient::with_transport(Arc::clone(&transport))
            .with_base_url("http://localhost:3333");

        client.get("https://api.example.com/x").send().await.unwrap();

        assert_eq!(
            transport.seen.lock().unwrap()[0].url(),
            "https://api.example.com/x"
        );
    }

    #[tokio::test]
    async fn test_request_header_overrides_default() {
        let transport = Arc::new(EchoTransport::default());
        let client = FetchClient::with_transport(Arc::clone(&transport))
            .with_default_header("Accept", "text/plain")
            .with_default_header("X-Shop", "rocketshoes");

        client
            .get("http://h/products")
            .header("Accept", "application/json")
            .send()
            .await
            .unwrap();

        let seen = transport.seen.lock().unwrap();
        let headers = seen[0].headers();
        assert_eq!(headers.get("Accept").map(String::as_str), Some("application/json"));
        assert_eq!(headers.get("X-Shop").map(String::as_str), Some("rocketshoes"));
    }
}
