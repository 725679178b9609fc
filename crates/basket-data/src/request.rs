//! Outbound GET requests.

use std::collections::HashMap;

/// A fully described GET request, handed to a
/// [`Transport`](crate::Transport) for delivery.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub(crate) url: String,
    pub(crate) headers: HashMap<String, String>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
        }
    }

    /// Add a header to the request. A later value for the same name wins.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// The absolute request URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Headers set on the request.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_header_wins() {
        let req = RequestBuilder::new("http://x/products")
            .header("Accept", "text/plain")
            .header("Accept", "application/json");

        assert_eq!(req.url(), "http://x/products");
        assert_eq!(req.headers().len(), 1);
        assert_eq!(
            req.headers().get("Accept").map(String::as_str),
            Some("application/json")
        );
    }
}
