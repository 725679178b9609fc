//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File names searched for, in order, in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["basket.toml", ".basket.toml", "basket.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Where products and stock come from.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Where the cart is kept between runs.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }

    /// Check the config, returning `(errors, warnings)`.
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let url = &self.catalog.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!("catalog.base_url '{}' must be an http(s) URL", url));
        }

        if self.catalog.timeout_ms == 0 {
            errors.push("catalog.timeout_ms must be greater than 0".to_string());
        } else if self.catalog.timeout_ms > 60_000 {
            warnings.push(format!(
                "catalog.timeout_ms {} is over a minute",
                self.catalog.timeout_ms
            ));
        }

        if let Some(ref fixture) = self.catalog.fixture {
            warnings.push(format!(
                "catalog.fixture is set; products come from {} instead of {}",
                fixture, url
            ));
        }

        if self.storage.data_dir.trim().is_empty() {
            errors.push("storage.data_dir is required".to_string());
        }

        let namespace = &self.storage.namespace;
        if namespace.is_empty() {
            errors.push("storage.namespace is required".to_string());
        } else if namespace.contains(char::is_whitespace) {
            errors.push(format!(
                "storage.namespace '{}' must not contain whitespace",
                namespace
            ));
        }

        (errors, warnings)
    }
}

/// Catalog service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL serving `/products` and `/stock`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// JSON fixture to serve the catalog from instead of the network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:3333".to_string()
}

fn default_timeout_ms() -> u64 {
    5_000
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            fixture: None,
        }
    }
}

/// Cart storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the saved cart, relative to the working directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Prefix of the key the cart is saved under.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_data_dir() -> String {
    ".basket".to_string()
}

fn default_namespace() -> String {
    "basket".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            namespace: default_namespace(),
        }
    }
}

/// Generate a default basket.toml config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# Basket configuration

[catalog]
base_url = "{base_url}"
timeout_ms = {timeout_ms}
# fixture = "server.json"

[storage]
data_dir = "{data_dir}"
namespace = "{namespace}"
"#,
        base_url = default_base_url(),
        timeout_ms = default_timeout_ms(),
        data_dir = default_data_dir(),
        namespace = default_namespace(),
    )
}
