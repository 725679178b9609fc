//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use basket_cache::{cache_key, Cache, FileStore};
use basket_commerce::cart::{CartStore, KvCartRepository};
use basket_commerce::catalog::{Catalog, HttpCatalog, MemoryCatalog};
use basket_data::{FetchClient, ReqwestTransport};

use crate::config::{CliConfig, CONFIG_NAMES};
use crate::output::{ConsoleNotifier, Output};

/// The cart store as the CLI wires it.
pub type Store = CartStore<Arc<dyn Catalog>, KvCartRepository, ConsoleNotifier>;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub data_dir: Option<String>,
    pub fixture: Option<String>,
}

impl Overrides {
    fn apply(self, config: &mut CliConfig) {
        if let Some(url) = self.api_url {
            config.catalog.base_url = url;
        }
        if let Some(dir) = self.data_dir {
            config.storage.data_dir = dir;
        }
        if let Some(fixture) = self.fixture {
            config.catalog.fixture = Some(fixture);
        }
    }
}

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, overrides: Overrides, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        // Try to find config in current directory or parent directories
        let config_path = match config_path {
            Some(path) => Some(PathBuf::from(path)),
            None => find_config_file(&cwd),
        };

        let mut config = match &config_path {
            Some(path) => CliConfig::load(&path.to_string_lossy())?,
            None => CliConfig::default(),
        };
        overrides.apply(&mut config);
        tracing::debug!(
            file = ?config_path,
            base_url = %config.catalog.base_url,
            data_dir = %config.storage.data_dir,
            "configuration loaded"
        );

        let mut ctx = Self::new(config, output, cwd);
        ctx.config_path = config_path;
        Ok(ctx)
    }

    /// Context over an already loaded config.
    pub fn new(config: CliConfig, output: Output, cwd: PathBuf) -> Self {
        Self {
            config,
            config_path: None,
            output,
            cwd,
        }
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }

    /// Directory the cart is saved in.
    pub fn data_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.storage.data_dir)
    }

    /// Catalog selected by the config: the fixture file when one is set,
    /// the HTTP service otherwise.
    pub fn catalog(&self) -> Result<Arc<dyn Catalog>> {
        let catalog = &self.config.catalog;

        if let Some(ref fixture) = catalog.fixture {
            let path = self.resolve_path(fixture);
            self.output
                .debug(&format!("Using catalog fixture {}", path.display()));
            let memory = MemoryCatalog::from_file(&path)
                .with_context(|| format!("Failed to load catalog fixture: {}", path.display()))?;
            return Ok(Arc::new(memory));
        }

        self.output
            .debug(&format!("Using catalog at {}", catalog.base_url));
        let transport = ReqwestTransport::with_timeout(Duration::from_millis(catalog.timeout_ms))
            .context("Failed to create HTTP client")?;
        let client = FetchClient::with_transport(transport)
            .with_base_url(catalog.base_url.clone())
            .with_default_header("Accept", "application/json");
        Ok(Arc::new(HttpCatalog::new(client)))
    }

    /// Repository over the configured data directory.
    pub fn repository(&self) -> Result<KvCartRepository> {
        let dir = self.data_dir();
        let store = FileStore::open(&dir)
            .with_context(|| format!("Failed to open data directory: {}", dir.display()))?;
        let key = cache_key!(self.config.storage.namespace.as_str(), "cart");
        Ok(KvCartRepository::with_key(Cache::new(store), key))
    }

    /// Cart store restored from the last saved cart.
    pub fn open_store(&self) -> Result<Store> {
        Ok(CartStore::load(
            self.catalog()?,
            self.repository()?,
            ConsoleNotifier::new(self.output.clone()),
        ))
    }
}

/// Find a config file in `start` or the nearest parent that has one.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}
