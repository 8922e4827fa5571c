//! Token icon resolution.

use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use parking_lot::RwLock;
use reqwest::Client;
use tracing::debug;

use tokenswap_common::Symbol;

/// Where token icons live, keyed by symbol.
pub const DEFAULT_ICON_BASE_URL: &str =
    "https://raw.githubusercontent.com/Switcheo/token-icons/main/tokens/";

/// Shown when a token has no icon.
pub const DEFAULT_ICON_FALLBACK_URL: &str = "https://via.placeholder.com/28?text=?";

/// Icon configuration.
#[derive(Debug, Clone)]
pub struct IconConfig {
    /// Prefix for `{symbol}.svg`.
    pub base_url: String,
    /// Substituted when the primary icon does not load.
    pub fallback_url: String,
    /// Check each icon with a HEAD request.
    pub probe: bool,
    /// Timeout per probe.
    pub probe_timeout: Duration,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ICON_BASE_URL.to_string(),
            fallback_url: DEFAULT_ICON_FALLBACK_URL.to_string(),
            probe: false,
            probe_timeout: Duration::from_secs(3),
        }
    }
}

impl IconConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("SWAP_ICON_BASE_URL") {
            config.base_url = url;
        }

        if let Ok(url) = std::env::var("SWAP_ICON_FALLBACK_URL") {
            config.fallback_url = url;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("Icon base URL cannot be empty".to_string());
        }

        if self.fallback_url.is_empty() {
            return Err("Icon fallback URL cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Maps symbols to icon URLs, optionally verifying them.
pub struct IconResolver {
    config: IconConfig,
    client: Client,
    resolved: RwLock<HashMap<Symbol, String>>,
}

impl IconResolver {
    /// Create a resolver.
    pub fn new(config: IconConfig) -> Self {
        let client = Client::builder()
            .timeout(config.probe_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            config,
            client,
            resolved: RwLock::new(HashMap::new()),
        }
    }

    /// The primary icon URL for `symbol`.
    pub fn primary_url(&self, symbol: &Symbol) -> String {
        format!("{}{}.svg", self.config.base_url, symbol)
    }

    /// The fallback icon URL.
    pub fn fallback_url(&self) -> &str {
        &self.config.fallback_url
    }

    /// The icon to show for `symbol`.
    ///
    /// Probed icons use the probe result; everything else uses the primary URL.
    pub fn icon_for(&self, symbol: &Symbol) -> String {
        self.resolved
            .read()
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| self.primary_url(symbol))
    }

    /// Probe every symbol not yet resolved. No-op unless probing is enabled.
    pub async fn probe_all(&self, symbols: &[Symbol]) {
        if !self.config.probe {
            return;
        }

        let pending: Vec<&Symbol> = {
            let resolved = self.resolved.read();
            symbols.iter().filter(|s| !resolved.contains_key(*s)).collect()
        };

        let results = join_all(pending.into_iter().map(|symbol| async move {
            let url = self.probe(symbol).await;
            (symbol.clone(), url)
        }))
        .await;

        self.resolved.write().extend(results);
    }

    async fn probe(&self, symbol: &Symbol) -> String {
        let url = self.primary_url(symbol);
        match self.client.head(&url).send().await {
            Ok(response) if response.status().is_success() => url,
            Ok(response) => {
                debug!(symbol = %symbol, status = response.status().as_u16(), "Icon missing, using fallback");
                self.config.fallback_url.clone()
            }
            Err(e) => {
                debug!(symbol = %symbol, error = %e, "Icon probe failed, using fallback");
                self.config.fallback_url.clone()
            }
        }
    }
}
