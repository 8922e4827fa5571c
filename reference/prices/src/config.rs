//! Price source configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::provider::{FilePriceSource, HttpPriceSource, PriceSource};

/// Default price feed endpoint.
pub const DEFAULT_PRICES_URL: &str = "https://interview.switcheo.com/prices.json";

/// Configuration for where prices come from.
#[derive(Debug, Clone)]
pub struct PriceSourceConfig {
    /// URL of the JSON price feed.
    pub url: String,
    /// Read prices from this file instead of the URL.
    pub prices_file: Option<PathBuf>,
    /// Optional request timeout. Loading has no timeout unless one is set.
    pub request_timeout: Option<Duration>,
}

impl Default for PriceSourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PRICES_URL.to_string(),
            prices_file: None,
            request_timeout: None,
        }
    }
}

impl PriceSourceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("SWAP_PRICES_URL") {
            config.url = url;
        }

        if let Ok(path) = std::env::var("SWAP_PRICES_FILE") {
            config.prices_file = Some(PathBuf::from(path));
        }

        if let Ok(ms) = std::env::var("SWAP_PRICES_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.request_timeout = Some(Duration::from_millis(ms));
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.prices_file.is_none() && self.url.is_empty() {
            return Err("Prices URL cannot be empty".to_string());
        }

        if let Some(timeout) = self.request_timeout {
            if timeout.is_zero() {
                return Err("Request timeout cannot be zero".to_string());
            }
        }

        Ok(())
    }

    /// Build the price source this configuration describes.
    pub fn build_source(&self) -> Arc<dyn PriceSource> {
        match &self.prices_file {
            Some(path) => Arc::new(FilePriceSource::new(path.clone())),
            None => Arc::new(HttpPriceSource::new(self.url.clone(), self.request_timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PriceSourceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.url, DEFAULT_PRICES_URL);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = PriceSourceConfig::default();
        config.url = String::new();
        assert!(config.validate().is_err());

        config.prices_file = Some(PathBuf::from("prices.json"));
        assert!(config.validate().is_ok());

        config.request_timeout = Some(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_source_prefers_file() {
        let mut config = PriceSourceConfig::default();
        assert_eq!(config.build_source().name(), "http");

        config.prices_file = Some(PathBuf::from("prices.json"));
        assert_eq!(config.build_source().name(), "file");
    }
}
