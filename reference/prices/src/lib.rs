//! TokenSwap Price Catalog
//!
//! Loads asset prices from an external source and normalizes them into an
//! [`AssetCatalog`]: a symbol to price mapping plus the sorted list of
//! known symbols.
//!
//! # Features
//!
//! - Pluggable price sources (HTTP endpoint, local JSON file)
//! - Lenient record decoding: unusable records are dropped, not fatal
//! - Whole-catalog replacement, never a partial merge
//!
//! # Example
//!
//! ```rust,ignore
//! use tokenswap_prices::{CatalogLoader, PriceSourceConfig};
//!
//! let loader = CatalogLoader::new(PriceSourceConfig::from_env().build_source());
//! let catalog = loader.load().await?;
//! println!("{} symbols", catalog.len());
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod provider;
pub mod record;

pub use catalog::{AssetCatalog, Normalized};
pub use config::PriceSourceConfig;
pub use error::{LoadError, LoadResult};
pub use loader::CatalogLoader;
pub use provider::{FilePriceSource, HttpPriceSource, PriceSource};
#[cfg(any(test, feature = "test-utils"))]
pub use provider::StaticPriceSource;
pub use record::PriceRecord;
