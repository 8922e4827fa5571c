//! Catalog loader.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::catalog::AssetCatalog;
use crate::error::LoadResult;
use crate::provider::PriceSource;

/// Fetches the price feed and turns it into a fresh [`AssetCatalog`].
///
/// The loader never touches session state: callers apply the result. A load
/// is a single attempt with no retries.
#[derive(Clone)]
pub struct CatalogLoader {
    source: Arc<dyn PriceSource>,
}

impl CatalogLoader {
    /// Create a loader over the given source.
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self { source }
    }

    /// Get the source name.
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch and normalize the whole catalog.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn load(&self) -> LoadResult<AssetCatalog> {
        let records = match self.source.fetch_records().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "Price feed failed");
                return Err(e);
            }
        };

        let received = records.len();
        let normalized = AssetCatalog::normalize(records);

        info!(
            received,
            symbols = normalized.catalog.len(),
            dropped = normalized.dropped,
            overwritten = normalized.overwritten,
            "Loaded price catalog"
        );

        Ok(normalized.catalog)
    }
}
