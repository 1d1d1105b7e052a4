//! Zone catalog fetching with a bounded number of attempts

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::traits::ZoneProvider;

/// Default number of attempts at listing the zone catalog
pub const DEFAULT_CATALOG_ATTEMPTS: usize = 5;

/// Fetches the full zone list, retrying a fixed number of times
///
/// Retries are immediate: the listing happens once per run, so there is no
/// backoff. Exhausting every attempt is fatal because no zone work can
/// proceed without the catalog.
pub struct ZoneCatalogFetcher<'a> {
    provider: &'a dyn ZoneProvider,
    max_attempts: usize,
}

impl<'a> ZoneCatalogFetcher<'a> {
    /// Create a fetcher; `max_attempts` is clamped to at least one
    pub fn new(provider: &'a dyn ZoneProvider, max_attempts: usize) -> Self {
        Self {
            provider,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Zone identifiers in catalog order
    pub async fn fetch_zones(&self) -> Result<Vec<String>> {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match self.provider.list_zones().await {
                Ok(zones) => {
                    info!("Got zone list: {} zone(s)", zones.len());
                    return Ok(zones);
                }
                Err(e) => {
                    warn!(
                        "Zone list attempt {}/{} failed: {}",
                        attempt, self.max_attempts, e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(Error::CatalogUnavailable {
            attempts: self.max_attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string()),
        })
    }
}
