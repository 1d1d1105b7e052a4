//! Core scan engine
//!
//! The ScanRunner is responsible for:
//! - Loading the previous checkpoint
//! - Opening a provider session
//! - Fetching the zone catalog (bounded retry, fatal on exhaustion)
//! - Scanning every zone in catalog order
//! - Persisting the next checkpoint once, at the end of the run
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌────────────────────┐
//! │ CheckpointStore  │     │ ZoneCatalogFetcher │
//! │ (load / save)    │     │ (list, retried)    │
//! └──────────────────┘     └────────────────────┘
//!          │                         │
//!          └────────────┬────────────┘
//!                       ▼
//!               ┌──────────────┐
//!               │  ScanRunner  │
//!               └──────────────┘
//!                       │ per zone
//!                       ▼
//!               ┌──────────────┐
//!               │ ZoneScanner  │── classify ─▶ redirect ─▶ TTL policy ─▶ reverse index
//!               └──────────────┘
//! ```
//!
//! ## Failure Handling
//!
//! 1. Checkpoint load, login, and catalog exhaustion abort the run before
//!    anything is written
//! 2. Zone and record fetch failures are logged; the zone is left out of
//!    the next checkpoint and retried on the next run
//! 3. A failed checkpoint save aborts the run

pub mod catalog;
pub mod scanner;

pub use catalog::{DEFAULT_CATALOG_ATTEMPTS, ZoneCatalogFetcher};
pub use scanner::{
    OffendingRecord, ScanAccumulator, ZoneDecision, ZoneOutcome, ZoneScanner, ZoneStats,
};

use crate::config::{CheckConfig, ScanConfig};
use crate::error::{Error, Result};
use crate::index::ReverseIndex;
use crate::policy::{RedirectExclusion, TtlPolicy};
use crate::traits::{Checkpoint, CheckpointStore, ZoneProvider};
use tracing::{debug, error, info, warn};

/// Everything a run produces for the reporting collaborators
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Offending records in traversal order
    pub offending_records: Vec<OffendingRecord>,
    /// Targets -> zones, in traversal order
    pub reverse_index: ReverseIndex,
    /// One outcome per catalog zone, in catalog order
    pub zones: Vec<ZoneOutcome>,
    /// Checkpoint persisted at the end of the run
    pub checkpoint: Checkpoint,
}

/// Zone counts for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Zones in the catalog
    pub total: usize,
    /// Zones skipped on an unchanged serial
    pub skipped: usize,
    /// Zones whose records were evaluated
    pub scanned: usize,
    /// Zones that could not be scanned
    pub failed: usize,
    /// Offending records
    pub offending: usize,
}

impl ScanResult {
    /// Count zones by outcome
    pub fn summary(&self) -> ScanSummary {
        let mut summary = ScanSummary {
            total: self.zones.len(),
            offending: self.offending_records.len(),
            ..ScanSummary::default()
        };
        for outcome in &self.zones {
            match outcome {
                ZoneOutcome::Skipped { .. } => summary.skipped += 1,
                ZoneOutcome::Scanned(_) => summary.scanned += 1,
                ZoneOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }
}

/// Top-level scan runner
///
/// ## Lifecycle
///
/// 1. Create with [`ScanRunner::new()`]
/// 2. Call [`ScanRunner::run()`] once per invocation
///
/// ## Threading
///
/// Strictly sequential: one provider session, one pass over the catalog,
/// one pass over each zone's records. Every provider call is awaited before
/// the next one is issued.
pub struct ScanRunner {
    /// Provider the zones are read from
    provider: Box<dyn ZoneProvider>,

    /// Where the checkpoint is loaded from and saved to
    store: Box<dyn CheckpointStore>,

    /// Minimum TTL policy
    policy: TtlPolicy,

    /// Redirect-service blocks
    exclusion: RedirectExclusion,

    /// Skip policy and retry bound
    scan: ScanConfig,
}

impl ScanRunner {
    /// Create a new runner
    ///
    /// The configuration is validated here so that a bad redirect block or
    /// attempt bound fails before any provider call.
    pub fn new(
        provider: Box<dyn ZoneProvider>,
        store: Box<dyn CheckpointStore>,
        config: &CheckConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            provider,
            store,
            policy: TtlPolicy::new(config.policy.min_ttl),
            exclusion: RedirectExclusion::from_blocks(&config.policy.redirect_blocks)?,
            scan: config.scan.clone(),
        })
    }

    /// Minimum TTL enforced by this runner
    pub fn min_ttl(&self) -> u32 {
        self.policy.min_ttl()
    }

    /// Run one full scan
    ///
    /// # Returns
    ///
    /// - `Ok(ScanResult)`: the run completed and the next checkpoint was saved
    /// - `Err(Error)`: a fatal error; the checkpoint was not written
    pub async fn run(&self) -> Result<ScanResult> {
        let previous = self.store.load().await?;
        info!(
            "Starting scan with {} checkpointed zone(s), minimum TTL {}s",
            previous.len(),
            self.policy.min_ttl()
        );

        self.login().await?;

        let result = self.run_session(&previous).await;

        if let Err(e) = self.provider.logout().await {
            warn!("Failed to close {} session: {}", self.provider.provider_name(), e);
        }

        let result = result?;
        let summary = result.summary();
        info!(
            "Scan finished: {} zone(s), {} scanned, {} skipped, {} failed, {} offending record(s)",
            summary.total, summary.scanned, summary.skipped, summary.failed, summary.offending
        );
        Ok(result)
    }

    async fn run_session(&self, previous: &Checkpoint) -> Result<ScanResult> {
        let zone_ids = ZoneCatalogFetcher::new(self.provider.as_ref(), self.scan.catalog_attempts)
            .fetch_zones()
            .await?;

        let result = self.scan_zones(&zone_ids, previous).await;

        info!("Saving checkpoint ({} zone(s))", result.checkpoint.len());
        self.store.save(&result.checkpoint).await.inspect_err(|e| {
            error!("Failed to save checkpoint: {}", e);
        })?;

        Ok(result)
    }

    /// Scan `zone_ids` in order against `previous`, without touching the store
    pub async fn scan_zones(&self, zone_ids: &[String], previous: &Checkpoint) -> ScanResult {
        let scanner = ZoneScanner::new(
            self.provider.as_ref(),
            self.policy,
            &self.exclusion,
            self.scan.skip_policy,
        );

        let mut acc = ScanAccumulator::default();
        let mut outcomes = Vec::with_capacity(zone_ids.len());
        let total = zone_ids.len();

        for (done, zone_id) in zone_ids.iter().enumerate() {
            info!(
                "{} {:6.2}% done",
                zone_id,
                done as f64 / total as f64 * 100.0
            );
            let outcome = scanner.scan_zone(zone_id, previous, &mut acc).await;
            debug!("{} -> {:?}", zone_id, outcome);
            outcomes.push(outcome);
        }

        ScanResult {
            offending_records: acc.offending,
            reverse_index: acc.reverse_index,
            zones: outcomes,
            checkpoint: acc.next_checkpoint,
        }
    }

    /// Open the provider session
    ///
    /// Transport failures are retried up to the catalog attempt bound;
    /// rejected credentials abort immediately.
    async fn login(&self) -> Result<()> {
        let attempts = self.scan.catalog_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.provider.login().await {
                Ok(()) => {
                    debug!("Logged in to {}", self.provider.provider_name());
                    return Ok(());
                }
                Err(e @ Error::Authentication(_)) => return Err(e),
                Err(e) => {
                    warn!("Login attempt {}/{} failed: {}", attempt, attempts, e);
                    last_error = Some(e);
                }
            }
        }

        Err(Error::auth(format!(
            "could not open a {} session: {}",
            self.provider.provider_name(),
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string())
        )))
    }
}
