//! Per-zone scan
//!
//! ```text
//! Start ─▶ MetadataFetched ─┬─▶ Skip ───────────────────────────┐
//!                           └─▶ RecordsFetched ─▶ RecordsEvaluated ─┴─▶ CheckpointUpdated ─▶ Done
//! ```
//!
//! The scanner never mutates the loaded checkpoint. It writes into the next
//! checkpoint, so a zone that fails part-way is simply absent from it and is
//! scanned in full on the next run.

use tracing::{debug, warn};

use crate::config::SkipPolicy;
use crate::index::ReverseIndex;
use crate::policy::{RecordKind, RedirectExclusion, TtlPolicy, Verdict, classify};
use crate::traits::{Checkpoint, RecordData, ZoneInfo, ZoneProvider};

/// A record whose TTL is below the policy minimum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffendingRecord {
    /// Owning zone
    pub zone: String,
    /// Fully-qualified record name
    pub fqdn: String,
    /// Observed TTL
    pub ttl: u32,
    /// Address or alias target
    pub target: String,
    /// Record kind
    pub kind: RecordKind,
}

/// Whether a zone needs its records fetched this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneDecision {
    /// Serial unchanged; carry the checkpoint entry forward
    Skip,
    /// Fetch and evaluate every record
    Scan,
}

/// Counters for a scanned zone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneStats {
    /// Zone name
    pub zone: String,
    /// Serial observed this run
    pub serial: u64,
    /// Address/alias records evaluated against the policy
    pub records_checked: usize,
    /// Records of other types, never fetched
    pub records_ignored: usize,
    /// Address records exempted as redirect-service addresses
    pub records_excluded: usize,
    /// Records below the minimum TTL
    pub offending: usize,
    /// Records whose detail could not be fetched or interpreted
    pub failed_records: usize,
    /// Whether the zone's serial was written to the next checkpoint
    pub checkpointed: bool,
}

/// What happened to one zone of the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneOutcome {
    /// Serial matched the checkpoint; no records fetched
    Skipped {
        /// Zone name
        zone: String,
        /// Carried-forward serial
        serial: u64,
    },
    /// Records fetched and evaluated
    Scanned(ZoneStats),
    /// Metadata or record listing failed; zone left out of the next checkpoint
    Failed {
        /// Zone identifier from the catalog
        zone_id: String,
        /// Failure message
        error: String,
    },
}

/// Run-scoped accumulators the scanner appends to, in traversal order
#[derive(Debug, Default)]
pub struct ScanAccumulator {
    /// Offending records found so far
    pub offending: Vec<OffendingRecord>,
    /// Targets seen so far
    pub reverse_index: ReverseIndex,
    /// Next checkpoint being built
    pub next_checkpoint: Checkpoint,
}

/// Scans one zone at a time against the previous checkpoint
pub struct ZoneScanner<'a> {
    provider: &'a dyn ZoneProvider,
    policy: TtlPolicy,
    exclusion: &'a RedirectExclusion,
    skip_policy: SkipPolicy,
}

impl<'a> ZoneScanner<'a> {
    /// Create a scanner
    pub fn new(
        provider: &'a dyn ZoneProvider,
        policy: TtlPolicy,
        exclusion: &'a RedirectExclusion,
        skip_policy: SkipPolicy,
    ) -> Self {
        Self {
            provider,
            policy,
            exclusion,
            skip_policy,
        }
    }

    /// Decide skip vs scan for a zone
    pub fn decide(&self, zone: &ZoneInfo, previous: &Checkpoint) -> ZoneDecision {
        match self.skip_policy {
            SkipPolicy::SkipUnchanged if previous.serial(&zone.name) == Some(zone.serial) => {
                ZoneDecision::Skip
            }
            _ => ZoneDecision::Scan,
        }
    }

    /// Scan one zone, appending to `acc`
    ///
    /// Never fails: fetch errors are logged and reflected in the outcome.
    pub async fn scan_zone(
        &self,
        zone_id: &str,
        previous: &Checkpoint,
        acc: &mut ScanAccumulator,
    ) -> ZoneOutcome {
        let zone = match self.provider.get_zone(zone_id).await {
            Ok(zone) => zone,
            Err(e) => {
                warn!("Failed to fetch zone {}: {}", zone_id, e);
                return ZoneOutcome::Failed {
                    zone_id: zone_id.to_string(),
                    error: e.to_string(),
                };
            }
        };

        if self.decide(&zone, previous) == ZoneDecision::Skip {
            debug!("Skipping {} (serial {} unchanged)", zone.name, zone.serial);
            acc.next_checkpoint.set_serial(zone.name.clone(), zone.serial);
            return ZoneOutcome::Skipped {
                zone: zone.name,
                serial: zone.serial,
            };
        }

        let records = match self.provider.list_records(zone_id).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to list records of {}: {}", zone.name, e);
                return ZoneOutcome::Failed {
                    zone_id: zone_id.to_string(),
                    error: e.to_string(),
                };
            }
        };

        let mut stats = ZoneStats {
            zone: zone.name.clone(),
            serial: zone.serial,
            ..ZoneStats::default()
        };

        for path in &records {
            self.inspect_record(path, &zone, &mut stats, acc).await;
        }

        if stats.offending == 0 && stats.failed_records == 0 {
            acc.next_checkpoint.set_serial(zone.name.clone(), zone.serial);
            stats.checkpointed = true;
        } else {
            debug!(
                "Leaving {} unchecked ({} offending, {} failed)",
                zone.name, stats.offending, stats.failed_records
            );
        }

        ZoneOutcome::Scanned(stats)
    }

    async fn inspect_record(
        &self,
        path: &str,
        zone: &ZoneInfo,
        stats: &mut ZoneStats,
        acc: &mut ScanAccumulator,
    ) {
        let kind = classify(path);
        if !kind.is_inspected() {
            debug!("skipping {}", path);
            stats.records_ignored += 1;
            return;
        }

        let detail = match self.provider.get_record(path).await {
            Ok(detail) => detail,
            Err(e) => {
                warn!("Failed to fetch record {}: {}", path, e);
                stats.failed_records += 1;
                return;
            }
        };

        let target = match (kind, &detail.data) {
            (RecordKind::Address, RecordData::Address(address)) => {
                if self.exclusion.is_redirect_address(address) {
                    debug!("Excluding redirect record {} -> {}", detail.fqdn, address);
                    stats.records_excluded += 1;
                    return;
                }
                acc.reverse_index.addresses.record(address, &zone.name);
                address.clone()
            }
            (RecordKind::Alias, RecordData::Alias(target)) => {
                acc.reverse_index.aliases.record(target, &zone.name);
                target.clone()
            }
            (kind, data) => {
                warn!(
                    "Record {} listed as {:?} but provider returned {:?}",
                    path, kind, data
                );
                stats.failed_records += 1;
                return;
            }
        };

        stats.records_checked += 1;
        if self.policy.evaluate(&detail) == Verdict::Offending {
            stats.offending += 1;
            acc.offending.push(OffendingRecord {
                zone: zone.name.clone(),
                fqdn: detail.fqdn,
                ttl: detail.ttl,
                target,
                kind,
            });
        }
    }
}
