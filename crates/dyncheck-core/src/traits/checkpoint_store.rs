// # Checkpoint Store Trait
//
// Defines the interface for persisting the per-zone checkpoint.
//
// ## Purpose
//
// The checkpoint maps a zone name to the serial observed at the end of the
// last fully successful scan of that zone. A zone whose current serial
// matches its checkpoint entry does not need to be scanned again.
//
// ## Implementations
//
// - File-based: [`FileCheckpointStore`](crate::state::FileCheckpointStore)
// - In-memory: [`MemoryCheckpointStore`](crate::state::MemoryCheckpointStore)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Zone name -> last fully scanned serial
///
/// Ordered by zone name so that equal checkpoints serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checkpoint {
    zones: BTreeMap<String, u64>,
}

impl Checkpoint {
    /// Create an empty checkpoint
    pub fn new() -> Self {
        Self::default()
    }

    /// Serial recorded for a zone
    pub fn serial(&self, zone: &str) -> Option<u64> {
        self.zones.get(zone).copied()
    }

    /// Record a zone's serial, returning the previous one
    pub fn set_serial(&mut self, zone: impl Into<String>, serial: u64) -> Option<u64> {
        self.zones.insert(zone.into(), serial)
    }

    /// Whether a zone has an entry
    pub fn contains(&self, zone: &str) -> bool {
        self.zones.contains_key(zone)
    }

    /// Number of zones recorded
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether no zone is recorded
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Iterate entries in zone-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.zones.iter().map(|(zone, serial)| (zone.as_str(), *serial))
    }
}

impl FromIterator<(String, u64)> for Checkpoint {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self {
            zones: iter.into_iter().collect(),
        }
    }
}

/// Trait for checkpoint store implementations
///
/// # Contract
///
/// - `load` on a store that has never been saved returns an empty
///   checkpoint, not an error.
/// - `save` replaces the stored checkpoint wholesale. A reader never observes
///   a partially written checkpoint, and a failed save leaves the previous
///   one intact.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load the stored checkpoint
    async fn load(&self) -> Result<Checkpoint, crate::Error>;

    /// Replace the stored checkpoint
    async fn save(&self, checkpoint: &Checkpoint) -> Result<(), crate::Error>;
}
