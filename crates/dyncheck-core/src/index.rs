//! Reverse index of record targets to the zones that reference them
//!
//! Keys keep first-seen order and each key's zone list keeps encounter
//! order. Repeated zones are kept: a target referenced twice from one zone
//! or from many zones is exactly the shared-hosting fan-out the report is
//! meant to show.

use std::collections::HashMap;

/// Ordered `target -> [zone]` accumulator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseIndexBuilder {
    entries: Vec<(String, Vec<String>)>,
    positions: HashMap<String, usize>,
}

impl ReverseIndexBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `zone` to the list kept for `target`
    pub fn record(&mut self, target: &str, zone: &str) {
        match self.positions.get(target) {
            Some(&pos) => self.entries[pos].1.push(zone.to_string()),
            None => {
                self.positions.insert(target.to_string(), self.entries.len());
                self.entries
                    .push((target.to_string(), vec![zone.to_string()]));
            }
        }
    }

    /// Zones recorded for `target`
    pub fn zones_for(&self, target: &str) -> Option<&[String]> {
        self.positions
            .get(target)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    /// Number of distinct targets
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ordered copy of all entries
    pub fn snapshot(&self) -> Vec<(String, Vec<String>)> {
        self.entries.clone()
    }
}

/// Reverse indexes for both inspected record kinds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseIndex {
    /// Alias target -> zones
    pub aliases: ReverseIndexBuilder,
    /// Address -> zones
    pub addresses: ReverseIndexBuilder,
}

impl ReverseIndex {
    /// Create empty indexes
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether both indexes are empty
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty() && self.addresses.is_empty()
    }
}
