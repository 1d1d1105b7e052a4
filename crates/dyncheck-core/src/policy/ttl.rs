//! TTL policy evaluation

use crate::traits::RecordDetail;

/// Outcome of evaluating one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// TTL at or above the minimum
    Compliant,
    /// TTL below the minimum
    Offending,
}

/// Minimum-TTL policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    min_ttl: u32,
}

impl TtlPolicy {
    /// Create a policy with the given minimum TTL in seconds
    pub fn new(min_ttl: u32) -> Self {
        Self { min_ttl }
    }

    /// Configured minimum TTL
    pub fn min_ttl(&self) -> u32 {
        self.min_ttl
    }

    /// `record.ttl < min_ttl` is offending; equality is compliant
    pub fn evaluate(&self, record: &RecordDetail) -> Verdict {
        if record.ttl < self.min_ttl {
            Verdict::Offending
        } else {
            Verdict::Compliant
        }
    }
}
