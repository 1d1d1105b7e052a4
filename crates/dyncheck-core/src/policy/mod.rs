//! Per-record decisions
//!
//! - [`classify`]: which records warrant a detail fetch at all
//! - [`RedirectExclusion`]: addresses exempt from policy evaluation
//! - [`TtlPolicy`]: compliant vs offending TTLs
//!
//! Everything in here is pure; no provider calls are made.

pub mod classify;
pub mod redirect;
pub mod ttl;

pub use classify::{RecordKind, RecordPath, classify};
pub use redirect::{AddressBlock, RedirectExclusion};
pub use ttl::{TtlPolicy, Verdict};
