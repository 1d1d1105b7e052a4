//! Core traits for the zone scanner
//!
//! This module defines the abstract interfaces at the scanner's external seams.
//!
//! - [`ZoneProvider`]: Read zones and records from a DNS provider
//! - [`CheckpointStore`]: Persist the per-zone serial checkpoint between runs
//! - [`Reporter`]: Deliver the formatted report

pub mod checkpoint_store;
pub mod reporter;
pub mod zone_provider;

pub use checkpoint_store::{Checkpoint, CheckpointStore};
pub use reporter::Reporter;
pub use zone_provider::{RecordData, RecordDetail, ZoneInfo, ZoneProvider, ZoneProviderFactory};
