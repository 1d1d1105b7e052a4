// # dyncheck-core
//
// Core library for the incremental DNS zone TTL scanner.
//
// ## Architecture Overview
//
// - **ZoneProvider**: Trait for reading zones and records from a DNS provider
// - **CheckpointStore**: Trait for the persisted zone -> serial checkpoint
// - **ScanRunner**: Orchestrates catalog fetch, per-zone scans, and checkpoint save
// - **ZoneScanner**: Skip-vs-scan decision and per-record evaluation for one zone
// - **ProviderRegistry**: Plugin-based registry for zone providers
// - **Reporter**: Delivery channels for the formatted report
//
// ## Design Principles
//
// 1. **Single pass**: One provider session, one pass over zones, one pass over records
// 2. **Incremental**: Unchanged zones (same serial) are not re-fetched
// 3. **Never half-written**: The checkpoint is replaced once, atomically, at the end
// 4. **Local failures stay local**: A failing zone or record is retried next run
// 5. **Library-First**: All core functionality can be used as a library

pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod policy;
pub mod registry;
pub mod report;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{CheckConfig, PolicyConfig, ProviderConfig, ReportConfig, ScanConfig, SkipPolicy};
pub use engine::{OffendingRecord, ScanResult, ScanRunner, ZoneOutcome};
pub use error::{Error, Result};
pub use index::{ReverseIndex, ReverseIndexBuilder};
pub use registry::ProviderRegistry;
pub use report::{ConsoleReporter, deliver_all, format_report};
pub use state::{FileCheckpointStore, MemoryCheckpointStore};
pub use traits::{Checkpoint, CheckpointStore, Reporter, ZoneProvider};
