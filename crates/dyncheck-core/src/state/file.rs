// # File Checkpoint Store
//
// File-based implementation of CheckpointStore with crash safety.
//
// ## Purpose
//
// Persists the zone -> serial checkpoint between scanner runs so that
// zones whose serial did not change are not scanned again.
//
// ## Crash Safety
//
// - Atomic writes: serialize into a freshly created temporary file next to
//   the destination, fsync, then rename over the destination
// - Backup: the previous checkpoint is copied to `<path>.backup` before the rename
// - Corruption: an unparseable checkpoint falls back to the backup, then to
//   an empty checkpoint (which only costs a full rescan)
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "zones": {
//     "example.com": 42
//   }
// }
// ```

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::traits::checkpoint_store::{Checkpoint, CheckpointStore};

/// Checkpoint file format version
/// Used for future migration if format changes
const CHECKPOINT_FILE_VERSION: &str = "1.0";

/// File-based checkpoint store
///
/// # Example
///
/// ```rust,no_run
/// use dyncheck_core::state::FileCheckpointStore;
/// use dyncheck_core::traits::{Checkpoint, CheckpointStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileCheckpointStore::new("/var/lib/dyncheck/status.json");
///
///     // Missing file loads as an empty checkpoint
///     let mut checkpoint = store.load().await?;
///
///     checkpoint.set_serial("example.com", 42);
///     store.save(&checkpoint).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    path: PathBuf,
}

/// Serializable checkpoint file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct CheckpointFileFormat {
    version: String,
    zones: Checkpoint,
}

/// Result of reading one checkpoint file
enum ReadOutcome {
    Missing,
    Loaded(Checkpoint),
    Corrupt(String),
}

impl FileCheckpointStore {
    /// Create a store backed by `path`; nothing is read or written yet
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Destination path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load with fallback to the backup file when the main file is corrupt
    async fn load_with_recovery(&self) -> Result<Checkpoint, Error> {
        match Self::read_checkpoint(&self.path).await? {
            ReadOutcome::Loaded(checkpoint) => {
                tracing::debug!(
                    "Loaded checkpoint from {}: {} zone(s)",
                    self.path.display(),
                    checkpoint.len()
                );
                Ok(checkpoint)
            }
            ReadOutcome::Missing => {
                tracing::info!(
                    "No checkpoint found at {}, a new one will be created",
                    self.path.display()
                );
                Ok(Checkpoint::new())
            }
            ReadOutcome::Corrupt(reason) => {
                tracing::warn!(
                    "Checkpoint file appears corrupted: {}. Attempting recovery from backup.",
                    reason
                );

                let backup_path = Self::backup_path(&self.path);
                match Self::read_checkpoint(&backup_path).await? {
                    ReadOutcome::Loaded(checkpoint) => {
                        tracing::info!(
                            "Recovered checkpoint from backup: {} zone(s)",
                            checkpoint.len()
                        );
                        Ok(checkpoint)
                    }
                    ReadOutcome::Missing => {
                        tracing::warn!("No backup file found. Starting with empty checkpoint.");
                        Ok(Checkpoint::new())
                    }
                    ReadOutcome::Corrupt(backup_reason) => {
                        tracing::error!(
                            "Backup also corrupted: {}. Starting with empty checkpoint.",
                            backup_reason
                        );
                        Ok(Checkpoint::new())
                    }
                }
            }
        }
    }

    /// Read and parse a single checkpoint file
    async fn read_checkpoint(path: &Path) -> Result<ReadOutcome, Error> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Checkpoint file does not exist: {}", path.display());
                return Ok(ReadOutcome::Missing);
            }
            Err(e) => {
                return Err(Error::checkpoint_store(format!(
                    "Failed to read checkpoint file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let file: CheckpointFileFormat = match serde_json::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                return Ok(ReadOutcome::Corrupt(format!("{}: {}", path.display(), e)));
            }
        };

        if file.version != CHECKPOINT_FILE_VERSION {
            tracing::warn!(
                "Checkpoint file version mismatch: expected {}, got {}. \
                Attempting to load anyway.",
                CHECKPOINT_FILE_VERSION,
                file.version
            );
        }

        Ok(ReadOutcome::Loaded(file.zones))
    }

    /// Write the checkpoint atomically
    async fn write_checkpoint(&self, checkpoint: &Checkpoint) -> Result<(), Error> {
        let file = CheckpointFileFormat {
            version: CHECKPOINT_FILE_VERSION.to_string(),
            zones: checkpoint.clone(),
        };

        let json = serde_json::to_string_pretty(&file).map_err(|e| {
            Error::checkpoint_store(format!("Failed to serialize checkpoint: {}", e))
        })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::checkpoint_store(format!(
                    "Failed to create checkpoint directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp_path = self.temp_path();
        if let Err(e) = self.replace_with(&temp_path, json.as_bytes()).await {
            // Never leave a stray temporary file behind
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        tracing::trace!("Checkpoint written to file: {}", self.path.display());
        Ok(())
    }

    /// Write `contents` into a fresh `temp_path`, back up the current file, rename over it
    async fn replace_with(&self, temp_path: &Path, contents: &[u8]) -> Result<(), Error> {
        {
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(temp_path)
                .await
                .map_err(|e| {
                    Error::checkpoint_store(format!(
                        "Failed to create temp file {}: {}",
                        temp_path.display(),
                        e
                    ))
                })?;

            file.write_all(contents).await.map_err(|e| {
                Error::checkpoint_store(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::checkpoint_store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.sync_all().await.map_err(|e| {
                Error::checkpoint_store(format!(
                    "Failed to sync temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Create backup of current file (if it exists)
        if self.path.is_file() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create checkpoint backup: {}", e);
            }
        }

        // Atomic rename (temp -> actual)
        fs::rename(temp_path, &self.path).await.map_err(|e| {
            Error::checkpoint_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })
    }

    /// Unique temporary path in the destination's directory
    ///
    /// Same directory keeps the final rename on one filesystem.
    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "checkpoint".to_string());
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();

        self.path
            .with_file_name(format!(".{}.{}-{}.tmp", file_name, std::process::id(), nanos))
    }

    /// Backup path: `.backup` appended to the full file name
    fn backup_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "checkpoint".into());
        name.push(".backup");
        path.with_file_name(name)
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn load(&self) -> Result<Checkpoint, Error> {
        self.load_with_recovery().await
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<(), Error> {
        self.write_checkpoint(checkpoint).await
    }
}
