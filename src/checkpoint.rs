//! Checkpoint state and an on-disk checkpoint store.
//!
//! [`CheckpointState`] is everything needed to resume a split: where the reader
//! stands and which schema it was converting with. Hosts that already have their
//! own state backend can serialize it with any serde format. For everyone else,
//! the [`CheckpointStore`] (feature `checkpointing`) keeps the latest snapshots per
//! split in a directory.
//!
//! # Usage
//!
//! ```no_run
//! use ironsheet::*;
//! use ironsheet::checkpoint::{CheckpointStore, CheckpointStoreConfig};
//! # fn main() -> anyhow::Result<()> {
//! # let opener = MemoryOpener::new();
//! let split = SheetSplit::new("sales.xlsx");
//! let mut store = CheckpointStore::new(CheckpointStoreConfig {
//!     directory: "./checkpoints".into(),
//!     max_checkpoints: Some(3),
//! })?;
//!
//! let mut reader = SheetReader::new(&opener, ReaderConfig::default());
//! match store.latest(&split.id())? {
//!     Some(path) => reader.reopen(&split, store.load(&path)?)?,
//!     None => reader.open(&split)?,
//! }
//! while let Some(_record) = reader.next_record(None)? {
//!     store.save(&split.id(), &reader.current_state()?)?;
//! }
//! # Ok(())
//! # }
//! ```

use crate::cell::ReaderPosition;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};

#[cfg(feature = "checkpointing")]
use anyhow::{Context, Result, anyhow};
#[cfg(feature = "checkpointing")]
use sha2::{Digest, Sha256};
#[cfg(feature = "checkpointing")]
use std::fs::{DirEntry, File, create_dir_all, read_dir, remove_file};
#[cfg(feature = "checkpointing")]
use std::io::{Read, Write};
#[cfg(feature = "checkpointing")]
use std::path::{Path, PathBuf};
#[cfg(feature = "checkpointing")]
use std::time::{SystemTime, UNIX_EPOCH};
#[cfg(feature = "checkpointing")]
use tracing::debug;

/// Resumable reading progress of one split.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckpointState {
    /// Sheet of the next row to read.
    pub sheet_index: u64,
    /// Row (within `sheet_index`) of the next row to read.
    pub row_index: u64,
    /// The finalized schema the reader was converting with.
    pub schema: Schema,
}

impl CheckpointState {
    #[must_use]
    pub fn new(position: ReaderPosition, schema: Schema) -> Self {
        Self {
            sheet_index: position.sheet_index,
            row_index: position.row_index,
            schema,
        }
    }

    #[must_use]
    pub fn position(&self) -> ReaderPosition {
        ReaderPosition::new(self.sheet_index, self.row_index)
    }
}

/// Where and how many checkpoints are kept.
#[derive(Clone, Debug)]
#[cfg(feature = "checkpointing")]
pub struct CheckpointStoreConfig {
    /// Directory where checkpoint files are stored.
    pub directory: PathBuf,
    /// Maximum number of checkpoints to retain per split (oldest are deleted first).
    /// None means keep all checkpoints.
    pub max_checkpoints: Option<usize>,
}

#[cfg(feature = "checkpointing")]
impl Default for CheckpointStoreConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./ironsheet_checkpoints"),
            max_checkpoints: Some(10),
        }
    }
}

/// On-disk envelope: the state plus integrity metadata.
#[derive(Serialize, Deserialize)]
#[cfg(feature = "checkpointing")]
struct StoredCheckpoint {
    split_id: String,
    timestamp: u64,
    state: CheckpointState,
    checksum: String,
}

/// Persists [`CheckpointState`]s per split id.
#[cfg(feature = "checkpointing")]
pub struct CheckpointStore {
    config: CheckpointStoreConfig,
    last_timestamp: Option<u64>,
}

#[cfg(feature = "checkpointing")]
impl CheckpointStore {
    /// # Errors
    ///
    /// Returns an error if the checkpoint directory cannot be created.
    pub fn new(config: CheckpointStoreConfig) -> Result<Self> {
        create_dir_all(&config.directory).context("Failed to create checkpoint directory")?;
        Ok(Self {
            config,
            last_timestamp: None,
        })
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    /// Write `state` as the newest checkpoint of `split_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint file cannot be encoded or written.
    pub fn save(&mut self, split_id: &str, state: &CheckpointState) -> Result<PathBuf> {
        // strictly increasing, so two saves in the same millisecond still order
        let timestamp = match self.last_timestamp {
            Some(last) => current_timestamp_ms().max(last + 1),
            None => current_timestamp_ms(),
        };
        let checksum = state_checksum(split_id, timestamp, state)?;
        let stored = StoredCheckpoint {
            split_id: split_id.to_string(),
            timestamp,
            state: state.clone(),
            checksum,
        };

        let prefix = file_prefix(split_id);
        let path = self.config.directory.join(format!("{prefix}{timestamp}.bin"));
        let encoded = postcard::to_allocvec(&stored).context("Failed to serialize checkpoint")?;

        let mut file = File::create(&path).context("Failed to create checkpoint file")?;
        file.write_all(&encoded)
            .context("Failed to write checkpoint")?;
        file.sync_all()
            .context("Failed to sync checkpoint to disk")?;
        self.last_timestamp = Some(timestamp);

        debug!(split_id, position = %state.position(), path = %path.display(), "saved checkpoint");
        self.cleanup_old(split_id)?;
        Ok(path)
    }

    /// Path of the newest checkpoint of `split_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint directory cannot be read.
    pub fn latest(&self, split_id: &str) -> Result<Option<PathBuf>> {
        if !self.config.directory.exists() {
            return Ok(None);
        }
        let checkpoints = self.list(split_id)?;
        Ok(checkpoints.last().map(DirEntry::path))
    }

    /// Load and verify a checkpoint file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded, or if its checksum
    /// does not match its contents.
    pub fn load(&self, path: &Path) -> Result<CheckpointState> {
        let mut file = File::open(path).context("Failed to open checkpoint file")?;
        let mut encoded = Vec::new();
        file.read_to_end(&mut encoded)
            .context("Failed to read checkpoint")?;

        let stored: StoredCheckpoint =
            postcard::from_bytes(&encoded).context("Failed to deserialize checkpoint")?;

        let computed = state_checksum(&stored.split_id, stored.timestamp, &stored.state)?;
        if computed != stored.checksum {
            return Err(anyhow!(
                "Checkpoint integrity check failed: checksum mismatch"
            ));
        }
        Ok(stored.state)
    }

    /// Delete every checkpoint of `split_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint directory cannot be read.
    pub fn clear(&self, split_id: &str) -> Result<()> {
        for entry in self.list(split_id)? {
            remove_file(entry.path()).ok();
        }
        Ok(())
    }

    /// Checkpoint files of `split_id`, oldest first.
    fn list(&self, split_id: &str) -> Result<Vec<DirEntry>> {
        let prefix = file_prefix(split_id);
        let mut checkpoints: Vec<_> = read_dir(&self.config.directory)
            .context("Failed to read checkpoint directory")?
            .filter_map(std::result::Result::ok)
            .filter(|entry| {
                entry.file_name().to_str().is_some_and(|name| {
                    name.starts_with(&prefix)
                        && Path::new(name)
                            .extension()
                            .is_some_and(|ext| ext.eq_ignore_ascii_case("bin"))
                })
            })
            .collect();

        // Sort by timestamp (encoded in filename)
        checkpoints.sort_by_key(|entry| {
            entry
                .file_name()
                .to_str()
                .and_then(|name| {
                    name.strip_prefix(&prefix)
                        .and_then(|s| s.strip_suffix(".bin"))
                        .and_then(|s| s.parse::<u64>().ok())
                })
                .unwrap_or(0)
        });
        Ok(checkpoints)
    }

    fn cleanup_old(&self, split_id: &str) -> Result<()> {
        let Some(max_checkpoints) = self.config.max_checkpoints else {
            return Ok(());
        };
        let checkpoints = self.list(split_id)?;
        if checkpoints.len() <= max_checkpoints {
            return Ok(());
        }
        let to_delete = checkpoints.len() - max_checkpoints;
        for entry in checkpoints.iter().take(to_delete) {
            remove_file(entry.path()).ok(); // Ignore errors
        }
        Ok(())
    }
}

/// SHA-256 of the split id, timestamp and encoded state, as lowercase hex.
#[cfg(feature = "checkpointing")]
fn state_checksum(split_id: &str, timestamp: u64, state: &CheckpointState) -> Result<String> {
    let payload = postcard::to_allocvec(state).context("Failed to serialize checkpoint state")?;
    let mut hasher = Sha256::new();
    hasher.update(split_id.as_bytes());
    hasher.update(timestamp.to_le_bytes());
    hasher.update(&payload);
    Ok(format!("{:x}", hasher.finalize()))
}

/// File name prefix of a split: split ids are paths, so they are hashed.
#[cfg(feature = "checkpointing")]
fn file_prefix(split_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(split_id.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("checkpoint_{}_", &digest[..16])
}

/// Get current timestamp in milliseconds since epoch.
#[cfg(feature = "checkpointing")]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
