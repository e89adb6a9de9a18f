//! Tests for checkpoint state and the on-disk checkpoint store.

use ironsheet::testing::*;
use ironsheet::*;

#[cfg(feature = "checkpointing")]
#[test]
fn checkpoint_state_round_trips_through_postcard() -> anyhow::Result<()> {
    let state = CheckpointState::new(
        ReaderPosition::new(2, 17),
        Schema::new(vec![ColumnType::String, ColumnType::Decimal]),
    );
    let bytes = postcard::to_allocvec(&state)?;
    let back: CheckpointState = postcard::from_bytes(&bytes)?;
    assert_eq!(back, state);
    assert_eq!(back.position(), ReaderPosition::new(2, 17));
    Ok(())
}

#[cfg(feature = "checkpointing")]
mod store_tests {
    use super::*;
    use ironsheet::checkpoint::{CheckpointStore, CheckpointStoreConfig};
    use std::fs::{self, File};
    use std::io::{Read, Write};
    use tempfile::TempDir;

    fn store(dir: &TempDir, keep: Option<usize>) -> anyhow::Result<CheckpointStore> {
        CheckpointStore::new(CheckpointStoreConfig {
            directory: dir.path().join("checkpoints"),
            max_checkpoints: keep,
        })
    }

    fn state(row: u64) -> CheckpointState {
        CheckpointState::new(ReaderPosition::new(0, row), Schema::all_strings(2))
    }

    #[test]
    fn store_config_default() {
        let config = CheckpointStoreConfig::default();
        assert_eq!(config.max_checkpoints, Some(10));
    }

    #[test]
    fn new_creates_directory() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let store = store(&tmp, None)?;
        assert!(store.directory().is_dir());
        Ok(())
    }

    #[test]
    fn save_then_load_latest() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let mut store = store(&tmp, None)?;
        assert!(store.latest("a.csv#0")?.is_none());

        store.save("a.csv#0", &state(1))?;
        store.save("a.csv#0", &state(5))?;
        let latest = store.latest("a.csv#0")?.unwrap_or_default();
        assert_eq!(store.load(&latest)?, state(5));
        Ok(())
    }

    #[test]
    fn splits_are_kept_apart() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let mut store = store(&tmp, None)?;
        store.save("a#0", &state(1))?;
        store.save("b#1", &state(9))?;

        let a = store.latest("a#0")?.unwrap_or_default();
        assert_eq!(store.load(&a)?, state(1));

        store.clear("a#0")?;
        assert!(store.latest("a#0")?.is_none());
        assert!(store.latest("b#1")?.is_some());
        Ok(())
    }

    #[test]
    fn retention_keeps_only_the_newest() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let mut store = store(&tmp, Some(2))?;
        for row in 0..5 {
            store.save("s#0", &state(row))?;
        }
        let files = fs::read_dir(store.directory())?.count();
        assert_eq!(files, 2);
        let latest = store.latest("s#0")?.unwrap_or_default();
        assert_eq!(store.load(&latest)?, state(4));
        Ok(())
    }

    #[test]
    fn corrupted_checkpoint_is_rejected() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let mut store = store(&tmp, None)?;
        let path = store.save("s#0", &state(3))?;

        let mut bytes = Vec::new();
        File::open(&path)?.read_to_end(&mut bytes)?;
        let idx = bytes.len() / 2;
        bytes[idx] ^= 0xff;
        File::create(&path)?.write_all(&bytes)?;

        assert!(store.load(&path).is_err());
        Ok(())
    }

    #[test]
    fn resume_a_split_from_the_store() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let mut store = store(&tmp, Some(3))?;
        let opener = MemoryOpener::new().with_workbook("multi", multi_sheet_workbook());
        let split = SheetSplit::new("multi");

        // read two records, checkpointing after each, then "crash"
        let mut first = SheetReader::new(&opener, ReaderConfig::default());
        first.open(&split)?;
        let mut seen = Vec::new();
        for _ in 0..2 {
            if let Some(record) = first.next_record(None)? {
                seen.push(record);
            }
            store.save(&split.id(), &first.current_state()?)?;
        }
        drop(first);

        let checkpoint = store.load(&store.latest(&split.id())?.unwrap_or_default())?;
        let mut second = SheetReader::new(&opener, ReaderConfig::default());
        second.reopen(&split, checkpoint)?;
        seen.extend(drain_records(&mut second)?);

        let uninterrupted = read_sheet_vec(&opener, &split, ReaderConfig::default())?;
        assert_eq!(seen, uninterrupted);
        Ok(())
    }
}
