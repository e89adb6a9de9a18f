use crate::convert::TypedRecord;
use crate::reader::{ReaderConfig, SheetReader};
use crate::source::{SheetSplit, SourceOpener};
use anyhow::Context;

// --------- Whole-split reads ----------

/// Read every record of `split` into memory.
///
/// # Errors
/// Returns an error if the split cannot be opened, inferred or converted; the
/// context names the split.
pub fn read_sheet_vec<O: SourceOpener>(
    opener: O,
    split: &SheetSplit,
    config: ReaderConfig,
) -> anyhow::Result<Vec<TypedRecord>> {
    let mut reader = SheetReader::new(opener, config);
    reader
        .open(split)
        .with_context(|| format!("open {split}"))?;
    let mut out = Vec::new();
    while let Some(record) = reader
        .next_record(None)
        .with_context(|| format!("read record #{} of {split}", out.len() + 1))?
    {
        out.push(record);
    }
    reader.close().with_context(|| format!("close {split}"))?;
    Ok(out)
}

/// Read a CSV file with the default [`CsvOpener`](crate::io::csv::CsvOpener).
///
/// # Errors
/// See [`read_sheet_vec`].
#[cfg(feature = "io-csv")]
pub fn read_csv_records(
    path: impl AsRef<std::path::Path>,
    config: ReaderConfig,
) -> anyhow::Result<Vec<TypedRecord>> {
    let split = SheetSplit::new(path.as_ref());
    read_sheet_vec(crate::io::csv::CsvOpener::new(), &split, config)
}

// --------- Batches of splits ----------

/// Read every split sequentially, one reader per split.
///
/// # Errors
/// Stops at the first split that fails.
pub fn read_splits<O: SourceOpener>(
    opener: &O,
    splits: &[SheetSplit],
    config: &ReaderConfig,
) -> anyhow::Result<Vec<Vec<TypedRecord>>> {
    splits
        .iter()
        .map(|split| read_sheet_vec(opener, split, config.clone()))
        .collect()
}

/// Read splits in parallel with rayon. Each split gets its own reader; results
/// come back in the order of `splits`.
///
/// # Errors
/// Returns the error of the first failing split (in split order).
#[cfg_attr(docsrs, doc(cfg(feature = "parallel-io")))]
#[cfg(feature = "parallel-io")]
pub fn read_splits_par<O>(
    opener: &O,
    splits: &[SheetSplit],
    config: &ReaderConfig,
) -> anyhow::Result<Vec<Vec<TypedRecord>>>
where
    O: SourceOpener + Sync,
{
    use rayon::prelude::*;

    tracing::info!(splits = splits.len(), "reading splits in parallel");
    splits
        .par_iter()
        .map(|split| read_sheet_vec(opener, split, config.clone()))
        .collect()
}
