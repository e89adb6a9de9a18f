//! File globbing for batch reads.
//!
//! Expands a pattern like `reports/2024-*/*.csv` into a sorted, deterministic list
//! of files, and numbers them as [`SheetSplit`]s so each split has a stable id for
//! checkpointing.
//!
//! ```no_run
//! use ironsheet::io::glob::splits_from_glob;
//!
//! for split in splits_from_glob("exports/*.csv")? {
//!     println!("{}", split.id());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::source::SheetSplit;
use anyhow::{Context, Result, bail};
use glob::glob;
use std::path::PathBuf;

/// Expand a glob pattern into a sorted vector of matching file paths.
///
/// Directories are skipped. No match is an empty vector, not an error.
///
/// # Errors
///
/// Returns an error if the pattern is invalid or a matched entry cannot be read.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut result = Vec::new();
    for entry in paths {
        let path =
            entry.with_context(|| format!("error reading glob entry for pattern: {pattern}"))?;
        if path.is_file() {
            result.push(path);
        }
    }
    result.sort();
    Ok(result)
}

/// Like [`expand_glob`], but zero matches is an error.
///
/// # Errors
///
/// Returns an error if the pattern is invalid or matches no files.
pub fn expand_glob_required(pattern: &str) -> Result<Vec<PathBuf>> {
    let files = expand_glob(pattern)?;
    if files.is_empty() {
        bail!("no files found matching pattern: {pattern}");
    }
    Ok(files)
}

/// One split per matching file, indexed in sorted path order.
///
/// # Errors
///
/// See [`expand_glob`].
pub fn splits_from_glob(pattern: &str) -> Result<Vec<SheetSplit>> {
    Ok(number(expand_glob(pattern)?))
}

/// Like [`splits_from_glob`], but zero matches is an error.
///
/// # Errors
///
/// See [`expand_glob_required`].
pub fn splits_from_glob_required(pattern: &str) -> Result<Vec<SheetSplit>> {
    Ok(number(expand_glob_required(pattern)?))
}

fn number(paths: Vec<PathBuf>) -> Vec<SheetSplit> {
    paths
        .into_iter()
        .enumerate()
        .map(|(i, path)| SheetSplit::new(path).with_index(i))
        .collect()
}
