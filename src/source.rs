//! The cell source abstraction and an in-memory implementation.
//!
//! A [`SourceOpener`] turns a [`SheetSplit`] into a fresh [`CellSource`]. The reader
//! opens the same split twice when inferring: one source for the inference pre-pass,
//! another one for actual reading. Sources are therefore expected to be cheap to
//! open and fully independent of each other.
//!
//! Position contract: [`CellSource::position`] is the position of the *next* row the
//! source would yield. After the last row of a sheet it may still point one past that
//! row; the move to the next sheet happens on the following `next_row` call. Seeking
//! to any position previously reported by `position` must make the source yield
//! exactly the rows it would have yielded from there.

use crate::cell::{RawCell, RawRow, ReaderPosition};
use crate::error::{Result, SheetError};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Descriptor of one unit of work: a whole source file.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SheetSplit {
    pub path: PathBuf,
    /// Ordinal of this split within its batch.
    pub index: usize,
}

impl SheetSplit {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            index: 0,
        }
    }

    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Stable identifier used to key persisted checkpoints.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}#{}", self.path.display(), self.index)
    }
}

impl fmt::Display for SheetSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (split {})", self.path.display(), self.index)
    }
}

/// A lazy, positioned sequence of raw rows across the sheets of one split.
pub trait CellSource {
    /// Next row, or `None` once every sheet is exhausted.
    ///
    /// # Errors
    /// Returns [`SheetError::Source`] when the underlying data cannot be read.
    fn next_row(&mut self) -> Result<Option<RawRow>>;

    /// Position of the next row this source would yield.
    fn position(&self) -> ReaderPosition;

    /// Reposition so the next row yielded is the one at `pos`.
    ///
    /// Seeking past the end leaves the source exhausted.
    ///
    /// # Errors
    /// Returns [`SheetError::Source`] when repositioning requires I/O that fails.
    fn seek(&mut self, pos: ReaderPosition) -> Result<()>;

    /// Release underlying resources. Further calls yield no rows.
    ///
    /// # Errors
    /// Returns [`SheetError::Source`] if releasing fails.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: CellSource + ?Sized> CellSource for Box<S> {
    fn next_row(&mut self) -> Result<Option<RawRow>> {
        (**self).next_row()
    }

    fn position(&self) -> ReaderPosition {
        (**self).position()
    }

    fn seek(&mut self, pos: ReaderPosition) -> Result<()> {
        (**self).seek(pos)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Opens cell sources for splits.
pub trait SourceOpener {
    type Source: CellSource;

    /// Open a fresh source positioned at the first row of the first sheet.
    ///
    /// # Errors
    /// Returns [`SheetError::Source`] if the split cannot be opened.
    fn open(&self, split: &SheetSplit) -> Result<Self::Source>;
}

impl<O: SourceOpener + ?Sized> SourceOpener for &O {
    type Source = O::Source;

    fn open(&self, split: &SheetSplit) -> Result<Self::Source> {
        (**self).open(split)
    }
}

impl<O: SourceOpener + ?Sized> SourceOpener for Arc<O> {
    type Source = O::Source;

    fn open(&self, split: &SheetSplit) -> Result<Self::Source> {
        (**self).open(split)
    }
}

// --------- In-memory workbooks ----------

/// One named sheet of raw rows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemorySheet {
    pub name: String,
    pub rows: Vec<Vec<RawCell>>,
}

impl MemorySheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// An already-decoded workbook: an ordered list of sheets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryWorkbook {
    pub sheets: Vec<MemorySheet>,
}

impl MemoryWorkbook {
    #[must_use]
    pub fn new(sheets: Vec<MemorySheet>) -> Self {
        Self { sheets }
    }

    /// A workbook with a single sheet named `Sheet1`.
    #[must_use]
    pub fn single_sheet(rows: Vec<Vec<RawCell>>) -> Self {
        Self::new(vec![MemorySheet::new("Sheet1", rows)])
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.sheets.iter().map(|s| s.rows.len()).sum()
    }
}

/// Cell source over a shared [`MemoryWorkbook`].
#[derive(Debug)]
pub struct MemorySource {
    workbook: Arc<MemoryWorkbook>,
    cursor: ReaderPosition,
    closed: bool,
}

impl MemorySource {
    #[must_use]
    pub fn new(workbook: Arc<MemoryWorkbook>) -> Self {
        Self {
            workbook,
            cursor: ReaderPosition::default(),
            closed: false,
        }
    }

    fn sheet_len(&self, sheet: u64) -> Option<u64> {
        let sheet = usize::try_from(sheet).ok()?;
        self.workbook.sheets.get(sheet).map(|s| s.rows.len() as u64)
    }
}

impl CellSource for MemorySource {
    fn next_row(&mut self) -> Result<Option<RawRow>> {
        if self.closed {
            return Ok(None);
        }
        loop {
            let Some(len) = self.sheet_len(self.cursor.sheet_index) else {
                return Ok(None);
            };
            if self.cursor.row_index < len {
                let sheet = &self.workbook.sheets[self.cursor.sheet_index as usize];
                let cells = sheet.rows[self.cursor.row_index as usize].clone();
                let origin = self.cursor;
                self.cursor = self.cursor.next_row();
                return Ok(Some(RawRow::new(origin, cells)));
            }
            self.cursor = self.cursor.next_sheet();
        }
    }

    fn position(&self) -> ReaderPosition {
        self.cursor
    }

    fn seek(&mut self, pos: ReaderPosition) -> Result<()> {
        self.cursor = pos;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Opener resolving split paths against a set of registered in-memory workbooks.
#[derive(Clone, Debug, Default)]
pub struct MemoryOpener {
    workbooks: HashMap<PathBuf, Arc<MemoryWorkbook>>,
}

impl MemoryOpener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `workbook` under `path`, replacing any previous one.
    #[must_use]
    pub fn with_workbook(mut self, path: impl Into<PathBuf>, workbook: MemoryWorkbook) -> Self {
        self.insert(path, workbook);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, workbook: MemoryWorkbook) {
        self.workbooks.insert(path.into(), Arc::new(workbook));
    }

    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&MemoryWorkbook> {
        self.workbooks.get(path).map(AsRef::as_ref)
    }
}

impl SourceOpener for MemoryOpener {
    type Source = MemorySource;

    fn open(&self, split: &SheetSplit) -> Result<MemorySource> {
        let workbook = self.workbooks.get(&split.path).ok_or_else(|| {
            SheetError::Source(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no workbook registered for {}", split.path.display()),
            ))
        })?;
        debug!(split = %split, sheets = workbook.sheets.len(), "opened in-memory workbook");
        Ok(MemorySource::new(Arc::clone(workbook)))
    }
}
