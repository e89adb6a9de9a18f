//! CSV files as single-sheet cell sources.
//!
//! A CSV file is a workbook with exactly one sheet (index 0). Every field is a
//! string cell, except empty fields which become [`RawCell::Empty`] unless
//! [`CsvOpener::keep_empty_strings`] says otherwise. Type detection on those
//! strings is done by the reader (see [`ReaderConfig::infer_text_cells`]).
//!
//! **Compression**: gzip and zstd inputs are decoded transparently (see
//! [`crate::io::compression`]). Since decoded streams cannot seek, [`CsvSource::seek`]
//! re-opens the file and skips records.
//!
//! [`ReaderConfig::infer_text_cells`]: crate::reader::ReaderConfig::infer_text_cells

use crate::cell::{RawCell, RawRow, ReaderPosition};
use crate::error::{Result, SheetError};
use crate::io::compression::auto_detect_reader;
use crate::source::{CellSource, SheetSplit, SourceOpener};
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Opens CSV files named by splits.
#[derive(Clone, Debug)]
pub struct CsvOpener {
    delimiter: u8,
    quote: u8,
    empty_as_null: bool,
}

impl Default for CsvOpener {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            empty_as_null: true,
        }
    }
}

impl CsvOpener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    /// Yield empty fields as `RawCell::String("")` rather than `RawCell::Empty`.
    ///
    /// Both are null after conversion; this only matters to hosts inspecting raw rows.
    #[must_use]
    pub fn keep_empty_strings(mut self) -> Self {
        self.empty_as_null = false;
        self
    }
}

impl SourceOpener for CsvOpener {
    type Source = CsvSource;

    fn open(&self, split: &SheetSplit) -> Result<CsvSource> {
        CsvSource::open(&split.path, self.clone())
    }
}

/// Cell source over one CSV file.
pub struct CsvSource {
    path: PathBuf,
    settings: CsvOpener,
    reader: Option<csv::Reader<Box<dyn Read>>>,
    record: StringRecord,
    cursor: ReaderPosition,
}

impl CsvSource {
    /// # Errors
    /// Returns [`SheetError::Source`] if the file cannot be opened or decoded.
    pub fn open(path: impl AsRef<Path>, settings: CsvOpener) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = Some(build_reader(&path, &settings)?);
        debug!(path = %path.display(), "opened CSV source");
        Ok(Self {
            path,
            settings,
            reader,
            record: StringRecord::new(),
            cursor: ReaderPosition::default(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_record(&mut self) -> Result<bool> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(false);
        };
        reader
            .read_record(&mut self.record)
            .map_err(SheetError::source_failure)
    }

    fn to_cell(&self, field: &str) -> RawCell {
        if field.is_empty() && self.settings.empty_as_null {
            RawCell::Empty
        } else {
            RawCell::String(field.to_string())
        }
    }
}

impl CellSource for CsvSource {
    fn next_row(&mut self) -> Result<Option<RawRow>> {
        if self.cursor.sheet_index > 0 || !self.read_record()? {
            return Ok(None);
        }
        let cells = self.record.iter().map(|f| self.to_cell(f)).collect();
        let origin = self.cursor;
        self.cursor = self.cursor.next_row();
        Ok(Some(RawRow::new(origin, cells)))
    }

    fn position(&self) -> ReaderPosition {
        self.cursor
    }

    fn seek(&mut self, pos: ReaderPosition) -> Result<()> {
        self.reader = Some(build_reader(&self.path, &self.settings)?);
        self.cursor = ReaderPosition::default();
        if pos.sheet_index > 0 {
            // only one sheet: anything past it is the end
            self.cursor = pos;
            return Ok(());
        }
        while self.cursor.row_index < pos.row_index {
            if !self.read_record()? {
                break;
            }
            self.cursor = self.cursor.next_row();
        }
        trace!(path = %self.path.display(), position = %self.cursor, "repositioned CSV source");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.reader = None;
        Ok(())
    }
}

fn build_reader(path: &Path, settings: &CsvOpener) -> Result<csv::Reader<Box<dyn Read>>> {
    let file = File::open(path).map_err(SheetError::from)?;
    let input = auto_detect_reader(file, path)?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(settings.delimiter)
        .quote(settings.quote)
        .from_reader(input))
}
