//! The reader: inference pre-pass, typed iteration and checkpoint/resume for one split.
//!
//! Lifecycle:
//!
//! ```text
//! Unopened --open()--> [Inferring] --> Ready --next_record()*--> Exhausted
//!     \--reopen(state)------------------^
//! any --close()--> Closed
//! ```
//!
//! `open` without a custom schema opens the split a second time and feeds at most
//! [`ReaderConfig::max_infer_rows`] rows of that second source into a
//! [`TypeInferencer`]; the reading source itself is never rewound. `reopen` adopts
//! a checkpointed schema and seeks the reading source to the checkpointed position
//! without inferring anything.
//!
//! A reader is single-threaded and single-use: every mutating call takes
//! `&mut self`, and once closed it cannot be opened again.

use crate::cell::ReaderPosition;
use crate::checkpoint::CheckpointState;
use crate::convert::RowConverter;
use crate::error::{Result, SheetError};
use crate::format::CellFormats;
use crate::infer::TypeInferencer;
use crate::schema::{ColumnType, Schema};
use crate::shape::{RecordShaper, RowShaper};
use crate::source::{CellSource, SheetSplit, SourceOpener};
use std::fmt;
use tracing::{debug, info};

/// Default bound of the inference pre-pass.
pub const DEFAULT_MAX_INFER_ROWS: i64 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReaderState {
    Unopened,
    Inferring,
    Ready,
    Exhausted,
    Closed,
}

impl fmt::Display for ReaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReaderState::Unopened => "unopened",
            ReaderState::Inferring => "inferring",
            ReaderState::Ready => "ready",
            ReaderState::Exhausted => "exhausted",
            ReaderState::Closed => "closed",
        })
    }
}

/// Reader configuration. Fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct ReaderConfig {
    /// Number of data rows the inference pre-pass may observe. Zero observes
    /// nothing and yields an all-`STRING` schema as wide as the first data row.
    /// A negative value lifts the bound and infers from the whole split.
    pub max_infer_rows: i64,
    /// Skip inference and use this schema as-is.
    pub custom_schema: Option<Schema>,
    pub formats: CellFormats,
    /// Treat the first row of the split as column names.
    pub has_header: bool,
    /// Classify string cells by content during inference.
    pub infer_text_cells: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_infer_rows: DEFAULT_MAX_INFER_ROWS,
            custom_schema: None,
            formats: CellFormats::default(),
            has_header: false,
            infer_text_cells: true,
        }
    }
}

impl ReaderConfig {
    #[must_use]
    pub fn with_max_infer_rows(mut self, rows: i64) -> Self {
        self.max_infer_rows = rows;
        self
    }

    #[must_use]
    pub fn with_custom_schema(mut self, schema: Schema) -> Self {
        self.custom_schema = Some(schema);
        self
    }

    #[must_use]
    pub fn with_formats(mut self, formats: CellFormats) -> Self {
        self.formats = formats;
        self
    }

    #[must_use]
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    #[must_use]
    pub fn with_text_inference(mut self, enabled: bool) -> Self {
        self.infer_text_cells = enabled;
        self
    }

    /// The pre-pass bound as a row count, `None` when unbounded.
    #[must_use]
    pub fn infer_limit(&self) -> Option<u64> {
        u64::try_from(self.max_infer_rows).ok()
    }
}

/// Reads one split into shaped typed records.
pub struct SheetReader<O: SourceOpener, S: RecordShaper = RowShaper> {
    opener: O,
    shaper: S,
    config: ReaderConfig,
    converter: RowConverter,
    state: ReaderState,
    source: Option<O::Source>,
    split: Option<SheetSplit>,
    schema: Option<Schema>,
    header: Option<Vec<String>>,
}

impl<O: SourceOpener> SheetReader<O, RowShaper> {
    /// A reader producing [`TypedRecord`]s.
    pub fn new(opener: O, config: ReaderConfig) -> Self {
        Self::with_shaper(opener, RowShaper, config)
    }
}

impl<O: SourceOpener, S: RecordShaper> SheetReader<O, S> {
    pub fn with_shaper(opener: O, shaper: S, config: ReaderConfig) -> Self {
        let converter = RowConverter::new(config.formats.clone());
        Self {
            opener,
            shaper,
            config,
            converter,
            state: ReaderState::Unopened,
            source: None,
            split: None,
            schema: None,
            header: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> ReaderState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// The split currently being read.
    #[must_use]
    pub fn split(&self) -> Option<&SheetSplit> {
        self.split.as_ref()
    }

    /// The finalized schema, or the custom schema before the reader is opened.
    #[must_use]
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref().or(self.config.custom_schema.as_ref())
    }

    /// Column names taken from the header row, when `has_header` is set.
    #[must_use]
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Position of the next row to be read.
    #[must_use]
    pub fn position(&self) -> Option<ReaderPosition> {
        self.source.as_ref().map(CellSource::position)
    }

    /// Open `split`, inferring the schema unless a custom one was configured.
    ///
    /// # Errors
    /// [`SheetError::InvalidState`] unless the reader is unopened; source errors
    /// from either the reading or the inference source. A failed open leaves the
    /// reader closed.
    pub fn open(&mut self, split: &SheetSplit) -> Result<()> {
        self.ensure("open", &[ReaderState::Unopened])?;
        let opened = self.start(split, None);
        self.finish_start(opened)?;
        debug!(
            split = %split,
            schema = %self.schema.as_ref().map(ToString::to_string).unwrap_or_default(),
            "reader ready"
        );
        Ok(())
    }

    /// Restore a reader from a checkpoint: adopt the checkpointed schema, open
    /// `split` and seek to the checkpointed position. Never runs inference.
    ///
    /// # Errors
    /// [`SheetError::InvalidState`] unless the reader is unopened; source errors
    /// while opening or seeking.
    pub fn reopen(&mut self, split: &SheetSplit, state: CheckpointState) -> Result<()> {
        self.ensure("reopen", &[ReaderState::Unopened])?;
        let position = state.position();
        let opened = self.start(split, Some(state.schema)).and_then(|()| {
            let source = self.source_mut()?;
            // never seek back onto the header row
            let target = position.max(source.position());
            source.seek(target)
        });
        self.finish_start(opened)?;
        info!(split = %split, position = %position, "reader restored from checkpoint");
        Ok(())
    }

    /// Read the next record, reusing `reuse` as the output buffer when given.
    ///
    /// Returns `Ok(None)` once the split is exhausted (and on every call after).
    /// A conversion error consumes the offending row; the position has already
    /// moved past it.
    ///
    /// # Errors
    /// [`SheetError::Conversion`] when a cell does not fit its column type,
    /// [`SheetError::Source`] when the source fails, [`SheetError::InvalidState`]
    /// before open or after close.
    pub fn next_record(&mut self, reuse: Option<S::Output>) -> Result<Option<S::Output>> {
        match self.state {
            ReaderState::Ready => {}
            ReaderState::Exhausted => return Ok(None),
            other => return Err(SheetError::invalid_state("next_record", other)),
        }
        let Some(row) = self.source_mut()?.next_row()? else {
            self.state = ReaderState::Exhausted;
            debug!(split = ?self.split.as_ref().map(ToString::to_string), "split exhausted");
            return Ok(None);
        };
        let schema = self
            .schema
            .as_ref()
            .ok_or_else(|| SheetError::invalid_state("next_record", self.state))?;
        let shaped = self
            .shaper
            .shape_row(&self.converter, &row, schema, reuse)?;
        Ok(Some(shaped))
    }

    /// Snapshot of the current position and schema.
    ///
    /// # Errors
    /// [`SheetError::InvalidState`] unless the reader is ready or exhausted.
    pub fn current_state(&self) -> Result<CheckpointState> {
        self.ensure(
            "current_state",
            &[ReaderState::Ready, ReaderState::Exhausted],
        )?;
        match (&self.source, &self.schema) {
            (Some(source), Some(schema)) => {
                Ok(CheckpointState::new(source.position(), schema.clone()))
            }
            _ => Err(SheetError::invalid_state("current_state", self.state)),
        }
    }

    /// Release the source. Valid in any state; the reader stays closed.
    ///
    /// # Errors
    /// Returns the source's error if releasing it fails; the reader is closed
    /// regardless.
    pub fn close(&mut self) -> Result<()> {
        self.state = ReaderState::Closed;
        if let Some(mut source) = self.source.take() {
            debug!(split = ?self.split.as_ref().map(ToString::to_string), "closing reader");
            source.close()?;
        }
        Ok(())
    }

    /// Iterate the remaining records without reuse buffers.
    pub fn records(&mut self) -> Records<'_, O, S> {
        Records {
            reader: self,
            failed: false,
        }
    }

    fn ensure(&self, operation: &'static str, allowed: &[ReaderState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SheetError::invalid_state(operation, self.state))
        }
    }

    fn source_mut(&mut self) -> Result<&mut O::Source> {
        let state = self.state;
        self.source
            .as_mut()
            .ok_or_else(|| SheetError::invalid_state("read", state))
    }

    /// Open the reading source, consume the header and settle the schema: the
    /// given one, else the custom one, else an inferred one.
    fn start(&mut self, split: &SheetSplit, schema: Option<Schema>) -> Result<()> {
        self.split = Some(split.clone());
        let mut source = self.opener.open(split)?;
        if self.config.has_header {
            self.header = Some(self.read_header(&mut source)?);
        }
        self.source = Some(source);

        let schema = match schema.or_else(|| self.config.custom_schema.clone()) {
            Some(schema) => schema,
            None => {
                self.state = ReaderState::Inferring;
                self.infer(split)?
            }
        };
        self.schema = Some(schema);
        Ok(())
    }

    fn finish_start(&mut self, opened: Result<()>) -> Result<()> {
        match opened {
            Ok(()) => {
                self.state = ReaderState::Ready;
                Ok(())
            }
            Err(e) => {
                // the split is aborted; the error from open wins over any close error
                let _ = self.close();
                Err(e)
            }
        }
    }

    /// Inference pre-pass over a second source for the same split.
    fn infer(&self, split: &SheetSplit) -> Result<Schema> {
        let limit = self.config.infer_limit();
        let mut inferencer = TypeInferencer::new(self.config.formats.clone())
            .with_text_inference(self.config.infer_text_cells);

        let mut scan = self.opener.open(split)?;
        if self.config.has_header {
            scan.next_row()?;
        }
        let mut width = 0;
        if limit == Some(0) {
            // nothing is observed; the first row only sizes the schema
            width = scan.next_row()?.map_or(0, |row| row.len());
        } else {
            while limit.is_none_or(|limit| inferencer.rows_observed() < limit) {
                let Some(row) = scan.next_row()? else {
                    break;
                };
                inferencer.observe(&row);
            }
        }
        scan.close()?;

        let observed = inferencer.rows_observed();
        let mut schema = inferencer.finalize();
        width = width.max(self.header.as_ref().map_or(0, Vec::len));
        if width > schema.len() {
            schema = schema
                .iter()
                .chain(std::iter::repeat(ColumnType::String))
                .take(width)
                .collect();
        }
        debug!(split = %split, rows = observed, limit = ?limit, schema = %schema, "inferred schema");
        Ok(schema)
    }

    fn read_header(&self, source: &mut O::Source) -> Result<Vec<String>> {
        let Some(row) = source.next_row()? else {
            return Ok(Vec::new());
        };
        row.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| -> Result<String> {
                if cell.is_empty() {
                    return Ok(format!("column_{i}"));
                }
                let value = self.converter.convert_cell(i, cell, ColumnType::String)?;
                Ok(value.to_string())
            })
            .collect()
    }
}

impl<O: SourceOpener, S: RecordShaper> Drop for SheetReader<O, S> {
    fn drop(&mut self) {
        if self.source.is_some() {
            let _ = self.close();
        }
    }
}

/// Iterator over the remaining records of a reader. Stops after the first error.
pub struct Records<'a, O: SourceOpener, S: RecordShaper> {
    reader: &'a mut SheetReader<O, S>,
    failed: bool,
}

impl<O: SourceOpener, S: RecordShaper> Iterator for Records<'_, O, S> {
    type Item = Result<S::Output>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.reader.next_record(None) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// A reader producing [`TypedRecord`]s.
pub type RowReader<O> = SheetReader<O, RowShaper>;
