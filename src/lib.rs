//! # Ironsheet
//!
//! An **incremental, schema-inferring reader** for tabular sources such as
//! spreadsheet workbooks and CSV files. Ironsheet turns loosely-typed cells into
//! typed records, infers column types from a bounded prefix of the data, and can
//! checkpoint and resume a read at any record boundary.
//!
//! ## Key Features
//!
//! - **Bounded schema inference** - at most `max_infer_rows` rows are observed, on a
//!   second source, before the first record is produced
//! - **Type widening** - integers widen to decimals, dates to date-times, and every
//!   other conflict to strings
//! - **Checkpoint/resume** - `(sheet, row, schema)` snapshots restore a reader without
//!   re-inferring
//! - **Pluggable sources** - implement [`CellSource`] and [`SourceOpener`]; in-memory
//!   workbooks and CSV files come built in
//! - **Row or array output** - pick a [`RecordShaper`], or shape with any closure
//! - **Batch helpers** - read one split or many, sequentially or with Rayon
//!
//! ## Quick Start
//!
//! ```
//! use ironsheet::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let workbook = MemoryWorkbook::single_sheet(vec![
//!     vec!["Alice".into(), RawCell::Number(30.0)],
//!     vec!["Bob".into(), RawCell::Number(25.5)],
//! ]);
//! let opener = MemoryOpener::new().with_workbook("people.xlsx", workbook);
//!
//! let mut reader = SheetReader::new(&opener, ReaderConfig::default());
//! reader.open(&SheetSplit::new("people.xlsx"))?;
//! assert_eq!(reader.schema().map(ToString::to_string).as_deref(), Some("[STRING, DECIMAL]"));
//!
//! while let Some(record) = reader.next_record(None)? {
//!     println!("{}", record[0]);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Sources and splits
//!
//! A [`SheetSplit`] names one source file. A [`SourceOpener`] opens a fresh
//! [`CellSource`] for it: a lazy, positioned stream of [`RawRow`]s that walks every
//! sheet in order. Positions are `(sheet_index, row_index)` pairs pointing at the
//! *next* row.
//!
//! ### Schema inference
//!
//! Without a custom schema, [`SheetReader::open`] opens the split a second time and
//! feeds up to `max_infer_rows` rows to a [`TypeInferencer`]. Rows after the bound are
//! never looked at, so a late outlier surfaces as a [`ConversionError`] when it is
//! read.
//!
//! ### Checkpoints
//!
//! [`SheetReader::current_state`] returns a [`CheckpointState`]; hand it to
//! [`SheetReader::reopen`] on a fresh reader to continue exactly where the old one
//! stood. The [`checkpoint`] module also has an on-disk store (feature `checkpointing`).
//!
//! ## Feature Flags
//!
//! - `io-csv` - CSV files as single-sheet sources
//! - `compression-gzip` / `compression-zstd` - transparent decompression of file sources
//! - `checkpointing` - the on-disk [`CheckpointStore`](checkpoint::CheckpointStore)
//! - `parallel-io` - [`read_splits_par`]
//!
//! ## Module Overview
//!
//! - [`cell`] - raw cells, rows and positions
//! - [`schema`] - column types and the widening rules
//! - [`format`] - number and date formats used for parsing and rendering text
//! - [`infer`] - the type inferencer
//! - [`convert`] - typed values and the row converter
//! - [`source`] - the source traits and in-memory workbooks
//! - [`shape`] - record shaping strategies
//! - [`reader`] - the reader state machine
//! - [`checkpoint`] - checkpoint state and storage
//! - [`io`] - file sources, decompression and globbing
//! - [`helpers`] - whole-split and batch reads
//! - [`testing`] - builders, fixtures and assertions for tests

pub mod cell;
pub mod checkpoint;
pub mod convert;
pub mod error;
pub mod format;
pub mod helpers;
pub mod infer;
pub mod io;
pub mod reader;
pub mod schema;
pub mod shape;
pub mod source;
pub mod testing;

// General re-exports
pub use cell::{RawCell, RawRow, ReaderPosition};
pub use checkpoint::CheckpointState;
pub use convert::{ConversionError, RowConverter, TypedRecord, TypedValue};
pub use error::{Result, SheetError};
pub use format::{CellFormats, DecimalFormat};
pub use helpers::*;
pub use infer::TypeInferencer;
pub use reader::{ReaderConfig, ReaderState, RowReader, SheetReader};
pub use schema::{ColumnType, Schema};
pub use shape::{ArrayShaper, RecordShaper, RowShaper};
pub use source::{
    CellSource, MemoryOpener, MemorySheet, MemorySource, MemoryWorkbook, SheetSplit, SourceOpener,
};

// Gated re-exports
#[cfg(feature = "checkpointing")]
pub use checkpoint::{CheckpointStore, CheckpointStoreConfig};

#[cfg(feature = "io-csv")]
pub use io::csv::{CsvOpener, CsvSource};

pub use io::glob::{splits_from_glob, splits_from_glob_required};
