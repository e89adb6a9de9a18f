//! Testing utilities for code built on ironsheet readers.
//!
//! - **Builders**: assemble in-memory workbooks fluently ([`WorkbookBuilder`])
//! - **Fixtures**: small ready-made workbooks for common scenarios
//! - **Assertions**: compare records and check checkpoint/resume equivalence
//! - **Mock I/O**: temporary CSV files that clean up after themselves
//!
//! # Quick Start
//!
//! ```
//! use ironsheet::*;
//! use ironsheet::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let opener = WorkbookBuilder::new()
//!     .sheet("Sheet1")
//!     .row(["Alice".into(), RawCell::Number(30.0)])
//!     .row(["Bob".into(), RawCell::Number(25.5)])
//!     .into_opener("people.xlsx");
//!
//! let split = SheetSplit::new("people.xlsx");
//! let mut reader = SheetReader::new(&opener, ReaderConfig::default());
//! reader.open(&split)?;
//! let records = drain_records(&mut reader)?;
//! assert_eq!(records[0][1], TypedValue::Decimal(30.into()));
//!
//! assert_resume_equivalent(&opener, &split, &ReaderConfig::default())?;
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod builders;
pub mod fixtures;

#[cfg(feature = "io-csv")]
pub mod mock_io;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;

#[cfg(feature = "io-csv")]
pub use mock_io::*;

use crate::error::Result;
use crate::reader::SheetReader;
use crate::shape::RecordShaper;
use crate::source::SourceOpener;

/// Read every remaining record of an opened reader.
///
/// # Errors
///
/// Returns the first error the reader reports.
pub fn drain_records<O: SourceOpener, S: RecordShaper>(
    reader: &mut SheetReader<O, S>,
) -> Result<Vec<S::Output>> {
    reader.records().collect()
}
