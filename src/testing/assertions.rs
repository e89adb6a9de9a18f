//! Assertion functions for reader output.

use crate::convert::{TypedRecord, TypedValue};
use crate::error::Result;
use crate::reader::{ReaderConfig, SheetReader};
use crate::source::{SheetSplit, SourceOpener};

/// Assert that records hold exactly the expected values, in order.
///
/// # Panics
///
/// Panics if the record counts differ or any record differs.
///
/// # Example
///
/// ```
/// use ironsheet::{TypedRecord, TypedValue};
/// use ironsheet::testing::assert_records_equal;
///
/// let actual = vec![TypedRecord::new(vec![TypedValue::Integer(1)])];
/// assert_records_equal(&actual, &[vec![TypedValue::Integer(1)]]);
/// ```
pub fn assert_records_equal(actual: &[TypedRecord], expected: &[Vec<TypedValue>]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Record count mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(
            a.values(),
            e.as_slice(),
            "Record mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}"
        );
    }
}

/// Assert that checkpointing after any record and restoring into a fresh reader
/// yields exactly the remaining records of an uninterrupted read.
///
/// The split must read without conversion errors.
///
/// # Errors
///
/// Returns the first error raised by any of the readers.
///
/// # Panics
///
/// Panics if a restored reader yields a different suffix.
pub fn assert_resume_equivalent<O: SourceOpener>(
    opener: &O,
    split: &SheetSplit,
    config: &ReaderConfig,
) -> Result<()> {
    let mut reader = SheetReader::new(opener, config.clone());
    reader.open(split)?;
    let mut records = Vec::new();
    let mut checkpoints = vec![reader.current_state()?];
    while let Some(record) = reader.next_record(None)? {
        records.push(record);
        checkpoints.push(reader.current_state()?);
    }
    reader.close()?;

    for (k, checkpoint) in checkpoints.into_iter().enumerate() {
        let mut resumed = SheetReader::new(opener, config.clone());
        resumed.reopen(split, checkpoint)?;
        let rest: Vec<TypedRecord> = resumed.records().collect::<Result<_>>()?;
        assert_eq!(
            rest,
            records[k..],
            "Resuming after {k} record(s) diverged from the uninterrupted read"
        );
    }
    Ok(())
}
