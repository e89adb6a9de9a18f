//! Tests for the public testing helpers.

use ironsheet::testing::*;
use ironsheet::*;

#[test]
fn fixtures_have_the_documented_shape() {
    assert_eq!(people_workbook().row_count(), 2);
    assert_eq!(people_with_header_workbook().row_count(), 3);
    assert_eq!(multi_sheet_workbook().sheets.len(), 3);
    assert!(multi_sheet_workbook().sheets[1].rows.is_empty());
    assert_eq!(late_text_workbook(4).row_count(), 5);
    assert_eq!(dates_workbook().sheets[0].rows[0].len(), 2);
}

#[test]
fn builder_output_reads_back() -> anyhow::Result<()> {
    let opener = WorkbookBuilder::new()
        .sheet("a")
        .rows(number_rows(0, 3))
        .into_opener("built.xlsx");
    let records = read_sheet_vec(&opener, &SheetSplit::new("built.xlsx"), ReaderConfig::default())?;
    assert_records_equal(
        &records,
        &[
            vec![TypedValue::Integer(0)],
            vec![TypedValue::Integer(1)],
            vec![TypedValue::Integer(2)],
        ],
    );
    Ok(())
}

#[test]
#[should_panic(expected = "Record count mismatch")]
fn assert_records_equal_reports_length() {
    assert_records_equal(&[], &[vec![TypedValue::Null]]);
}

#[cfg(feature = "io-csv")]
#[test]
fn temp_csv_is_removed_on_drop() -> anyhow::Result<()> {
    let file = write_temp_csv("a\n")?;
    let path = file.path().to_path_buf();
    assert!(path.exists());
    drop(file);
    assert!(!path.exists());
    Ok(())
}
