//! Spreadsheet reading tests against real .xlsx files
//!
//! Fixtures are written with rust_xlsxwriter into a temp dir, then read back
//! through the same path the CLI uses.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use royalbit_tally::core::{DecimalPolicy, Strategy};
use royalbit_tally::error::TallyError;
use royalbit_tally::excel::{discover_files, SheetFormat, SheetReader};
use royalbit_tally::types::Cell;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_header(sheet: &mut rust_xlsxwriter::Worksheet) {
    for (col, header) in ["Date", "North", "South", "East", "West"]
        .iter()
        .enumerate()
    {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
}

/// Reference workbook: the duplicate/date-error scenario with mixed cell types
fn write_reference_workbook(path: &Path) {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let sheet = workbook.add_worksheet();
    write_header(sheet);

    // Typed date cell
    let jan1 = ExcelDateTime::from_ymd(2024, 1, 1).unwrap();
    sheet
        .write_datetime_with_format(1, 0, &jan1, &date_format)
        .unwrap();
    for (k, v) in [1.0, 2.0, 3.0, 4.0].iter().enumerate() {
        sheet.write_number(1, k as u16 + 1, *v).unwrap();
    }

    // Same day as text
    sheet.write_string(2, 0, "2024-01-01").unwrap();
    for k in 1..=4 {
        sheet.write_number(2, k, 5.0).unwrap();
    }

    // Unparseable date
    sheet.write_string(3, 0, "bad").unwrap();
    for k in 1..=4 {
        sheet.write_number(3, k, 1.0).unwrap();
    }

    workbook.save(path).unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════
// READER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_read_skips_header_and_pads_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.xlsx");
    write_reference_workbook(&path);

    let reader = SheetReader::new(&path);
    assert_eq!(reader.format().unwrap(), SheetFormat::Xlsx);

    let sheet = reader.read().unwrap();

    assert_eq!(sheet.len(), 3);
    assert!(sheet.rows.iter().all(|row| row.len() == 5));
    assert_eq!(
        sheet.rows[0][0],
        Cell::DateTime(date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap())
    );
    assert_eq!(sheet.rows[1][0], Cell::text("2024-01-01"));
    assert_eq!(sheet.rows[2][0], Cell::text("bad"));
}

#[test]
fn test_reference_workbook_through_every_strategy() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.xlsx");
    write_reference_workbook(&path);
    let sheet = SheetReader::new(&path).read().unwrap();

    for strategy in Strategy::ALL {
        let result = strategy.build(DecimalPolicy::Truncate).interpret(&sheet.rows);

        assert_eq!(result.series.len(), 1, "{}", strategy);
        assert_eq!(result.series[&date(2024, 1, 1)], 20);
        assert_eq!(result.diagnostics.total_rows, 3);
        assert_eq!(result.diagnostics.date_errors, 1);
        assert_eq!(result.diagnostics.duplicates.len(), 1);
        assert_eq!(result.diagnostics.duplicates[0].row, 3);
        assert!(result.diagnostics.invalid_cells.is_empty());
    }
}

#[test]
fn test_only_first_worksheet_is_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("multi.xlsx");

    let mut workbook = Workbook::new();
    let first = workbook.add_worksheet();
    write_header(first);
    first.write_string(1, 0, "2024-02-01").unwrap();
    first.write_number(1, 1, 9.0).unwrap();

    let second = workbook.add_worksheet();
    write_header(second);
    for row in 1..=10 {
        second.write_string(row, 0, "2024-03-01").unwrap();
    }
    workbook.save(&path).unwrap();

    let sheet = SheetReader::new(&path).read().unwrap();

    assert_eq!(sheet.len(), 1);
    assert_eq!(sheet.rows[0][0], Cell::text("2024-02-01"));
    assert_eq!(sheet.rows[0][1], Cell::Float(9.0));
}

#[test]
fn test_blank_rows_keep_sheet_row_numbers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gaps.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    write_header(sheet);
    // Rows 2 and 3 (1-based) are left blank
    sheet.write_string(3, 0, "2024-01-05").unwrap();
    sheet.write_string(3, 1, "oops").unwrap();
    workbook.save(&path).unwrap();

    let sheet = SheetReader::new(&path).read().unwrap();
    let result = Strategy::Row
        .build(DecimalPolicy::Truncate)
        .interpret(&sheet.rows);

    assert_eq!(sheet.len(), 3);
    assert_eq!(result.diagnostics.date_errors, 2);
    // Sheet row 4 holds the data
    assert_eq!(result.diagnostics.invalid_cells[0].row, 4);
    assert_eq!(result.diagnostics.invalid_cells[0].count, 4);
}

#[test]
fn test_mixed_cell_types() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mixed.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    write_header(sheet);
    sheet.write_number(1, 0, 45292.0).unwrap();
    sheet.write_string(1, 1, "abc").unwrap();
    sheet.write_number(1, 2, 5.0).unwrap();
    sheet.write_boolean(1, 3, true).unwrap();
    sheet.write_string(1, 4, "3").unwrap();
    workbook.save(&path).unwrap();

    let sheet = SheetReader::new(&path).read().unwrap();

    for strategy in Strategy::ALL {
        let result = strategy.build(DecimalPolicy::Truncate).interpret(&sheet.rows);
        // Serial 45292 is 2024-01-01
        assert_eq!(result.series[&date(2024, 1, 1)], 8);
        assert_eq!(result.diagnostics.invalid_cells[0].count, 2);
    }
}

#[test]
fn test_header_only_workbook() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.xlsx");

    let mut workbook = Workbook::new();
    write_header(workbook.add_worksheet());
    workbook.save(&path).unwrap();

    let sheet = SheetReader::new(&path).read().unwrap();
    assert!(sheet.is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// ODS TESTS
// ═══════════════════════════════════════════════════════════════════════════

/// Committed LibreOffice-style workbook: typed date and date-time cells,
/// floats, a string and a boolean amount, and two repeated blank rows
fn ods_fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/daily_log.ods")
}

#[test]
fn test_read_ods_fixture() {
    let reader = SheetReader::new(ods_fixture());
    assert_eq!(reader.format().unwrap(), SheetFormat::Ods);

    let sheet = reader.read().unwrap();

    assert_eq!(sheet.len(), 4);
    assert_eq!(
        sheet.rows[0],
        vec![
            Cell::text("2024-01-01"),
            Cell::Float(1.0),
            Cell::Float(2.0),
            Cell::Float(3.0),
            Cell::Float(4.0),
        ]
    );
    // number-rows-repeated="2" expands into two blank rows
    assert!(sheet.rows[1].iter().all(|c| *c == Cell::Empty));
    assert!(sheet.rows[2].iter().all(|c| *c == Cell::Empty));
    assert_eq!(
        sheet.rows[3],
        vec![
            Cell::text("2024-01-01T10:30:00"),
            Cell::text("abc"),
            Cell::Float(5.0),
            Cell::Bool(true),
            Cell::Float(3.7),
        ]
    );
}

#[test]
fn test_ods_fixture_through_every_strategy() {
    let sheet = SheetReader::new(ods_fixture()).read().unwrap();

    for strategy in Strategy::ALL {
        let result = strategy.build(DecimalPolicy::Truncate).interpret(&sheet.rows);
        let diagnostics = &result.diagnostics;

        // Sheet row 5 overwrites row 2: 0 + 5 + 0 + 3
        assert_eq!(
            result.series.iter().collect::<Vec<_>>(),
            vec![(&date(2024, 1, 1), &8)],
            "{}",
            strategy
        );
        assert_eq!(diagnostics.total_rows, 4);
        assert_eq!(diagnostics.date_errors, 2);
        assert_eq!(
            diagnostics
                .invalid_cells
                .iter()
                .map(|c| (c.row, c.count))
                .collect::<Vec<_>>(),
            vec![(5, 2)]
        );
        assert_eq!(
            diagnostics
                .duplicates
                .iter()
                .map(|d| (d.row, d.date))
                .collect::<Vec<_>>(),
            vec![(5, date(2024, 1, 1))]
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// FAILURES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_corrupt_files_are_workbook_errors() {
    let dir = TempDir::new().unwrap();
    for name in ["broken.xlsx", "broken.ods"] {
        let path = dir.path().join(name);
        fs::write(&path, b"PK\x03\x04 truncated").unwrap();

        let err = SheetReader::new(&path).read().unwrap_err();
        assert!(matches!(err, TallyError::Workbook { .. }), "{}", name);
        assert!(err.to_string().contains(name));
    }
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = SheetReader::new(dir.path().join("gone.xlsx")).read();
    assert!(result.is_err());
}

#[test]
fn test_discovery_matches_reader_formats() {
    let dir = TempDir::new().unwrap();
    write_reference_workbook(&dir.path().join("a.xlsx"));
    fs::write(dir.path().join("b.ODS"), b"").unwrap();
    fs::write(dir.path().join("c.xls"), b"").unwrap();
    fs::write(dir.path().join("d.csv"), b"").unwrap();

    let files = discover_files(dir.path()).unwrap();

    assert_eq!(files.len(), 2);
    for path in &files {
        assert!(SheetReader::new(path).format().is_ok());
    }
}
