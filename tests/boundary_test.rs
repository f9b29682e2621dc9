//! Boundary Tests for pulldata
//!
//! Missing and empty sheets, short rows, and the guarantee that a failed run
//! leaves earlier output files untouched.

use pulldata::{Category, FetchStatus, Locale, PublisherBuilder, PullDataError, WorkbookSource};
use rust_xlsxwriter::*;
use std::io::Cursor;

// Helper module for generating boundary test fixtures
mod fixtures {
    use super::*;

    /// Generate a workbook whose sheets are unrelated to the roster
    pub fn generate_unrelated_workbook() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Budget")?;
        worksheet.write_string(0, 0, "Line item")?;
        Ok(workbook.save_to_buffer()?)
    }

    /// Generate all five sheets containing only their header row
    pub fn generate_headers_only() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        for category in Category::ALL {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(category.name())?;
            worksheet.write_string(0, 0, "Name")?;
        }
        Ok(workbook.save_to_buffer()?)
    }

    /// Generate a workbook with a single sheet holding the given rows below a header
    pub fn generate_single_sheet(name: &str, rows: &[&[&str]]) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name)?;
        worksheet.write_string(0, 0, "Name")?;
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    worksheet.write_string(r as u32 + 1, c as u16, *value)?;
                }
            }
        }
        Ok(workbook.save_to_buffer()?)
    }
}

fn source(data: Vec<u8>) -> WorkbookSource<Cursor<Vec<u8>>> {
    WorkbookSource::from_reader(Cursor::new(data)).unwrap()
}

#[test]
fn test_missing_sheets_are_reported_and_rendered_empty() {
    let dir = tempfile::tempdir().unwrap();
    let publisher = PublisherBuilder::new()
        .with_output_dir(dir.path())
        .build()
        .unwrap();

    let mut source = source(fixtures::generate_unrelated_workbook().unwrap());
    let report = publisher.publish(&mut source).unwrap();

    assert_eq!(report.failed_categories(), Category::ALL.to_vec());
    for locale in Locale::ALL {
        let html = std::fs::read_to_string(report.files.get(locale)).unwrap();
        assert_eq!(html.matches("<details>").count(), 5);
        assert_eq!(html.matches("</details>").count(), 5);
        assert!(!html.contains("<li>"));
    }
}

#[test]
fn test_header_only_sheets_are_empty_not_failed() {
    let publisher = PublisherBuilder::new().build().unwrap();
    let mut source = source(fixtures::generate_headers_only().unwrap());
    let collected = publisher.collect(&mut source).unwrap();

    assert!(collected.dataset.is_empty());
    for fetch in &collected.fetches {
        assert_eq!(fetch.status, FetchStatus::Empty, "{}", fetch.category);
    }
}

#[test]
fn test_empty_sections_keep_wrapper_markup() {
    let publisher = PublisherBuilder::new().build().unwrap();
    let mut source = source(fixtures::generate_headers_only().unwrap());
    let collected = publisher.collect(&mut source).unwrap();
    let html = publisher.render_to_strings(&collected.dataset).unwrap();

    let page = html.get(Locale::En);
    assert!(page.contains(concat!(
        "<div class=\"columns limit with-max with-margin to-4 then-3 finally-2\">\n",
        "                            </div>"
    )));
    assert!(page.contains("                <ul>\n                </ul>"));
    assert!(page.ends_with("        </details>"));
}

#[test]
fn test_short_federal_row_is_fatal() {
    let data = fixtures::generate_single_sheet(
        "Federal Staff",
        &[&["Jane Doe", "", "Washington", "", "Senator"]],
    )
    .unwrap();

    let publisher = PublisherBuilder::new().build().unwrap();
    let err = publisher.collect(&mut source(data)).unwrap_err();

    assert!(err.is_fatal());
    match err {
        PullDataError::MissingCell {
            category,
            column,
            field,
            ..
        } => {
            assert_eq!(category, "Federal Staff");
            assert_eq!(column, 5);
            assert_eq!(field, "image_url");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_blank_row_between_entries_is_fatal() {
    let data = fixtures::generate_single_sheet(
        "City Staff",
        &[&["Kim", "Mayor", "City"], &[], &["Diaz", "Clerk", "City"]],
    )
    .unwrap();

    let publisher = PublisherBuilder::new().build().unwrap();
    let err = publisher.collect(&mut source(data)).unwrap_err();
    assert!(matches!(err, PullDataError::MissingCell { row: 1, .. }));
}

#[test]
fn test_trailing_blank_rows_are_ignored() {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("City Staff").unwrap();
    worksheet.write_string(0, 0, "Name").unwrap();
    worksheet.write_string(1, 0, "Kim").unwrap();
    worksheet.write_string(1, 1, "Mayor").unwrap();
    worksheet.write_string(1, 2, "City").unwrap();
    // 書式のみのセル（値なし）
    worksheet.write_blank(5, 0, &Format::new().set_bold()).unwrap();
    let data = workbook.save_to_buffer().unwrap();

    let publisher = PublisherBuilder::new().build().unwrap();
    let collected = publisher.collect(&mut source(data)).unwrap();
    assert_eq!(collected.dataset.city_staff.len(), 1);
}

#[test]
fn test_failed_run_keeps_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let previous = dir.path().join("PulledDataPage_en.html");
    std::fs::write(&previous, "previous run").unwrap();

    let data = fixtures::generate_single_sheet("Education Staff", &[&["Ann", "Trustee"]]).unwrap();
    let publisher = PublisherBuilder::new()
        .with_output_dir(dir.path())
        .build()
        .unwrap();

    assert!(publisher.publish(&mut source(data)).is_err());

    assert_eq!(std::fs::read_to_string(&previous).unwrap(), "previous run");
    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["PulledDataPage_en.html".to_string()]);
}

#[test]
fn test_missing_output_dir_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let publisher = PublisherBuilder::new()
        .with_output_dir(dir.path().join("missing"))
        .build()
        .unwrap();

    let mut source = source(fixtures::generate_headers_only().unwrap());
    let err = publisher.publish(&mut source).unwrap_err();
    assert!(matches!(err, PullDataError::Io(_)));
}
