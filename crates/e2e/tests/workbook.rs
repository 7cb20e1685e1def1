//! Suite runs against a real `.xlsx` store

mod common;

use std::path::Path;

use transcheck_common::{HarnessConfig, Status, SuiteKind, TestResult};
use transcheck_e2e::runner::write_report;
use transcheck_e2e::workbook::{CaseWorkbook, WorkbookPaths};
use transcheck_e2e::{CaseFilter, HarnessError, SuiteRunner};

use common::FakePage;

const HEADER: [&str; 6] = ["TC ID", "Test case name", "Input", "Expected output", "Actual output", "Status"];

fn write_cell(ws: &mut umya_spreadsheet::Worksheet, col: u32, row: u32, value: &str) {
    ws.get_cell_mut((col, row)).set_value(value.to_string());
}

/// Summary sheet first, then the case sheet with a title row above the header
fn create_workbook(path: &Path) {
    let mut book = umya_spreadsheet::new_file();
    book.get_sheet_collection_mut()[0].set_name("Summary");
    book.new_sheet("Test Cases").unwrap();

    let ws = &mut book.get_sheet_collection_mut()[1];
    write_cell(ws, 1, 1, "Singlish translator checks");
    for (i, h) in HEADER.iter().enumerate() {
        write_cell(ws, i as u32 + 1, 2, h);
    }
    let rows = [
        ["Pos_Fun_0001", "pronoun", "mama", "මම", "", ""],
        ["Neg_Fun_0001", "typo", "oya", "ඔයා", "", ""],
        ["", "note row", "ignored", "", "", ""],
        ["Pos_UI_0001", "live", "Hello World", "ආයුබෝවන් ලොකය", "stale", "Fail"],
    ];
    for (r, cells) in rows.iter().enumerate() {
        for (c, value) in cells.iter().enumerate() {
            write_cell(ws, c as u32 + 1, r as u32 + 3, value);
        }
    }

    umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
}

fn translator_page() -> FakePage {
    FakePage::translator(|v| match v {
        "mama" => "මම".to_string(),
        "oya" => "ඔය".to_string(),
        _ => String::new(),
    })
}

fn read_cell(path: &Path, col: u32, row: u32) -> String {
    let book = umya_spreadsheet::reader::xlsx::read(path).unwrap();
    book.get_sheet_collection()[1].get_value((col, row))
}

#[test]
fn loads_cases_from_named_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cases.xlsx");
    create_workbook(&path);

    let workbook = CaseWorkbook::open(&path).unwrap();
    let sheet = workbook.sheet();
    assert_eq!(sheet.header_row(), 1);

    let ids: Vec<String> = sheet.cases().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["Pos_Fun_0001", "Neg_Fun_0001", "Pos_UI_0001"]);
    assert_eq!(sheet.cases_for(SuiteKind::Ui)[0].row_index, 5);
}

#[test]
fn missing_header_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.xlsx");
    let mut book = umya_spreadsheet::new_file();
    write_cell(&mut book.get_sheet_collection_mut()[0], 1, 1, "Nothing here");
    umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();

    assert!(matches!(CaseWorkbook::open(&path), Err(HarnessError::HeaderNotFound)));
}

#[tokio::test(start_paused = true)]
async fn functional_run_writes_executed_copy() {
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("cases.xlsx");
    create_workbook(&original);

    let page = translator_page();
    let config = HarnessConfig {
        workbook: original.clone(),
        ..Default::default()
    };
    let report = SuiteRunner::new(&page, &config)
        .run_suite(SuiteKind::Functional, &CaseFilter::default())
        .await
        .unwrap();

    let executed = WorkbookPaths::for_original(&original).executed;
    assert_eq!(report.output.as_deref(), Some(executed.as_path()));
    assert_eq!((report.total, report.passed, report.failed), (2, 1, 1));
    // The UI row belongs to the other suite.
    assert_eq!(report.skipped, 1);

    assert_eq!(read_cell(&executed, 5, 3), "මම");
    assert_eq!(read_cell(&executed, 6, 3), "Pass");
    assert_eq!(read_cell(&executed, 5, 4), "ඔය");
    assert_eq!(read_cell(&executed, 6, 4), "Fail");
    // UI row and free text untouched
    assert_eq!(read_cell(&executed, 5, 6), "stale");
    assert_eq!(read_cell(&executed, 2, 5), "note row");
    assert_eq!(read_cell(&executed, 1, 1), "Singlish translator checks");
    // Original left as-is
    assert_eq!(read_cell(&original, 6, 3), "");

    let report_path = write_report(&dir.path().join("results"), &report).unwrap();
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(json["suite"], "functional");
    assert_eq!(json["cases"][0]["row"], 3);
}

#[tokio::test(start_paused = true)]
async fn rerun_builds_on_executed_store() {
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("cases.xlsx");
    create_workbook(&original);
    let executed = WorkbookPaths::for_original(&original).executed;

    let config = HarnessConfig {
        workbook: original.clone(),
        ..Default::default()
    };

    let first_page = translator_page();
    SuiteRunner::new(&first_page, &config)
        .run_suite(SuiteKind::Functional, &CaseFilter::default())
        .await
        .unwrap();

    // Second run only touches the UI row; functional results must survive.
    let ui_page = FakePage::translator(|v| match v {
        "Hello W" => "ආයු".to_string(),
        "Hello World" => "ආයුබෝවන් ලොකය".to_string(),
        _ => String::new(),
    });
    let report = SuiteRunner::new(&ui_page, &config)
        .run_suite(SuiteKind::Ui, &CaseFilter::default())
        .await
        .unwrap();

    assert_eq!(report.source, executed);
    assert_eq!(report.passed, 1);
    assert_eq!(read_cell(&executed, 5, 6), "ආයුබෝවන් ලොකය");
    assert_eq!(read_cell(&executed, 6, 6), "Pass");
    assert_eq!(read_cell(&executed, 6, 3), "Pass");
    assert_eq!(read_cell(&executed, 5, 4), "ඔය");
}

#[tokio::test(start_paused = true)]
async fn nothing_scheduled_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("cases.xlsx");
    create_workbook(&original);

    let page = translator_page();
    let config = HarnessConfig {
        workbook: original.clone(),
        ..Default::default()
    };
    let filter = CaseFilter { only: Some("Pos_Fun_9999".into()) };
    let report = SuiteRunner::new(&page, &config)
        .run_suite(SuiteKind::Functional, &filter)
        .await
        .unwrap();

    assert_eq!(report.total, 0);
    assert!(report.output.is_none());
    assert!(!WorkbookPaths::for_original(&original).executed.exists());
}

#[test]
fn numeric_looking_output_is_stored_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("cases.xlsx");
    create_workbook(&original);
    let executed = WorkbookPaths::for_original(&original).executed;

    let mut workbook = CaseWorkbook::open(&original).unwrap();
    let case = workbook.sheet().cases().remove(0);
    workbook
        .apply(&[TestResult::new(&case, "007", Status::Fail)])
        .unwrap();
    workbook.save(&executed).unwrap();

    assert_eq!(read_cell(&executed, 5, 3), "007");
    assert_eq!(read_cell(&executed, 6, 3), "Fail");

    // The executed copy feeds the next run unchanged.
    let reopened = CaseWorkbook::open(&executed).unwrap();
    let columns = reopened.sheet().columns();
    assert_eq!(reopened.sheet().cell(case.row_index, columns.actual), "007");
}

#[tokio::test(start_paused = true)]
async fn invalid_config_is_rejected_before_loading() {
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("cases.xlsx");
    create_workbook(&original);

    let page = translator_page();
    let mut config = HarnessConfig {
        workbook: original.clone(),
        ..Default::default()
    };
    config.timing.stable_repeats = 0;

    let err = SuiteRunner::new(&page, &config)
        .run_suite(SuiteKind::Functional, &CaseFilter::default())
        .await
        .unwrap_err();

    assert!(matches!(err, HarnessError::Config(_)));
    assert!(page.actions().is_empty());
    assert!(!WorkbookPaths::for_original(&original).executed.exists());
}
