//! Test-case listing

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use transcheck_common::{HarnessConfig, SuiteKind, TestCase};
use transcheck_e2e::workbook::{CaseWorkbook, WorkbookPaths};

use crate::output::{print_info, print_list, OutputFormat, TableDisplay};

#[derive(Debug, Args)]
pub struct CasesArgs {
    /// Only cases scheduled by this suite (functional, ui)
    #[arg(long, value_parser = parse_suite)]
    pub suite: Option<SuiteKind>,
}

fn parse_suite(s: &str) -> Result<SuiteKind, String> {
    match s.to_ascii_lowercase().as_str() {
        "functional" => Ok(SuiteKind::Functional),
        "ui" => Ok(SuiteKind::Ui),
        other => Err(format!("unknown suite: {}", other)),
    }
}

#[derive(Serialize)]
struct CaseRow {
    id: String,
    family: Option<String>,
    row: usize,
    input: String,
    expected: String,
}

impl From<&TestCase> for CaseRow {
    fn from(case: &TestCase) -> Self {
        Self {
            id: case.id.clone(),
            family: case.family().map(|f| f.prefix().to_string()),
            row: case.row_index + 1,
            input: case.input_text.clone(),
            expected: case.expected_output.clone(),
        }
    }
}

impl TableDisplay for CaseRow {
    fn headers() -> Vec<&'static str> {
        vec!["TC ID", "Family", "Row", "Input", "Expected"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.family.clone().unwrap_or_else(|| "-".into()),
            self.row.to_string(),
            self.input.clone(),
            self.expected.clone(),
        ]
    }
}

pub fn execute(args: CasesArgs, config: &HarnessConfig, format: OutputFormat) -> Result<()> {
    let paths = WorkbookPaths::for_original(&config.workbook);
    let workbook = CaseWorkbook::open_latest(&paths)
        .with_context(|| format!("failed to load {}", paths.input().display()))?;
    print_info(&format!("Cases from {}", workbook.source().display()));

    let cases = match args.suite {
        Some(suite) => workbook.sheet().cases_for(suite),
        None => workbook.sheet().cases(),
    };
    let rows: Vec<CaseRow> = cases.iter().map(CaseRow::from).collect();
    print_list(&rows, format);
    Ok(())
}
