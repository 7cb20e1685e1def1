//! Test-case table parsing
//!
//! Works on a plain grid of cell strings so the header and column rules can
//! be exercised without a workbook file.

use serde::Serialize;
use transcheck_common::{SuiteKind, TestCase, TestResult};

use crate::error::{HarnessError, HarnessResult};

pub const TC_ID_HEADER: &str = "TC ID";
pub const INPUT_HEADER: &str = "Input";
pub const EXPECTED_HEADER: &str = "Expected output";
pub const ACTUAL_HEADER: &str = "Actual output";
pub const STATUS_HEADER: &str = "Status";

/// Zero-based column positions of the required headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    pub tc_id: usize,
    pub input: usize,
    pub expected: usize,
    pub actual: usize,
    pub status: usize,
}

impl ColumnMap {
    fn resolve(header: &[String]) -> HarnessResult<Self> {
        let find = |name: &str| header.iter().position(|c| c.trim() == name);

        let mut missing = Vec::new();
        let mut lookup = |name: &str| {
            find(name).unwrap_or_else(|| {
                missing.push(name.to_string());
                0
            })
        };

        let columns = ColumnMap {
            tc_id: lookup(TC_ID_HEADER),
            input: lookup(INPUT_HEADER),
            expected: lookup(EXPECTED_HEADER),
            actual: lookup(ACTUAL_HEADER),
            status: lookup(STATUS_HEADER),
        };

        if missing.is_empty() {
            Ok(columns)
        } else {
            Err(HarnessError::MissingColumns(missing))
        }
    }
}

/// Pick the sheet whose name mentions "test cases", else the first one
pub fn select_sheet<S: AsRef<str>>(names: &[S]) -> usize {
    names
        .iter()
        .position(|n| n.as_ref().to_lowercase().contains("test cases"))
        .unwrap_or(0)
}

/// A parsed test-case sheet
#[derive(Debug, Clone)]
pub struct CaseSheet {
    grid: Vec<Vec<String>>,
    header_row: usize,
    columns: ColumnMap,
}

impl CaseSheet {
    /// Locate the header row and required columns
    pub fn parse(grid: Vec<Vec<String>>) -> HarnessResult<Self> {
        let header_row = grid
            .iter()
            .position(|row| row.iter().any(|c| c.trim() == TC_ID_HEADER))
            .ok_or(HarnessError::HeaderNotFound)?;

        let columns = ColumnMap::resolve(&grid[header_row])?;

        Ok(Self {
            grid,
            header_row,
            columns,
        })
    }

    pub fn header_row(&self) -> usize {
        self.header_row
    }

    pub fn columns(&self) -> ColumnMap {
        self.columns
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.grid
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Every row below the header with a non-empty "TC ID"
    pub fn cases(&self) -> Vec<TestCase> {
        (self.header_row + 1..self.grid.len())
            .filter_map(|r| {
                let id = self.cell(r, self.columns.tc_id).trim();
                if id.is_empty() {
                    return None;
                }
                Some(TestCase {
                    id: id.to_string(),
                    input_text: self.cell(r, self.columns.input).to_string(),
                    expected_output: self.cell(r, self.columns.expected).to_string(),
                    row_index: r,
                })
            })
            .collect()
    }

    /// Cases the given suite schedules
    pub fn cases_for(&self, suite: SuiteKind) -> Vec<TestCase> {
        self.cases()
            .into_iter()
            .filter(|c| suite.schedules(&c.id))
            .collect()
    }

    /// Overwrite the actual/status cells of each result's row
    pub fn apply(&mut self, results: &[TestResult]) {
        let ColumnMap { actual, status, .. } = self.columns;
        for result in results {
            let Some(row) = self.grid.get_mut(result.row_index) else {
                continue;
            };
            let width = actual.max(status) + 1;
            if row.len() < width {
                row.resize(width, String::new());
            }
            row[actual] = result.actual_output.clone();
            row[status] = result.status.to_string();
        }
    }
}
