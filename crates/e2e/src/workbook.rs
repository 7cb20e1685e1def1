//! Spreadsheet-backed test-case store
//!
//! Reads the first "test cases" sheet of an `.xlsx` workbook and writes
//! results back by overwriting only the "Actual output" and "Status" cells.
//! Results are saved next to the original as `<name>_EXECUTED.xlsx`; once
//! that file exists it becomes the input of the next run.

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use transcheck_common::TestResult;
use umya_spreadsheet::{Spreadsheet, Worksheet};

use crate::cases::{select_sheet, CaseSheet};
use crate::error::{HarnessError, HarnessResult};

pub const EXECUTED_SUFFIX: &str = "_EXECUTED";

/// Original and executed workbook locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookPaths {
    pub original: PathBuf,
    pub executed: PathBuf,
}

impl WorkbookPaths {
    pub fn for_original(original: impl Into<PathBuf>) -> Self {
        let original = original.into();
        let executed = executed_path(&original);
        Self { original, executed }
    }

    /// Executed workbook when present, otherwise the original
    pub fn input(&self) -> &Path {
        if self.executed.exists() {
            &self.executed
        } else {
            &self.original
        }
    }
}

/// `dir/name.xlsx` -> `dir/name_EXECUTED.xlsx`
pub fn executed_path(original: &Path) -> PathBuf {
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match original.extension() {
        Some(ext) => format!("{}{}.{}", stem, EXECUTED_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, EXECUTED_SUFFIX),
    };
    original.with_file_name(name)
}

/// An opened workbook and its parsed case sheet
pub struct CaseWorkbook {
    book: Spreadsheet,
    sheet_index: usize,
    sheet: CaseSheet,
    source: PathBuf,
}

impl CaseWorkbook {
    /// Open a workbook and parse its test-case sheet
    pub fn open(path: &Path) -> HarnessResult<Self> {
        let book = umya_spreadsheet::reader::xlsx::read(path).map_err(|e| {
            HarnessError::Workbook(format!("failed to read {}: {}", path.display(), e))
        })?;

        let names: Vec<String> = book
            .get_sheet_collection()
            .iter()
            .map(|ws| ws.get_name().to_string())
            .collect();
        if names.is_empty() {
            return Err(HarnessError::Workbook(format!(
                "{} contains no worksheets",
                path.display()
            )));
        }
        let sheet_index = select_sheet(&names);
        let worksheet = &book.get_sheet_collection()[sheet_index];
        let sheet = CaseSheet::parse(read_grid(worksheet))?;

        info!(
            "Loaded sheet '{}' from {} (header on row {})",
            names[sheet_index],
            path.display(),
            sheet.header_row() + 1
        );

        Ok(Self {
            book,
            sheet_index,
            sheet,
            source: path.to_path_buf(),
        })
    }

    /// Open the executed workbook if it exists, else the original
    pub fn open_latest(paths: &WorkbookPaths) -> HarnessResult<Self> {
        Self::open(paths.input())
    }

    pub fn sheet(&self) -> &CaseSheet {
        &self.sheet
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Overwrite the actual/status cells for each result
    ///
    /// Both are stored as text so numeric-looking output keeps its exact form.
    pub fn apply(&mut self, results: &[TestResult]) -> HarnessResult<()> {
        let columns = self.sheet.columns();
        let worksheet = self
            .book
            .get_sheet_collection_mut()
            .get_mut(self.sheet_index)
            .ok_or_else(|| HarnessError::Workbook("case sheet disappeared".into()))?;

        for result in results {
            let row = cell_index(result.row_index);
            worksheet
                .get_cell_mut((cell_index(columns.actual), row))
                .set_value_string(result.actual_output.clone());
            worksheet
                .get_cell_mut((cell_index(columns.status), row))
                .set_value_string(result.status.to_string());
            debug!(case = %result.case_id, row, status = %result.status, "result cell written");
        }

        self.sheet.apply(results);
        Ok(())
    }

    pub fn save(&self, path: &Path) -> HarnessResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        umya_spreadsheet::writer::xlsx::write(&self.book, path).map_err(|e| {
            HarnessError::Workbook(format!("failed to write {}: {}", path.display(), e))
        })?;
        info!("Results written to: {}", path.display());
        Ok(())
    }
}

// Sheet cells are 1-based (column, row).
fn cell_index(zero_based: usize) -> u32 {
    zero_based as u32 + 1
}

fn read_grid(worksheet: &Worksheet) -> Vec<Vec<String>> {
    let rows = worksheet.get_highest_row();
    let cols = worksheet.get_highest_column();
    (1..=rows)
        .map(|r| (1..=cols).map(|c| worksheet.get_value((c, r))).collect())
        .collect()
}
