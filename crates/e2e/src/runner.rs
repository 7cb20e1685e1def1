//! Suite runner: load cases, run them serially, write results back

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};
use transcheck_common::{HarnessConfig, SuiteKind, TestCase, TestResult};

use crate::error::{HarnessError, HarnessResult};
use crate::page::BrowserPage;
use crate::scenario::ScenarioDriver;
use crate::workbook::{CaseWorkbook, WorkbookPaths};

/// Per-case entry of the JSON report
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub id: String,
    /// 1-based spreadsheet row
    pub row: usize,
    pub status: transcheck_common::Status,
    pub expected: String,
    pub actual: String,
    pub observed: Vec<String>,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of running one suite
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub suite: SuiteKind,
    pub started_at: DateTime<Utc>,
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Which cases of a sheet a run schedules
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    /// Restrict to a single case id
    pub only: Option<String>,
}

impl CaseFilter {
    /// Split the sheet's cases into scheduled ones and the skipped count
    pub fn schedule(&self, suite: SuiteKind, cases: Vec<TestCase>) -> (Vec<TestCase>, usize) {
        let mut skipped = 0;
        let mut scheduled = Vec::new();

        for case in cases {
            // Rows belonging to the other suite count too.
            if !suite.schedules(&case.id) {
                skipped += 1;
                continue;
            }
            if self.only.as_deref().is_some_and(|only| only != case.id) {
                skipped += 1;
                continue;
            }
            scheduled.push(case);
        }

        (scheduled, skipped)
    }
}

/// Runs scenarios one after another on a single page
pub struct SuiteRunner<'a, P: BrowserPage + ?Sized> {
    page: &'a P,
    config: &'a HarnessConfig,
}

impl<'a, P: BrowserPage + ?Sized> SuiteRunner<'a, P> {
    pub fn new(page: &'a P, config: &'a HarnessConfig) -> Self {
        Self { page, config }
    }

    /// Run one case under the scenario timeout; failures become `Fail` results
    pub async fn run_case(&self, suite: SuiteKind, case: &TestCase) -> (TestResult, CaseReport) {
        let start = Instant::now();
        let driver = ScenarioDriver::new(self.page, self.config);
        let budget = self.config.timing.scenario_timeout();

        let outcome = match tokio::time::timeout(budget, driver.run(suite, case)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(HarnessError::ScenarioTimeout(self.config.timing.scenario_timeout_ms)),
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let (result, observed, error) = match outcome {
            Ok(outcome) => (outcome.result, outcome.observed, None),
            Err(e) => {
                error!("✗ {} - {}", case.label(), e);
                (TestResult::failed(case), Vec::new(), Some(e.to_string()))
            }
        };

        if result.status.is_pass() {
            info!("✓ {} ({} ms)", case.label(), duration_ms);
        } else if error.is_none() {
            warn!("✗ {} - expected {:?}, got {:?}", case.label(), case.expected_output.trim(), result.actual_output);
        }

        let report = CaseReport {
            id: case.id.clone(),
            row: case.row_index + 1,
            status: result.status,
            expected: case.expected_output.clone(),
            actual: result.actual_output.clone(),
            observed,
            duration_ms,
            error,
        };
        (result, report)
    }

    /// Run cases strictly in order, collecting results in an owned list
    pub async fn run_cases(&self, suite: SuiteKind, cases: &[TestCase]) -> (Vec<TestResult>, Vec<CaseReport>) {
        info!("Running {} {} case(s)...", cases.len(), suite);

        let mut results = Vec::with_capacity(cases.len());
        let mut reports = Vec::with_capacity(cases.len());
        for case in cases {
            let (result, report) = self.run_case(suite, case).await;
            results.push(result);
            reports.push(report);
        }
        (results, reports)
    }

    /// Load the store, run the suite, write results back and report
    pub async fn run_suite(&self, suite: SuiteKind, filter: &CaseFilter) -> HarnessResult<SuiteReport> {
        let started_at = Utc::now();
        let start = Instant::now();

        self.config.validate()?;

        let paths = WorkbookPaths::for_original(&self.config.workbook);
        let mut workbook = CaseWorkbook::open_latest(&paths)?;
        let (cases, skipped) = filter.schedule(suite, workbook.sheet().cases());

        let (results, reports) = self.run_cases(suite, &cases).await;

        let output = if results.is_empty() {
            None
        } else {
            workbook.apply(&results)?;
            workbook.save(&paths.executed)?;
            Some(paths.executed.clone())
        };

        let passed = results.iter().filter(|r| r.status.is_pass()).count();
        let report = SuiteReport {
            suite,
            started_at,
            source: workbook.source().to_path_buf(),
            output,
            total: results.len(),
            passed,
            failed: results.len() - passed,
            skipped,
            duration_ms: start.elapsed().as_millis() as u64,
            cases: reports,
        };

        info!(
            "{} results: {} passed, {} failed, {} skipped ({} ms)",
            suite, report.passed, report.failed, report.skipped, report.duration_ms
        );

        Ok(report)
    }
}

/// Write a suite report as `<suite>-results.json` under `dir`
pub fn write_report(dir: &Path, report: &SuiteReport) -> HarnessResult<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join(format!("{}-results.json", report.suite));
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)?;

    info!("Report written to: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(id: &str, row: usize) -> TestCase {
        TestCase {
            id: id.to_string(),
            input_text: String::new(),
            expected_output: String::new(),
            row_index: row,
        }
    }

    #[test]
    fn test_schedule_by_suite() {
        let cases = vec![case("Pos_Fun_1", 3), case("Pos_UI_1", 4), case("Other_1", 5)];
        let (scheduled, skipped) = CaseFilter::default().schedule(SuiteKind::Functional, cases);
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].id, "Pos_Fun_1");
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_other_suite_rows_are_skipped() {
        let cases = vec![case("Pos_Fun_1", 3), case("Neg_Fun_2", 4), case("Pos_UI_1", 5)];
        let (scheduled, skipped) = CaseFilter::default().schedule(SuiteKind::Ui, cases);
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].id, "Pos_UI_1");
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_schedule_single_case() {
        let cases = vec![case("Neg_UI_1", 3), case("Neg_UI_2", 4)];
        let filter = CaseFilter { only: Some("Neg_UI_2".into()) };
        let (scheduled, skipped) = filter.schedule(SuiteKind::Ui, cases);
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].row_index, 4);
        assert_eq!(skipped, 1);
    }
}
