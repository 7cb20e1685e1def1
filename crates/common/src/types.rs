//! Core types for transcheck

use serde::{Deserialize, Serialize};

/// A single row of the test-case table
///
/// Immutable once loaded. `row_index` is the zero-based row position in the
/// source sheet, so the spreadsheet row number shown to humans is
/// `row_index + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub input_text: String,
    pub expected_output: String,
    pub row_index: usize,
}

impl TestCase {
    /// Family this case belongs to, derived from its id prefix
    pub fn family(&self) -> Option<CaseFamily> {
        CaseFamily::of(&self.id)
    }

    /// Label used in logs and reports, e.g. `Pos_Fun_0001 | ROW_12`
    pub fn label(&self) -> String {
        format!("{} | ROW_{}", self.id, self.row_index + 1)
    }
}

/// Pass/fail outcome written to the "Status" column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Pass,
    Fail,
}

impl Status {
    pub fn from_bool(passed: bool) -> Self {
        if passed {
            Status::Pass
        } else {
            Status::Fail
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Status::Pass)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pass => write!(f, "Pass"),
            Status::Fail => write!(f, "Fail"),
        }
    }
}

/// Observed outcome of one scenario, destined for the result writer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub case_id: String,
    pub row_index: usize,
    pub actual_output: String,
    pub status: Status,
}

impl TestResult {
    pub fn new(case: &TestCase, actual_output: impl Into<String>, status: Status) -> Self {
        Self {
            case_id: case.id.clone(),
            row_index: case.row_index,
            actual_output: actual_output.into(),
            status,
        }
    }

    /// Result recorded when a scenario could not produce any output
    pub fn failed(case: &TestCase) -> Self {
        Self::new(case, String::new(), Status::Fail)
    }
}

/// Test-case id families, matched by string prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseFamily {
    PosFun,
    NegFun,
    PosUi,
    NegUi,
}

impl CaseFamily {
    pub const ALL: [CaseFamily; 4] = [
        CaseFamily::PosFun,
        CaseFamily::NegFun,
        CaseFamily::PosUi,
        CaseFamily::NegUi,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            CaseFamily::PosFun => "Pos_Fun",
            CaseFamily::NegFun => "Neg_Fun",
            CaseFamily::PosUi => "Pos_UI",
            CaseFamily::NegUi => "Neg_UI",
        }
    }

    pub fn of(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| id.starts_with(f.prefix()))
    }

    pub fn suite(&self) -> SuiteKind {
        match self {
            CaseFamily::PosFun | CaseFamily::NegFun => SuiteKind::Functional,
            CaseFamily::PosUi | CaseFamily::NegUi => SuiteKind::Ui,
        }
    }
}

/// Which scenario style a suite runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteKind {
    /// Whole input injected at once, output awaited until stable
    Functional,
    /// Input typed in three chunks, output sampled after each
    Ui,
}

impl SuiteKind {
    pub fn families(&self) -> [CaseFamily; 2] {
        match self {
            SuiteKind::Functional => [CaseFamily::PosFun, CaseFamily::NegFun],
            SuiteKind::Ui => [CaseFamily::PosUi, CaseFamily::NegUi],
        }
    }

    /// Whether a case id is scheduled by this suite
    pub fn schedules(&self, id: &str) -> bool {
        !id.is_empty() && self.families().iter().any(|f| id.starts_with(f.prefix()))
    }
}

impl std::fmt::Display for SuiteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuiteKind::Functional => write!(f, "functional"),
            SuiteKind::Ui => write!(f, "ui"),
        }
    }
}
