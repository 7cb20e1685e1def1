//! Transcheck scenario runner
//!
//! This crate drives a live translation page through WebDriver to reproduce
//! spreadsheet test cases:
//! - Loads cases from an `.xlsx` workbook and writes results back in place
//! - Locates the input control and injects text with best-effort actions
//! - Discovers the translated output by scoring visible elements
//! - Waits for that output to settle (functional) or to respond (UI)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SuiteRunner (serial)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CaseWorkbook::open_latest() -> CaseSheet -> [TestCase]     │
//! │  for each case (scenario timeout):                          │
//! │    ScenarioDriver                                           │
//! │      ├── goto + first_visible_control                      │
//! │      ├── clear (select-all, backspace, direct clear)        │
//! │      ├── type input (whole, or three chunks)                │
//! │      └── wait_for_stable_output / wait_for_non_empty_output │
//! │            └── PageOutput: snapshot -> OutputScorer         │
//! │  CaseWorkbook::apply(results) + save(_EXECUTED)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod cases;
pub mod discovery;
pub mod driver;
pub mod error;
pub mod page;
pub mod poll;
pub mod runner;
pub mod scenario;
pub mod webdriver;
pub mod workbook;

pub use discovery::{Candidate, ElementSnapshot, OutputScorer, ScriptRange};
pub use error::{HarnessError, HarnessResult};
pub use page::BrowserPage;
pub use poll::{wait_for_non_empty_output, wait_for_stable_output, OutputSource, StabilityPolicy};
pub use runner::{CaseFilter, SuiteReport, SuiteRunner};
pub use scenario::ScenarioDriver;
pub use webdriver::WebDriverPage;
