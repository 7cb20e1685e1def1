//! Suite execution

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};

use transcheck_common::{BrowserKind, HarnessConfig, Status, SuiteKind};
use transcheck_e2e::driver::{default_driver_binary, DriverEndpoint, DriverProcess};
use transcheck_e2e::runner::{write_report, CaseReport};
use transcheck_e2e::{CaseFilter, SuiteReport, SuiteRunner, WebDriverPage};

use crate::output::{print_info, print_list, print_success, print_warning, OutputFormat, TableDisplay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SuiteArg {
    Functional,
    Ui,
    /// Functional first, then UI, against the same session
    All,
}

impl SuiteArg {
    pub fn suites(self) -> Vec<SuiteKind> {
        match self {
            SuiteArg::Functional => vec![SuiteKind::Functional],
            SuiteArg::Ui => vec![SuiteKind::Ui],
            SuiteArg::All => vec![SuiteKind::Functional, SuiteKind::Ui],
        }
    }
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Suite to run
    #[arg(long, value_enum, default_value = "all")]
    pub suite: SuiteArg,

    /// Run only the case with this TC ID
    #[arg(long = "case")]
    pub case: Option<String>,

    /// Existing WebDriver endpoint
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Spawn this driver binary instead of using an existing endpoint
    #[arg(long)]
    pub driver_binary: Option<PathBuf>,

    /// Spawn the browser's default driver (chromedriver, geckodriver) from PATH
    #[arg(long, conflicts_with = "driver_binary")]
    pub spawn_driver: bool,

    /// Browser (chromium, firefox)
    #[arg(long)]
    pub browser: Option<BrowserKind>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Page to test
    #[arg(long)]
    pub target_url: Option<String>,

    /// Directory for JSON reports
    #[arg(long)]
    pub results_dir: Option<PathBuf>,
}

impl RunArgs {
    fn apply(&self, config: &mut HarnessConfig) {
        if let Some(url) = &self.webdriver_url {
            config.browser.webdriver_url = url.clone();
        }
        if let Some(binary) = &self.driver_binary {
            config.browser.driver_binary = Some(binary.clone());
        }
        if let Some(browser) = self.browser {
            config.browser.browser = browser;
        }
        if self.spawn_driver && config.browser.driver_binary.is_none() {
            config.browser.driver_binary = Some(default_driver_binary(config.browser.browser));
        }
        if self.headed {
            config.browser.headless = false;
        }
        if let Some(url) = &self.target_url {
            config.target_url = url.clone();
        }
        if let Some(dir) = &self.results_dir {
            config.results_dir = dir.clone();
        }
    }
}

/// Row of the per-suite summary
#[derive(Serialize)]
struct SuiteSummary {
    suite: SuiteKind,
    total: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
    duration_ms: u64,
    report: String,
}

impl TableDisplay for SuiteSummary {
    fn headers() -> Vec<&'static str> {
        vec!["Suite", "Total", "Passed", "Failed", "Skipped", "Duration", "Report"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.suite.to_string(),
            self.total.to_string(),
            self.passed.to_string(),
            self.failed.to_string(),
            self.skipped.to_string(),
            format!("{:.1}s", self.duration_ms as f64 / 1000.0),
            self.report.clone(),
        ]
    }
}

impl TableDisplay for CaseReport {
    fn headers() -> Vec<&'static str> {
        vec!["TC ID", "Row", "Status", "Expected", "Actual", "Error"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.row.to_string(),
            self.status.to_string(),
            self.expected.clone(),
            self.actual.clone(),
            self.error.clone().unwrap_or_default(),
        ]
    }
}

/// Runs the selected suites; `Ok(false)` means at least one case failed
pub async fn execute(args: RunArgs, mut config: HarnessConfig, format: OutputFormat) -> Result<bool> {
    args.apply(&mut config);
    config.validate().context("invalid configuration")?;

    let endpoint = match &config.browser.driver_binary {
        Some(binary) => {
            print_info(&format!("Starting {}", binary.display()));
            let process = DriverProcess::spawn(
                binary,
                config.browser.browser,
                config.browser.driver_startup_timeout(),
            )
            .await
            .context("failed to start WebDriver")?;
            DriverEndpoint::Spawned(process)
        }
        None => DriverEndpoint::External(config.browser.webdriver_url.clone()),
    };

    let page = WebDriverPage::connect(endpoint.url(), &config.browser)
        .await
        .with_context(|| format!("failed to open a browser session at {}", endpoint.url()))?;

    let filter = CaseFilter { only: args.case.clone() };
    let outcome = run_suites(&page, &config, args.suite.suites(), &filter).await;

    if let Err(e) = page.close().await {
        warn!("Failed to close browser session: {}", e);
    }
    if let Err(e) = endpoint.shutdown().await {
        warn!("Failed to stop WebDriver: {}", e);
    }

    let reports = outcome?;
    let mut summaries = Vec::with_capacity(reports.len());
    for (report, path) in &reports {
        let failures: Vec<&CaseReport> = report.cases.iter().filter(|c| c.status == Status::Fail).collect();
        if !failures.is_empty() {
            print_warning(&format!("{} suite: {} failing case(s)", report.suite, failures.len()));
            print_list(&failures, format);
        }
        summaries.push(SuiteSummary {
            suite: report.suite,
            total: report.total,
            passed: report.passed,
            failed: report.failed,
            skipped: report.skipped,
            duration_ms: report.duration_ms,
            report: path.display().to_string(),
        });
    }
    print_list(&summaries, format);

    let passed = reports.iter().all(|(r, _)| r.success());
    if passed {
        print_success("All scheduled cases passed");
    }
    Ok(passed)
}

async fn run_suites(
    page: &WebDriverPage,
    config: &HarnessConfig,
    suites: Vec<SuiteKind>,
    filter: &CaseFilter,
) -> Result<Vec<(SuiteReport, PathBuf)>> {
    let runner = SuiteRunner::new(page, config);
    let mut reports = Vec::new();
    for suite in suites {
        let report = runner
            .run_suite(suite, filter)
            .await
            .with_context(|| format!("{} suite could not run", suite))?;
        let path = write_report(&config.results_dir, &report)?;
        info!(suite = %suite, report = %path.display(), "Suite finished");
        reports.push((report, path));
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            suite: SuiteArg::All,
            case: None,
            webdriver_url: None,
            driver_binary: None,
            spawn_driver: false,
            browser: None,
            headed: false,
            target_url: None,
            results_dir: None,
        }
    }

    #[test]
    fn all_runs_functional_before_ui() {
        assert_eq!(SuiteArg::All.suites(), vec![SuiteKind::Functional, SuiteKind::Ui]);
        assert_eq!(SuiteArg::Ui.suites(), vec![SuiteKind::Ui]);
    }

    #[test]
    fn flags_override_config() {
        let mut config = HarnessConfig::default();
        let mut a = args();
        a.webdriver_url = Some("http://127.0.0.1:4444".into());
        a.browser = Some(BrowserKind::Firefox);
        a.headed = true;
        a.apply(&mut config);

        assert_eq!(config.browser.webdriver_url, "http://127.0.0.1:4444");
        assert_eq!(config.browser.browser, BrowserKind::Firefox);
        assert!(!config.browser.headless);
        assert!(config.browser.driver_binary.is_none());
    }

    #[test]
    fn spawn_driver_follows_browser() {
        let mut config = HarnessConfig::default();
        let mut a = args();
        a.spawn_driver = true;
        a.browser = Some(BrowserKind::Firefox);
        a.apply(&mut config);
        assert_eq!(config.browser.driver_binary, Some(PathBuf::from("geckodriver")));
    }

    #[test]
    fn absent_flags_keep_config() {
        let mut config = HarnessConfig::default();
        config.browser.headless = true;
        args().apply(&mut config);
        assert!(config.browser.headless);
        assert_eq!(config.target_url, HarnessConfig::default().target_url);
    }
}
