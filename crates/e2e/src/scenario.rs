//! Scenario driver: reproduce one test case against the live page

use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;
use serde::Serialize;
use tracing::{debug, info, warn};
use transcheck_common::{HarnessConfig, Status, SuiteKind, TestCase, TestResult};

use crate::discovery::OutputScorer;
use crate::error::{HarnessError, HarnessResult};
use crate::page::{first_visible_control, BrowserPage, KeyChord, PageOutput};
use crate::poll::{wait_for_non_empty_output, wait_for_stable_output, StabilityPolicy};

/// Run a browser micro-action whose failure must not abort the scenario.
///
/// The failure is logged and `None` returned so the caller moves on.
pub async fn attempt<T, F>(action: &str, fut: F) -> Option<T>
where
    F: Future<Output = HarnessResult<T>>,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(action, error = %e, "micro-action failed, continuing");
            None
        }
    }
}

/// What a scenario observed, beyond the written result
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub result: TestResult,
    /// Output after each UI chunk; a single entry for functional runs
    pub observed: Vec<String>,
}

/// Pass iff the expected output is non-empty and matches exactly after trimming
pub fn functional_status(expected: &str, actual: &str) -> Status {
    let expected = expected.trim();
    Status::from_bool(!expected.is_empty() && actual.trim() == expected)
}

/// Functional rule plus at least two distinct states seen while typing
pub fn ui_status(expected: &str, final_output: &str, distinct_states: usize) -> Status {
    Status::from_bool(functional_status(expected, final_output).is_pass() && distinct_states >= 2)
}

/// Split into three chunks of about a third each; the last takes the remainder.
///
/// The first two chunks hold at least one character when the text allows.
pub fn split_in_thirds(text: &str) -> [String; 3] {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let first_end = (len / 3).max(1).min(len);
    let second_end = ((2 * len) / 3).max(first_end + 1).min(len);

    [
        chars[..first_end].iter().collect(),
        chars[first_end..second_end].iter().collect(),
        chars[second_end..].iter().collect(),
    ]
}

/// Drives scenarios on one page
pub struct ScenarioDriver<'a, P: BrowserPage + ?Sized> {
    page: &'a P,
    config: &'a HarnessConfig,
    scorer: OutputScorer,
}

impl<'a, P: BrowserPage + ?Sized> ScenarioDriver<'a, P> {
    pub fn new(page: &'a P, config: &'a HarnessConfig) -> Self {
        Self {
            page,
            config,
            scorer: OutputScorer::from_config(&config.discovery),
        }
    }

    pub async fn run(&self, suite: SuiteKind, case: &TestCase) -> HarnessResult<ScenarioOutcome> {
        match suite {
            SuiteKind::Functional => self.run_functional(case).await,
            SuiteKind::Ui => self.run_ui(case).await,
        }
    }

    fn output(&self) -> PageOutput<'_, P> {
        PageOutput::new(self.page, &self.scorer, &self.config.discovery.candidate_selector)
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    /// Navigate and locate the input control
    async fn open_input(&self) -> HarnessResult<P::Control> {
        self.page.goto(&self.config.target_url).await?;

        let timing = &self.config.timing;
        first_visible_control(
            self.page,
            &self.config.discovery.input_selectors,
            Self::ms(timing.locate_interval_ms),
            Self::ms(timing.locate_timeout_ms),
        )
        .await
        .ok_or(HarnessError::InputNotFound(timing.locate_timeout_ms))
    }

    /// Select-all + delete, then a direct clear for controls that ignore keys
    async fn clear_input(&self, control: &P::Control) {
        attempt("click", self.page.click(control)).await;
        attempt("select-all", self.page.press(control, KeyChord::SelectAll)).await;
        attempt("backspace", self.page.press(control, KeyChord::Backspace)).await;
        attempt("clear", self.page.clear(control)).await;
    }

    async fn type_or_fill(&self, control: &P::Control, text: &str, delay: Duration) {
        if text.is_empty() {
            return;
        }
        if attempt("type", self.page.type_text(control, text, delay)).await.is_none() {
            warn!("typing failed, filling the control instead");
            attempt("fill", self.page.fill(control, text)).await;
        }
    }

    /// Inject the whole input, wait for stable output, compare
    pub async fn run_functional(&self, case: &TestCase) -> HarnessResult<ScenarioOutcome> {
        let timing = &self.config.timing;
        let control = self.open_input().await?;

        self.clear_input(&control).await;
        self.type_or_fill(&control, &case.input_text, Self::ms(timing.functional_type_delay_ms))
            .await;

        let actual = wait_for_stable_output(
            &self.output(),
            &case.input_text,
            Self::ms(timing.stable_budget_ms),
            StabilityPolicy::from(timing),
        )
        .await;

        let status = functional_status(&case.expected_output, &actual);
        info!(case = %case.label(), %status, actual = %actual, "functional scenario finished");

        Ok(ScenarioOutcome {
            result: TestResult::new(case, actual.clone(), status),
            observed: vec![actual],
        })
    }

    /// Type the input in three chunks, sampling output after each
    pub async fn run_ui(&self, case: &TestCase) -> HarnessResult<ScenarioOutcome> {
        let timing = &self.config.timing;
        let control = self.open_input().await?;

        self.clear_input(&control).await;

        let chunks = split_in_thirds(&case.input_text);
        let output = self.output();
        let mut typed = String::new();
        let mut observed = Vec::with_capacity(chunks.len());

        for (chunk, budget) in chunks.iter().zip(timing.ui_chunk_budgets_ms) {
            self.type_or_fill_chunk(&control, &typed, chunk).await;
            typed.push_str(chunk);

            let sample = wait_for_non_empty_output(
                &output,
                &typed,
                Self::ms(budget),
                Self::ms(timing.non_empty_interval_ms),
            )
            .await;
            debug!(case = %case.id, typed = %typed, sample = %sample, "chunk sampled");
            observed.push(sample);
        }

        let final_output = observed.last().cloned().unwrap_or_default();
        let distinct: BTreeSet<&str> = observed.iter().map(String::as_str).collect();
        let status = ui_status(&case.expected_output, &final_output, distinct.len());

        info!(
            case = %case.label(),
            %status,
            distinct_states = distinct.len(),
            actual = %final_output,
            "ui scenario finished"
        );

        Ok(ScenarioOutcome {
            result: TestResult::new(case, final_output, status),
            observed,
        })
    }

    // Appending keystrokes; a fill fallback has to restore the whole prefix.
    async fn type_or_fill_chunk(&self, control: &P::Control, typed: &str, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        let delay = Self::ms(self.config.timing.ui_type_delay_ms);
        if attempt("type", self.page.type_text(control, chunk, delay)).await.is_none() {
            warn!("typing failed, filling the control instead");
            attempt("fill", self.page.fill(control, &format!("{}{}", typed, chunk))).await;
        }
    }
}
