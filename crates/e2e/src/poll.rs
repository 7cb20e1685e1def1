//! Polling loops that wait for discovered output to settle or appear
//!
//! Both pollers only suspend between discovery passes, and both return
//! within `max_duration` plus one final pass even when the page never
//! produces what they wait for. A timeout is a best-effort answer, never an
//! error.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;
use transcheck_common::TimingConfig;

/// Anything that can run one discovery pass
#[async_trait]
pub trait OutputSource: Send + Sync {
    /// Best-guess output text for the given input; empty when nothing is found
    async fn discover(&self, input_text: &str) -> String;
}

/// Interval and repeat count that define "stable"
#[derive(Debug, Clone, Copy)]
pub struct StabilityPolicy {
    pub interval: Duration,
    /// Consecutive unchanged non-empty repeats required
    pub required_repeats: u32,
}

impl Default for StabilityPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(250),
            required_repeats: 4,
        }
    }
}

impl From<&TimingConfig> for StabilityPolicy {
    fn from(timing: &TimingConfig) -> Self {
        Self {
            interval: Duration::from_millis(timing.stable_interval_ms),
            required_repeats: timing.stable_repeats,
        }
    }
}

/// Counts consecutive identical non-empty samples
#[derive(Debug, Clone)]
pub struct StabilityTracker {
    last: String,
    repeats: u32,
    required: u32,
}

impl StabilityTracker {
    pub fn new(required: u32) -> Self {
        Self {
            last: String::new(),
            repeats: 0,
            required,
        }
    }

    /// Record a trimmed sample; true once the output counts as stable
    pub fn observe(&mut self, sample: &str) -> bool {
        if !sample.is_empty() && sample == self.last {
            self.repeats += 1;
        } else {
            self.repeats = 0;
        }
        if self.last != sample {
            self.last = sample.to_string();
        }
        self.repeats >= self.required
    }

    pub fn repeats(&self) -> u32 {
        self.repeats
    }
}

async fn sample<S: OutputSource + ?Sized>(source: &S, input_text: &str) -> String {
    source.discover(input_text).await.trim().to_string()
}

/// Re-run discovery until the output stops changing or `max_duration` elapses
pub async fn wait_for_stable_output<S: OutputSource + ?Sized>(
    source: &S,
    input_text: &str,
    max_duration: Duration,
    policy: StabilityPolicy,
) -> String {
    let start = Instant::now();
    let mut tracker = StabilityTracker::new(policy.required_repeats);
    let mut samples = 0usize;

    while start.elapsed() < max_duration {
        let current = sample(source, input_text).await;
        samples += 1;
        if tracker.observe(&current) {
            debug!(samples, elapsed_ms = start.elapsed().as_millis() as u64, "output stable");
            return current;
        }
        sleep(policy.interval).await;
    }

    debug!(samples, "stability budget exhausted, taking final sample");
    sample(source, input_text).await
}

/// Re-run discovery until it yields non-empty text or `max_duration` elapses
pub async fn wait_for_non_empty_output<S: OutputSource + ?Sized>(
    source: &S,
    input_text: &str,
    max_duration: Duration,
    interval: Duration,
) -> String {
    let start = Instant::now();

    while start.elapsed() < max_duration {
        let current = sample(source, input_text).await;
        if !current.is_empty() {
            return current;
        }
        sleep(interval).await;
    }

    debug!("non-empty budget exhausted, taking final sample");
    sample(source, input_text).await
}
