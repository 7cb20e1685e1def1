//! Browser capability used by scenarios

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::discovery::{ElementSnapshot, OutputScorer};
use crate::error::HarnessResult;
use crate::poll::OutputSource;

/// Keyboard shortcuts the scenarios send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyChord {
    SelectAll,
    Backspace,
}

/// A live page the harness can drive
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Handle to a located control
    type Control: Send + Sync;

    async fn goto(&self, url: &str) -> HarnessResult<()>;

    /// First element matching `selector`, if it exists and is displayed
    async fn first_visible(&self, selector: &str) -> HarnessResult<Option<Self::Control>>;

    async fn click(&self, control: &Self::Control) -> HarnessResult<()>;

    async fn press(&self, control: &Self::Control, chord: KeyChord) -> HarnessResult<()>;

    /// Clear the control's value directly, bypassing keyboard events
    async fn clear(&self, control: &Self::Control) -> HarnessResult<()>;

    /// Type `text` one character at a time with `delay` between keystrokes
    async fn type_text(&self, control: &Self::Control, text: &str, delay: Duration) -> HarnessResult<()>;

    /// Replace the control's value in one operation
    async fn fill(&self, control: &Self::Control, text: &str) -> HarnessResult<()>;

    /// Snapshot every element matching `selector`, in document order
    async fn snapshot(&self, selector: &str) -> HarnessResult<Vec<ElementSnapshot>>;
}

/// Poll `selectors` in priority order until one yields a visible control
pub async fn first_visible_control<P: BrowserPage + ?Sized>(
    page: &P,
    selectors: &[String],
    interval: Duration,
    timeout: Duration,
) -> Option<P::Control> {
    let start = Instant::now();

    while start.elapsed() < timeout {
        for selector in selectors {
            match page.first_visible(selector).await {
                Ok(Some(control)) => {
                    debug!(selector = %selector, "input control located");
                    return Some(control);
                }
                Ok(None) => {}
                Err(e) => debug!(selector = %selector, error = %e, "locator lookup failed"),
            }
        }
        sleep(interval).await;
    }

    None
}

/// Discovery passes against a live page
pub struct PageOutput<'a, P: ?Sized> {
    page: &'a P,
    scorer: &'a OutputScorer,
    selector: &'a str,
}

impl<'a, P: BrowserPage + ?Sized> PageOutput<'a, P> {
    pub fn new(page: &'a P, scorer: &'a OutputScorer, selector: &'a str) -> Self {
        Self { page, scorer, selector }
    }
}

#[async_trait]
impl<'a, P: BrowserPage + ?Sized> OutputSource for PageOutput<'a, P> {
    async fn discover(&self, input_text: &str) -> String {
        match self.page.snapshot(self.selector).await {
            Ok(elements) => self.scorer.discover(&elements, input_text),
            Err(e) => {
                warn!(error = %e, "discovery pass failed, treating as no output");
                String::new()
            }
        }
    }
}
