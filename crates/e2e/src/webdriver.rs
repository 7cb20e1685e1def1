//! WebDriver-backed browser page

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::key::Key;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, info};
use transcheck_common::{BrowserConfig, BrowserKind};

use crate::discovery::{ElementSnapshot, SNAPSHOT_SCRIPT};
use crate::error::{HarnessError, HarnessResult};
use crate::page::{BrowserPage, KeyChord};

const READY_STATE_SCRIPT: &str = "return document.readyState;";

/// A WebDriver session holding a single page
pub struct WebDriverPage {
    client: Client,
}

impl WebDriverPage {
    /// Open a new session against `webdriver_url`
    pub async fn connect(webdriver_url: &str, config: &BrowserConfig) -> HarnessResult<Self> {
        info!("Connecting to {} WebDriver at {}", config.browser.as_str(), webdriver_url);

        let client = ClientBuilder::native()
            .capabilities(capabilities(config))
            .connect(webdriver_url)
            .await?;

        if let Err(e) = client
            .set_window_size(config.viewport_width, config.viewport_height)
            .await
        {
            debug!("Could not set window size: {}", e);
        }

        Ok(Self { client })
    }

    /// End the session
    pub async fn close(self) -> HarnessResult<()> {
        self.client.close().await?;
        Ok(())
    }
}

/// Browser-specific session capabilities
pub fn capabilities(config: &BrowserConfig) -> Map<String, Value> {
    let mut caps = Map::new();
    let mut args = Vec::new();

    match config.browser {
        BrowserKind::Chromium => {
            args.push("--no-sandbox".to_string());
            if config.headless {
                args.push("--headless=new".to_string());
                args.push("--disable-gpu".to_string());
                args.push("--disable-dev-shm-usage".to_string());
            }
            args.push(format!(
                "--window-size={},{}",
                config.viewport_width, config.viewport_height
            ));
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
        BrowserKind::Firefox => {
            if config.headless {
                args.push("--headless".to_string());
            }
            args.push(format!("--width={}", config.viewport_width));
            args.push(format!("--height={}", config.viewport_height));
            caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
        }
    }

    caps
}

fn chord_keys(chord: KeyChord) -> String {
    match chord {
        KeyChord::SelectAll => format!("{}a{}", char::from(Key::Control), char::from(Key::Null)),
        KeyChord::Backspace => char::from(Key::Backspace).to_string(),
    }
}

#[async_trait]
impl BrowserPage for WebDriverPage {
    type Control = Element;

    async fn goto(&self, url: &str) -> HarnessResult<()> {
        info!("Navigating to {}", url);
        self.client.goto(url).await?;

        // The DOM is usable once it leaves "loading"; sub-resources are not awaited.
        for _ in 0..20 {
            match self.client.execute(READY_STATE_SCRIPT, vec![]).await {
                Ok(Value::String(state)) if state != "loading" => break,
                _ => tokio::time::sleep(Duration::from_millis(100)).await,
            }
        }
        Ok(())
    }

    async fn first_visible(&self, selector: &str) -> HarnessResult<Option<Element>> {
        let elements = self.client.find_all(Locator::Css(selector)).await?;
        let Some(first) = elements.into_iter().next() else {
            return Ok(None);
        };
        if first.is_displayed().await? {
            Ok(Some(first))
        } else {
            Ok(None)
        }
    }

    async fn click(&self, control: &Element) -> HarnessResult<()> {
        control.click().await?;
        Ok(())
    }

    async fn press(&self, control: &Element, chord: KeyChord) -> HarnessResult<()> {
        control.send_keys(&chord_keys(chord)).await?;
        Ok(())
    }

    async fn clear(&self, control: &Element) -> HarnessResult<()> {
        control.clear().await?;
        Ok(())
    }

    async fn type_text(&self, control: &Element, text: &str, delay: Duration) -> HarnessResult<()> {
        if delay.is_zero() {
            control.send_keys(text).await?;
            return Ok(());
        }
        let mut buf = [0u8; 4];
        for c in text.chars() {
            control.send_keys(c.encode_utf8(&mut buf)).await?;
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn fill(&self, control: &Element, text: &str) -> HarnessResult<()> {
        control.clear().await?;
        if !text.is_empty() {
            control.send_keys(text).await?;
        }
        Ok(())
    }

    async fn snapshot(&self, selector: &str) -> HarnessResult<Vec<ElementSnapshot>> {
        let value = self
            .client
            .execute(SNAPSHOT_SCRIPT, vec![Value::String(selector.to_string())])
            .await?;
        match value {
            Value::Array(_) => Ok(serde_json::from_value(value)?),
            other => Err(HarnessError::Command(format!(
                "snapshot script returned {} instead of an array",
                other
            ))),
        }
    }
}
