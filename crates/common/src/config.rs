//! Harness configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Translator page under test
pub const DEFAULT_TARGET_URL: &str = "https://www.swifttranslator.com/";

/// Harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Page the scenarios drive
    pub target_url: String,

    /// Original test-case workbook; the `_EXECUTED` sibling is derived from it
    pub workbook: PathBuf,

    /// Directory for JSON suite reports
    pub results_dir: PathBuf,

    /// Browser / WebDriver configuration
    pub browser: BrowserConfig,

    /// Output discovery heuristics
    pub discovery: DiscoveryConfig,

    /// Polling intervals and budgets
    pub timing: TimingConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            workbook: PathBuf::from("test-data/test-cases.xlsx"),
            results_dir: PathBuf::from("test-results"),
            browser: BrowserConfig::default(),
            discovery: DiscoveryConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

/// Browser engine driven through WebDriver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chromium => "chromium",
            BrowserKind::Firefox => "firefox",
        }
    }
}

impl std::str::FromStr for BrowserKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserKind::Chromium),
            "firefox" => Ok(BrowserKind::Firefox),
            other => Err(Error::InvalidConfig(format!("unsupported browser: {}", other))),
        }
    }
}

/// WebDriver session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// WebDriver endpoint; ignored when `driver_binary` is spawned
    pub webdriver_url: String,

    /// Driver binary (chromedriver / geckodriver) to spawn on a free port
    pub driver_binary: Option<PathBuf>,

    pub browser: BrowserKind,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// How long a spawned driver gets to answer `/status`
    pub driver_startup_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            driver_binary: None,
            browser: BrowserKind::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            driver_startup_timeout_ms: 30_000,
        }
    }
}

impl BrowserConfig {
    pub fn driver_startup_timeout(&self) -> Duration {
        Duration::from_millis(self.driver_startup_timeout_ms)
    }
}

/// Heuristics used to locate the input control and the translated output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Elements considered as output candidates, in document order
    pub candidate_selector: String,

    /// Input control patterns, most preferred first
    pub input_selectors: Vec<String>,

    /// First code point of the target script (inclusive)
    pub script_start: u32,

    /// Last code point of the target script (inclusive)
    pub script_end: u32,

    /// Case-insensitive hints looked for in class, id and aria-label
    pub boost_keywords: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            candidate_selector: "textarea,input,div,span,p,pre,section,article".to_string(),
            input_selectors: vec![
                "textarea:not([readonly]):not([disabled])".to_string(),
                "textarea".to_string(),
                "div[contenteditable='true']".to_string(),
                "div[role='textbox'][contenteditable='true']".to_string(),
                "input[type='text']".to_string(),
            ],
            // Sinhala block
            script_start: 0x0D80,
            script_end: 0x0DFF,
            boost_keywords: vec![
                "output".to_string(),
                "result".to_string(),
                "translate".to_string(),
            ],
        }
    }
}

/// Polling intervals and budgets, all in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub stable_interval_ms: u64,
    /// Consecutive unchanged repeats needed before output counts as stable
    pub stable_repeats: u32,
    pub stable_budget_ms: u64,

    pub non_empty_interval_ms: u64,
    /// Non-empty budgets after the first, second and final UI chunk
    pub ui_chunk_budgets_ms: [u64; 3],

    pub locate_interval_ms: u64,
    pub locate_timeout_ms: u64,

    /// Wall-clock budget for one scenario
    pub scenario_timeout_ms: u64,

    pub functional_type_delay_ms: u64,
    pub ui_type_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            stable_interval_ms: 250,
            stable_repeats: 4,
            stable_budget_ms: 60_000,
            non_empty_interval_ms: 200,
            ui_chunk_budgets_ms: [15_000, 15_000, 20_000],
            locate_interval_ms: 250,
            locate_timeout_ms: 60_000,
            scenario_timeout_ms: 120_000,
            functional_type_delay_ms: 5,
            ui_type_delay_ms: 25,
        }
    }
}

impl TimingConfig {
    pub fn scenario_timeout(&self) -> Duration {
        Duration::from_millis(self.scenario_timeout_ms)
    }
}

impl HarnessConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            tracing::debug!("Loaded configuration from {}", path.display());
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the pollers and scorer cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.discovery.script_start > self.discovery.script_end {
            return Err(Error::InvalidConfig(format!(
                "script range is empty: {:#06X}..{:#06X}",
                self.discovery.script_start, self.discovery.script_end
            )));
        }
        if self.discovery.input_selectors.is_empty() {
            return Err(Error::InvalidConfig("no input selectors configured".into()));
        }
        if self.timing.stable_interval_ms == 0 || self.timing.non_empty_interval_ms == 0 {
            return Err(Error::InvalidConfig("poll intervals must be non-zero".into()));
        }
        if self.timing.stable_repeats == 0 {
            return Err(Error::InvalidConfig("stable_repeats must be at least 1".into()));
        }
        Ok(())
    }
}
