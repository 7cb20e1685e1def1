//! Output discovery: which visible element holds the translated text
//!
//! A discovery pass evaluates [`SNAPSHOT_SCRIPT`] once in the page, which
//! returns one [`ElementSnapshot`] per candidate element in document order.
//! Everything after that is pure:
//!
//! 1. [`is_visible`] drops hidden or collapsed elements.
//! 2. [`OutputScorer::score_candidates`] normalizes text, filters echoes of
//!    the input and scores by target-script density plus structural hints.
//! 3. [`OutputScorer::select_best_output`] prefers script-bearing candidates.

use serde::{Deserialize, Serialize};
use transcheck_common::DiscoveryConfig;

/// Collects candidate snapshots in the page. Takes the candidate selector as
/// its only argument and returns a JSON array.
pub const SNAPSHOT_SCRIPT: &str = r#"
const selector = arguments[0];
const els = Array.from(document.querySelectorAll(selector));
return els.map((el) => {
  const tag = (el.tagName || "").toLowerCase();
  let style = null;
  try {
    const s = window.getComputedStyle(el);
    if (s) style = { visibility: s.visibility, display: s.display, opacity: s.opacity };
  } catch (e) {}
  let width = 0, height = 0;
  try {
    const r = el.getBoundingClientRect();
    if (r) { width = r.width; height = r.height; }
  } catch (e) {}
  const text = (tag === "textarea" || tag === "input") ? (el.value || "") : (el.innerText || "");
  return {
    tag: tag,
    text: String(text),
    style: style,
    width: width,
    height: height,
    role: el.getAttribute("role") || "",
    className: String(el.className || ""),
    id: el.id || "",
    ariaLabel: el.getAttribute("aria-label") || ""
  };
});
"#;

const ALERT_BOOST: f64 = 10.0;
const KEYWORD_BOOST: f64 = 6.0;
const SCRIPT_HIT_WEIGHT: f64 = 10.0;
const LENGTH_BONUS_CAP: f64 = 50.0;
const MIN_RENDERED_PX: f64 = 2.0;

/// Computed style properties relevant to visibility
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputedStyle {
    #[serde(default)]
    pub visibility: String,
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub opacity: String,
}

/// What the page reports about one candidate element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    #[serde(default)]
    pub tag: String,
    /// `value` for textarea/input, rendered `innerText` otherwise
    #[serde(default)]
    pub text: String,
    /// `None` when the computed style could not be obtained
    #[serde(default)]
    pub style: Option<ComputedStyle>,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub aria_label: String,
}

/// A visible element's normalized text and its relevance score
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub text: String,
    pub score: f64,
}

/// Inclusive code point range of the target script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptRange {
    pub start: u32,
    pub end: u32,
}

impl ScriptRange {
    pub const SINHALA: ScriptRange = ScriptRange { start: 0x0D80, end: 0x0DFF };

    pub fn contains(&self, c: char) -> bool {
        (self.start..=self.end).contains(&(c as u32))
    }

    pub fn count_in(&self, text: &str) -> usize {
        text.chars().filter(|c| self.contains(*c)).count()
    }

    pub fn appears_in(&self, text: &str) -> bool {
        text.chars().any(|c| self.contains(c))
    }
}

/// Whether the element is rendered where a user could see it.
///
/// Fails closed: an element without a computed style is not visible.
pub fn is_visible(el: &ElementSnapshot) -> bool {
    let Some(style) = &el.style else {
        return false;
    };
    if style.visibility == "hidden" || style.display == "none" || opacity_is_zero(&style.opacity) {
        return false;
    }
    el.width >= MIN_RENDERED_PX && el.height >= MIN_RENDERED_PX
}

// `Number("")` is 0 in the page, while unparseable values are NaN and never zero.
fn opacity_is_zero(opacity: &str) -> bool {
    let trimmed = opacity.trim();
    if trimmed.is_empty() {
        return true;
    }
    trimmed.parse::<f64>().map(|v| v == 0.0).unwrap_or(false)
}

/// Collapse whitespace runs to a single space and trim the ends
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Scores candidate elements against the configured target script
#[derive(Debug, Clone)]
pub struct OutputScorer {
    script: ScriptRange,
    keywords: Vec<String>,
}

impl Default for OutputScorer {
    fn default() -> Self {
        Self::from_config(&DiscoveryConfig::default())
    }
}

impl OutputScorer {
    pub fn new(script: ScriptRange, keywords: Vec<String>) -> Self {
        Self {
            script,
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self::new(
            ScriptRange { start: config.script_start, end: config.script_end },
            config.boost_keywords.clone(),
        )
    }

    pub fn script(&self) -> ScriptRange {
        self.script
    }

    /// Visible, non-echo candidates in document order with their scores
    pub fn score_candidates(&self, elements: &[ElementSnapshot], input_text: &str) -> Vec<Candidate> {
        let echo = normalize_text(input_text);
        let mut candidates = Vec::new();

        for el in elements {
            if !is_visible(el) {
                continue;
            }

            let text = normalize_text(&el.text);
            if text.is_empty() {
                continue;
            }
            // Blank input (empty or whitespace only) echoes nothing.
            if !echo.is_empty() && text.contains(&echo) {
                continue;
            }

            let score = self.score(&text, el);
            candidates.push(Candidate { text, score });
        }

        candidates
    }

    /// Score of already-normalized text found in `el`
    pub fn score(&self, text: &str, el: &ElementSnapshot) -> f64 {
        let hits = self.script.count_in(text) as f64;
        let length_bonus = (text.chars().count() as f64 / 10.0).min(LENGTH_BONUS_CAP);
        hits * SCRIPT_HIT_WEIGHT + self.boost(el) + length_bonus
    }

    fn boost(&self, el: &ElementSnapshot) -> f64 {
        let mut boost = 0.0;
        if el.role.eq_ignore_ascii_case("alert") {
            boost += ALERT_BOOST;
        }
        for attr in [&el.class_name, &el.id, &el.aria_label] {
            if self.mentions_keyword(attr) {
                boost += KEYWORD_BOOST;
            }
        }
        boost
    }

    fn mentions_keyword(&self, attr: &str) -> bool {
        if attr.is_empty() {
            return false;
        }
        let attr = attr.to_lowercase();
        self.keywords.iter().any(|k| attr.contains(k.as_str()))
    }

    /// Highest-scoring script-bearing candidate, else the highest overall.
    ///
    /// Ties keep document order.
    pub fn select_best_output(&self, mut candidates: Vec<Candidate>) -> String {
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        if let Some(best) = candidates.iter().find(|c| self.script.appears_in(&c.text)) {
            return best.text.clone();
        }
        candidates.into_iter().next().map(|c| c.text).unwrap_or_default()
    }

    /// One full discovery pass over a page snapshot
    pub fn discover(&self, elements: &[ElementSnapshot], input_text: &str) -> String {
        self.select_best_output(self.score_candidates(elements, input_text))
    }
}
