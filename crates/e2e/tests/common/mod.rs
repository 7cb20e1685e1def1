//! Scripted in-memory page shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

use transcheck_e2e::discovery::{ComputedStyle, ElementSnapshot};
use transcheck_e2e::page::{BrowserPage, KeyChord};
use transcheck_e2e::{HarnessError, HarnessResult};

/// Renders the page from the control's current value and the number of
/// discovery passes taken so far
pub type Render = Box<dyn Fn(&str, usize) -> Vec<ElementSnapshot> + Send + Sync>;

#[derive(Default)]
struct PageState {
    value: String,
    selected: bool,
    passes: usize,
    actions: Vec<String>,
}

pub struct FakePage {
    state: Mutex<PageState>,
    render: Render,
    pub input_visible: bool,
    pub typing_fails: bool,
    pub keys_fail: bool,
}

impl FakePage {
    pub fn new(render: Render) -> Self {
        Self {
            state: Mutex::new(PageState::default()),
            render,
            input_visible: true,
            typing_fails: false,
            keys_fail: false,
        }
    }

    /// Page with a textarea echoing the input and an output div whose text
    /// is looked up from the current input value
    pub fn translator<F>(output_for: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::new(Box::new(move |value, _| {
            vec![textarea(value), output_div(&output_for(value))]
        }))
    }

    pub fn value(&self) -> String {
        self.state.lock().value.clone()
    }

    pub fn passes(&self) -> usize {
        self.state.lock().passes
    }

    pub fn actions(&self) -> Vec<String> {
        self.state.lock().actions.clone()
    }

    fn record(&self, action: impl Into<String>) {
        self.state.lock().actions.push(action.into());
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    type Control = ();

    async fn goto(&self, url: &str) -> HarnessResult<()> {
        let mut state = self.state.lock();
        state.value.clear();
        state.actions.push(format!("goto:{}", url));
        Ok(())
    }

    async fn first_visible(&self, _selector: &str) -> HarnessResult<Option<()>> {
        Ok(self.input_visible.then_some(()))
    }

    async fn click(&self, _control: &()) -> HarnessResult<()> {
        self.record("click");
        Ok(())
    }

    async fn press(&self, _control: &(), chord: KeyChord) -> HarnessResult<()> {
        if self.keys_fail {
            return Err(HarnessError::Command(format!("{:?} not supported", chord)));
        }
        let mut state = self.state.lock();
        match chord {
            KeyChord::SelectAll => state.selected = true,
            KeyChord::Backspace => {
                if state.selected {
                    state.value.clear();
                    state.selected = false;
                } else {
                    state.value.pop();
                }
            }
        }
        state.actions.push(format!("press:{:?}", chord));
        Ok(())
    }

    async fn clear(&self, _control: &()) -> HarnessResult<()> {
        let mut state = self.state.lock();
        state.value.clear();
        state.actions.push("clear".into());
        Ok(())
    }

    async fn type_text(&self, _control: &(), text: &str, _delay: Duration) -> HarnessResult<()> {
        if self.typing_fails {
            return Err(HarnessError::Command("element not interactable".into()));
        }
        let mut state = self.state.lock();
        state.value.push_str(text);
        state.actions.push(format!("type:{}", text));
        Ok(())
    }

    async fn fill(&self, _control: &(), text: &str) -> HarnessResult<()> {
        let mut state = self.state.lock();
        state.value = text.to_string();
        state.actions.push(format!("fill:{}", text));
        Ok(())
    }

    async fn snapshot(&self, _selector: &str) -> HarnessResult<Vec<ElementSnapshot>> {
        let (value, passes) = {
            let mut state = self.state.lock();
            state.passes += 1;
            (state.value.clone(), state.passes)
        };
        Ok((self.render)(&value, passes))
    }
}

fn displayed(tag: &str, text: &str) -> ElementSnapshot {
    ElementSnapshot {
        tag: tag.to_string(),
        text: text.to_string(),
        style: Some(ComputedStyle {
            visibility: "visible".into(),
            display: "block".into(),
            opacity: "1".into(),
        }),
        width: 300.0,
        height: 60.0,
        ..Default::default()
    }
}

pub fn textarea(value: &str) -> ElementSnapshot {
    displayed("textarea", value)
}

pub fn output_div(text: &str) -> ElementSnapshot {
    let mut el = displayed("div", text);
    el.class_name = "translate-output".into();
    el
}

pub fn plain(tag: &str, text: &str) -> ElementSnapshot {
    displayed(tag, text)
}

pub fn hidden(tag: &str, text: &str) -> ElementSnapshot {
    let mut el = displayed(tag, text);
    if let Some(style) = el.style.as_mut() {
        style.display = "none".into();
    }
    el
}
