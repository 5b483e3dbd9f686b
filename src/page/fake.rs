// In-memory page used by the section object unit tests

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::PageDriver;
use crate::config::Timeouts;
use crate::locator::Locator;
use crate::types::{BoundingBox, LoadState, ViewportSize};

/// Waits short enough to keep failing visibility checks quick
pub(crate) fn short_timeouts() -> Timeouts {
    Timeouts {
        extra_fast_ms: 10,
        fast_ms: 30,
        slow_ms: 50,
        extra_slow_ms: 100,
        action_ms: 30,
        theme_settle_ms: 1,
        poll_interval_ms: 5,
    }
}

/// Change applied to the fake DOM after a click or pointer move
#[derive(Clone, Debug)]
pub(crate) enum Reaction {
    Show(Locator),
    Hide(Locator),
    SetTexts(Locator, Vec<String>),
    SetUrl(String),
    /// Scripts containing the needle evaluate to the value from now on
    SetScript(String, Value),
}

/// Pointer region: moving into `min_x..max_x` applies the reactions
#[derive(Clone, Debug)]
pub(crate) struct HoverRegion {
    pub min_x: f64,
    pub max_x: f64,
    pub reactions: Vec<Reaction>,
}

#[derive(Default)]
pub(crate) struct FakeState {
    pub url: String,
    pub visible: HashSet<String>,
    pub texts: HashMap<String, Vec<String>>,
    pub boxes: HashMap<String, Vec<BoundingBox>>,
    pub clicks: Vec<String>,
    pub fills: Vec<(String, String)>,
    pub pointer: Vec<(f64, f64)>,
    pub scripts: Vec<String>,
    pub script_results: Vec<(String, Value)>,
    pub viewport: Option<ViewportSize>,
    pub on_click: HashMap<String, Vec<Reaction>>,
    pub hover_regions: Vec<HoverRegion>,
    pub outside_hover: Vec<Reaction>,
    pub screenshot: Option<Vec<u8>>,
}

impl FakeState {
    fn apply(&mut self, reactions: &[Reaction]) {
        for reaction in reactions {
            match reaction {
                Reaction::Show(locator) => {
                    self.visible.insert(locator.to_string());
                }
                Reaction::Hide(locator) => {
                    self.visible.remove(&locator.to_string());
                }
                Reaction::SetTexts(locator, texts) => {
                    self.texts.insert(locator.to_string(), texts.clone());
                }
                Reaction::SetUrl(url) => self.url = url.clone(),
                Reaction::SetScript(needle, value) => {
                    self.script_results.insert(0, (needle.clone(), value.clone()));
                }
            }
        }
    }
}

#[derive(Default)]
pub(crate) struct FakePage {
    state: Mutex<FakeState>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn show(&self, locator: &Locator) {
        self.state().visible.insert(locator.to_string());
    }

    pub fn set_texts(&self, locator: &Locator, texts: &[&str]) {
        self.state().texts.insert(
            locator.to_string(),
            texts.iter().map(|t| t.to_string()).collect(),
        );
    }

    pub fn set_box(&self, locator: &Locator, bounds: BoundingBox) {
        self.state()
            .boxes
            .entry(locator.to_string())
            .or_default()
            .push(bounds);
    }

    pub fn on_click(&self, locator: &Locator, reactions: Vec<Reaction>) {
        self.state()
            .on_click
            .insert(locator.to_string(), reactions);
    }

    /// Script containing `needle` evaluates to `value`
    pub fn script_result(&self, needle: &str, value: Value) {
        self.state()
            .script_results
            .insert(0, (needle.to_string(), value));
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state().clicks.clone()
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.state().url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state().url.clone())
    }

    async fn wait_for_load_state(&self, _state: LoadState, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> Result<usize> {
        let state = self.state();
        let key = locator.to_string();
        let texts = state.texts.get(&key).map_or(0, Vec::len);
        let shown = usize::from(state.visible.contains(&key));
        Ok(texts.max(shown))
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        Ok(self.state().visible.contains(&locator.to_string()))
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let mut state = self.state();
        let key = locator.to_string();
        if !state.visible.contains(&key) {
            anyhow::bail!("Element not found: {}", key);
        }
        state.clicks.push(key.clone());
        if let Some(reactions) = state.on_click.get(&key).cloned() {
            state.apply(&reactions);
        }
        Ok(())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> Result<()> {
        self.state()
            .fills
            .push((locator.to_string(), text.to_string()));
        Ok(())
    }

    async fn texts(&self, locator: &Locator) -> Result<Vec<String>> {
        Ok(self
            .state()
            .texts
            .get(&locator.to_string())
            .cloned()
            .unwrap_or_default())
    }

    async fn bounding_boxes(&self, locator: &Locator) -> Result<Vec<BoundingBox>> {
        Ok(self
            .state()
            .boxes
            .get(&locator.to_string())
            .cloned()
            .unwrap_or_default())
    }

    async fn move_mouse(&self, x: f64, y: f64) -> Result<()> {
        let mut state = self.state();
        state.pointer.push((x, y));
        let reactions = state
            .hover_regions
            .iter()
            .find(|region| x >= region.min_x && x < region.max_x)
            .map(|region| region.reactions.clone())
            .unwrap_or_else(|| state.outside_hover.clone());
        state.apply(&reactions);
        Ok(())
    }

    async fn evaluate(&self, script: &str, _args: Vec<Value>) -> Result<Value> {
        let mut state = self.state();
        state.scripts.push(script.to_string());
        Ok(state
            .script_results
            .iter()
            .find(|(needle, _)| script.contains(needle.as_str()))
            .map(|(_, value)| value.clone())
            .unwrap_or(Value::Null))
    }

    async fn set_viewport(&self, size: ViewportSize) -> Result<()> {
        self.state().viewport = Some(size);
        Ok(())
    }

    async fn screenshot(&self, _locator: Option<&Locator>) -> Result<Vec<u8>> {
        self.state()
            .screenshot
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No screenshot configured"))
    }
}
