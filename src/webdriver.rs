use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::actions::{InputSource, MouseActions, PointerAction};
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Value, json};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::errors::PulseprobeError;
use crate::locator::{Locator, Query};
use crate::page::PageDriver;
use crate::types::{BoundingBox, LoadState, ViewportSize};
use crate::webdriver_manager::GLOBAL_WEBDRIVER_MANAGER;

/// No new resource entries for this long counts as network idle
const NETWORK_QUIET: Duration = Duration::from_millis(500);
const LOAD_POLL: Duration = Duration::from_millis(100);

/// Browser session driven over WebDriver
pub struct Browser {
    pub(crate) client: Client,
    browser_type: BrowserType,
    // Removed when the session is dropped
    _profile_dir: TempDir,
}

/// Supported browser types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    /// Mozilla Firefox
    Firefox,
    /// Google Chrome/Chromium
    Chrome,
}

impl std::str::FromStr for BrowserType {
    type Err = anyhow::Error;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserType::Firefox),
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            _ => anyhow::bail!("Unsupported browser: {}", s),
        }
    }
}

impl std::fmt::Display for BrowserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BrowserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserType::Firefox => "firefox",
            BrowserType::Chrome => "chrome",
        }
    }

    /// Executable name of the matching WebDriver
    pub fn driver_name(&self) -> &'static str {
        match self {
            BrowserType::Firefox => "geckodriver",
            BrowserType::Chrome => "chromedriver",
        }
    }

    /// Conventional port the driver listens on when started by hand
    pub fn default_port(&self) -> u16 {
        match self {
            BrowserType::Firefox => 4444,
            BrowserType::Chrome => 9515,
        }
    }

    /// Session capabilities for this browser
    pub fn capabilities(
        &self,
        headless: bool,
        viewport: Option<ViewportSize>,
        profile_dir: &std::path::Path,
    ) -> serde_json::Map<String, Value> {
        let mut caps = serde_json::Map::new();

        match self {
            BrowserType::Firefox => {
                let mut args = vec!["-profile".to_string(), profile_dir.display().to_string()];
                if headless {
                    args.push("--headless".to_string());
                }
                if let Some(vp) = viewport {
                    args.push(format!("--width={}", vp.width));
                    args.push(format!("--height={}", vp.height));
                }
                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
            BrowserType::Chrome => {
                let mut args = vec!["--no-sandbox".to_string()];
                if headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }
                if let Some(vp) = viewport {
                    args.push(format!("--window-size={},{}", vp.width, vp.height));
                }
                // performance.memory is only populated with precise memory info
                args.push("--enable-precise-memory-info".to_string());
                args.push(format!("--user-data-dir={}", profile_dir.display()));
                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
        }

        caps
    }
}

impl Browser {
    /// Start a browser session, launching the WebDriver when none is running
    pub async fn new(
        browser_type: BrowserType,
        viewport: Option<ViewportSize>,
        headless: bool,
    ) -> Result<Self> {
        info!("Connecting to {} WebDriver", browser_type);

        let webdriver_url = GLOBAL_WEBDRIVER_MANAGER
            .ensure_driver(&browser_type)
            .await?;

        let profile_dir = tempfile::Builder::new()
            .prefix(&format!("pulseprobe-{}-", browser_type))
            .tempdir()
            .context("Failed to create browser profile directory")?;
        let caps = browser_type.capabilities(headless, viewport, profile_dir.path());

        debug!("Connecting to WebDriver at {}", webdriver_url);
        let client = match ClientBuilder::rustls()
            .capabilities(caps.clone())
            .connect(&webdriver_url)
            .await
        {
            Ok(client) => client,
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("Session is already started")
                    || error_str.contains("session not created")
                {
                    info!("WebDriver appears to be in a bad state, restarting it");
                    GLOBAL_WEBDRIVER_MANAGER.kill_driver(&browser_type);
                    sleep(Duration::from_millis(500)).await;

                    let new_url = GLOBAL_WEBDRIVER_MANAGER
                        .ensure_driver(&browser_type)
                        .await
                        .context("Failed to restart WebDriver after recovery")?;

                    ClientBuilder::rustls()
                        .capabilities(caps)
                        .connect(&new_url)
                        .await
                        .context("Failed to connect to WebDriver after restart")?
                } else {
                    return Err(e).context("Failed to connect to WebDriver");
                }
            }
        };

        let browser = Browser {
            client,
            browser_type,
            _profile_dir: profile_dir,
        };

        if let Some(vp) = viewport
            && let Err(e) = browser.set_viewport(vp).await
        {
            debug!("Could not set viewport: {:#}", e);
        }

        Ok(browser)
    }

    pub fn browser_type(&self) -> BrowserType {
        self.browser_type
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Element>> {
        let elements = match locator.query() {
            Query::Css(css) => self.client.find_all(fantoccini::Locator::Css(css)).await,
            Query::XPath(xpath) => self.client.find_all(fantoccini::Locator::XPath(xpath)).await,
        }
        .with_context(|| format!("Failed to query {}", locator))?;

        if locator.exact_text().is_none() {
            return Ok(elements);
        }

        let mut matching = Vec::new();
        for element in elements {
            // Elements can go stale between the query and the text read
            if let Ok(text) = element.text().await
                && locator.accepts_text(&text)
            {
                matching.push(element);
            }
        }
        Ok(matching)
    }

    async fn first(&self, locator: &Locator) -> Result<Element> {
        self.find_all(locator)
            .await?
            .into_iter()
            .next()
            .with_context(|| format!("Element not found: {}", locator))
    }

    async fn ready_state(&self) -> Result<String> {
        let state = self
            .client
            .execute("return document.readyState;", vec![])
            .await
            .context("Failed to read document.readyState")?;
        Ok(state.as_str().unwrap_or_default().to_string())
    }

    async fn resource_count(&self) -> Result<u64> {
        let count = self
            .client
            .execute(
                "return performance.getEntriesByType('resource').length;",
                vec![],
            )
            .await
            .context("Failed to read resource timing entries")?;
        Ok(count.as_u64().unwrap_or(0))
    }

    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}

#[async_trait]
impl PageDriver for Browser {
    async fn goto(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        self.client
            .goto(url)
            .await
            .with_context(|| format!("Failed to navigate to {}", url))
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let mut last_resources: Option<u64> = None;
        let mut quiet_since = Instant::now();

        loop {
            let ready = self.ready_state().await?;
            let reached = match state {
                LoadState::DomContentLoaded => ready == "interactive" || ready == "complete",
                LoadState::Load => ready == "complete",
                LoadState::NetworkIdle => {
                    if ready != "complete" {
                        false
                    } else {
                        let resources = self.resource_count().await?;
                        if last_resources != Some(resources) {
                            last_resources = Some(resources);
                            quiet_since = Instant::now();
                        }
                        quiet_since.elapsed() >= NETWORK_QUIET
                    }
                }
            };

            if reached {
                debug!("Reached {:?}", state);
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(PulseprobeError::Timeout(format!(
                    "page did not reach {:?} within {}ms (readyState: {})",
                    state,
                    timeout.as_millis(),
                    ready
                ))
                .into());
            }
            sleep(LOAD_POLL).await;
        }
    }

    async fn count(&self, locator: &Locator) -> Result<usize> {
        Ok(self.find_all(locator).await?.len())
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        match self.find_all(locator).await?.first() {
            Some(element) => Ok(element.is_displayed().await.unwrap_or(false)),
            None => Ok(false),
        }
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        debug!("Clicking {}", locator);
        self.first(locator)
            .await?
            .click()
            .await
            .with_context(|| format!("Failed to click {}", locator))
    }

    async fn fill(&self, locator: &Locator, text: &str) -> Result<()> {
        debug!("Filling {} with {:?}", locator, text);
        let element = self.first(locator).await?;
        element
            .clear()
            .await
            .with_context(|| format!("Failed to clear {}", locator))?;
        element
            .send_keys(text)
            .await
            .with_context(|| format!("Failed to type into {}", locator))
    }

    async fn texts(&self, locator: &Locator) -> Result<Vec<String>> {
        let mut texts = Vec::new();
        for element in self.find_all(locator).await? {
            texts.push(element.text().await?);
        }
        Ok(texts)
    }

    async fn bounding_boxes(&self, locator: &Locator) -> Result<Vec<BoundingBox>> {
        let script = r#"
            const r = arguments[0].getBoundingClientRect();
            return [r.x, r.y, r.width, r.height];
        "#;

        let mut boxes = Vec::new();
        for element in self.find_all(locator).await? {
            let rect = self
                .client
                .execute(script, vec![serde_json::to_value(&element)?])
                .await
                .with_context(|| format!("Failed to measure {}", locator))?;
            let values: Vec<f64> = serde_json::from_value(rect)?;
            if let [x, y, width, height] = values[..] {
                boxes.push(BoundingBox {
                    x,
                    y,
                    width,
                    height,
                });
            }
        }
        Ok(boxes)
    }

    async fn move_mouse(&self, x: f64, y: f64) -> Result<()> {
        let actions = MouseActions::new("mouse".to_string()).then(PointerAction::MoveTo {
            duration: None,
            x: x.round() as i64,
            y: y.round() as i64,
        });
        self.client
            .perform_actions(actions)
            .await
            .with_context(|| format!("Failed to move pointer to ({}, {})", x, y))
    }

    async fn evaluate(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.client
            .execute(script, args)
            .await
            .context("Failed to execute script")
    }

    async fn set_viewport(&self, size: ViewportSize) -> Result<()> {
        debug!("Setting viewport to {}x{}", size.width, size.height);
        self.client
            .set_window_size(size.width, size.height)
            .await
            .context("Failed to set window size")?;

        // Window size includes browser chrome; grow it by the difference once
        let inner = self
            .client
            .execute("return [window.innerWidth, window.innerHeight];", vec![])
            .await?;
        let inner: Vec<u32> = serde_json::from_value(inner).unwrap_or_default();
        if let [width, height] = inner[..]
            && (width, height) != (size.width, size.height)
        {
            let outer_width = size.width + size.width.saturating_sub(width);
            let outer_height = size.height + size.height.saturating_sub(height);
            self.client
                .set_window_size(outer_width, outer_height)
                .await
                .context("Failed to adjust window size")?;
        }
        Ok(())
    }

    async fn screenshot(&self, locator: Option<&Locator>) -> Result<Vec<u8>> {
        match locator {
            Some(locator) => self
                .first(locator)
                .await?
                .screenshot()
                .await
                .with_context(|| format!("Failed to capture {}", locator)),
            None => self
                .client
                .screenshot()
                .await
                .context("Failed to capture page screenshot"),
        }
    }
}

#[cfg(test)]
#[path = "webdriver_test.rs"]
mod webdriver_test;
