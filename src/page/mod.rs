//! Page objects for the Package Pulse dashboard.
//!
//! Each section object wraps a [`PageDriver`] and the selector table for its part
//! of the page. Element references are never cached: every operation resolves its
//! locator again, so re-renders after a theme or period change are harmless.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::errors::PulseprobeError;
use crate::locator::Locator;
use crate::types::{BoundingBox, LoadState, ViewportSize};

pub mod footer;
pub mod header;
pub mod home_page;
pub mod package_card;
pub mod search_bar;

#[cfg(test)]
pub(crate) mod fake;

pub use footer::Footer;
pub use header::Header;
pub use home_page::HomePage;
pub use package_card::PackageCard;
pub use search_bar::SearchBar;

/// Browser operations the page objects are written against.
///
/// [`crate::webdriver::Browser`] is the WebDriver implementation. Locators are
/// resolved on every call; when a locator carries an exact-text filter only the
/// matching elements count.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    /// Wait until the page reaches `state`, failing after `timeout`
    async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> Result<()>;

    async fn count(&self, locator: &Locator) -> Result<usize>;

    /// Whether the first matching element exists and is displayed
    async fn is_visible(&self, locator: &Locator) -> Result<bool>;

    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Clear the first matching input and type `text`
    async fn fill(&self, locator: &Locator, text: &str) -> Result<()>;

    /// Text of every matching element, in document order
    async fn texts(&self, locator: &Locator) -> Result<Vec<String>>;

    /// Rectangles of every matching element
    async fn bounding_boxes(&self, locator: &Locator) -> Result<Vec<BoundingBox>>;

    /// Move the pointer to viewport coordinates
    async fn move_mouse(&self, x: f64, y: f64) -> Result<()>;

    /// Run a script in the page; `arguments[n]` refers to `args[n]`
    async fn evaluate(&self, script: &str, args: Vec<Value>) -> Result<Value>;

    async fn set_viewport(&self, size: ViewportSize) -> Result<()>;

    /// PNG screenshot of the viewport, or of one element
    async fn screenshot(&self, locator: Option<&Locator>) -> Result<Vec<u8>>;

    /// Text of the first matching element
    async fn text(&self, locator: &Locator) -> Result<String> {
        self.texts(locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Element not found: {}", locator))
    }

    /// Rectangle of the first matching element, `None` when nothing matches
    async fn bounding_box(&self, locator: &Locator) -> Result<Option<BoundingBox>> {
        Ok(self.bounding_boxes(locator).await?.into_iter().next())
    }

    /// Poll until the locator is visible, failing with
    /// [`PulseprobeError::ElementNotVisible`] once `timeout` elapses
    async fn wait_for_visible(
        &self,
        locator: &Locator,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.is_visible(locator).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) => debug!("Visibility check for {} failed: {:#}", locator, e),
            }

            if Instant::now() >= deadline {
                return Err(PulseprobeError::ElementNotVisible {
                    element: locator.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                }
                .into());
            }
            sleep(poll_interval).await;
        }
    }

    /// Inject a stylesheet into the current document
    async fn add_style(&self, css: &str) -> Result<()> {
        let script = r#"
            const style = document.createElement('style');
            style.setAttribute('data-pulseprobe', '');
            style.textContent = arguments[0];
            document.head.appendChild(style);
            return true;
        "#;
        self.evaluate(script, vec![Value::String(css.to_string())])
            .await?;
        Ok(())
    }
}
