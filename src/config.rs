//! Suite configuration: target URL, browser, timeouts, budgets and selector tables.
//!
//! Every field has a default matching the production dashboard, so an empty
//! JSON object (or no file at all) is a valid configuration. Values are
//! resolved in order: defaults, JSON file, environment, command line flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::locator::Locator;
use crate::types::ViewportSize;
use crate::webdriver::BrowserType;

/// Environment variable overriding the base URL
pub const ENV_BASE_URL: &str = "PULSEPROBE_BASE_URL";
/// Environment variable overriding the browser
pub const ENV_BROWSER: &str = "PULSEPROBE_BROWSER";

pub const DEFAULT_BASE_URL: &str = "https://www.package-pulse.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Root URL of the dashboard under test
    pub base_url: String,
    pub browser: BrowserType,
    pub headless: bool,
    /// Window size applied when a session starts
    pub viewport: Option<ViewportSize>,
    pub timeouts: Timeouts,
    pub budgets: PerformanceBudgets,
    pub packages: Packages,
    pub visual: VisualConfig,
    pub selectors: Selectors,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            browser: BrowserType::Chrome,
            headless: true,
            viewport: None,
            timeouts: Timeouts::default(),
            budgets: PerformanceBudgets::default(),
            packages: Packages::default(),
            visual: VisualConfig::default(),
            selectors: Selectors::default(),
        }
    }
}

impl SuiteConfig {
    /// Load configuration from `path`, or from the default location when it exists,
    /// then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path().filter(|p| p.exists()),
        };

        let mut config = match file {
            Some(file) => {
                info!("Loading configuration from {}", file.display());
                let content = std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read config file {}", file.display()))?;
                serde_json::from_str(&content)
                    .with_context(|| format!("Invalid config file {}", file.display()))?
            }
            None => {
                debug!("No configuration file, using defaults");
                SuiteConfig::default()
            }
        };

        config.apply_env()?;
        Ok(config)
    }

    /// `<config dir>/pulseprobe/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pulseprobe").join("config.json"))
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var(ENV_BASE_URL)
            && !url.trim().is_empty()
        {
            self.base_url = url;
        }
        if let Ok(browser) = std::env::var(ENV_BROWSER)
            && !browser.trim().is_empty()
        {
            self.browser = browser
                .parse()
                .with_context(|| format!("Invalid {} value", ENV_BROWSER))?;
        }
        Ok(())
    }

    /// Absolute URL for a path relative to the base URL (e.g. "/" or "/?projects=react")
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

/// Bounded waits, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub extra_fast_ms: u64,
    pub fast_ms: u64,
    pub slow_ms: u64,
    pub extra_slow_ms: u64,
    /// Default wait for an interaction step that names no timeout of its own
    pub action_ms: u64,
    /// Pause after a theme change so the re-render settles
    pub theme_settle_ms: u64,
    /// Interval between visibility polls
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            extra_fast_ms: 1_000,
            fast_ms: 5_000,
            slow_ms: 30_000,
            extra_slow_ms: 60_000,
            action_ms: 10_000,
            theme_settle_ms: 500,
            poll_interval_ms: 100,
        }
    }
}

impl Timeouts {
    pub fn extra_fast(&self) -> Duration {
        Duration::from_millis(self.extra_fast_ms)
    }

    pub fn fast(&self) -> Duration {
        Duration::from_millis(self.fast_ms)
    }

    pub fn slow(&self) -> Duration {
        Duration::from_millis(self.slow_ms)
    }

    pub fn extra_slow(&self) -> Duration {
        Duration::from_millis(self.extra_slow_ms)
    }

    pub fn action(&self) -> Duration {
        Duration::from_millis(self.action_ms)
    }

    pub fn theme_settle(&self) -> Duration {
        Duration::from_millis(self.theme_settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceBudgets {
    pub timing: TimingBudget,
    pub resources: ResourceBudget,
    /// Maximum relative heap growth across a project selection
    pub max_memory_growth: f64,
    /// Maximum ratio between load time after adding a project and the baseline
    pub max_runtime_regression: f64,
}

impl Default for PerformanceBudgets {
    fn default() -> Self {
        Self {
            timing: TimingBudget::default(),
            resources: ResourceBudget::default(),
            max_memory_growth: 0.3,
            max_runtime_regression: 1.2,
        }
    }
}

/// Timing budgets in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingBudget {
    /// Time to first byte
    pub ttfb: f64,
    /// First contentful paint
    pub fcp: f64,
    /// Largest contentful paint (checked against DOM content loaded)
    pub lcp: f64,
    /// Time to interactive (checked against load event end)
    pub tti: f64,
}

impl Default for TimingBudget {
    fn default() -> Self {
        Self {
            ttfb: 200.0,
            fcp: 1800.0,
            lcp: 2500.0,
            tti: 3800.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceBudget {
    pub max_requests: usize,
    /// Total transfer size in bytes
    pub total_size: u64,
    /// Size limit for one static asset in bytes
    pub max_asset_size: u64,
    pub allowed_status_codes: Vec<u16>,
}

impl Default for ResourceBudget {
    fn default() -> Self {
        Self {
            max_requests: 50,
            total_size: 1_572_864,
            max_asset_size: 1_048_576,
            allowed_status_codes: vec![200, 304],
        }
    }
}

/// Package names used by the scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Packages {
    pub react: String,
    pub vue: String,
    pub playwright: String,
    /// Project searched by the smoke scenario
    pub smoke: String,
}

impl Default for Packages {
    fn default() -> Self {
        Self {
            react: "react".to_string(),
            vue: "vue".to_string(),
            playwright: "playwright".to_string(),
            smoke: "test".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    /// Directory holding baseline screenshots
    pub baseline_dir: PathBuf,
    /// Directory receiving actual and diff images on mismatch
    pub diff_dir: PathBuf,
    /// Fraction of pixels allowed to differ (0.0-1.0)
    pub max_diff_ratio: f64,
    /// Per-channel color distance below which pixels count as equal
    pub color_threshold: u8,
    /// Write missing or mismatching baselines instead of failing
    pub update_baselines: bool,
    /// Viewport used when preparing a page for screenshots
    pub viewport: ViewportSize,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            baseline_dir: PathBuf::from("snapshots"),
            diff_dir: PathBuf::from("snapshots/diffs"),
            max_diff_ratio: 0.01,
            color_threshold: 10,
            update_baselines: false,
            viewport: ViewportSize {
                width: 1280,
                height: 720,
            },
        }
    }
}

/// DOM contract of the dashboard, one table per section object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub header: HeaderSelectors,
    pub footer: FooterSelectors,
    pub search_bar: SearchBarSelectors,
    pub package_card: PackageCardSelectors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderSelectors {
    pub container: Locator,
    pub theme_dropdown: Locator,
    pub theme_label: Locator,
    pub theme_system: Locator,
    pub theme_light: Locator,
    pub theme_dark: Locator,
}

impl Default for HeaderSelectors {
    fn default() -> Self {
        Self {
            container: Locator::css("header.flex"),
            theme_dropdown: Locator::css("#theme-switch"),
            theme_label: Locator::css("#theme-switch label"),
            theme_system: Locator::role("menuitem", Some("System")),
            theme_light: Locator::role("menuitem", Some("Light")),
            theme_dark: Locator::role("menuitem", Some("Dark")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterSelectors {
    pub container: Locator,
}

impl Default for FooterSelectors {
    fn default() -> Self {
        Self {
            container: Locator::css("footer.mt-4.flex"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchBarSelectors {
    pub container: Locator,
    pub input: Locator,
    pub dropdown: Locator,
    pub results: Locator,
    pub no_results: Locator,
}

impl Default for SearchBarSelectors {
    fn default() -> Self {
        Self {
            container: Locator::css("form.flex.flex-col.gap-4"),
            input: Locator::css("#search"),
            dropdown: Locator::css(r#"[role="listbox"]"#),
            results: Locator::css(r#"[role="option"]"#),
            no_results: Locator::text("No project found."),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageCardSelectors {
    pub time_period: TimePeriodSelectors,
    pub chart: Locator,
    pub x_axis_ticks: Locator,
    pub y_axis_ticks: Locator,
    pub tooltip: Locator,
    pub tooltip_date: Locator,
    pub tooltip_package_name: Locator,
    pub tooltip_downloads: Locator,
    pub stats_toggle: Locator,
    pub info_toggle: Locator,
    pub table: Locator,
    pub table_values: Locator,
    pub table_arrows: Locator,
}

impl Default for PackageCardSelectors {
    fn default() -> Self {
        Self {
            time_period: TimePeriodSelectors::default(),
            chart: Locator::css(r#"[role="application"]"#),
            x_axis_ticks: Locator::css(".recharts-xAxis .recharts-cartesian-axis-tick-value"),
            y_axis_ticks: Locator::css(".recharts-yAxis .recharts-cartesian-axis-tick-value"),
            tooltip: Locator::css(".recharts-tooltip-wrapper"),
            tooltip_date: Locator::css(".recharts-tooltip-wrapper .recharts-tooltip-label"),
            tooltip_package_name: Locator::css(
                ".recharts-tooltip-wrapper .recharts-tooltip-item-name",
            ),
            tooltip_downloads: Locator::css(
                ".recharts-tooltip-wrapper .recharts-tooltip-item-value",
            ),
            stats_toggle: Locator::role("radio", Some("Toggle stats")),
            info_toggle: Locator::role("radio", Some("Toggle info")),
            table: Locator::css("table"),
            table_values: Locator::css("table tbody td.value"),
            table_arrows: Locator::css("table tbody td svg"),
        }
    }
}

/// Period dropdown and one option per period
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimePeriodSelectors {
    pub button: Locator,
    pub all_time: Locator,
    pub one_month: Locator,
    pub three_months: Locator,
    pub six_months: Locator,
    pub one_year: Locator,
    pub two_years: Locator,
    pub five_years: Locator,
}

impl Default for TimePeriodSelectors {
    fn default() -> Self {
        Self {
            button: Locator::css("#time-period-select"),
            all_time: Locator::role("menuitem", Some("All time")),
            one_month: Locator::role("menuitem", Some("1 month")),
            three_months: Locator::role("menuitem", Some("3 months")),
            six_months: Locator::role("menuitem", Some("6 months")),
            one_year: Locator::role("menuitem", Some("1 year")),
            two_years: Locator::role("menuitem", Some("2 years")),
            five_years: Locator::role("menuitem", Some("5 years")),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
