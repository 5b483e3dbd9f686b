//! # pulseprobe
#![allow(clippy::uninlined_format_args)]
//!
//! End-to-end, performance-budget and visual-regression suite for the
//! Package Pulse npm download statistics dashboard, driven over WebDriver.
//!
//! The dashboard is modelled as page objects ([`page::HomePage`] composing a
//! header, search bar, package card and footer). Scenarios in [`scenarios`]
//! drive those objects and check chart date ranges, tooltip contents, load
//! budgets, static assets, heap growth and screenshots against baselines.
//!
//! ## Installation
//!
//! ```bash
//! cargo install pulseprobe
//! ```
//!
//! A `chromedriver` or `geckodriver` on the `PATH` is started automatically.
//! Point `PULSEPROBE_WEBDRIVER_URL` at an already running driver to reuse it.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Run everything against the production dashboard in headless Chrome
//! pulseprobe run
//!
//! # Smoke scenarios only, human-readable output
//! pulseprobe run --tag smoke --format simple
//!
//! # Chart scenarios without the known-broken ones, in Firefox
//! pulseprobe run --suite chart --exclude-tag bugged --browser firefox
//!
//! # Against a local build, visible browser
//! pulseprobe run --base-url http://localhost:3000 --no-headless
//!
//! # Record or refresh screenshot baselines
//! pulseprobe run --suite visual --update-snapshots --baseline-dir snapshots
//!
//! # List the scenario catalogue
//! pulseprobe list --suite performance
//!
//! # Validate axis ticks offline
//! pulseprobe check-ticks "1 year" 2025-11 2026-02 2026-08 --today 2026-10-16
//! ```
//!
//! ## JSON Output
//!
//! `run` prints a report with a run id, timestamps and one entry per scenario.
//! Logs go to stderr, so the report can be piped straight into `jq`:
//!
//! ```bash
//! pulseprobe run --suite smoke | jq -r '.results[] | select(.status == "failed") | .name'
//! ```
//!
//! Failures exit non-zero: 2 element not visible, 3 unexpected theme,
//! 4 WebDriver failure, 5 timeout, 6 unreadable tooltip, 7 failed assertions.
//!
//! ## Library Usage
//!
//! ```no_run
//! use pulseprobe::{Browser, HomePage, SuiteConfig};
//! use pulseprobe::types::{TimePeriod, YearSpan};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = SuiteConfig::load(None)?;
//! let browser = Browser::new(config.browser, config.viewport, config.headless).await?;
//!
//! let home = HomePage::new(&browser, &config);
//! home.open("/").await?;
//! home.search_bar.select_project("react").await?;
//! home.package_card.change_time_period(TimePeriod::OneYear).await?;
//! assert!(home.package_card.are_dates_in_year_range(YearSpan::OneYear).await?);
//!
//! browser.close().await?;
//! # Ok(())
//! # }
//! ```

/// Tooltip parsing and axis date-range rules
pub mod chart;

/// CLI command handlers
pub mod commands;

/// Suite configuration and selector tables
pub mod config;

/// Error classification and exit codes
pub mod errors;

/// Selector strings understood by the page driver
pub mod locator;

/// Page objects for the dashboard
pub mod page;

/// Performance API readings and the static asset audit
pub mod perf;

/// Scenario catalogue and runner
pub mod scenarios;

/// Shared value types
pub mod types;

/// Screenshot baselines and pixel comparison
pub mod visual;

/// WebDriver browser control and automation
pub mod webdriver;

/// Automatic WebDriver process management
pub mod webdriver_manager;

pub use config::SuiteConfig;
pub use errors::PulseprobeError;
pub use locator::Locator;
pub use page::{HomePage, PageDriver};
pub use types::{BoundingBox, ColorScheme, OutputFormat, Theme, TimePeriod, ViewportSize};
pub use webdriver::{Browser, BrowserType};
