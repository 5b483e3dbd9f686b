//! Performance measurements taken from the page under test.
//!
//! Timing and memory figures come from the browser's Performance API. Static
//! assets are discovered through Resource Timing entries and fetched again with
//! `reqwest` to read their status code and `content-length`.

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{CONTENT_LENGTH, HeaderMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{ResourceBudget, TimingBudget};
use crate::page::PageDriver;

lazy_static! {
    static ref STATIC_ASSET: Regex =
        Regex::new(r"(?i)\.(js|css|png|jpg|jpeg|gif|svg|woff2?|ttf|eot)$").expect("valid asset pattern");
}

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Whether `url` ends in a static asset extension (case insensitive)
pub fn is_static_asset(url: &str) -> bool {
    STATIC_ASSET.is_match(url)
}

/// Size announced by `content-length`, `None` when absent or unreadable
pub fn asset_size(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// An unknown size is never oversized
pub fn is_oversized(size: Option<u64>, max_size: u64) -> bool {
    size.is_some_and(|s| s > max_size)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub url: String,
    /// HTTP status, `None` when the request itself failed
    pub status: Option<u16>,
    pub size: Option<u64>,
}

/// Static assets of a page checked against the resource budget
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetAudit {
    pub assets: Vec<AssetRecord>,
    /// `url (status: N)` for every asset outside the allowed status codes
    pub failed: Vec<String>,
    pub oversized: Vec<AssetRecord>,
}

impl AssetAudit {
    pub fn from_records(records: Vec<AssetRecord>, budget: &ResourceBudget) -> Self {
        let mut audit = AssetAudit::default();
        for record in &records {
            match record.status {
                Some(status) if budget.allowed_status_codes.contains(&status) => {}
                Some(status) => audit
                    .failed
                    .push(format!("{} (status: {})", record.url, status)),
                None => audit
                    .failed
                    .push(format!("{} (request failed)", record.url)),
            }
            if is_oversized(record.size, budget.max_asset_size) {
                audit.oversized.push(record.clone());
            }
        }
        audit.assets = records;
        audit
    }

    pub fn passed(&self) -> bool {
        self.failed.is_empty() && self.oversized.is_empty()
    }
}

/// URLs of every resource the current document loaded, in load order
pub async fn resource_urls(driver: &dyn PageDriver) -> Result<Vec<String>> {
    let value = driver
        .evaluate(
            "return performance.getEntriesByType('resource').map(e => e.name);",
            vec![],
        )
        .await
        .context("Failed to read resource timing entries")?;
    serde_json::from_value(value).context("Unexpected resource timing entries")
}

/// Fetch `url` and record its status and announced size
pub async fn fetch_asset(client: &reqwest::Client, url: &str) -> AssetRecord {
    match client.get(url).send().await {
        Ok(response) => AssetRecord {
            url: url.to_string(),
            status: Some(response.status().as_u16()),
            size: asset_size(response.headers()),
        },
        Err(e) => {
            warn!("Failed to fetch {}: {}", url, e);
            AssetRecord {
                url: url.to_string(),
                status: None,
                size: None,
            }
        }
    }
}

/// Audit the static assets the current page loaded
pub async fn audit_assets(driver: &dyn PageDriver, budget: &ResourceBudget) -> Result<AssetAudit> {
    let urls: BTreeSet<String> = resource_urls(driver)
        .await?
        .into_iter()
        .filter(|url| is_static_asset(url))
        .collect();
    debug!("Auditing {} static assets", urls.len());
    audit_urls(urls, budget).await
}

/// Audit an explicit list of asset URLs
pub async fn audit_urls(
    urls: impl IntoIterator<Item = String>,
    budget: &ResourceBudget,
) -> Result<AssetAudit> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;

    let mut records = Vec::new();
    for url in urls {
        records.push(fetch_asset(&client, &url).await);
    }
    Ok(AssetAudit::from_records(records, budget))
}

/// Request count and transfer size of the current document
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub requests: usize,
    pub transfer_size: u64,
}

impl ResourceSummary {
    /// Budget lines this summary exceeds
    pub fn violations(&self, budget: &ResourceBudget) -> Vec<String> {
        let mut violations = Vec::new();
        if self.requests > budget.max_requests {
            violations.push(format!(
                "{} requests (budget {})",
                self.requests, budget.max_requests
            ));
        }
        if self.transfer_size > budget.total_size {
            violations.push(format!(
                "{} bytes transferred (budget {})",
                self.transfer_size, budget.total_size
            ));
        }
        violations
    }
}

pub async fn resource_summary(driver: &dyn PageDriver) -> Result<ResourceSummary> {
    let value = driver
        .evaluate(
            r#"
            const entries = performance.getEntriesByType('resource');
            return {
                requests: entries.length,
                transfer_size: Math.round(entries.reduce((sum, e) => sum + (e.transferSize || 0), 0))
            };
            "#,
            vec![],
        )
        .await
        .context("Failed to summarize resources")?;
    serde_json::from_value(value).context("Unexpected resource summary")
}

/// Navigation timing in milliseconds since navigation start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadMetrics {
    pub ttfb: f64,
    pub load_time: f64,
    pub dom_content_loaded: f64,
    /// First contentful paint, 0 when the browser reported none
    pub fcp: f64,
}

impl LoadMetrics {
    /// Each metric must stay strictly below its budget. LCP is approximated by
    /// DOM content loaded and TTI by load event end.
    pub fn violations(&self, budget: &TimingBudget) -> Vec<String> {
        let checks = [
            ("TTFB", self.ttfb, budget.ttfb),
            ("load time", self.load_time, budget.tti),
            ("FCP", self.fcp, budget.fcp),
            ("DOM content loaded", self.dom_content_loaded, budget.lcp),
        ];
        checks
            .into_iter()
            .filter(|(_, value, limit)| value >= limit)
            .map(|(name, value, limit)| format!("{} {:.0}ms >= {:.0}ms", name, value, limit))
            .collect()
    }
}

pub async fn load_metrics(driver: &dyn PageDriver) -> Result<LoadMetrics> {
    let value = driver
        .evaluate(
            r#"
            const nav = performance.getEntriesByType('navigation')[0];
            if (!nav) return null;
            const paint = performance.getEntriesByType('paint')
                .find(e => e.name === 'first-contentful-paint');
            return {
                ttfb: nav.responseStart,
                load_time: nav.loadEventEnd,
                dom_content_loaded: nav.domContentLoadedEventEnd,
                fcp: paint ? paint.startTime : 0
            };
            "#,
            vec![],
        )
        .await
        .context("Failed to read navigation timing")?;

    if value.is_null() {
        anyhow::bail!("No navigation timing entry available");
    }
    let metrics: LoadMetrics =
        serde_json::from_value(value).context("Unexpected navigation timing")?;
    debug!("Load metrics: {:?}", metrics);
    Ok(metrics)
}

/// `true` when `current` stays under `baseline * factor`
pub fn within_regression(baseline: f64, current: f64, factor: f64) -> bool {
    current < baseline * factor
}

/// JavaScript heap usage; only Chromium exposes `performance.memory`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetrics {
    pub used_js_heap_size: u64,
    pub total_js_heap_size: u64,
    pub js_heap_size_limit: u64,
    pub available: bool,
    pub used_js_heap_size_mb: u64,
    pub total_js_heap_size_mb: u64,
    pub js_heap_size_limit_mb: u64,
}

impl MemoryMetrics {
    pub fn new(used: u64, total: u64, limit: u64) -> Self {
        MemoryMetrics {
            used_js_heap_size: used,
            total_js_heap_size: total,
            js_heap_size_limit: limit,
            available: true,
            used_js_heap_size_mb: to_mb(used),
            total_js_heap_size_mb: to_mb(total),
            js_heap_size_limit_mb: to_mb(limit),
        }
    }

    pub fn unavailable() -> Self {
        MemoryMetrics::default()
    }
}

fn to_mb(bytes: u64) -> u64 {
    (bytes as f64 / BYTES_PER_MB).round() as u64
}

#[derive(Deserialize)]
struct RawMemory {
    used: u64,
    total: u64,
    limit: u64,
}

pub async fn memory_metrics(driver: &dyn PageDriver) -> Result<MemoryMetrics> {
    let value = driver
        .evaluate(
            r#"
            const m = performance.memory;
            if (!m) return null;
            return { used: m.usedJSHeapSize, total: m.totalJSHeapSize, limit: m.jsHeapSizeLimit };
            "#,
            vec![],
        )
        .await
        .context("Failed to read memory metrics")?;

    if value.is_null() {
        debug!("performance.memory is not available");
        return Ok(MemoryMetrics::unavailable());
    }
    let raw: RawMemory = serde_json::from_value(value).context("Unexpected memory metrics")?;
    Ok(MemoryMetrics::new(raw.used, raw.total, raw.limit))
}

/// Relative heap growth, `None` when the initial reading is zero
pub fn memory_growth(initial: u64, final_size: u64) -> Option<f64> {
    if initial == 0 {
        return None;
    }
    Some((final_size as f64 - initial as f64) / initial as f64)
}

#[cfg(test)]
#[path = "perf_test.rs"]
mod perf_test;
