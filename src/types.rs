use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output format for CLI results
#[derive(Clone, Copy, Debug, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON format for programmatic consumption
    Json,
    /// Human-readable simple format
    Simple,
}

/// Time window offered by the package card's period dropdown
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePeriod {
    AllTime,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
}

impl TimePeriod {
    /// Every period in dropdown order
    pub const ALL: [TimePeriod; 7] = [
        TimePeriod::AllTime,
        TimePeriod::OneMonth,
        TimePeriod::ThreeMonths,
        TimePeriod::SixMonths,
        TimePeriod::OneYear,
        TimePeriod::TwoYears,
        TimePeriod::FiveYears,
    ];

    /// Exact label rendered by the dashboard
    pub fn label(&self) -> &'static str {
        match self {
            TimePeriod::AllTime => "All time",
            TimePeriod::OneMonth => "1 month",
            TimePeriod::ThreeMonths => "3 months",
            TimePeriod::SixMonths => "6 months",
            TimePeriod::OneYear => "1 year",
            TimePeriod::TwoYears => "2 years",
            TimePeriod::FiveYears => "5 years",
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimePeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        TimePeriod::ALL
            .into_iter()
            .find(|period| period.label() == trimmed)
            .ok_or_else(|| anyhow::anyhow!("Unknown time period: {}", s))
    }
}

/// Theme choice offered by the header dropdown
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    System,
    Light,
    Dark,
}

impl Theme {
    /// Accessible name of the dropdown menu item
    pub fn label(&self) -> &'static str {
        match self {
            Theme::System => "System",
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Color scheme resolved on the root element; `System` always resolves to one of these
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Light,
    Dark,
}

impl ColorScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chart axis whose tick labels are read
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// Year window accepted by the year-range validator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum YearSpan {
    OneYear,
    TwoYears,
    FiveYears,
}

impl YearSpan {
    pub fn label(&self) -> &'static str {
        match self {
            YearSpan::OneYear => "1 year",
            YearSpan::TwoYears => "2 years",
            YearSpan::FiveYears => "5 years",
        }
    }
}

impl FromStr for YearSpan {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1 year" => Ok(YearSpan::OneYear),
            "2 years" => Ok(YearSpan::TwoYears),
            "5 years" => Ok(YearSpan::FiveYears),
            other => anyhow::bail!("Unsupported year range: {}", other),
        }
    }
}

/// Month window accepted by the month-range validator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonthSpan {
    OneMonth,
    ThreeMonths,
    SixMonths,
}

impl MonthSpan {
    pub fn label(&self) -> &'static str {
        match self {
            MonthSpan::OneMonth => "1 month",
            MonthSpan::ThreeMonths => "3 months",
            MonthSpan::SixMonths => "6 months",
        }
    }
}

impl FromStr for MonthSpan {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1 month" => Ok(MonthSpan::OneMonth),
            "3 months" => Ok(MonthSpan::ThreeMonths),
            "6 months" => Ok(MonthSpan::SixMonths),
            other => anyhow::bail!("Unsupported month range: {}", other),
        }
    }
}

/// Page load milestones a wait can target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// `document.readyState` is at least `interactive`
    DomContentLoaded,
    /// `document.readyState` is `complete`
    Load,
    /// Load finished and no new resource entries appeared for the quiet period
    NetworkIdle,
}

/// Browser viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
}

impl ViewportSize {
    /// Parse viewport size from "WIDTHxHEIGHT" format (e.g., "1280x720")
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid viewport format. Use WIDTHxHEIGHT (e.g., 1280x720)");
        }

        let width = parts[0]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid width in viewport size"))?;
        let height = parts[1]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid height in viewport size"))?;

        Ok(ViewportSize { width, height })
    }
}

/// Element rectangle in CSS pixels relative to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// This box expressed relative to the top-left corner of `outer`
    pub fn relative_to(&self, outer: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x: self.x - outer.x,
            y: self.y - outer.y,
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
