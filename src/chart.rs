//! Chart tick and tooltip validation.
//!
//! The dashboard renders download counts over time. The x-axis tick labels are
//! date strings (`YYYY-MM...`) and the hover tooltip shows one data point. The
//! functions here are pure: they receive the extracted text and the date to treat
//! as "today", which keeps them independent of the browser and of the clock.
//!
//! Range checks use tolerance bands on the number of distinct years or months
//! because tick granularity can straddle a boundary depending on the exact day.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

use crate::types::{MonthSpan, YearSpan};

lazy_static! {
    static ref STRICT_DATE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern");
}

/// Content of the chart tooltip for one hovered data point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipDetails {
    /// Data point date, expected as YYYY-MM-DD
    pub date: String,
    pub package_name: String,
    pub downloads: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TooltipError {
    #[error("Tooltip package name is empty")]
    EmptyPackageName,
    #[error("Tooltip downloads value '{0}' is not a number")]
    InvalidDownloads(String),
    #[error("Tooltip is missing required data (date: '{date}', downloads: {downloads})")]
    MissingData { date: String, downloads: u64 },
}

impl TooltipDetails {
    /// Assemble tooltip details from the raw text of its three parts.
    ///
    /// Thousands separators are stripped from the downloads text. A zero download
    /// count is reported as missing data, the same as an empty date.
    ///
    /// The date text is kept as shown and not validated here. Callers that need a
    /// real date must check [`TooltipDetails::has_valid_date`].
    pub fn parse(
        date_text: &str,
        downloads_text: &str,
        name_text: &str,
    ) -> Result<Self, TooltipError> {
        let package_name = name_text.trim();
        if package_name.is_empty() {
            return Err(TooltipError::EmptyPackageName);
        }

        let raw_downloads = downloads_text.replace(',', "");
        let downloads = raw_downloads
            .trim()
            .parse::<u64>()
            .map_err(|_| TooltipError::InvalidDownloads(downloads_text.trim().to_string()))?;

        let date = date_text.trim();
        // TODO: zero downloads is a legitimate data point for young packages; report it
        // once the dashboard distinguishes "no data" from "0" in the tooltip
        if date.is_empty() || downloads == 0 {
            return Err(TooltipError::MissingData {
                date: date.to_string(),
                downloads,
            });
        }

        Ok(TooltipDetails {
            date: date.to_string(),
            package_name: package_name.to_string(),
            downloads,
        })
    }

    pub fn has_valid_date(&self) -> bool {
        is_valid_date_format(&self.date)
    }
}

/// Strict `YYYY-MM-DD` pattern that is also a real calendar date
pub fn is_valid_date_format(value: &str) -> bool {
    STRICT_DATE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Parse a tooltip date for chronological comparison
pub fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    if !STRICT_DATE.is_match(value.trim()) {
        anyhow::bail!("Date '{}' does not match YYYY-MM-DD", value);
    }
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("Invalid calendar date '{}': {}", value, e))
}

/// Outcome of checking a set of ticks against a range policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeCheck {
    /// Distinct year or month values found, ascending
    pub distinct: Vec<i32>,
    /// Value of the chronologically newest tick
    pub newest: Option<i32>,
    /// Current year or month at evaluation time
    pub current: i32,
    /// Smallest oldest value the policy accepts
    pub minimum: i32,
    pub valid_counts: Vec<usize>,
    pub in_range: bool,
}

struct Policy {
    valid_counts: &'static [usize],
    back: i32,
}

fn year_policy(span: YearSpan) -> Policy {
    match span {
        YearSpan::OneYear => Policy {
            valid_counts: &[1, 2],
            back: 1,
        },
        YearSpan::TwoYears => Policy {
            valid_counts: &[2, 3],
            back: 2,
        },
        YearSpan::FiveYears => Policy {
            valid_counts: &[4, 5, 6],
            back: 5,
        },
    }
}

fn month_policy(span: MonthSpan) -> Policy {
    match span {
        MonthSpan::OneMonth => Policy {
            valid_counts: &[1, 2],
            back: 1,
        },
        MonthSpan::ThreeMonths => Policy {
            valid_counts: &[3, 4],
            back: 3,
        },
        MonthSpan::SixMonths => Policy {
            valid_counts: &[5, 6, 7],
            back: 6,
        },
    }
}

/// Year of a tick: its first four characters
pub fn tick_year(tick: &str) -> Option<i32> {
    let year = tick.get(0..4)?;
    if !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    year.parse().ok()
}

/// Month of a tick: characters 5-6
pub fn tick_month(tick: &str) -> Option<i32> {
    let month = tick.get(5..7)?;
    if !month.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    month.parse().ok().filter(|m| (1..=12).contains(m))
}

/// Bring a month offset back into 1..=12
pub fn wrap_month(month: i32) -> i32 {
    if month < 1 {
        month + 12
    } else if month > 12 {
        month - 12
    } else {
        month
    }
}

/// Check x-axis ticks against a year window ending today
pub fn check_year_range(ticks: &[String], span: YearSpan, today: NaiveDate) -> RangeCheck {
    let policy = year_policy(span);
    let current = today.year();
    let years: BTreeSet<i32> = ticks.iter().filter_map(|t| tick_year(t)).collect();
    let newest = years.last().copied();
    let minimum = current - policy.back;

    let in_range = match (years.first(), newest) {
        (Some(&oldest), Some(newest)) if newest == current => {
            policy.valid_counts.contains(&years.len()) && oldest >= minimum
        }
        _ => false,
    };

    debug!(
        "Year range {}: years {:?}, current {}, in range {}",
        span.label(),
        years,
        current,
        in_range
    );

    RangeCheck {
        distinct: years.into_iter().collect(),
        newest,
        current,
        minimum,
        valid_counts: policy.valid_counts.to_vec(),
        in_range,
    }
}

/// Check x-axis ticks against a month window ending today.
///
/// The two ends are read differently. The newest month comes from the latest tick
/// by `YYYY-MM` order and must equal the current month. The oldest month is the
/// smallest month number among all ticks regardless of year, so a window that
/// crosses a year boundary (wrapped minimum greater than the current month)
/// accepts any oldest month. The check is a loose month-number comparison, not a
/// calendar computation.
pub fn check_month_range(ticks: &[String], span: MonthSpan, today: NaiveDate) -> RangeCheck {
    let policy = month_policy(span);
    let current = today.month() as i32;
    let months: BTreeSet<i32> = ticks.iter().filter_map(|t| tick_month(t)).collect();
    let newest = ticks
        .iter()
        .filter(|t| tick_month(t).is_some())
        .max()
        .and_then(|t| tick_month(t));
    let minimum = wrap_month(current - policy.back);

    let in_range = match (months.first(), newest) {
        (Some(&oldest), Some(newest)) if newest == current => {
            let oldest_ok = if minimum > current {
                oldest >= 1
            } else {
                oldest >= minimum
            };
            policy.valid_counts.contains(&months.len()) && oldest_ok
        }
        _ => false,
    };

    debug!(
        "Month range {}: months {:?}, current {}, in range {}",
        span.label(),
        months,
        current,
        in_range
    );

    RangeCheck {
        distinct: months.into_iter().collect(),
        newest,
        current,
        minimum,
        valid_counts: policy.valid_counts.to_vec(),
        in_range,
    }
}

pub fn dates_in_year_range(ticks: &[String], span: YearSpan, today: NaiveDate) -> bool {
    check_year_range(ticks, span, today).in_range
}

pub fn dates_in_month_range(ticks: &[String], span: MonthSpan, today: NaiveDate) -> bool {
    check_month_range(ticks, span, today).in_range
}

#[cfg(test)]
#[path = "chart_test.rs"]
mod chart_test;
