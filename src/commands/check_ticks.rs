use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::chart::{self, RangeCheck};
use crate::errors::PulseprobeError;
use crate::types::{MonthSpan, OutputFormat, YearSpan};

/// Range a set of axis ticks is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpan {
    Years(YearSpan),
    Months(MonthSpan),
}

impl RangeSpan {
    pub fn label(&self) -> &'static str {
        match self {
            RangeSpan::Years(span) => span.label(),
            RangeSpan::Months(span) => span.label(),
        }
    }

    pub fn check(&self, ticks: &[String], today: NaiveDate) -> RangeCheck {
        match self {
            RangeSpan::Years(span) => chart::check_year_range(ticks, *span, today),
            RangeSpan::Months(span) => chart::check_month_range(ticks, *span, today),
        }
    }
}

impl std::str::FromStr for RangeSpan {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(span) = s.parse::<YearSpan>() {
            return Ok(RangeSpan::Years(span));
        }
        if let Ok(span) = s.parse::<MonthSpan>() {
            return Ok(RangeSpan::Months(span));
        }
        anyhow::bail!(
            "Unsupported range: {}. Use 1 month, 3 months, 6 months, 1 year, 2 years or 5 years",
            s
        )
    }
}

#[derive(Debug, Serialize)]
pub struct TickReport {
    pub range: &'static str,
    pub today: NaiveDate,
    pub ticks: Vec<String>,
    #[serde(flatten)]
    pub check: RangeCheck,
}

pub fn evaluate(range: &str, ticks: Vec<String>, today: Option<&str>) -> Result<TickReport> {
    let span: RangeSpan = range.parse()?;
    let today = match today {
        Some(date) => chart::parse_date(date)?,
        None => Local::now().date_naive(),
    };
    let ticks: Vec<String> = ticks
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    Ok(TickReport {
        range: span.label(),
        today,
        check: span.check(&ticks, today),
        ticks,
    })
}

pub async fn handle_check_ticks(
    range: String,
    ticks: Vec<String>,
    today: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let report = evaluate(&range, ticks, today.as_deref())?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Simple => {
            println!(
                "{}: {} (distinct {:?}, newest {:?}, current {}, minimum {})",
                report.range,
                if report.check.in_range { "in range" } else { "out of range" },
                report.check.distinct,
                report.check.newest,
                report.check.current,
                report.check.minimum
            );
        }
    }

    if !report.check.in_range {
        return Err(PulseprobeError::AssertionFailed(format!(
            "Ticks do not span {}",
            report.range
        ))
        .into());
    }
    Ok(())
}
