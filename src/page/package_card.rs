use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::fmt;
use tracing::{debug, info};

use super::PageDriver;
use crate::chart::{self, TooltipDetails};
use crate::config::{PackageCardSelectors, Timeouts};
use crate::errors::PulseprobeError;
use crate::locator::Locator;
use crate::types::{Axis, MonthSpan, TimePeriod, YearSpan};

/// Package card elements addressable through [`PackageCard::get_element`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PackageCardElement {
    TimePeriod,
    Chart,
    Tooltip,
    InfoButton,
    StatsButton,
    Table,
}

impl fmt::Display for PackageCardElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PackageCardElement::TimePeriod => "time period",
            PackageCardElement::Chart => "chart",
            PackageCardElement::Tooltip => "tooltip",
            PackageCardElement::InfoButton => "info button",
            PackageCardElement::StatsButton => "stats button",
            PackageCardElement::Table => "table",
        };
        f.write_str(name)
    }
}

/// Card showing the download chart, period selector and stats table of the
/// selected projects
pub struct PackageCard<'a> {
    driver: &'a dyn PageDriver,
    selectors: &'a PackageCardSelectors,
    timeouts: &'a Timeouts,
}

impl<'a> PackageCard<'a> {
    pub fn new(
        driver: &'a dyn PageDriver,
        selectors: &'a PackageCardSelectors,
        timeouts: &'a Timeouts,
    ) -> Self {
        Self {
            driver,
            selectors,
            timeouts,
        }
    }

    fn period_option(&self, period: TimePeriod) -> &'a Locator {
        let options = &self.selectors.time_period;
        match period {
            TimePeriod::AllTime => &options.all_time,
            TimePeriod::OneMonth => &options.one_month,
            TimePeriod::ThreeMonths => &options.three_months,
            TimePeriod::SixMonths => &options.six_months,
            TimePeriod::OneYear => &options.one_year,
            TimePeriod::TwoYears => &options.two_years,
            TimePeriod::FiveYears => &options.five_years,
        }
    }

    fn element_locator(&self, element: PackageCardElement) -> &'a Locator {
        match element {
            PackageCardElement::TimePeriod => &self.selectors.time_period.button,
            PackageCardElement::Chart => &self.selectors.chart,
            PackageCardElement::Tooltip => &self.selectors.tooltip,
            PackageCardElement::InfoButton => &self.selectors.info_toggle,
            PackageCardElement::StatsButton => &self.selectors.stats_toggle,
            PackageCardElement::Table => &self.selectors.table,
        }
    }

    async fn is_shown(&self, locator: &Locator) -> bool {
        self.driver
            .wait_for_visible(locator, self.timeouts.fast(), self.timeouts.poll_interval())
            .await
            .is_ok()
    }

    pub async fn get_element(&self, element: PackageCardElement) -> Result<Locator> {
        let locator = self.element_locator(element);
        self.driver
            .wait_for_visible(locator, self.timeouts.fast(), self.timeouts.poll_interval())
            .await
            .with_context(|| format!("Could not get element {}", element))?;
        Ok(locator.clone())
    }

    /// Pick `period` from the dropdown and wait for the control to settle
    pub async fn change_time_period(&self, period: TimePeriod) -> Result<()> {
        info!("Changing time period to {}", period);
        let button = &self.selectors.time_period.button;
        let action = self.timeouts.action();
        let poll = self.timeouts.poll_interval();

        let result: Result<()> = async {
            self.driver.wait_for_visible(button, action, poll).await?;
            self.driver.click(button).await?;

            let option = self.period_option(period);
            self.driver.wait_for_visible(option, action, poll).await?;
            self.driver.click(option).await?;

            self.driver.wait_for_visible(button, action, poll).await
        }
        .await;

        result.with_context(|| format!("Failed to change time period to {}", period))
    }

    /// Label currently shown on the period control
    pub async fn time_period_option(&self) -> Result<String> {
        let button = &self.selectors.time_period.button;
        self.driver
            .wait_for_visible(button, self.timeouts.action(), self.timeouts.poll_interval())
            .await
            .context("Failed to get time period option")?;
        let text = self.driver.text(button).await?;
        Ok(text.trim().to_string())
    }

    /// Tick labels of one chart axis in render order, empty labels dropped
    pub async fn chart_axis_values(&self, axis: Axis) -> Result<Vec<String>> {
        let ticks = match axis {
            Axis::X => &self.selectors.x_axis_ticks,
            Axis::Y => &self.selectors.y_axis_ticks,
        };

        self.driver
            .wait_for_visible(ticks, self.timeouts.action(), self.timeouts.poll_interval())
            .await
            .with_context(|| format!("Failed to get chart {:?} axis values", axis))?;

        let values: Vec<String> = self
            .driver
            .texts(ticks)
            .await?
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        debug!("{:?} axis ticks: {:?}", axis, values);
        Ok(values)
    }

    pub async fn are_dates_in_year_range(&self, span: YearSpan) -> Result<bool> {
        self.are_dates_in_year_range_on(span, today()).await
    }

    /// Year range check against an explicit "today"
    pub async fn are_dates_in_year_range_on(&self, span: YearSpan, today: NaiveDate) -> Result<bool> {
        let ticks = self.chart_axis_values(Axis::X).await?;
        Ok(chart::dates_in_year_range(&ticks, span, today))
    }

    pub async fn are_dates_in_month_range(&self, span: MonthSpan) -> Result<bool> {
        self.are_dates_in_month_range_on(span, today()).await
    }

    /// Month range check against an explicit "today"
    pub async fn are_dates_in_month_range_on(
        &self,
        span: MonthSpan,
        today: NaiveDate,
    ) -> Result<bool> {
        let ticks = self.chart_axis_values(Axis::X).await?;
        Ok(chart::dates_in_month_range(&ticks, span, today))
    }

    /// Read the hover tooltip
    pub async fn tooltip_details(&self) -> Result<TooltipDetails> {
        self.driver
            .wait_for_visible(
                &self.selectors.tooltip,
                self.timeouts.action(),
                self.timeouts.poll_interval(),
            )
            .await
            .context("Tooltip is not visible")?;

        let date = self.driver.text(&self.selectors.tooltip_date).await?;
        let downloads = self.driver.text(&self.selectors.tooltip_downloads).await?;
        let name = self.driver.text(&self.selectors.tooltip_package_name).await?;

        let details = TooltipDetails::parse(&date, &downloads, &name)
            .map_err(|e| PulseprobeError::InvalidTooltip(e.to_string()))?;
        debug!("Tooltip: {:?}", details);
        Ok(details)
    }

    /// Whether the tooltip is on screen. Never fails.
    pub async fn is_tooltip_visible(&self) -> bool {
        let tooltip = &self.selectors.tooltip;
        let script = format!(
            r#"
            const el = {};
            if (!el) return false;
            const style = window.getComputedStyle(el);
            return style.visibility !== 'hidden'
                && style.display !== 'none'
                && parseFloat(style.opacity || '1') > 0;
            "#,
            tooltip.js_lookup()
        );

        let styled = match self.driver.evaluate(&script, vec![]).await {
            Ok(value) => value.as_bool().unwrap_or(false),
            Err(e) => {
                debug!("Tooltip style check failed: {:#}", e);
                false
            }
        };

        styled && self.driver.is_visible(tooltip).await.unwrap_or(false)
    }

    /// Hover the middle of the chart
    pub async fn move_to_chart_center(&self) -> Result<()> {
        self.move_mouse_on_chart(0.0, 0.0).await
    }

    /// Hover the chart at an offset from its centre
    pub async fn move_mouse_on_chart(&self, dx: f64, dy: f64) -> Result<()> {
        let chart = &self.selectors.chart;
        self.driver
            .wait_for_visible(chart, self.timeouts.action(), self.timeouts.poll_interval())
            .await?;
        let bounds = self
            .driver
            .bounding_box(chart)
            .await?
            .with_context(|| format!("Chart {} has no bounding box", chart))?;

        let (x, y) = bounds.center();
        debug!("Moving pointer to chart at ({}, {})", x + dx, y + dy);
        self.driver.move_mouse(x + dx, y + dy).await
    }

    pub async fn is_time_period_visible(&self) -> bool {
        self.is_shown(&self.selectors.time_period.button).await
    }

    pub async fn is_chart_visible(&self) -> bool {
        self.is_shown(&self.selectors.chart).await
    }

    pub async fn is_stats_button_visible(&self) -> bool {
        self.is_shown(&self.selectors.stats_toggle).await
    }

    pub async fn is_info_button_visible(&self) -> bool {
        self.is_shown(&self.selectors.info_toggle).await
    }

    pub async fn is_table_visible(&self) -> bool {
        self.is_shown(&self.selectors.table).await
    }

    /// Locators covering every value cell of the stats table
    pub async fn table_value_locators(&self) -> Result<Vec<Locator>> {
        self.matching(&self.selectors.table_values).await
    }

    /// Locators covering every trend arrow of the stats table
    pub async fn table_arrow_locators(&self) -> Result<Vec<Locator>> {
        self.matching(&self.selectors.table_arrows).await
    }

    async fn matching(&self, locator: &Locator) -> Result<Vec<Locator>> {
        let count = self.driver.count(locator).await?;
        Ok(if count > 0 {
            vec![locator.clone()]
        } else {
            Vec::new()
        })
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
#[path = "package_card_test.rs"]
mod package_card_test;
