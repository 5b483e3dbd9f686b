use anyhow::Result;
use tokio::time::sleep;

use super::{ScenarioContext, Verdict, expect};
use crate::chart::parse_date;
use crate::page::HomePage;
use crate::types::{MonthSpan, TimePeriod, YearSpan};

/// Select `project` and switch its card to `period`
async fn switch_period(home: &HomePage<'_>, project: &str, period: TimePeriod) -> Result<()> {
    home.search_bar.select_project(project).await?;

    let card = &home.package_card;
    expect(card.is_time_period_visible().await, "Time period control is not visible")?;
    let initial = card.time_period_option().await?;

    card.change_time_period(period).await?;

    let selected = card.time_period_option().await?;
    expect(
        selected != initial,
        format!("Time period stayed at {}", initial),
    )?;
    expect(
        selected == period.label(),
        format!("Time period shows {}, expected {}", selected, period),
    )
}

pub async fn one_year_period(ctx: &ScenarioContext<'_>) -> Result<Verdict> {
    let home = ctx.home();
    home.open("/").await?;
    switch_period(&home, &ctx.config.packages.react, TimePeriod::OneYear).await?;

    let card = &home.package_card;
    expect(
        card.are_dates_in_year_range(YearSpan::OneYear).await?,
        "Axis dates do not cover one year",
    )?;
    expect(
        !card.are_dates_in_year_range(YearSpan::FiveYears).await?,
        "One year of dates passed as five years",
    )?;
    Ok(Verdict::Passed)
}

pub async fn six_month_period(ctx: &ScenarioContext<'_>) -> Result<Verdict> {
    let home = ctx.home();
    home.open("/").await?;
    switch_period(&home, &ctx.config.packages.react, TimePeriod::SixMonths).await?;

    let card = &home.package_card;
    expect(
        card.are_dates_in_month_range(MonthSpan::SixMonths).await?,
        "Axis dates do not cover six months",
    )?;
    expect(
        card.are_dates_in_year_range(YearSpan::OneYear).await?,
        "Six months of dates do not fit one year",
    )?;
    Ok(Verdict::Passed)
}

pub async fn five_year_period(ctx: &ScenarioContext<'_>) -> Result<Verdict> {
    let home = ctx.home();
    home.open("/").await?;
    switch_period(&home, &ctx.config.packages.react, TimePeriod::FiveYears).await?;

    expect(
        home.package_card
            .are_dates_in_year_range(YearSpan::FiveYears)
            .await?,
        "Axis dates do not cover five years",
    )?;
    Ok(Verdict::Passed)
}

pub async fn tooltip_on_hover(ctx: &ScenarioContext<'_>) -> Result<Verdict> {
    let home = ctx.home();
    let project = &ctx.config.packages.react;
    home.open("/").await?;
    home.search_bar.select_project(project).await?;
    sleep(ctx.config.timeouts.fast()).await;

    let card = &home.package_card;
    expect(card.is_chart_visible().await, "Chart is not visible")?;

    ctx.driver.move_mouse(0.0, 0.0).await?;
    expect(
        !card.is_tooltip_visible().await,
        "Tooltip is visible with the pointer outside the chart",
    )?;

    card.move_to_chart_center().await?;
    expect(card.is_tooltip_visible().await, "Tooltip did not appear on hover")?;

    let details = card.tooltip_details().await?;
    expect(
        details.package_name == *project,
        format!("Tooltip names {}, expected {}", details.package_name, project),
    )?;
    expect(
        details.has_valid_date(),
        format!("Tooltip date {:?} is not YYYY-MM-DD", details.date),
    )?;
    Ok(Verdict::Passed)
}

pub async fn tooltip_follows_pointer(ctx: &ScenarioContext<'_>) -> Result<Verdict> {
    let home = ctx.home();
    home.open("/").await?;
    home.search_bar
        .select_project(&ctx.config.packages.react)
        .await?;
    sleep(ctx.config.timeouts.fast()).await;

    let card = &home.package_card;
    expect(card.is_chart_visible().await, "Chart is not visible")?;

    card.move_to_chart_center().await?;
    expect(card.is_tooltip_visible().await, "Tooltip did not appear on hover")?;
    let initial = card.tooltip_details().await?;

    card.move_mouse_on_chart(40.0, 0.0).await?;
    expect(card.is_tooltip_visible().await, "Tooltip vanished moving right")?;
    let newest = card.tooltip_details().await?;

    card.move_mouse_on_chart(-80.0, 0.0).await?;
    expect(card.is_tooltip_visible().await, "Tooltip vanished moving left")?;
    let oldest = card.tooltip_details().await?;

    let initial_date = parse_date(&initial.date)?;
    let newest_date = parse_date(&newest.date)?;
    let oldest_date = parse_date(&oldest.date)?;

    expect(
        newest_date > initial_date,
        format!("{} is not after {}", newest.date, initial.date),
    )?;
    expect(
        oldest_date < newest_date && oldest_date < initial_date,
        format!("{} is not before {} and {}", oldest.date, initial.date, newest.date),
    )?;
    for details in [&newest, &oldest] {
        expect(
            details.package_name == initial.package_name,
            format!(
                "Tooltip switched from {} to {}",
                initial.package_name, details.package_name
            ),
        )?;
    }

    Ok(Verdict::Passed)
}
