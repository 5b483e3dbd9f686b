use anyhow::Result;
use tokio::time::sleep;

use super::{ScenarioContext, Verdict, expect};
use crate::errors::PulseprobeError;
use crate::locator::Locator;
use crate::page::HomePage;
use crate::page::footer::FooterElement;
use crate::page::header::HeaderElement;
use crate::page::package_card::PackageCardElement;
use crate::page::search_bar::SearchBarElement;
use crate::types::{ColorScheme, Theme};
use crate::visual::{VisualOutcome, prepare_for_visual_test, snapshot};

async fn open_prepared<'a>(ctx: &ScenarioContext<'a>) -> Result<HomePage<'a>> {
    let home = ctx.home();
    home.open("/").await?;
    prepare_for_visual_test(ctx.driver, ctx.config.visual.viewport).await?;
    Ok(home)
}

async fn apply_theme(home: &HomePage<'_>, scheme: ColorScheme) -> Result<()> {
    let theme = match scheme {
        ColorScheme::Light => Theme::Light,
        ColorScheme::Dark => Theme::Dark,
    };
    home.header.select_theme(theme).await?;
    let current = home.header.current_theme().await?;
    expect(
        current == scheme,
        format!("Theme is {} after selecting {}", current, theme),
    )
}

async fn expect_not_empty(ctx: &ScenarioContext<'_>, locator: &Locator) -> Result<()> {
    let text = ctx.driver.text(locator).await?;
    expect(!text.trim().is_empty(), format!("{} is empty", locator))
}

/// Compare `target` against baseline `name`, failing on mismatch
async fn expect_screenshot(
    ctx: &ScenarioContext<'_>,
    name: &str,
    target: &Locator,
    masks: &[Locator],
) -> Result<()> {
    match snapshot(ctx.driver, ctx.comparator, name, Some(target), masks).await? {
        VisualOutcome::Mismatch { reason, .. } => {
            Err(PulseprobeError::AssertionFailed(format!("Screenshot {} differs: {}", name, reason)).into())
        }
        _ => Ok(()),
    }
}

pub async fn chart_layout(ctx: &ScenarioContext<'_>) -> Result<Verdict> {
    let home = open_prepared(ctx).await?;
    home.search_bar
        .select_project(&ctx.config.packages.react)
        .await?;
    let card = &home.package_card;
    expect(card.is_chart_visible().await, "Chart is not visible")?;

    sleep(ctx.config.timeouts.extra_fast()).await;
    card.move_to_chart_center().await?;

    let chart = card.get_element(PackageCardElement::Chart).await?;
    let tooltip = card.get_element(PackageCardElement::Tooltip).await?;
    expect_screenshot(ctx, "chart-default", &chart, &[tooltip]).await?;
    Ok(Verdict::Passed)
}

pub async fn tooltip_layout(ctx: &ScenarioContext<'_>) -> Result<Verdict> {
    let home = open_prepared(ctx).await?;
    home.search_bar
        .select_project(&ctx.config.packages.react)
        .await?;
    let card = &home.package_card;
    expect(card.is_chart_visible().await, "Chart is not visible")?;
    card.move_to_chart_center().await?;

    let tooltip = card.get_element(PackageCardElement::Tooltip).await?;
    expect_not_empty(ctx, &tooltip).await?;
    expect_screenshot(ctx, "tooltip-default", &tooltip, &[]).await?;
    Ok(Verdict::Passed)
}

pub async fn header(ctx: &ScenarioContext<'_>, scheme: ColorScheme) -> Result<Verdict> {
    let home = open_prepared(ctx).await?;
    apply_theme(&home, scheme).await?;

    let container = home.header.get_element(HeaderElement::Container).await?;
    expect(home.header.is_header_visible().await, "Header is not visible")?;
    expect_not_empty(ctx, &container).await?;
    expect_screenshot(ctx, &format!("header-{}-default", scheme), &container, &[]).await?;
    Ok(Verdict::Passed)
}

pub async fn search_bar(ctx: &ScenarioContext<'_>, scheme: ColorScheme) -> Result<Verdict> {
    let home = open_prepared(ctx).await?;
    apply_theme(&home, scheme).await?;

    let container = home
        .search_bar
        .get_element(SearchBarElement::Container)
        .await?;
    expect(
        home.search_bar.is_search_bar_visible().await,
        "Search bar is not visible",
    )?;
    expect_not_empty(ctx, &container).await?;
    expect_screenshot(
        ctx,
        &format!("search-bar-landing-{}-default", scheme),
        &container,
        &[],
    )
    .await?;

    home.search_bar
        .select_project(&ctx.config.packages.react)
        .await?;
    expect(
        home.search_bar.is_search_bar_visible().await,
        "Search bar is not visible after selecting a project",
    )?;
    expect_not_empty(ctx, &container).await?;
    expect_screenshot(
        ctx,
        &format!("search-bar-home-{}-default", scheme),
        &container,
        &[],
    )
    .await?;
    Ok(Verdict::Passed)
}

pub async fn table(ctx: &ScenarioContext<'_>, scheme: ColorScheme) -> Result<Verdict> {
    let home = open_prepared(ctx).await?;
    apply_theme(&home, scheme).await?;

    home.search_bar
        .select_project(&ctx.config.packages.react)
        .await?;
    let card = &home.package_card;
    expect(card.is_table_visible().await, "Table is not visible")?;

    let table = card.get_element(PackageCardElement::Table).await?;
    let mut masks = card.table_value_locators().await?;
    masks.extend(card.table_arrow_locators().await?);

    expect_not_empty(ctx, &table).await?;
    expect_screenshot(ctx, &format!("table-{}-default", scheme), &table, &masks).await?;
    Ok(Verdict::Passed)
}

pub async fn footer(ctx: &ScenarioContext<'_>, scheme: ColorScheme) -> Result<Verdict> {
    let home = open_prepared(ctx).await?;
    apply_theme(&home, scheme).await?;

    let container = home.footer.get_element(FooterElement::Container).await?;
    expect(home.footer.is_footer_visible().await, "Footer is not visible")?;
    expect_not_empty(ctx, &container).await?;
    expect_screenshot(ctx, &format!("footer-{}-default", scheme), &container, &[]).await?;
    Ok(Verdict::Passed)
}
