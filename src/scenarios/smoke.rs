use anyhow::Result;

use super::{ScenarioContext, Verdict, expect};
use crate::page::header::HeaderElement;
use crate::types::{ColorScheme, Theme};

pub async fn theme_switch(ctx: &ScenarioContext<'_>) -> Result<Verdict> {
    let home = ctx.home();
    home.open("/").await?;

    let initial = home.header.current_theme().await?;
    expect(
        initial == ColorScheme::Light,
        format!("Initial theme is {}, expected light", initial),
    )?;

    let label = home.header.get_element(HeaderElement::ThemeLabel).await?;
    let caption = ctx.driver.text(&label).await?;
    expect(!caption.trim().is_empty(), "Theme switcher has no label")?;

    for (theme, scheme) in [(Theme::Dark, ColorScheme::Dark), (Theme::Light, ColorScheme::Light)] {
        home.header.select_theme(theme).await?;
        let current = home.header.current_theme().await?;
        expect(
            current == scheme,
            format!("Theme is {} after selecting {}", current, theme),
        )?;
    }

    Ok(Verdict::Passed)
}

pub async fn project_search(ctx: &ScenarioContext<'_>) -> Result<Verdict> {
    let home = ctx.home();
    home.open("/").await?;

    let project = &ctx.config.packages.smoke;
    home.search_bar.select_project(project).await?;

    let expected = ctx.config.url_for(&format!("/?projects={}", project));
    let url = home.current_url().await?;
    expect(url == expected, format!("URL is {}, expected {}", url, expected))?;

    let card = &home.package_card;
    let sections = [
        ("time period", card.is_time_period_visible().await),
        ("chart", card.is_chart_visible().await),
        ("info button", card.is_info_button_visible().await),
        ("stats button", card.is_stats_button_visible().await),
        ("table", card.is_table_visible().await),
    ];
    for (element, visible) in sections {
        expect(visible, format!("Package card {} is not visible", element))?;
    }

    Ok(Verdict::Passed)
}
