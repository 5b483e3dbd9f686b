use anyhow::{Context, Result};
use regex::Regex;
use tracing::info;

use super::{ScenarioContext, Verdict, expect};
use crate::page::HomePage;
use crate::perf;
use crate::types::LoadState;

async fn settle(ctx: &ScenarioContext<'_>) -> Result<()> {
    ctx.driver
        .wait_for_load_state(LoadState::NetworkIdle, ctx.config.timeouts.slow())
        .await
}

/// Select `project`, wait for the network to settle and for its chart and table
async fn add_project(ctx: &ScenarioContext<'_>, home: &HomePage<'_>, project: &str) -> Result<()> {
    home.search_bar.select_project(project).await?;
    settle(ctx).await?;
    expect(
        home.package_card.is_chart_visible().await,
        format!("Chart for {} is not visible", project),
    )?;
    expect(
        home.package_card.is_table_visible().await,
        format!("Table for {} is not visible", project),
    )
}

/// Click the top-left corner of the page so open dropdowns close
async fn dismiss_popups(ctx: &ScenarioContext<'_>) -> Result<()> {
    ctx.driver.move_mouse(0.0, 0.0).await?;
    ctx.driver
        .evaluate(
            r#"
            const target = document.elementFromPoint(0, 0) || document.body;
            for (const type of ['pointerdown', 'mousedown', 'pointerup', 'mouseup', 'click']) {
                target.dispatchEvent(new MouseEvent(type, { bubbles: true, clientX: 0, clientY: 0 }));
            }
            return true;
            "#,
            vec![],
        )
        .await
        .context("Failed to click the page corner")?;
    Ok(())
}

/// Timing and resource budgets of the page as loaded so far
async fn check_budgets(ctx: &ScenarioContext<'_>) -> Result<()> {
    let metrics = perf::load_metrics(ctx.driver).await?;
    info!(
        "TTFB {:.0}ms, load {:.0}ms, FCP {:.0}ms, DCL {:.0}ms",
        metrics.ttfb, metrics.load_time, metrics.fcp, metrics.dom_content_loaded
    );
    let violations = metrics.violations(&ctx.config.budgets.timing);
    expect(
        violations.is_empty(),
        format!("Timing budget exceeded: {}", violations.join(", ")),
    )?;

    let resources = perf::resource_summary(ctx.driver).await?;
    info!(
        "{} requests, {} bytes transferred",
        resources.requests, resources.transfer_size
    );
    let violations = resources.violations(&ctx.config.budgets.resources);
    expect(
        violations.is_empty(),
        format!("Resource budget exceeded: {}", violations.join(", ")),
    )
}

pub async fn homepage_load(ctx: &ScenarioContext<'_>) -> Result<Verdict> {
    ctx.home().open("/").await?;
    check_budgets(ctx).await?;
    Ok(Verdict::Passed)
}

pub async fn one_project_load(ctx: &ScenarioContext<'_>) -> Result<Verdict> {
    let home = ctx.home();
    home.open("/").await?;
    add_project(ctx, &home, &ctx.config.packages.react).await?;

    check_budgets(ctx).await?;
    Ok(Verdict::Passed)
}

pub async fn two_project_load(ctx: &ScenarioContext<'_>) -> Result<Verdict> {
    let home = ctx.home();
    home.open("/").await?;
    add_project(ctx, &home, &ctx.config.packages.react).await?;
    dismiss_popups(ctx).await?;
    add_project(ctx, &home, &ctx.config.packages.vue).await?;

    check_budgets(ctx).await?;
    Ok(Verdict::Passed)
}

pub async fn static_assets(ctx: &ScenarioContext<'_>) -> Result<Verdict> {
    ctx.home().open("/").await?;
    settle(ctx).await?;

    let audit = perf::audit_assets(ctx.driver, &ctx.config.budgets.resources).await?;
    info!("Checked {} static assets", audit.assets.len());
    expect(
        audit.failed.is_empty(),
        format!("Static assets failed to load: {}", audit.failed.join(", ")),
    )?;
    let oversized: Vec<String> = audit
        .oversized
        .iter()
        .map(|a| format!("{} ({} bytes)", a.url, a.size.unwrap_or_default()))
        .collect();
    expect(
        oversized.is_empty(),
        format!("Static assets over the size limit: {}", oversized.join(", ")),
    )?;
    Ok(Verdict::Passed)
}

pub async fn memory_growth(ctx: &ScenarioContext<'_>) -> Result<Verdict> {
    let home = ctx.home();
    home.open("/").await?;

    let initial = perf::memory_metrics(ctx.driver).await?;
    if !initial.available {
        return Ok(Verdict::Skipped(
            "Memory metrics not available in this browser".to_string(),
        ));
    }

    home.search_bar
        .select_project(&ctx.config.packages.playwright)
        .await?;
    settle(ctx).await?;

    let final_metrics = perf::memory_metrics(ctx.driver).await?;
    let growth = perf::memory_growth(initial.used_js_heap_size, final_metrics.used_js_heap_size)
        .context("Initial heap size reading was zero")?;
    info!(
        "Heap {}MB -> {}MB ({:+.1}%)",
        initial.used_js_heap_size_mb,
        final_metrics.used_js_heap_size_mb,
        growth * 100.0
    );

    let limit = ctx.config.budgets.max_memory_growth;
    expect(
        growth < limit,
        format!(
            "Heap grew {:.1}%, limit {:.1}%",
            growth * 100.0,
            limit * 100.0
        ),
    )?;
    Ok(Verdict::Passed)
}

pub async fn rapid_project_addition(ctx: &ScenarioContext<'_>) -> Result<Verdict> {
    let home = ctx.home();
    let packages = &ctx.config.packages;
    home.open("/").await?;

    home.search_bar.select_project(&packages.react).await?;
    settle(ctx).await?;
    expect(home.package_card.is_chart_visible().await, "Chart is not visible")?;
    let baseline = perf::load_metrics(ctx.driver).await?;

    dismiss_popups(ctx).await?;

    home.search_bar.select_project(&packages.playwright).await?;
    settle(ctx).await?;
    expect(home.package_card.is_chart_visible().await, "Chart is not visible")?;

    let pattern = Regex::new(&format!(
        "projects={}.*{}",
        regex::escape(&packages.react),
        regex::escape(&packages.playwright)
    ))?;
    let url = ctx.driver.current_url().await?;
    expect(
        pattern.is_match(&url),
        format!("URL {} does not list both projects", url),
    )?;

    let addition = perf::load_metrics(ctx.driver).await?;
    let timing = &ctx.config.budgets.timing;
    expect(
        addition.ttfb < timing.ttfb,
        format!("TTFB {:.0}ms >= {:.0}ms", addition.ttfb, timing.ttfb),
    )?;
    expect(
        addition.load_time < timing.tti,
        format!("Load time {:.0}ms >= {:.0}ms", addition.load_time, timing.tti),
    )?;

    let factor = ctx.config.budgets.max_runtime_regression;
    expect(
        perf::within_regression(baseline.load_time, addition.load_time, factor),
        format!(
            "Load time {:.0}ms regressed past {:.1}x the baseline {:.0}ms",
            addition.load_time, factor, baseline.load_time
        ),
    )?;
    Ok(Verdict::Passed)
}
