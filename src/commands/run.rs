use anyhow::{Context, Result};
use std::fmt::Write;
use std::path::PathBuf;
use tracing::info;

use crate::config::SuiteConfig;
use crate::errors::PulseprobeError;
use crate::scenarios::{self, Report, ScenarioFilter, ScenarioStatus};
use crate::types::{OutputFormat, ViewportSize};

/// Command line settings layered over the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub browser: Option<String>,
    pub base_url: Option<String>,
    pub no_headless: bool,
    pub viewport: Option<String>,
    pub update_snapshots: bool,
    pub baseline_dir: Option<PathBuf>,
}

impl RunOverrides {
    pub fn apply(&self, config: &mut SuiteConfig) -> Result<()> {
        if let Some(browser) = &self.browser {
            config.browser = browser.parse()?;
        }
        if let Some(url) = &self.base_url {
            url::Url::parse(url).with_context(|| format!("Invalid base URL: {}", url))?;
            config.base_url = url.clone();
        }
        if self.no_headless {
            config.headless = false;
        }
        if let Some(viewport) = &self.viewport {
            config.viewport = Some(ViewportSize::parse(viewport)?);
        }
        if self.update_snapshots {
            config.visual.update_baselines = true;
        }
        if let Some(dir) = &self.baseline_dir {
            config.visual.diff_dir = dir.join("diffs");
            config.visual.baseline_dir = dir.clone();
        }
        Ok(())
    }
}

pub async fn handle_run(
    config_path: Option<PathBuf>,
    filter: ScenarioFilter,
    overrides: RunOverrides,
    format: OutputFormat,
) -> Result<()> {
    let mut config = SuiteConfig::load(config_path.as_deref())?;
    overrides.apply(&mut config)?;

    let report = scenarios::run(&config, &filter).await?;
    info!(
        "{} passed, {} failed, {} skipped",
        report.passed, report.failed, report.skipped
    );

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Simple => print!("{}", render_simple(&report)),
    }

    if !report.success() {
        return Err(PulseprobeError::AssertionFailed(format!(
            "{} of {} scenarios failed",
            report.failed,
            report.results.len()
        ))
        .into());
    }
    Ok(())
}

pub fn render_simple(report: &Report) -> String {
    let mut out = String::new();
    for result in &report.results {
        let _ = match result.status {
            ScenarioStatus::Passed => {
                writeln!(out, "PASS {} ({}ms)", result.name, result.duration_ms)
            }
            ScenarioStatus::Failed => writeln!(
                out,
                "FAIL {}: {}",
                result.name,
                result.error.as_deref().unwrap_or("unknown error")
            ),
            ScenarioStatus::Skipped => writeln!(
                out,
                "SKIP {}: {}",
                result.name,
                result.skip_reason.as_deref().unwrap_or("skipped")
            ),
        };
    }
    let _ = writeln!(
        out,
        "{} passed, {} failed, {} skipped (run {})",
        report.passed, report.failed, report.skipped, report.run_id
    );
    out
}
