#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulseprobe::commands;
use pulseprobe::commands::run::RunOverrides;
use pulseprobe::errors::PulseprobeError;
use pulseprobe::scenarios::{ScenarioFilter, Suite, Tag};
use pulseprobe::types::OutputFormat;
use pulseprobe::webdriver_manager;

const EXIT_SUCCESS: i32 = 0;

#[derive(Parser)]
#[command(name = "pulseprobe")]
#[command(about = "E2E, performance and visual checks for the Package Pulse dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run dashboard scenarios
    Run {
        /// Configuration file (defaults to <config dir>/pulseprobe/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only run these suites (repeatable)
        #[arg(short, long, value_enum)]
        suite: Vec<Suite>,

        /// Only run scenarios carrying one of these tags (repeatable)
        #[arg(short, long, value_enum)]
        tag: Vec<Tag>,

        /// Skip scenarios carrying any of these tags (repeatable)
        #[arg(long, value_enum)]
        exclude_tag: Vec<Tag>,

        /// Only run scenarios whose name or title contains this text
        #[arg(short, long)]
        grep: Option<String>,

        /// Browser to use (chrome or firefox)
        #[arg(short, long)]
        browser: Option<String>,

        /// Dashboard URL
        #[arg(long)]
        base_url: Option<String>,

        /// Run browser in visible mode (disables headless)
        #[arg(long = "no-headless")]
        no_headless: bool,

        /// Set viewport size (WIDTHxHEIGHT, e.g., 1920x1080)
        #[arg(long)]
        viewport: Option<String>,

        /// Write missing or changed screenshot baselines instead of failing
        #[arg(long)]
        update_snapshots: bool,

        /// Directory holding screenshot baselines
        #[arg(long)]
        baseline_dir: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// List scenarios
    List {
        #[arg(short, long, value_enum)]
        suite: Vec<Suite>,

        #[arg(short, long, value_enum)]
        tag: Vec<Tag>,

        #[arg(long, value_enum)]
        exclude_tag: Vec<Tag>,

        #[arg(short, long)]
        grep: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "simple")]
        format: OutputFormat,
    },

    /// Check x-axis tick labels against a date range without a browser
    CheckTicks {
        /// Range to check, e.g. "1 year" or "6 months"
        range: String,

        /// Tick labels (YYYY-MM or YYYY-MM-DD)
        ticks: Vec<String>,

        /// Evaluate as of this day (YYYY-MM-DD) instead of today
        #[arg(long)]
        today: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let result = run().await;

    // Always clean up WebDriver processes before exiting
    webdriver_manager::GLOBAL_WEBDRIVER_MANAGER.stop_all();

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            let pulseprobe_err: PulseprobeError = err.into();

            // Output JSON error to stdout for programmatic consumption
            let error_json = json!({
                "error": true,
                "message": pulseprobe_err.to_string(),
                "exit_code": pulseprobe_err.exit_code()
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            eprintln!("Error: {}", pulseprobe_err);
            std::process::exit(pulseprobe_err.exit_code());
        }
    }
}

async fn run() -> Result<()> {
    // Initialize tracing to stderr (so JSON output to stdout remains clean)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulseprobe=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            suite,
            tag,
            exclude_tag,
            grep,
            browser,
            base_url,
            no_headless,
            viewport,
            update_snapshots,
            baseline_dir,
            format,
        } => {
            let filter = ScenarioFilter {
                suites: suite,
                tags: tag,
                exclude_tags: exclude_tag,
                grep,
            };
            let overrides = RunOverrides {
                browser,
                base_url,
                no_headless,
                viewport,
                update_snapshots,
                baseline_dir,
            };
            commands::run::handle_run(config, filter, overrides, format).await?
        }

        Commands::List {
            suite,
            tag,
            exclude_tag,
            grep,
            format,
        } => {
            let filter = ScenarioFilter {
                suites: suite,
                tags: tag,
                exclude_tags: exclude_tag,
                grep,
            };
            commands::list::handle_list(filter, format).await?
        }

        Commands::CheckTicks {
            range,
            ticks,
            today,
            format,
        } => commands::check_ticks::handle_check_ticks(range, ticks, today, format).await?,

        Commands::Version => commands::version::handle_version().await?,
    }

    Ok(())
}
