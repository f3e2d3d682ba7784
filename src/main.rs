//! Site Insights - fetch and summarize a site's statistics insights
//!
//! A CLI tool that fetches every insight report for a site concurrently
//! and renders them, together with the posting activity calendar, as a
//! single Markdown or JSON report.
//!
//! Exit codes:
//!   0 - Success (the fetch cycle converged, even if some reports failed)
//!   1 - Runtime error (missing site or token, bad config, etc.)

mod cli;
mod config;
mod report;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use report::{InsightsReport, ReportMetadata};
use site_insights::{InsightQuery, InsightsStore, ReportKind, RestGateway, Subject};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Site Insights v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Insights run failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .site-insights.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Set [site] id and timezone, then pass the token via SITE_INSIGHTS_TOKEN.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run one fetch cycle and print the report.
async fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let site_id = config.site_id()?;
    let timezone = config.timezone()?;
    let token = args
        .token
        .clone()
        .ok_or_else(|| anyhow!("No access token given. Pass --token or set SITE_INSIGHTS_TOKEN"))?;

    let subject = Subject::new(site_id, token, timezone);
    let gateway = RestGateway::new(config.gateway_config())
        .context("Failed to create stats API client")?;

    info!(
        "Fetching insights for site {} ({}) from {}",
        site_id,
        timezone,
        config.api.base_url
    );

    let store = InsightsStore::new(subject, Arc::new(gateway));

    // A live query is what starts the fetch cycle
    let query = store.query(InsightQuery::Insights);

    let progress = if args.quiet {
        None
    } else {
        Some(spawn_progress(&store))
    };

    store.wait_until_idle().await;

    if let Some((pb, task)) = progress {
        task.abort();
        pb.finish_and_clear();
    }

    let activity_date = args
        .date
        .unwrap_or_else(|| Utc::now().with_timezone(&timezone).date_naive());

    let monthly_activity = store.get_monthly_posting_activity(activity_date);
    let yearly_activity = config
        .output
        .show_yearly_activity
        .then(|| store.get_yearly_posting_activity(activity_date));

    let metadata = ReportMetadata {
        site_id,
        timezone: timezone.name().to_string(),
        generated_at: Utc::now(),
        activity_date,
        missing_reports: Vec::new(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };

    let report = InsightsReport::new(metadata, store.snapshot(), monthly_activity, yearly_activity);
    drop(query);

    if !report.metadata.missing_reports.is_empty() {
        warn!(
            "{} of {} reports unavailable: {}",
            report.metadata.missing_reports.len(),
            ReportKind::ALL.len(),
            report
                .metadata
                .missing_reports
                .iter()
                .map(|kind| kind.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let output = match config.output.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    println!("{}", output);

    info!(
        "Insights complete in {:.1}s",
        report.metadata.duration_seconds
    );

    Ok(())
}

/// Show a progress bar that advances as each report lands.
fn spawn_progress(store: &InsightsStore) -> (Arc<ProgressBar>, tokio::task::JoinHandle<()>) {
    let total = ReportKind::ALL.len() as u64;
    let pb = Arc::new(ProgressBar::new(total));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} reports")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    pb.set_position(completed_reports(store));

    let mut changes = store.subscribe();
    let watched = store.clone();
    let pb_clone = pb.clone();
    let task = tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            pb_clone.set_position(completed_reports(&watched));
        }
    });

    (pb, task)
}

fn completed_reports(store: &InsightsStore) -> u64 {
    (ReportKind::ALL.len() - store.snapshot().pending_count()) as u64
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
