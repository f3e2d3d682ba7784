//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::Parser;
use std::path::PathBuf;

/// Site Insights - fetch and summarize a site's statistics insights
///
/// Fetches all ten insight reports for a site concurrently and renders
/// them as a single Markdown or JSON report.
///
/// Examples:
///   site-insights --site 12345 --token $TOKEN
///   site-insights --site 12345 --timezone Europe/Paris --yearly
///   site-insights --site 12345 --date 2019-04-01 --format json
///   site-insights --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Numeric site ID to fetch insights for
    ///
    /// Can also be set in the [site] section of .site-insights.toml.
    #[arg(short, long, value_name = "ID", env = "SITE_INSIGHTS_SITE")]
    pub site: Option<u64>,

    /// OAuth2 bearer token for the stats API
    #[arg(
        short,
        long,
        value_name = "TOKEN",
        env = "SITE_INSIGHTS_TOKEN",
        hide_env_values = true
    )]
    pub token: Option<String>,

    /// The site's IANA timezone (e.g. Europe/Paris)
    #[arg(long, value_name = "TZ")]
    pub timezone: Option<String>,

    /// Day whose month the posting activity is shown for (YYYY-MM-DD)
    ///
    /// Defaults to today in the site's timezone.
    #[arg(short, long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Include the 12-month posting activity table
    #[arg(short, long)]
    pub yearly: bool,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Stats API base URL
    #[arg(long, value_name = "URL", env = "SITE_INSIGHTS_API_URL")]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .site-insights.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .site-insights.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref timezone) = self.timezone {
            if timezone.parse::<Tz>().is_err() {
                return Err(format!("Unknown timezone: {}", timezone));
            }
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if matches!(self.token.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err("Token must not be empty".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
