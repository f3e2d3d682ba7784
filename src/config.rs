//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.site-insights.toml` files.

use crate::cli::{Args, OutputFormat};
use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use site_insights::RestGatewayConfig;
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".site-insights.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Site settings.
    #[serde(default)]
    pub site: SiteConfig,

    /// Stats API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// The site to fetch insights for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Numeric site ID.
    #[serde(default)]
    pub id: Option<u64>,

    /// IANA timezone name.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            id: None,
            timezone: default_timezone(),
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// Stats API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// REST API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    RestGatewayConfig::default().base_url
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    RestGatewayConfig::default().user_agent
}

/// Report output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Include the 12-month posting activity table.
    #[serde(default)]
    pub show_yearly_activity: bool,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.site-insights.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(site) = args.site {
            self.site.id = Some(site);
        }
        if let Some(ref timezone) = args.timezone {
            self.site.timezone = timezone.clone();
        }
        if let Some(ref url) = args.api_url {
            self.api.base_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }
        if let Some(format) = args.format {
            self.output.format = format;
        }
        if args.yearly {
            self.output.show_yearly_activity = true;
        }
    }

    /// The configured site ID, required to run.
    pub fn site_id(&self) -> Result<u64> {
        self.site.id.ok_or_else(|| {
            anyhow!("No site ID given. Pass --site or set [site] id in {}", CONFIG_FILE_NAME)
        })
    }

    /// The configured timezone, parsed.
    pub fn timezone(&self) -> Result<Tz> {
        self.site
            .timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid timezone '{}': {}", self.site.timezone, e))
    }

    /// Gateway settings derived from the [api] section.
    pub fn gateway_config(&self) -> RestGatewayConfig {
        RestGatewayConfig {
            base_url: self.api.base_url.clone(),
            timeout_seconds: self.api.timeout_seconds,
            user_agent: self.api.user_agent.clone(),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.site.id.is_none());
        assert_eq!(config.site.timezone, "UTC");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.output.format, OutputFormat::Markdown);
        assert!(config.site_id().is_err());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[site]
id = 12345
timezone = "Europe/Paris"

[api]
timeout_seconds = 10

[output]
format = "json"
show_yearly_activity = true
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.site_id().unwrap(), 12345);
        assert_eq!(config.timezone().unwrap(), chrono_tz::Europe::Paris);
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.api.base_url, default_base_url());
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.show_yearly_activity);
    }

    #[test]
    fn test_invalid_timezone() {
        let mut config = Config::default();
        config.site.timezone = "Nowhere/Special".to_string();
        assert!(config.timezone().is_err());
    }

    #[test]
    fn test_merge_with_args() {
        let mut config: Config = toml::from_str("[site]\nid = 1\n").unwrap();
        let args = Args::try_parse_from([
            "site-insights",
            "--site",
            "2",
            "--timezone",
            "Asia/Tokyo",
            "--timeout",
            "5",
        ])
        .unwrap();

        config.merge_with_args(&args);

        assert_eq!(config.site.id, Some(2));
        assert_eq!(config.site.timezone, "Asia/Tokyo");
        assert_eq!(config.gateway_config().timeout_seconds, 5);
        // Not given on the command line, so the file/default value stays.
        assert_eq!(config.output.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[site]\nid = 77\n").unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.site.id, Some(77));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[site\nid = ").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[site]"));
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[output]"));
        assert!(!toml_str.contains("token"));
    }
}
