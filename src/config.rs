use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::{Path, PathBuf};

static DEFAULT_LISTING_URL: &str = "https://api.thevillages.com/cc3/Api/EventList";
static DEFAULT_TIME_ZONE: &str = "America/New_York";
static DEFAULT_SEARCH_TERMS: &str = "search_terms.csv";
const DEFAULT_MAX_RESULTS: u32 = 20000;

fn default_listing_url() -> String {
    DEFAULT_LISTING_URL.to_string()
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

fn default_window_days() -> u64 {
    eventsync_core::window::DEFAULT_WINDOW_DAYS
}

fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}

fn default_search_terms() -> String {
    DEFAULT_SEARCH_TERMS.to_string()
}

/// Global configuration at ~/.config/eventsync/config.toml
///
/// Every key is optional except `google_account`, which `sync` needs.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Event listing endpoint
    #[serde(default = "default_listing_url")]
    pub listing_url: String,

    /// IANA zone used for event times and the sync window
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Days after today included in each run
    #[serde(default = "default_window_days")]
    pub window_days: u64,

    /// Result-count ceiling passed to the listing endpoint
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Path of the search-terms CSV
    #[serde(default = "default_search_terms")]
    pub search_terms: String,

    pub google_account: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listing_url: default_listing_url(),
            time_zone: default_time_zone(),
            window_days: default_window_days(),
            max_results: default_max_results(),
            search_terms: default_search_terms(),
            google_account: None,
        }
    }
}

impl Config {
    pub fn tz(&self) -> Result<Tz> {
        self.time_zone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid time_zone '{}' in config: {}", self.time_zone, e))
    }

    pub fn search_terms_path(&self) -> PathBuf {
        expand_path(&self.search_terms)
    }

    pub fn google_account(&self) -> Result<&str> {
        self.google_account.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "No Google account configured.\n\
                Run `eventsync auth` and add the printed google_account line to {}",
                config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "config.toml".to_string())
            )
        })
    }
}

/// Get the config directory path (~/.config/eventsync)
pub fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("eventsync");
    Ok(config_dir)
}

/// Get the config file path (~/.config/eventsync/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load config from ~/.config/eventsync/config.toml, defaults if absent
pub fn load_config() -> Result<Config> {
    load_from(&config_path()?)
}

pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

    // Fail early on a bad zone rather than mid-run
    config.tz()?;

    Ok(config)
}

/// Expand ~ in paths to the home directory
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
