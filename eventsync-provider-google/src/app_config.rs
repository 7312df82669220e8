//! OAuth client credentials registered by the user in Google Cloud Console.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const FILE_NAME: &str = "app_config.toml";

/// Provider state lives under ~/.config/eventsync/providers/google
pub fn base_dir() -> Result<PathBuf> {
    let config = dirs::config_dir().context("No config directory on this platform")?;
    Ok(config.join("eventsync").join("providers").join("google"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&base_dir()?)
    }

    pub fn load_from(dir: &Path) -> Result<Self> {
        let path = dir.join(FILE_NAME);

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => anyhow::bail!(
                "Missing Google OAuth client at {}.\n\n\
                Create a Desktop OAuth client at https://console.cloud.google.com/apis/credentials\n\
                and save it as:\n\n\
                client_id = \"<id>.apps.googleusercontent.com\"\n\
                client_secret = \"<secret>\"",
                path.display()
            ),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        toml::from_str(&raw).with_context(|| format!("Invalid OAuth client file {}", path.display()))
    }
}
