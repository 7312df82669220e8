//! Google OAuth tokens stored per account, refreshed when close to expiry.
//!
//! Layout: `<base_dir>/session/<account>.toml`, owner-readable only.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use google_calendar::{AccessToken, Client};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::GoogleCalendar;
use crate::app_config::{AppConfig, base_dir};

/// Refresh this long before the recorded expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tokens {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl Tokens {
    /// Tokens issued now, valid for `expires_in` seconds.
    pub fn issued(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Tokens {
            access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        }
    }

    fn expires_soon(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

impl From<&AccessToken> for Tokens {
    fn from(token: &AccessToken) -> Self {
        Tokens::issued(
            token.access_token.clone(),
            token.refresh_token.clone(),
            token.expires_in,
        )
    }
}

fn session_file(dir: &Path, account_email: &str) -> PathBuf {
    let file_name = format!("{}.toml", account_email.replace(['/', '\\', ':'], "_"));
    dir.join("session").join(file_name)
}

pub struct Session {
    account_email: String,
    path: PathBuf,
    tokens: Tokens,
}

impl Session {
    pub fn new(account_email: &str, tokens: Tokens) -> Result<Self> {
        Ok(Session {
            account_email: account_email.to_string(),
            path: session_file(&base_dir()?, account_email),
            tokens,
        })
    }

    pub fn account_email(&self) -> &str {
        &self.account_email
    }

    /// Calendar API client authorized with the current access token.
    pub fn calendar(&self) -> GoogleCalendar {
        GoogleCalendar::new(self.tokens.access_token.clone())
    }

    /// Open the stored session for `account_email`, refreshing it if needed.
    pub async fn load_valid(account_email: &str) -> Result<Self> {
        let mut session = Self::open(&base_dir()?, account_email)?;

        if session.tokens.expires_soon(Utc::now()) {
            tracing::debug!(account = account_email, "Access token expired, refreshing");
            session.refresh().await?;
        }

        Ok(session)
    }

    pub fn open(dir: &Path, account_email: &str) -> Result<Self> {
        let path = session_file(dir, account_email);

        if !path.exists() {
            anyhow::bail!(
                "No saved Google login for {}.\n\
                Run `eventsync auth` first.",
                account_email
            );
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let tokens: Tokens = toml::from_str(&raw)
            .with_context(|| format!("Corrupt Google session file {}", path.display()))?;

        Ok(Session {
            account_email: account_email.to_string(),
            path,
            tokens,
        })
    }

    pub fn save(&self) -> Result<()> {
        let raw = toml::to_string_pretty(&self.tokens).context("Failed to encode tokens")?;
        write_private(&self.path, &raw)
    }

    async fn refresh(&mut self) -> Result<()> {
        let app = AppConfig::load()?;

        let client = Client::new(
            app.client_id,
            app.client_secret,
            String::new(),
            self.tokens.access_token.clone(),
            self.tokens.refresh_token.clone(),
        );

        let fresh = client
            .refresh_access_token()
            .await
            .with_context(|| format!("Failed to refresh Google login for {}", self.account_email))?;

        let mut tokens = Tokens::from(&fresh);
        // The refresh response usually omits the refresh token
        if tokens.refresh_token.is_empty() {
            tokens.refresh_token = std::mem::take(&mut self.tokens.refresh_token);
        }

        self.tokens = tokens;
        self.save()
    }
}

/// Write `contents` to `path`, creating parents, readable by the owner only.
fn write_private(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict {}", path.display()))?;
    }

    Ok(())
}
