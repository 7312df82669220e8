//! eventsync-provider-google - Google Calendar backend for eventsync
//!
//! The provider manages its own credentials and session:
//!   ~/.config/eventsync/providers/google/app_config.toml
//!   ~/.config/eventsync/providers/google/session/{account}.toml

pub mod api;
pub mod app_config;
pub mod authenticate;
pub mod session;
pub mod types;

pub use api::GoogleCalendar;
pub use authenticate::authenticate;
pub use session::Session;

/// Authorized Calendar client for `account_email`, refreshing the session if needed.
pub async fn connect(account_email: &str) -> anyhow::Result<GoogleCalendar> {
    let session = Session::load_valid(account_email).await?;
    Ok(session.calendar())
}
