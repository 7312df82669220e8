use anyhow::Result;

use crate::config;

pub async fn run() -> Result<()> {
    println!("Authenticating with Google...");

    // Provider handles the full OAuth flow and stores the session
    let account = eventsync_provider_google::authenticate().await?;

    println!("\nAuthenticated as: {}", account);
    println!("\nNow add this line to {}:", config::config_path()?.display());
    println!();
    println!("google_account = \"{}\"", account);
    println!();
    println!("Then run `eventsync sync` to add matching events to your calendars.");

    Ok(())
}
