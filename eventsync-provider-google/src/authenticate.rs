//! Browser consent flow that captures the OAuth code on a localhost redirect.

use anyhow::{Context, Result};
use google_calendar::Client;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::api::GoogleCalendar;
use crate::app_config::AppConfig;
use crate::session::{Session, Tokens};

/// Full read/write calendar access; calendars may need to be created.
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

const CALLBACK_PORT: u16 = 8085;

const CALLBACK_PAGE: &str = "HTTP/1.1 200 OK\r\n\
    Content-Type: text/html\r\n\
    Connection: close\r\n\
    \r\n\
    <html><body>\
    <h1>eventsync is authorized</h1>\
    <p>Return to the terminal to finish setup.</p>\
    </body></html>";

/// The code and state Google hands back on the redirect.
#[derive(Debug, PartialEq, Eq)]
struct Grant {
    code: String,
    state: String,
}

/// Run the consent flow, persist the session and return the account email.
pub async fn authenticate() -> Result<String> {
    let app = AppConfig::load()?;

    let mut client = Client::new(
        app.client_id,
        app.client_secret,
        format!("http://localhost:{CALLBACK_PORT}/callback"),
        String::new(),
        String::new(),
    );

    let consent_url = client.user_consent_url(&[CALENDAR_SCOPE.to_string()]);

    eprintln!("\nVisit this URL to grant calendar access:\n\n{}\n", consent_url);
    if let Err(e) = open::that(&consent_url) {
        tracing::debug!(error = %e, "Could not launch a browser");
        eprintln!("(Browser did not open, copy the URL above)");
    }

    let grant = receive_grant().await?;
    eprintln!("\nGot authorization code, requesting tokens...");

    let token = client
        .get_access_token(&grant.code, &grant.state)
        .await
        .context("Failed to exchange authorization code")?;

    // The primary calendar is named after the account email
    let account_email = GoogleCalendar::new(token.access_token.clone())
        .primary_calendar()
        .await
        .context("Failed to look up primary calendar")?
        .name;

    Session::new(&account_email, Tokens::from(&token))?.save()?;
    eprintln!("Saved Google login for {}", account_email);

    Ok(account_email)
}

/// Accept a single redirect request and answer it with a short page.
async fn receive_grant() -> Result<Grant> {
    let listener = TcpListener::bind(("127.0.0.1", CALLBACK_PORT))
        .await
        .with_context(|| format!("Failed to listen on port {CALLBACK_PORT} for the OAuth redirect"))?;

    let (stream, _) = listener.accept().await.context("OAuth redirect never arrived")?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .context("Failed to read OAuth redirect")?;

    let grant = parse_grant(&request_line)?;

    let mut stream = reader.into_inner();
    stream
        .write_all(CALLBACK_PAGE.as_bytes())
        .await
        .context("Failed to answer OAuth redirect")?;
    stream.flush().await?;

    Ok(grant)
}

/// Pull `code` and `state` out of `GET /callback?code=..&state=.. HTTP/1.1`.
fn parse_grant(request_line: &str) -> Result<Grant> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .context("Malformed OAuth redirect request")?;

    let url = url::Url::parse("http://localhost")?.join(target)?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match &*key {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => anyhow::bail!("Authorization was refused: {}", value),
            _ => {}
        }
    }

    Ok(Grant {
        code: code.context("OAuth redirect carried no code")?,
        state: state.context("OAuth redirect carried no state")?,
    })
}
