//! Browser-based OAuth consent flow for installed apps.
//!
//! Opens the consent page, waits for Google's redirect on a loopback port
//! and exchanges the code for tokens.

use anyhow::{Context, Result};
use google_calendar::Client;
use oneonone_core::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::app_config::Credentials;
use crate::session::SessionData;

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar.readonly",
    "https://www.googleapis.com/auth/calendar.events",
];

const REDIRECT_PORT: u16 = 8085;

pub fn redirect_uri() -> String {
    format!("http://localhost:{}/callback", REDIRECT_PORT)
}

pub fn redirect_address() -> String {
    format!("127.0.0.1:{}", REDIRECT_PORT)
}

pub async fn run(creds: &Credentials) -> Result<SessionData> {
    let scopes: Vec<String> = SCOPES.iter().map(|s| s.to_string()).collect();

    let mut client = Client::new(
        creds.client_id.clone(),
        creds.client_secret.clone(),
        redirect_uri(),
        String::new(),
        String::new(),
    );

    let auth_url = client.user_consent_url(&scopes);

    eprintln!("\nOpen this URL in your browser to authenticate:\n");
    eprintln!("{}\n", auth_url);

    if open::that(&auth_url).is_err() {
        eprintln!("(Could not open browser automatically, please copy the URL above)");
    }

    let (code, state) = wait_for_callback().await?;

    tracing::info!("Received authorization code, exchanging for tokens");

    let access_token = client
        .get_access_token(&code, &state)
        .await
        .map_err(|e| Error::Auth(format!("Failed to exchange authorization code: {}", e)))?;

    Ok((&access_token).into())
}

async fn wait_for_callback() -> Result<(String, String)> {
    let listener = TcpListener::bind(redirect_address())
        .await
        .context("Failed to bind OAuth callback listener")?;

    let (stream, _) = listener
        .accept()
        .await
        .context("Failed to accept OAuth callback")?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .context("Failed to read OAuth callback request line")?;

    let (code, state) = parse_callback(&request_line);

    let body = if code.is_ok() {
        "<h1>Authentication successful!</h1>\
        <p>You can close this window and return to the terminal.</p>"
    } else {
        "<h1>Authentication failed</h1><p>Check the terminal for details.</p>"
    };

    let response = format!(
        "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>{}</body></html>",
        body
    );

    let mut stream = reader.into_inner();
    stream
        .write_all(response.as_bytes())
        .await
        .context("Failed to write OAuth callback response")?;
    stream.flush().await?;

    Ok((code?, state?))
}

/// Pull `code` and `state` out of `GET /callback?code=...&state=... HTTP/1.1`.
fn parse_callback(request_line: &str) -> (Result<String>, Result<String>) {
    let url = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Invalid HTTP request"))
        .and_then(|path| {
            url::Url::parse(&format!("http://localhost{}", path)).map_err(anyhow::Error::from)
        });

    let url = match url {
        Ok(url) => url,
        Err(e) => {
            let msg = e.to_string();
            return (Err(e), Err(anyhow::anyhow!(msg)));
        }
    };

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.to_string())
    };

    if let Some(error) = param("error") {
        let denied =
            || -> anyhow::Error { Error::Auth(format!("Consent was not granted: {}", error)).into() };
        return (Err(denied()), Err(denied()));
    }

    (
        param("code").ok_or_else(|| anyhow::anyhow!("No code in callback")),
        param("state").ok_or_else(|| anyhow::anyhow!("No state in callback")),
    )
}
