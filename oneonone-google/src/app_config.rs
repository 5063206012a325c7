//! OAuth client credentials (user-provided).
//!
//! Accepts the `credentials.json` downloaded from Google Cloud Console,
//! which nests the values under `installed` (desktop apps) or `web`, as well
//! as a flat `{ "client_id": ..., "client_secret": ... }` object.

use std::path::Path;

use anyhow::{Context, Result};
use oneonone_core::Error;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CredentialsFile {
    Installed { installed: Credentials },
    Web { web: Credentials },
    Flat(Credentials),
}

impl From<CredentialsFile> for Credentials {
    fn from(file: CredentialsFile) -> Self {
        match file {
            CredentialsFile::Installed { installed } => installed,
            CredentialsFile::Web { web } => web,
            CredentialsFile::Flat(creds) => creds,
        }
    }
}

pub fn load(path: &Path) -> Result<Credentials> {
    if !path.exists() {
        return Err(Error::Auth(format!(
            "Credentials file not found at {}.\n\n\
            Download an OAuth client (Desktop app) from\n\
            https://console.cloud.google.com/apis/credentials\n\
            and pass its path with --credentials.",
            path.display()
        ))
        .into());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

    parse(&contents)
        .with_context(|| format!("Failed to parse credentials from {}", path.display()))
}

fn parse(contents: &str) -> Result<Credentials> {
    let file: CredentialsFile = serde_json::from_str(contents)
        .map_err(|e| Error::Auth(format!("malformed credentials: {}", e)))?;

    let creds = Credentials::from(file);
    if creds.client_id.is_empty() || creds.client_secret.is_empty() {
        return Err(Error::Auth("credentials are missing client_id or client_secret".into()).into());
    }

    Ok(creds)
}
