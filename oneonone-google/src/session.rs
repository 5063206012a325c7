//! Cached Google OAuth session (access + refresh token).
//!
//! Stored as TOML at the configured token path with owner-only permissions.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use google_calendar::{AccessToken, Client};
use oneonone_core::Error;
use serde::{Deserialize, Serialize};

use crate::app_config::Credentials;
use crate::authenticate;

/// Refresh this long before the token actually expires.
const EXPIRY_SLACK_SECS: i64 = 60;

pub struct Session {
    path: PathBuf,
    creds: Credentials,
    data: SessionData,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionData {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl From<&AccessToken> for SessionData {
    fn from(tokens: &AccessToken) -> Self {
        SessionData {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
        }
    }
}

impl Session {
    pub fn new(path: &Path, creds: Credentials, data: SessionData) -> Self {
        Session {
            path: path.to_path_buf(),
            creds,
            data,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.data.access_token
    }

    pub fn client(&self) -> Client {
        Client::new(
            self.creds.client_id.clone(),
            self.creds.client_secret.clone(),
            authenticate::redirect_uri(),
            self.data.access_token.clone(),
            self.data.refresh_token.clone(),
        )
    }

    /// Load the cached session and refresh it if expired.
    ///
    /// Without a cached session, run the browser flow when `interactive`,
    /// otherwise fail with an auth error.
    pub async fn obtain(path: &Path, creds: Credentials, interactive: bool) -> Result<Self> {
        match Self::load(path, creds.clone())? {
            Some(mut session) => {
                if session.is_expired() {
                    session.refresh().await?;
                }
                Ok(session)
            }
            None if interactive => {
                let data = authenticate::run(&creds).await?;
                let session = Session::new(path, creds, data);
                session.save()?;
                Ok(session)
            }
            None => Err(Error::Auth(
                "Not signed in to Google Calendar.\n\
                Run `oneonone validate-access` first."
                    .into(),
            )
            .into()),
        }
    }

    fn load(path: &Path, creds: Credentials) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path).with_context(|| {
            format!("Failed to read Google OAuth session from {}", path.display())
        })?;

        let data: SessionData = toml::from_str(&contents).map_err(|e| {
            Error::Auth(format!(
                "Failed to parse Google OAuth session from {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Some(Session::new(path, creds, data)))
    }

    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(&self.data).context("Failed to serialize session")?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write session to {}", self.path.display()))?;

        // Owner-only (0600) since the file contains OAuth tokens:
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", self.path.display()))?;
        }

        Ok(())
    }

    fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_SLACK_SECS) >= self.data.expires_at
    }

    async fn refresh(&mut self) -> Result<()> {
        tracing::info!("Access token expired, refreshing");

        if self.data.refresh_token.is_empty() {
            return Err(Error::Auth(format!(
                "Session has no refresh token. Delete {} and run `oneonone validate-access`.",
                self.path.display()
            ))
            .into());
        }

        let mut tokens = self
            .client()
            .refresh_access_token()
            .await
            .map_err(|e| crate::error::from_api("Failed to refresh token", e))?;

        // Google typically doesn't return a new refresh_token on refresh
        if tokens.refresh_token.is_empty() {
            tokens.refresh_token = self.data.refresh_token.clone();
        }

        self.data = (&tokens).into();
        self.save()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    fn data(expires_at: DateTime<Utc>) -> SessionData {
        SessionData {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at,
        }
    }

    #[test]
    fn save_and_load_round_trip_with_private_permissions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oneonone").join("token.toml");

        Session::new(&path, creds(), data(Utc::now() + Duration::hours(1)))
            .save()
            .unwrap();

        let loaded = Session::load(&path, creds()).unwrap().unwrap();
        assert_eq!(loaded.access_token(), "access");
        assert!(!loaded.is_expired());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn token_near_expiry_counts_as_expired() {
        let session = Session::new(
            Path::new("token.toml"),
            creds(),
            data(Utc::now() + Duration::seconds(10)),
        );
        assert!(session.is_expired());
    }

    #[tokio::test]
    async fn missing_session_without_browser_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Session::obtain(&dir.path().join("token.toml"), creds(), false).await;

        let err = result.err().unwrap();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Auth(_))));
    }

    #[test]
    fn corrupt_session_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.toml");
        std::fs::write(&path, "access_token = 12").unwrap();

        let err = Session::load(&path, creds()).err().unwrap();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Auth(_))));
    }
}
