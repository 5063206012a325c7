//! User configuration at ~/.config/oneonone/config.toml
//!
//! Every field is optional. Command line flags override the file, and the
//! file overrides built-in defaults.

use std::path::{Path, PathBuf};

use chrono::Duration;
use chrono_tz::Tz;
use serde::Deserialize;

use crate::constants::{APP_DIR, DEFAULT_MEETING_MINUTES};
use crate::error::{Error, Result};
use crate::input::{parse_duration, parse_timezone};
use crate::working_hours::WorkingHours;

static DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";
static DEFAULT_ORG_FILE: &str = "org.csv";

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// OAuth client credentials downloaded from Google Cloud Console
    pub credentials: Option<PathBuf>,
    /// Cached OAuth token
    pub token: Option<PathBuf>,
    pub org_file: Option<PathBuf>,
    pub dataset: Option<PathBuf>,
    /// IANA zone name; defaults to the system zone
    pub timezone: Option<String>,
    /// Organizer email; defaults to the authenticated account
    pub me: Option<String>,
    /// Domain appended to bare usernames that aren't in the organization file
    pub email_domain: Option<String>,
    pub cadence_days: Option<i64>,
    /// e.g. "30m"
    pub meeting_duration: Option<String>,
    #[serde(default)]
    pub tracked: Vec<String>,
    #[serde(default)]
    pub working_hours: WorkingHours,
}

fn expand(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).as_ref())
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
            .join(APP_DIR);

        Ok(config_dir.join("config.toml"))
    }

    /// Load `path`, or the default location. A missing default file is fine;
    /// a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (expand(p), true),
            None => (Self::config_path()?, false),
        };

        if !path.exists() {
            if explicit {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn credentials_path(&self) -> PathBuf {
        expand(
            self.credentials
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_CREDENTIALS_PATH)),
        )
    }

    pub fn token_path(&self) -> Result<PathBuf> {
        match &self.token {
            Some(p) => Ok(expand(p)),
            None => Ok(Self::config_path()?.with_file_name("token.toml")),
        }
    }

    pub fn org_file_path(&self) -> PathBuf {
        expand(self.org_file.as_deref().unwrap_or(Path::new(DEFAULT_ORG_FILE)))
    }

    pub fn dataset_path(&self) -> Result<PathBuf> {
        match &self.dataset {
            Some(p) => Ok(expand(p)),
            None => Ok(dirs::data_dir()
                .ok_or_else(|| Error::Config("Could not determine data directory".into()))?
                .join(APP_DIR)
                .join("dataset.json")),
        }
    }

    /// Configured zone, else the system zone, else UTC.
    pub fn timezone(&self) -> Result<Tz> {
        if let Some(name) = &self.timezone {
            return parse_timezone(name);
        }

        match iana_time_zone::get_timezone() {
            Ok(name) => Ok(name.parse().unwrap_or_else(|_| {
                tracing::warn!(zone = %name, "Unknown system time zone, using UTC");
                chrono_tz::UTC
            })),
            Err(e) => {
                tracing::warn!("Could not detect system time zone ({}), using UTC", e);
                Ok(chrono_tz::UTC)
            }
        }
    }

    pub fn meeting_duration(&self) -> Result<Duration> {
        match &self.meeting_duration {
            Some(s) => parse_duration(s),
            None => Ok(Duration::minutes(DEFAULT_MEETING_MINUTES)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();

        assert_eq!(config.credentials_path(), PathBuf::from("credentials.json"));
        assert_eq!(config.org_file_path(), PathBuf::from("org.csv"));
        assert_eq!(config.meeting_duration().unwrap(), Duration::minutes(30));
        assert_eq!(config.working_hours, WorkingHours::default());
        assert_eq!(config.cadence_days, None);
        assert!(config.tracked.is_empty());
    }

    #[test]
    fn full_config() {
        let config = Config::from_toml(
            r#"
credentials = "/etc/oneonone/credentials.json"
org_file = "/srv/org.csv"
dataset = "/tmp/dataset.json"
timezone = "Europe/Helsinki"
me = "mia@example.com"
email_domain = "example.com"
cadence_days = 14
meeting_duration = "45m"
tracked = ["alice", "bob"]

[working_hours]
start = "10:00"
end = "16:00"
"#,
        )
        .unwrap();

        assert_eq!(config.timezone().unwrap(), chrono_tz::Europe::Helsinki);
        assert_eq!(config.cadence_days, Some(14));
        assert_eq!(config.meeting_duration().unwrap(), Duration::minutes(45));
        assert_eq!(config.dataset_path().unwrap(), PathBuf::from("/tmp/dataset.json"));
        assert_eq!(config.tracked, vec!["alice", "bob"]);
        assert_eq!(
            config.working_hours.start,
            NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        );
    }

    #[test]
    fn tilde_paths_expand() {
        let config = Config::from_toml("org_file = \"~/org.csv\"").unwrap();
        assert!(!config.org_file_path().to_string_lossy().starts_with('~'));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Config::from_toml("cadense_days = 14"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn bad_timezone_is_validation_error() {
        let config = Config::from_toml("timezone = \"Nowhere/City\"").unwrap();
        assert!(matches!(config.timezone(), Err(Error::Validation(_))));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/config.toml"))).is_err());
    }
}
