//! Everything a command needs, loaded once from config and global flags.

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use oneonone_core::config::Config;
use oneonone_core::dataset::JsonFileStore;
use oneonone_core::directory::Directory;
use oneonone_core::person::Person;
use oneonone_core::recommendation::Cadence;
use oneonone_core::source::CalendarSource;
use oneonone_google::GoogleCalendar;

use crate::GlobalArgs;
use crate::utils::tui;

pub struct Context {
    pub config: Config,
    pub tz: Tz,
}

impl Context {
    /// Read the config file, then let global flags override it.
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let mut config = Config::load(args.config.as_deref())?;

        if let Some(path) = &args.credentials {
            config.credentials = Some(path.clone());
        }
        if let Some(path) = &args.org_file {
            config.org_file = Some(path.clone());
        }
        if let Some(path) = &args.dataset {
            config.dataset = Some(path.clone());
        }
        if let Some(tz) = &args.timezone {
            config.timezone = Some(tz.clone());
        }

        let tz = config.timezone()?;
        tracing::debug!(timezone = %tz, "Loaded config");

        Ok(Context { config, tz })
    }

    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    pub fn directory(&self) -> Result<Directory> {
        Ok(Directory::load(&self.config.org_file_path())?)
    }

    pub fn store(&self) -> Result<JsonFileStore> {
        Ok(JsonFileStore::new(self.config.dataset_path()?))
    }

    /// Flag value, else config value, else `fallback` (a stored dataset's
    /// cadence). There is no built-in cadence.
    pub fn cadence(&self, flag: Option<i64>, fallback: Option<i64>) -> Result<Cadence> {
        Ok(Cadence::require(
            flag.or(self.config.cadence_days).or(fallback),
        )?)
    }

    /// Connect to Google Calendar. Only `interactive` callers may open the
    /// browser for consent.
    pub async fn calendar(&self, interactive: bool) -> Result<GoogleCalendar> {
        let credentials = self.config.credentials_path();
        let token = self.config.token_path()?;

        let spinner = tui::create_spinner("Connecting to Google Calendar".to_string());
        let result = GoogleCalendar::connect(&credentials, &token, self.tz, interactive).await;
        spinner.finish_and_clear();

        Ok(result?)
    }

    /// The organizer: `me` from config, else the authenticated account.
    pub async fn me<S: CalendarSource>(&self, source: &S, directory: &Directory) -> Result<Person> {
        let email = match &self.config.me {
            Some(email) => email.clone(),
            None => source
                .account()
                .await
                .context("Failed to determine the signed-in account")?,
        };
        Ok(person_for_email(directory, &email))
    }

    pub fn person(&self, directory: &Directory, key: &str) -> Result<Person> {
        Ok(resolve_person(
            directory,
            key,
            self.config.email_domain.as_deref(),
        )?)
    }
}

/// Directory entry for `email`, or a bare person named after its local part.
pub fn person_for_email(directory: &Directory, email: &str) -> Person {
    match directory.lookup_by_email(email) {
        Ok(person) => person.clone(),
        Err(_) => {
            let local = email.split('@').next().unwrap_or(email);
            Person::new(local, email, local)
        }
    }
}

/// Look `key` up in the directory. Bare usernames missing from it become
/// `username@email_domain` when a domain is configured.
pub fn resolve_person(
    directory: &Directory,
    key: &str,
    email_domain: Option<&str>,
) -> oneonone_core::Result<Person> {
    match directory.lookup(key) {
        Ok(person) => Ok(person.clone()),
        Err(err) => match email_domain {
            Some(domain) if !key.contains('@') => {
                tracing::debug!(%key, %domain, "Not in organization file, using email domain");
                let email = format!("{}@{}", key, domain.trim_start_matches('@'));
                Ok(Person::new(key, &email, key))
            }
            _ => Err(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oneonone_core::Error;

    fn directory() -> Directory {
        Directory::from_reader(
            "username,email,name,manager\n\
             mia,mia@example.com,Mia Manager,\n\
             alice,alice@example.com,Alice Smith,Mia Manager\n"
                .as_bytes(),
        )
        .unwrap()
    }

    fn context(config_toml: &str) -> Context {
        Context {
            config: Config::from_toml(config_toml).unwrap(),
            tz: chrono_tz::UTC,
        }
    }

    #[test]
    fn cadence_prefers_flag_then_config_then_fallback() {
        let ctx = context("cadence_days = 21");
        assert_eq!(ctx.cadence(Some(7), Some(14)).unwrap().days(), 7);
        assert_eq!(ctx.cadence(None, Some(14)).unwrap().days(), 21);

        let ctx = context("");
        assert_eq!(ctx.cadence(None, Some(14)).unwrap().days(), 14);
        assert!(matches!(
            ctx.cadence(None, None).unwrap_err().downcast_ref::<Error>(),
            Some(Error::Config(_))
        ));
    }

    #[test]
    fn known_people_resolve_by_username_or_email() {
        let dir = directory();
        assert_eq!(resolve_person(&dir, "alice", None).unwrap().name, "Alice Smith");
        assert_eq!(
            resolve_person(&dir, "ALICE@example.com", None).unwrap().username,
            "alice"
        );
    }

    #[test]
    fn unknown_username_uses_email_domain() {
        let person = resolve_person(&directory(), "dave", Some("example.org")).unwrap();
        assert_eq!(person.email, "dave@example.org");
        assert_eq!(person.first_name(), "dave");
    }

    #[test]
    fn unknown_person_without_domain_is_lookup_error() {
        assert!(matches!(
            resolve_person(&directory(), "dave", None),
            Err(Error::Lookup(_))
        ));
        assert!(matches!(
            resolve_person(&directory(), "dave@example.org", Some("example.org")),
            Err(Error::Lookup(_))
        ));
    }

    #[test]
    fn organizer_outside_directory_is_named_after_email() {
        let me = person_for_email(&directory(), "boss@example.com");
        assert_eq!(me.username, "boss");
        assert_eq!(me.first_name(), "boss");

        let me = person_for_email(&directory(), "mia@example.com");
        assert_eq!(me.first_name(), "Mia");
    }
}
