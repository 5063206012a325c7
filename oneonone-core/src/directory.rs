//! Organization directory loaded from a CSV file.
//!
//! Two layouts are accepted:
//! - a header row naming the columns (`Name,Email,Title,...`), matched
//!   case-insensitively; the first row is a header when one cell is `email`
//! - headerless positional rows: `username,email[,name]`
//!
//! When there is no username column the username is the local part of the
//! email address.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{Error, Result};
use crate::person::Person;

#[derive(Debug, Default)]
pub struct Directory {
    people: Vec<Person>,
    by_username: HashMap<String, usize>,
    by_email: HashMap<String, usize>,
}

/// Column positions resolved from the header row.
#[derive(Debug, Default)]
struct Columns {
    username: Option<usize>,
    email: usize,
    name: Option<usize>,
    title: Option<usize>,
    level: Option<usize>,
    start_date: Option<usize>,
    tenure: Option<usize>,
    metro: Option<usize>,
    location: Option<usize>,
    manager: Option<usize>,
}

impl Columns {
    fn positional() -> Self {
        Columns {
            username: Some(0),
            email: 1,
            name: Some(2),
            ..Default::default()
        }
    }

    /// Returns None if the record isn't a header row.
    fn from_header(record: &StringRecord) -> Option<Self> {
        let find = |names: &[&str]| {
            record
                .iter()
                .position(|cell| names.iter().any(|n| cell.eq_ignore_ascii_case(n)))
        };

        let email = find(&["email", "e-mail", "email address"])?;

        Some(Columns {
            username: find(&["username", "user", "login"]),
            email,
            name: find(&["name", "display name", "full name"]),
            title: find(&["title"]),
            level: find(&["level"]),
            start_date: find(&["start date", "start_date"]),
            tenure: find(&["tenure"]),
            metro: find(&["metro"]),
            location: find(&["location"]),
            manager: find(&["manager"]),
        })
    }
}

fn cell(record: &StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl Directory {
    /// Load the organization file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Organization file not found: {}",
                path.display()
            )));
        }

        let file = std::fs::File::open(path)?;
        let directory = Self::from_reader(file).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;

        if directory.is_empty() {
            tracing::warn!(path = %path.display(), "Organization file has no people");
        } else {
            tracing::debug!(
                path = %path.display(),
                people = directory.len(),
                "Loaded organization file"
            );
        }

        Ok(directory)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut directory = Directory::default();
        let mut columns: Option<Columns> = None;

        for result in reader.records() {
            let record = result.map_err(|e| Error::Config(format!("Malformed CSV: {}", e)))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            if record.iter().all(|c| c.is_empty()) {
                continue;
            }

            if columns.is_none() {
                match Columns::from_header(&record) {
                    Some(header) => {
                        columns = Some(header);
                        continue;
                    }
                    None => columns = Some(Columns::positional()),
                }
            }

            let Some(columns) = &columns else {
                continue;
            };

            directory.insert_record(&record, columns, line)?;
        }

        Ok(directory)
    }

    fn insert_record(&mut self, record: &StringRecord, columns: &Columns, line: u64) -> Result<()> {
        let email = cell(record, Some(columns.email))
            .ok_or_else(|| Error::Config(format!("line {}: missing email", line)))?;

        let username = cell(record, columns.username)
            .unwrap_or_else(|| email.split('@').next().unwrap_or(&email).to_string());

        let person = Person {
            name: cell(record, columns.name).unwrap_or_else(|| username.clone()),
            username,
            email,
            title: cell(record, columns.title),
            level: cell(record, columns.level),
            start_date: cell(record, columns.start_date),
            tenure: cell(record, columns.tenure),
            metro: cell(record, columns.metro),
            location: cell(record, columns.location),
            manager: cell(record, columns.manager),
        };

        self.insert(person)
            .map_err(|e| Error::Config(format!("line {}: {}", line, e)))
    }

    /// Add a person, rejecting duplicate usernames and emails.
    pub fn insert(&mut self, person: Person) -> Result<()> {
        if self.by_username.contains_key(&person.username) {
            return Err(Error::Config(format!(
                "duplicate username '{}'",
                person.username
            )));
        }

        let email = person.email.to_lowercase();
        if let Some(&existing) = self.by_email.get(&email) {
            return Err(Error::Config(format!(
                "duplicate email '{}' (already used by '{}')",
                person.email, self.people[existing].username
            )));
        }

        let index = self.people.len();
        self.by_username.insert(person.username.clone(), index);
        self.by_email.insert(email, index);
        self.people.push(person);
        Ok(())
    }

    pub fn lookup_by_username(&self, username: &str) -> Result<&Person> {
        self.by_username
            .get(username.trim())
            .map(|&i| &self.people[i])
            .ok_or_else(|| Error::Lookup(format!("no person with username '{}'", username)))
    }

    pub fn lookup_by_email(&self, email: &str) -> Result<&Person> {
        self.by_email
            .get(&email.trim().to_lowercase())
            .map(|&i| &self.people[i])
            .ok_or_else(|| Error::Lookup(format!("no person with email '{}'", email)))
    }

    /// Lookup by email if `key` looks like one, otherwise by username.
    pub fn lookup(&self, key: &str) -> Result<&Person> {
        if key.contains('@') {
            self.lookup_by_email(key)
        } else {
            self.lookup_by_username(key)
        }
    }

    /// The people whose 1:1s are tracked.
    ///
    /// An explicit list wins. Otherwise the organizer's direct reports, or
    /// everybody but the organizer when nobody reports to them.
    pub fn tracked(&self, me: &str, explicit: &[String]) -> Result<Vec<&Person>> {
        if !explicit.is_empty() {
            return explicit.iter().map(|u| self.lookup_by_username(u)).collect();
        }

        let others = || self.people.iter().filter(|p| !p.has_email(me));

        if let Ok(organizer) = self.lookup_by_email(me) {
            let reports: Vec<&Person> = others().filter(|p| p.reports_to(organizer)).collect();
            if !reports.is_empty() {
                return Ok(reports);
            }
        }

        Ok(others().collect())
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}
