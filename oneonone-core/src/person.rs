use serde::{Deserialize, Serialize};

/// A person from the organization file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Natural key, unique within the organization file
    pub username: String,
    pub email: String,
    /// Display name ("Alice Smith")
    pub name: String,

    // Optional roster metadata
    pub title: Option<String>,
    pub level: Option<String>,
    pub start_date: Option<String>,
    pub tenure: Option<String>,
    pub metro: Option<String>,
    pub location: Option<String>,
    /// Manager's display name or email
    pub manager: Option<String>,
}

impl Person {
    /// Person with only the required fields set.
    pub fn new(username: &str, email: &str, name: &str) -> Self {
        Person {
            username: username.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            title: None,
            level: None,
            start_date: None,
            tenure: None,
            metro: None,
            location: None,
            manager: None,
        }
    }

    /// First word of the display name, or the username when there is no name.
    pub fn first_name(&self) -> &str {
        self.name
            .split_whitespace()
            .next()
            .unwrap_or(&self.username)
    }

    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }

    /// Whether `manager` names the given person (by display name or email).
    pub fn reports_to(&self, manager: &Person) -> bool {
        match &self.manager {
            Some(m) => {
                let m = m.trim();
                m.eq_ignore_ascii_case(&manager.name) || manager.has_email(m)
            }
            None => false,
        }
    }
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}
