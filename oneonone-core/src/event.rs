//! Provider-neutral event types.
//!
//! Providers convert their API responses into these types. All timestamps are
//! already in the user's local zone; all-day events start at local midnight.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A calendar event (read-only, owned by the provider)
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub summary: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub status: EventStatus,
    pub organizer: Option<Attendee>,
    pub attendees: Vec<Attendee>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
    pub name: Option<String>,
    pub response_status: ResponseStatus,
    /// Rooms and other resources
    pub resource: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    Accepted,
    Declined,
    Tentative,
    NeedsAction,
}

impl ResponseStatus {
    pub fn from_google(status: &str) -> Self {
        match status {
            "accepted" => ResponseStatus::Accepted,
            "declined" => ResponseStatus::Declined,
            "tentative" => ResponseStatus::Tentative,
            _ => ResponseStatus::NeedsAction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

impl Event {
    /// Everybody on the event: organizer first, then attendees, without
    /// duplicates (emails compared case-insensitively).
    pub fn participants(&self) -> Vec<&Attendee> {
        let mut seen: Vec<&Attendee> = Vec::new();
        for attendee in self.organizer.iter().chain(self.attendees.iter()) {
            if !seen.iter().any(|a| a.email.eq_ignore_ascii_case(&attendee.email)) {
                seen.push(attendee);
            }
        }
        seen
    }

    pub fn attendee(&self, email: &str) -> Option<&Attendee> {
        self.attendees
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
    }

    pub fn involves(&self, email: &str) -> bool {
        self.participants()
            .iter()
            .any(|a| a.email.eq_ignore_ascii_case(email))
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.summary)
    }
}

/// Request to create a meeting.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub summary: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub attendee_emails: Vec<String>,
}
