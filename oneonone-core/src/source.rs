//! Calendar access used by the recommendation engine.
//!
//! Providers implement this trait; tests use an in-memory calendar.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::error::Result;
use crate::event::{Event, NewEvent};
use crate::person::Person;
use crate::slots::Interval;

#[allow(async_fn_in_trait)]
pub trait CalendarSource {
    /// Email of the authenticated account.
    async fn account(&self) -> Result<String>;

    /// Events on the user's calendar in `[start, end)` involving `person`,
    /// recurring events expanded, cancelled ones dropped.
    async fn get_events(
        &self,
        person: &Person,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> Result<Vec<Event>>;

    /// Busy periods of the calendar owned by `email`.
    async fn busy(&self, email: &str, start: DateTime<Tz>, end: DateTime<Tz>)
    -> Result<Vec<Interval>>;

    /// Create an event and invite its attendees.
    async fn create_event(&self, event: &NewEvent) -> Result<Event>;
}
