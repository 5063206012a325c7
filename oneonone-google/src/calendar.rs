//! Google Calendar implementation of `CalendarSource`.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use google_calendar::Client;
use google_calendar::types::{EventAttendee, EventDateTime, MinAccessRole, OrderBy, SendUpdates};
use oneonone_core::event::{Event, EventStatus, NewEvent};
use oneonone_core::person::Person;
use oneonone_core::slots::Interval;
use oneonone_core::source::CalendarSource;
use oneonone_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::app_config;
use crate::convert::FromGoogle;
use crate::error::{from_anyhow, from_api};
use crate::session::Session;

/// Google's alias for the user's main calendar
const PRIMARY_CALENDAR_ID: &str = "primary";

const FREEBUSY_URL: &str = "https://www.googleapis.com/calendar/v3/freeBusy";

pub struct GoogleCalendar {
    session: Session,
    client: Client,
    http: reqwest::Client,
    tz: Tz,
}

impl GoogleCalendar {
    /// Authenticate with the credentials file, reusing the cached token at
    /// `token_path`. `interactive` allows the browser flow when there is none.
    pub async fn connect(
        credentials_path: &Path,
        token_path: &Path,
        tz: Tz,
        interactive: bool,
    ) -> Result<Self> {
        let creds = app_config::load(credentials_path).map_err(from_anyhow)?;
        let session = Session::obtain(token_path, creds, interactive)
            .await
            .map_err(from_anyhow)?;

        Ok(GoogleCalendar {
            client: session.client(),
            session,
            http: reqwest::Client::new(),
            tz,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Events in `[start, end)` matching Google's free-text `query`, which
    /// covers titles and attendee names and emails.
    async fn list_events(
        &self,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
        query: &str,
    ) -> Result<Vec<Event>> {
        let time_min = start.with_timezone(&Utc).to_rfc3339();
        let time_max = end.with_timezone(&Utc).to_rfc3339();

        tracing::debug!(%time_min, %time_max, %query, "Listing events");

        let response = self
            .client
            .events()
            .list_all(
                PRIMARY_CALENDAR_ID,
                "",
                0,
                OrderBy::default(),
                &[],
                query,
                &[],
                false,
                false,
                true, // expand recurring events into instances
                &time_max,
                &time_min,
                "",
                "",
            )
            .await
            .map_err(|e| from_api("Failed to fetch events", e))?;

        let mut events = Vec::new();
        for google_event in response.body {
            if google_event.status == "cancelled" || google_event.id.is_empty() {
                continue;
            }

            let id = google_event.id.clone();
            match Event::from_google(google_event, &self.tz) {
                Ok(event) if event.status != EventStatus::Cancelled => events.push(event),
                Ok(_) => {}
                Err(e) => tracing::warn!(event_id = %id, "Skipping event: {:#}", e),
            }
        }

        Ok(events)
    }
}

/// Server-side search narrowing the event list to one person. It has to
/// match both attendee-based and title-only 1:1s, so it is the first name
/// rather than the email.
fn search_query(person: &Person) -> &str {
    person.first_name()
}

/// Title naming the person's first name next to a separator.
fn mentions(summary: &str, first_name: &str) -> bool {
    summary
        .split(['/', ':', '<', '>'])
        .any(|part| part.trim().eq_ignore_ascii_case(first_name))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FreeBusyRequest<'a> {
    time_min: String,
    time_max: String,
    time_zone: &'a str,
    items: Vec<FreeBusyItem<'a>>,
}

#[derive(Serialize)]
struct FreeBusyItem<'a> {
    id: &'a str,
}

#[derive(Deserialize)]
struct FreeBusyResponse {
    #[serde(default)]
    calendars: HashMap<String, FreeBusyCalendar>,
}

#[derive(Deserialize)]
struct FreeBusyCalendar {
    #[serde(default)]
    busy: Vec<BusyPeriod>,
    #[serde(default)]
    errors: Vec<FreeBusyError>,
}

#[derive(Deserialize)]
struct BusyPeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct FreeBusyError {
    #[serde(default)]
    reason: String,
}

fn busy_intervals(response: FreeBusyResponse, email: &str, tz: &Tz) -> Result<Vec<Interval>> {
    let calendar = response
        .calendars
        .into_iter()
        .find(|(id, _)| id.eq_ignore_ascii_case(email))
        .map(|(_, cal)| cal)
        .ok_or_else(|| Error::Provider(format!("No free/busy data returned for {}", email)))?;

    if let Some(err) = calendar.errors.first() {
        return Err(Error::Provider(format!(
            "Free/busy unavailable for {}: {}",
            email, err.reason
        )));
    }

    Ok(calendar
        .busy
        .into_iter()
        .map(|b| Interval::new(b.start.with_timezone(tz), b.end.with_timezone(tz)))
        .collect())
}

impl CalendarSource for GoogleCalendar {
    async fn account(&self) -> Result<String> {
        let calendars = self
            .client
            .calendar_list()
            .list_all(MinAccessRole::default(), false, false)
            .await
            .map_err(|e| from_api("Failed to fetch calendars", e))?
            .body;

        calendars
            .into_iter()
            .find(|cal| cal.primary)
            .map(|cal| cal.id)
            .ok_or_else(|| Error::Provider("No primary calendar found".into()))
    }

    async fn get_events(
        &self,
        person: &Person,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> Result<Vec<Event>> {
        let events = self.list_events(start, end, search_query(person)).await?;

        Ok(events
            .into_iter()
            .filter(|e| e.involves(&person.email) || mentions(&e.summary, person.first_name()))
            .collect())
    }

    async fn busy(
        &self,
        email: &str,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> Result<Vec<Interval>> {
        let request = FreeBusyRequest {
            time_min: start.with_timezone(&Utc).to_rfc3339(),
            time_max: end.with_timezone(&Utc).to_rfc3339(),
            time_zone: self.tz.name(),
            items: vec![FreeBusyItem { id: email }],
        };

        tracing::debug!(%email, "Querying free/busy");

        let response = self
            .http
            .post(FREEBUSY_URL)
            .bearer_auth(self.session.access_token())
            .json(&request)
            .send()
            .await
            .map_err(|e| from_api("Failed to send free/busy request", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(from_api(
                "Free/busy request failed",
                format!("HTTP {} {}", status.as_u16(), body),
            ));
        }

        let parsed: FreeBusyResponse = response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("Failed to parse free/busy response: {}", e)))?;

        busy_intervals(parsed, email, &self.tz)
    }

    async fn create_event(&self, event: &NewEvent) -> Result<Event> {
        let time = |dt: &DateTime<Tz>| EventDateTime {
            date: None,
            date_time: Some(dt.with_timezone(&Utc)),
            time_zone: self.tz.name().to_string(),
        };

        let attendees = event
            .attendee_emails
            .iter()
            .map(|email| EventAttendee {
                email: email.clone(),
                display_name: String::new(),
                response_status: "needsAction".to_string(),
                additional_guests: 0,
                comment: String::new(),
                id: String::new(),
                optional: false,
                organizer: false,
                resource: false,
                self_: false,
            })
            .collect();

        let google_event = google_calendar::types::Event {
            summary: event.summary.clone(),
            start: Some(time(&event.start)),
            end: Some(time(&event.end)),
            attendees,
            ..Default::default()
        };

        let response = self
            .client
            .events()
            .insert(
                PRIMARY_CALENDAR_ID,
                0,
                0,
                false,
                SendUpdates::All,
                false,
                &google_event,
            )
            .await
            .map_err(|e| from_api(&format!("Failed to create event: {}", event.summary), e))?;

        tracing::info!(summary = %event.summary, "Created event");

        Event::from_google(response.body, &self.tz).map_err(from_anyhow)
    }
}
