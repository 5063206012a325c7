use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;
use oneonone_core::event::{Attendee, Event, EventStatus, ResponseStatus};

pub trait FromGoogle {
    fn from_google(event: google_calendar::types::Event, tz: &Tz) -> Result<Self>
    where
        Self: Sized;
}

/// All-day dates start at local midnight.
fn local_midnight(date: NaiveDate, tz: &Tz) -> Result<DateTime<Tz>> {
    match date
        .and_hms_opt(0, 0, 0)
        .and_then(|dt| tz.from_local_datetime(&dt).earliest())
    {
        Some(dt) => Ok(dt),
        None => bail!("Date {} has no local midnight in {}", date, tz),
    }
}

fn event_time(
    time: Option<&google_calendar::types::EventDateTime>,
    tz: &Tz,
    which: &str,
) -> Result<DateTime<Tz>> {
    let Some(time) = time else {
        bail!("Event has no {} time", which);
    };

    if let Some(dt) = time.date_time {
        Ok(dt.with_timezone(tz))
    } else if let Some(d) = time.date {
        local_midnight(d, tz)
    } else {
        bail!("Event has no {} time", which)
    }
}

fn display_name(name: &str) -> Option<String> {
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

impl FromGoogle for Event {
    fn from_google(event: google_calendar::types::Event, tz: &Tz) -> Result<Self> {
        let start = event_time(event.start.as_ref(), tz, "start")?;
        let end = event_time(event.end.as_ref(), tz, "end")?;

        let status = match event.status.as_str() {
            "tentative" => EventStatus::Tentative,
            "cancelled" => EventStatus::Cancelled,
            _ => EventStatus::Confirmed,
        };

        let organizer = event.organizer.as_ref().map(|o| Attendee {
            email: o.email.clone(),
            name: display_name(&o.display_name),
            response_status: ResponseStatus::Accepted,
            resource: false,
        });

        let attendees = event
            .attendees
            .iter()
            .map(|a| Attendee {
                email: a.email.clone(),
                name: display_name(&a.display_name),
                response_status: ResponseStatus::from_google(&a.response_status),
                resource: a.resource,
            })
            .collect();

        Ok(Event {
            id: event.id,
            summary: if event.summary.is_empty() {
                "(No title)".to_string()
            } else {
                event.summary
            },
            start,
            end,
            status,
            organizer,
            attendees,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use google_calendar::types::{EventAttendee, EventDateTime};

    fn timed(dt: DateTime<Utc>) -> EventDateTime {
        EventDateTime {
            date: None,
            date_time: Some(dt),
            time_zone: String::new(),
        }
    }

    fn google_attendee(email: &str, status: &str, resource: bool) -> EventAttendee {
        EventAttendee {
            email: email.to_string(),
            display_name: String::new(),
            response_status: status.to_string(),
            additional_guests: 0,
            comment: String::new(),
            id: String::new(),
            optional: false,
            organizer: false,
            resource,
            self_: false,
        }
    }

    #[test]
    fn timed_event_is_converted_to_local_zone() {
        let google = google_calendar::types::Event {
            id: "evt1".to_string(),
            summary: "Alice / Mia".to_string(),
            start: Some(timed(Utc.with_ymd_and_hms(2025, 3, 17, 8, 0, 0).unwrap())),
            end: Some(timed(Utc.with_ymd_and_hms(2025, 3, 17, 8, 30, 0).unwrap())),
            attendees: vec![
                google_attendee("alice@example.com", "declined", false),
                google_attendee("room@resource.example.com", "accepted", true),
            ],
            ..Default::default()
        };

        let event = Event::from_google(google, &chrono_tz::Europe::Helsinki).unwrap();

        assert_eq!(event.start.to_rfc3339(), "2025-03-17T10:00:00+02:00");
        assert_eq!(event.status, EventStatus::Confirmed);
        assert_eq!(event.attendees[0].response_status, ResponseStatus::Declined);
        assert!(event.attendees[1].resource);
    }

    #[test]
    fn all_day_event_starts_at_local_midnight() {
        let day = |d| EventDateTime {
            date: NaiveDate::from_ymd_opt(2025, 3, d),
            date_time: None,
            time_zone: String::new(),
        };
        let google = google_calendar::types::Event {
            id: "evt2".to_string(),
            start: Some(day(17)),
            end: Some(day(18)),
            ..Default::default()
        };

        let event = Event::from_google(google, &chrono_tz::America::New_York).unwrap();

        assert_eq!(event.start.to_rfc3339(), "2025-03-17T00:00:00-04:00");
        assert_eq!(event.summary, "(No title)");
    }

    #[test]
    fn event_without_start_is_rejected() {
        let google = google_calendar::types::Event {
            id: "evt3".to_string(),
            ..Default::default()
        };
        assert!(Event::from_google(google, &chrono_tz::UTC).is_err());
    }
}
