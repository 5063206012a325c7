//! Finding 1:1s and turning them into recommendations.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::dataset::{Dataset, DatasetStore, RecommendationRecord};
use crate::error::Result;
use crate::event::{Event, EventStatus, ResponseStatus};
use crate::person::Person;
use crate::recommendation::{Cadence, History, Recommendation};
use crate::slots::{FreeSlot, first_common_slot};
use crate::source::CalendarSource;
use crate::working_hours::WorkingHours;

/// Separators accepted in 1:1 titles ("Alice / Bob", "Alice <> Bob").
const TITLE_SEPARATORS: &[&str] = &["/", "<>", ":"];

fn declined(event: &Event, email: &str) -> bool {
    event
        .attendee(email)
        .is_some_and(|a| a.response_status == ResponseStatus::Declined)
}

fn titled_one_on_one(summary: &str, a: &str, b: &str) -> bool {
    TITLE_SEPARATORS.iter().any(|sep| {
        let parts: Vec<&str> = summary.split(sep).map(str::trim).collect();
        match parts.as_slice() {
            [x, y] => {
                (x.eq_ignore_ascii_case(a) && y.eq_ignore_ascii_case(b))
                    || (x.eq_ignore_ascii_case(b) && y.eq_ignore_ascii_case(a))
            }
            _ => false,
        }
    })
}

/// Whether `event` is a 1:1 between `me` and `person`.
///
/// Either the only (non-resource) participants are the two of us, or the
/// title names our first names on each side of a separator.
pub fn is_one_on_one(event: &Event, me: &Person, person: &Person) -> bool {
    if event.status == EventStatus::Cancelled
        || declined(event, &me.email)
        || declined(event, &person.email)
    {
        return false;
    }

    let participants: Vec<_> = event
        .participants()
        .into_iter()
        .filter(|a| !a.resource)
        .collect();

    let just_us = participants.len() == 2
        && participants.iter().any(|a| me.has_email(&a.email))
        && participants.iter().any(|a| person.has_email(&a.email));

    just_us || titled_one_on_one(&event.summary, me.first_name(), person.first_name())
}

pub struct OneOnOneTracker<'a, S> {
    source: &'a S,
    me: &'a Person,
    tz: Tz,
}

impl<'a, S: CalendarSource> OneOnOneTracker<'a, S> {
    pub fn new(source: &'a S, me: &'a Person, tz: Tz) -> Self {
        OneOnOneTracker { source, me, tz }
    }

    /// Most recent 1:1 with `person` that started in the last `lookback_days`.
    pub async fn last_one_on_one(
        &self,
        person: &Person,
        lookback_days: i64,
        now: DateTime<Tz>,
    ) -> Result<Option<Event>> {
        let start = now - Duration::days(lookback_days);
        let events = self.source.get_events(person, start, now).await?;

        tracing::debug!(
            username = %person.username,
            candidates = events.len(),
            "Scanning for last 1:1"
        );

        Ok(events
            .into_iter()
            .filter(|e| e.start >= start && e.start <= now)
            .filter(|e| is_one_on_one(e, self.me, person))
            .max_by_key(|e| e.start))
    }

    pub async fn next_meeting_date(
        &self,
        person: &Person,
        lookback_days: i64,
        cadence: &Cadence,
        now: DateTime<Tz>,
    ) -> Result<Recommendation> {
        let last = self.last_one_on_one(person, lookback_days, now).await?;
        let history = History::from(last.map(|e| e.start.date_naive()));

        Ok(cadence.classify(&person.username, history, now.date_naive()))
    }

    /// Recompute every person and overwrite the stored dataset.
    pub async fn refresh<D: DatasetStore>(
        &self,
        store: &mut D,
        people: &[&Person],
        lookback_days: i64,
        cadence: &Cadence,
        now: DateTime<Tz>,
    ) -> Result<Dataset> {
        let mut records = Vec::with_capacity(people.len());
        for person in people {
            let rec = self
                .next_meeting_date(person, lookback_days, cadence, now)
                .await?;
            records.push(RecommendationRecord::from(&rec));
        }

        let dataset = Dataset {
            generated_at: now.with_timezone(&Utc),
            lookback_days,
            cadence_days: cadence.days(),
            records,
        };
        store.save(&dataset)?;

        Ok(dataset)
    }

    /// First slot on or after `rec.recommended` (and not before `now`) within
    /// `horizon_days` when both of us are free.
    pub async fn propose_slot(
        &self,
        person: &Person,
        rec: &Recommendation,
        horizon_days: i64,
        hours: &WorkingHours,
        duration: Duration,
        now: DateTime<Tz>,
    ) -> Result<Option<FreeSlot>> {
        let window_end = now + Duration::days(horizon_days);

        let recommended_start = rec
            .recommended
            .and_hms_opt(0, 0, 0)
            .and_then(|dt| dt.and_local_timezone(self.tz).earliest())
            .unwrap_or(now);
        let window_start = recommended_start.max(now);

        if window_start >= window_end {
            return Ok(None);
        }

        let mine = self.source.busy(&self.me.email, window_start, window_end).await?;
        let theirs = self.source.busy(&person.email, window_start, window_end).await?;

        Ok(first_common_slot(
            &[mine, theirs],
            window_start,
            window_end,
            hours,
            duration,
        ))
    }
}
