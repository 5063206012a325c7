use anyhow::Result;
use chrono::{Duration, NaiveDate};
use dialoguer::Confirm;
use oneonone_core::Error;
use oneonone_core::constants::DEFAULT_REFRESH_LOOKBACK_DAYS;
use oneonone_core::dataset::{Dataset, DatasetStore};
use oneonone_core::event::NewEvent;
use oneonone_core::input::positive_days;
use oneonone_core::one_on_one::OneOnOneTracker;
use oneonone_core::recommendation::{MeetingState, Recommendation};
use oneonone_core::source::CalendarSource;
use owo_colors::OwoColorize;

use crate::context::Context;
use crate::render::{Render, render_recommendation};
use crate::utils::tui;

/// Records that are overdue or fall due inside the horizon, soonest first.
fn due_within(dataset: &Dataset, today: NaiveDate, horizon_days: i64) -> Vec<Recommendation> {
    let horizon_end = today + Duration::days(horizon_days);

    let mut due: Vec<Recommendation> = dataset
        .records
        .iter()
        .map(|r| r.to_recommendation(today))
        .filter(|r| r.state == MeetingState::Overdue || r.recommended < horizon_end)
        .collect();
    due.sort_by(|a, b| a.recommended.cmp(&b.recommended).then(a.username.cmp(&b.username)));
    due
}

/// The stored dataset. An unreadable one is ignored when it is about to be
/// recomputed anyway.
fn load_stored<D: DatasetStore>(
    store: &D,
    refresh: bool,
) -> oneonone_core::Result<Option<Dataset>> {
    match store.load() {
        Ok(stored) => Ok(stored),
        Err(e) if refresh => {
            tracing::warn!("Ignoring unreadable dataset, recomputing: {}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub async fn run(
    ctx: &Context,
    refresh: bool,
    days: i64,
    cadence_days: Option<i64>,
    confirm: bool,
) -> Result<()> {
    let horizon = positive_days(days, "--days")?;
    let duration = ctx.config.meeting_duration()?;

    let directory = ctx.directory()?;
    let mut store = ctx.store()?;

    let calendar = ctx.calendar(false).await?;
    let me = ctx.me(&calendar, &directory).await?;
    let tracker = OneOnOneTracker::new(&calendar, &me, ctx.tz);
    let now = ctx.now();
    let today = now.date_naive();

    let dataset = match load_stored(&store, refresh)? {
        Some(dataset) if !refresh => dataset,
        stored => {
            if stored.is_none() && !refresh {
                return Err(Error::Lookup(format!(
                    "No dataset at {}. Run `oneonone refresh-dataset` or pass --refresh",
                    store.path().display()
                ))
                .into());
            }

            let cadence = ctx.cadence(cadence_days, stored.as_ref().map(|d| d.cadence_days))?;
            let lookback = stored
                .as_ref()
                .map_or(DEFAULT_REFRESH_LOOKBACK_DAYS, |d| d.lookback_days);

            let people = directory.tracked(&me.email, &ctx.config.tracked)?;
            let spinner = tui::create_spinner(format!("Scanning {} calendars", people.len()));
            let result = tracker
                .refresh(&mut store, &people, lookback, &cadence, now)
                .await;
            spinner.finish_and_clear();
            result?
        }
    };

    let due = due_within(&dataset, today, horizon);
    if due.is_empty() {
        println!(
            "{}",
            format!("Nobody is due for a 1:1 in the next {} days", horizon).dimmed()
        );
        return Ok(());
    }

    for rec in &due {
        println!("{}", render_recommendation(rec, today));

        let person = match directory.lookup_by_username(&rec.username) {
            Ok(person) => person,
            Err(e) => {
                tracing::warn!(username = %rec.username, "Skipping: {}", e);
                println!("   {}", "not in the organization file".red());
                continue;
            }
        };

        let slot = tracker
            .propose_slot(person, rec, horizon, &ctx.config.working_hours, duration, now)
            .await?;

        let Some(slot) = slot else {
            println!(
                "   {}",
                format!("no common free slot in the next {} days", horizon).yellow()
            );
            continue;
        };

        println!("   {} {}", "→".dimmed(), slot.render());

        if !confirm {
            continue;
        }

        let request = NewEvent {
            summary: format!("{} / {}", me.first_name(), person.first_name()),
            start: slot.start,
            end: slot.end,
            attendee_emails: vec![me.email.clone(), person.email.clone()],
        };

        let create = Confirm::new()
            .with_prompt(format!("Schedule \"{}\" at {}?", request.summary, slot))
            .default(false)
            .interact()?;
        if !create {
            continue;
        }

        let event = calendar.create_event(&request).await?;
        println!("   {} {}", "✓".green(), event.render());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use oneonone_core::dataset::RecommendationRecord;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn record(username: &str, last: Option<NaiveDate>, recommended: NaiveDate) -> RecommendationRecord {
        RecommendationRecord {
            username: username.to_string(),
            last_meeting: last,
            recommended,
        }
    }

    struct CorruptStore;

    impl DatasetStore for CorruptStore {
        fn load(&self) -> oneonone_core::Result<Option<Dataset>> {
            Err(Error::Dataset("expected value at line 1 column 1".into()))
        }

        fn save(&mut self, _dataset: &Dataset) -> oneonone_core::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unreadable_dataset_is_ignored_only_when_refreshing() {
        assert!(matches!(load_stored(&CorruptStore, true), Ok(None)));
        assert!(matches!(
            load_stored(&CorruptStore, false),
            Err(Error::Dataset(_))
        ));
    }

    #[test]
    fn keeps_overdue_and_soon_due_people() {
        let dataset = Dataset {
            generated_at: Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap(),
            lookback_days: 60,
            cadence_days: 14,
            records: vec![
                record("alice", Some(date(3, 10)), date(3, 24)),
                record("bob", None, date(3, 10)),
                record("carol", Some(date(3, 16)), date(4, 13)),
                record("dave", Some(date(2, 20)), date(3, 6)),
            ],
        };

        let due = due_within(&dataset, date(3, 17), 14);
        let names: Vec<&str> = due.iter().map(|r| r.username.as_str()).collect();

        assert_eq!(names, vec!["dave", "bob", "alice"]);
        assert_eq!(due[1].state, MeetingState::Overdue);
        assert_eq!(due[1].recommended, date(3, 10));
        assert_eq!(due[2].state, MeetingState::OnTrack);
    }
}
