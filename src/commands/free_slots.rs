use anyhow::{Result, bail};
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use oneonone_core::constants::DEFAULT_FREE_SLOT_DAYS;
use oneonone_core::input::{MeetingDate, parse_duration};
use oneonone_core::slots::free_slots;
use oneonone_core::source::CalendarSource;
use owo_colors::OwoColorize;

use crate::context::Context;
use crate::render::Render;

/// `[from, to]` as local instants, `to` inclusive. Starts no earlier than `now`.
fn window(
    from: Option<&str>,
    to: Option<&str>,
    now: DateTime<Tz>,
) -> Result<(DateTime<Tz>, DateTime<Tz>)> {
    let tz = now.timezone();
    let today = now.date_naive();

    let from = match from {
        Some(s) => MeetingDate::parse(s, today)?,
        None => MeetingDate(today),
    };
    let to = match to {
        Some(s) => MeetingDate::parse(s, today)?,
        None => MeetingDate(today + Duration::days(DEFAULT_FREE_SLOT_DAYS)),
    };

    if to.0 < from.0 {
        bail!(oneonone_core::Error::Validation(format!(
            "--to {} is before --from {}",
            to.0, from.0
        )));
    }

    let start = from.start_of_day(&tz)?.max(now);
    let end = MeetingDate(to.0 + Duration::days(1)).start_of_day(&tz)?;

    if end <= start {
        bail!(oneonone_core::Error::Validation(format!(
            "{} to {} is in the past",
            from.0, to.0
        )));
    }

    Ok((start, end))
}

pub async fn run(
    ctx: &Context,
    username: &str,
    from: Option<&str>,
    to: Option<&str>,
    duration: Option<&str>,
) -> Result<()> {
    let now = ctx.now();
    let (start, end) = window(from, to, now)?;
    let min_duration = match duration {
        Some(s) => parse_duration(s)?,
        None => ctx.config.meeting_duration()?,
    };

    let directory = ctx.directory()?;
    let person = ctx.person(&directory, username)?;

    let calendar = ctx.calendar(false).await?;
    let me = ctx.me(&calendar, &directory).await?;

    let mut busy = calendar.busy(&me.email, start, end).await?;
    busy.extend(calendar.busy(&person.email, start, end).await?);

    let slots = free_slots(&busy, start, end, &ctx.config.working_hours, min_duration);

    if slots.is_empty() {
        println!(
            "{}",
            format!("No common free time with {} in that range", person.name).dimmed()
        );
        return Ok(());
    }

    println!("Free with {} ({}):", person.name.bold(), ctx.config.working_hours);
    for slot in &slots {
        println!("   {}", slot.render());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const TZ: Tz = chrono_tz::Europe::Helsinki;

    #[test]
    fn default_window_is_a_week_from_now() {
        let now = TZ.with_ymd_and_hms(2025, 3, 17, 12, 0, 0).unwrap();
        let (start, end) = window(None, None, now).unwrap();

        assert_eq!(start, now);
        assert_eq!(end, TZ.with_ymd_and_hms(2025, 3, 25, 0, 0, 0).unwrap());
    }

    #[test]
    fn to_date_is_inclusive() {
        let now = TZ.with_ymd_and_hms(2025, 3, 17, 12, 0, 0).unwrap();
        let (start, end) = window(Some("2025-03-20"), Some("2025-03-20"), now).unwrap();

        assert_eq!(start, TZ.with_ymd_and_hms(2025, 3, 20, 0, 0, 0).unwrap());
        assert_eq!(end, TZ.with_ymd_and_hms(2025, 3, 21, 0, 0, 0).unwrap());
    }

    #[test]
    fn reversed_or_malformed_dates_are_rejected() {
        let now = TZ.with_ymd_and_hms(2025, 3, 17, 12, 0, 0).unwrap();

        let err = window(Some("2025-03-20"), Some("2025-03-19"), now).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<oneonone_core::Error>(),
            Some(oneonone_core::Error::Validation(_))
        ));

        assert!(window(Some("next week"), None, now).is_err());
    }

    #[test]
    fn range_entirely_in_the_past_is_rejected() {
        let now = TZ.with_ymd_and_hms(2025, 3, 17, 12, 0, 0).unwrap();

        let err = window(Some("2025-03-10"), Some("2025-03-11"), now).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<oneonone_core::Error>(),
            Some(oneonone_core::Error::Validation(msg)) if msg.contains("in the past")
        ));

        let (start, _) = window(Some("2025-03-10"), Some("2025-03-17"), now).unwrap();
        assert_eq!(start, now);
    }
}
