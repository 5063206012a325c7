//! Validated values for date/time command line input.
//!
//! Everything is parsed once at the command boundary; malformed input fails
//! with `Error::Validation` before any calendar call is made.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::error::{Error, Result};
use crate::working_hours::parse_clock;

/// A calendar date typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeetingDate(pub NaiveDate);

impl MeetingDate {
    /// Accepts `YYYY-MM-DD`, `today` or `tomorrow` (relative to `today`).
    pub fn parse(s: &str, today: NaiveDate) -> Result<Self> {
        let s = s.trim();
        let date = match s.to_ascii_lowercase().as_str() {
            "today" => today,
            "tomorrow" => today
                .succ_opt()
                .ok_or_else(|| Error::Validation("date out of range".into()))?,
            _ => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                Error::Validation(format!(
                    "Invalid date '{}'. Expected YYYY-MM-DD, 'today' or 'tomorrow'",
                    s
                ))
            })?,
        };
        Ok(MeetingDate(date))
    }

    /// Local midnight at the start of this date.
    pub fn start_of_day(&self, tz: &Tz) -> Result<DateTime<Tz>> {
        local_datetime(tz, *self, MeetingTime(NaiveTime::MIN))
    }
}

/// A wall-clock time typed by the user (`HH:MM`, 24h).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeetingTime(pub NaiveTime);

impl std::str::FromStr for MeetingTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_clock(s).map(MeetingTime)
    }
}

/// Combine a date and time in `tz`.
///
/// Ambiguous local times (DST fall-back) resolve to the earlier instant;
/// nonexistent ones (spring-forward) are rejected.
pub fn local_datetime(tz: &Tz, date: MeetingDate, time: MeetingTime) -> Result<DateTime<Tz>> {
    tz.from_local_datetime(&date.0.and_time(time.0))
        .earliest()
        .ok_or_else(|| {
            Error::Validation(format!(
                "{} {} does not exist in {}",
                date.0,
                time.0.format("%H:%M"),
                tz
            ))
        })
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| Error::Validation(format!("Unknown time zone '{}'", name)))
}

/// Parse a meeting length like `30m` or `1h 15m`.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let std_duration = humantime::parse_duration(s.trim())
        .map_err(|e| Error::Validation(format!("Invalid duration '{}': {}", s, e)))?;

    let duration = Duration::from_std(std_duration)
        .map_err(|_| Error::Validation(format!("Duration '{}' is too long", s)))?;

    if duration < Duration::minutes(1) {
        return Err(Error::Validation(format!(
            "Duration '{}' must be at least one minute",
            s
        )));
    }

    Ok(duration)
}

/// Lookback/horizon day counts must be positive.
pub fn positive_days(days: i64, flag: &str) -> Result<i64> {
    if days <= 0 {
        return Err(Error::Validation(format!("{} must be positive, got {}", flag, days)));
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 17).unwrap()
    }

    #[test]
    fn parse_iso_date() {
        let d = MeetingDate::parse("2025-04-01", today()).unwrap();
        assert_eq!(d.0, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
    }

    #[test]
    fn parse_relative_dates() {
        assert_eq!(MeetingDate::parse("today", today()).unwrap().0, today());
        assert_eq!(
            MeetingDate::parse("Tomorrow", today()).unwrap().0,
            NaiveDate::from_ymd_opt(2025, 3, 18).unwrap()
        );
    }

    #[test]
    fn malformed_dates_are_validation_errors() {
        for bad in ["2025-13-01", "17/03/2025", "", "next week", "2025-02-30"] {
            assert!(
                matches!(MeetingDate::parse(bad, today()), Err(Error::Validation(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn parse_times() {
        let t: MeetingTime = "14:30".parse().unwrap();
        assert_eq!((t.0.hour(), t.0.minute()), (14, 30));

        assert!(matches!("25:00".parse::<MeetingTime>(), Err(Error::Validation(_))));
        assert!(matches!("2pm".parse::<MeetingTime>(), Err(Error::Validation(_))));
    }

    #[test]
    fn combine_in_zone() {
        let tz = chrono_tz::America::New_York;
        let date = MeetingDate::parse("2025-03-17", today()).unwrap();
        let dt = local_datetime(&tz, date, "09:00".parse().unwrap()).unwrap();

        assert_eq!(dt.to_rfc3339(), "2025-03-17T09:00:00-04:00");
    }

    #[test]
    fn nonexistent_local_time_is_rejected() {
        // US spring-forward: 02:30 doesn't exist on 2025-03-09
        let tz = chrono_tz::America::New_York;
        let date = MeetingDate::parse("2025-03-09", today()).unwrap();
        let result = local_datetime(&tz, date, "02:30".parse().unwrap());

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn parse_zones() {
        assert_eq!(parse_timezone("Europe/Helsinki").unwrap(), chrono_tz::Europe::Helsinki);
        assert!(matches!(parse_timezone("Mars/Olympus"), Err(Error::Validation(_))));
    }

    #[test]
    fn parse_durations() {
        assert_eq!(parse_duration("30m").unwrap(), Duration::minutes(30));
        assert_eq!(parse_duration("1h 15m").unwrap(), Duration::minutes(75));
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("10s").is_err());
    }

    #[test]
    fn day_counts_must_be_positive() {
        assert_eq!(positive_days(30, "--days").unwrap(), 30);
        assert!(matches!(positive_days(0, "--days"), Err(Error::Validation(_))));
    }
}
