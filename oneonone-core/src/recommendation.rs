//! The "days since last 1:1" rule.
//!
//! A person with no 1:1 inside the lookback window is overdue. Otherwise the
//! next 1:1 is due `cadence` days after the last one.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingState {
    OnTrack,
    Overdue,
}

impl std::fmt::Display for MeetingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeetingState::OnTrack => write!(f, "on track"),
            MeetingState::Overdue => write!(f, "overdue"),
        }
    }
}

/// Whether a 1:1 was found in the lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum History {
    NoHistory,
    HasHistory(NaiveDate),
}

impl From<Option<NaiveDate>> for History {
    fn from(last: Option<NaiveDate>) -> Self {
        match last {
            Some(date) => History::HasHistory(date),
            None => History::NoHistory,
        }
    }
}

/// Outcome for one person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub username: String,
    pub last_meeting: Option<NaiveDate>,
    pub recommended: NaiveDate,
    pub state: MeetingState,
}

impl Recommendation {
    pub fn days_since_last(&self, today: NaiveDate) -> Option<i64> {
        self.last_meeting.map(|last| (today - last).num_days())
    }
}

/// Days between 1:1s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    days: i64,
}

impl Cadence {
    pub fn new(days: i64) -> Result<Self> {
        if days <= 0 {
            return Err(Error::Config(format!(
                "cadence_days must be positive, got {}",
                days
            )));
        }
        Ok(Cadence { days })
    }

    /// Resolve the cadence from a flag or config value. There is no default.
    pub fn require(days: Option<i64>) -> Result<Self> {
        match days {
            Some(days) => Cadence::new(days),
            None => Err(Error::Config(
                "No meeting cadence configured.\n\
                Set `cadence_days` in config.toml or pass --cadence-days"
                    .into(),
            )),
        }
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    pub fn classify(&self, username: &str, history: History, today: NaiveDate) -> Recommendation {
        let (last_meeting, recommended, state) = match history {
            History::NoHistory => (None, today, MeetingState::Overdue),
            History::HasHistory(last) => {
                let due = last + Duration::days(self.days);
                if (today - last).num_days() < self.days {
                    (Some(last), due, MeetingState::OnTrack)
                } else {
                    (Some(last), today, MeetingState::Overdue)
                }
            }
        };

        Recommendation {
            username: username.to_string(),
            last_meeting,
            recommended,
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn no_history_is_overdue_today() {
        let rec = Cadence::new(14).unwrap().classify("alice", History::NoHistory, date(3, 17));

        assert_eq!(rec.state, MeetingState::Overdue);
        assert_eq!(rec.last_meeting, None);
        assert_eq!(rec.recommended, date(3, 17));
        assert_eq!(rec.days_since_last(date(3, 17)), None);
    }

    #[test]
    fn recent_meeting_is_on_track() {
        let rec = Cadence::new(14)
            .unwrap()
            .classify("alice", History::HasHistory(date(3, 10)), date(3, 17));

        assert_eq!(rec.state, MeetingState::OnTrack);
        assert_eq!(rec.recommended, date(3, 24));
        assert_eq!(rec.days_since_last(date(3, 17)), Some(7));
    }

    #[test]
    fn overdue_once_cadence_has_elapsed() {
        let cadence = Cadence::new(14).unwrap();

        let on_the_day = cadence.classify("alice", History::HasHistory(date(3, 3)), date(3, 17));
        assert_eq!(on_the_day.state, MeetingState::Overdue);
        assert_eq!(on_the_day.recommended, date(3, 17));

        let day_before = cadence.classify("alice", History::HasHistory(date(3, 4)), date(3, 17));
        assert_eq!(day_before.state, MeetingState::OnTrack);
        assert_eq!(day_before.recommended, date(3, 18));
    }

    #[test]
    fn cadence_is_never_inferred() {
        assert!(matches!(Cadence::require(None), Err(Error::Config(_))));
        assert!(Cadence::require(Some(0)).is_err());
        assert_eq!(Cadence::require(Some(21)).unwrap().days(), 21);
    }
}
