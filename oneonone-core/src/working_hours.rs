//! Daily time range in which meetings may be scheduled.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWorkingHours", into = "RawWorkingHours")]
pub struct WorkingHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub days: Vec<Weekday>,
}

impl Default for WorkingHours {
    /// 09:00-17:00, Monday to Friday
    fn default() -> Self {
        WorkingHours {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
        }
    }
}

impl WorkingHours {
    pub fn new(start: NaiveTime, end: NaiveTime, days: Vec<Weekday>) -> Result<Self> {
        if start >= end {
            return Err(Error::Config(format!(
                "working hours start ({}) must be before end ({})",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }

        Ok(WorkingHours { start, end, days })
    }

    pub fn is_working_day(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }
}

impl std::fmt::Display for WorkingHours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// On-disk form: `start = "09:00"`, `days = ["Mon", ...]`
#[derive(Serialize, Deserialize)]
struct RawWorkingHours {
    start: String,
    end: String,
    #[serde(default = "default_days")]
    days: Vec<String>,
}

fn default_days() -> Vec<String> {
    ["Mon", "Tue", "Wed", "Thu", "Fri"]
        .iter()
        .map(|d| d.to_string())
        .collect()
}

pub(crate) fn parse_clock(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| Error::Validation(format!("Invalid time '{}'. Expected HH:MM", s)))
}

impl TryFrom<RawWorkingHours> for WorkingHours {
    type Error = Error;

    fn try_from(raw: RawWorkingHours) -> Result<Self> {
        let days = raw
            .days
            .iter()
            .map(|d| {
                d.parse::<Weekday>()
                    .map_err(|_| Error::Config(format!("Invalid weekday '{}'", d)))
            })
            .collect::<Result<Vec<_>>>()?;

        WorkingHours::new(parse_clock(&raw.start)?, parse_clock(&raw.end)?, days)
    }
}

impl From<WorkingHours> for RawWorkingHours {
    fn from(hours: WorkingHours) -> Self {
        RawWorkingHours {
            start: hours.start.format("%H:%M").to_string(),
            end: hours.end.format("%H:%M").to_string(),
            days: hours.days.iter().map(|d| d.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_from_toml() {
        let hours: WorkingHours = toml::from_str(
            r#"
start = "08:30"
end = "16:00"
days = ["Mon", "Wednesday"]
"#,
        )
        .unwrap();

        assert_eq!(hours.start, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(hours.end, NaiveTime::from_hms_opt(16, 0, 0).unwrap());
        assert_eq!(hours.days, vec![Weekday::Mon, Weekday::Wed]);
    }

    #[test]
    fn days_default_to_weekdays() {
        let hours: WorkingHours = toml::from_str("start = \"09:00\"\nend = \"17:00\"").unwrap();
        assert_eq!(hours, WorkingHours::default());
    }

    #[test]
    fn start_must_precede_end() {
        let result: std::result::Result<WorkingHours, _> =
            toml::from_str("start = \"17:00\"\nend = \"09:00\"");
        assert!(result.is_err());
    }

    #[test]
    fn weekend_is_not_a_working_day() {
        let hours = WorkingHours::default();
        assert!(hours.is_working_day(Weekday::Fri));
        assert!(!hours.is_working_day(Weekday::Sat));
    }
}
