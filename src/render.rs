//! Colored terminal rendering for core types.

use chrono::NaiveDate;
use oneonone_core::event::Event;
use oneonone_core::person::Person;
use oneonone_core::recommendation::{MeetingState, Recommendation};
use oneonone_core::slots::Interval;
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for MeetingState {
    fn render(&self) -> String {
        match self {
            MeetingState::OnTrack => self.to_string().green().to_string(),
            MeetingState::Overdue => self.to_string().red().to_string(),
        }
    }
}

impl Render for Event {
    fn render(&self) -> String {
        let time = if self.start.date_naive() == self.end.date_naive() {
            format!(
                "{} {}-{}",
                self.start.format("%a %Y-%m-%d"),
                self.start.format("%H:%M"),
                self.end.format("%H:%M")
            )
        } else {
            format!(
                "{} - {}",
                self.start.format("%a %Y-%m-%d %H:%M"),
                self.end.format("%a %Y-%m-%d %H:%M")
            )
        };
        format!("{} {}", self.summary.bold(), time.dimmed())
    }
}

impl Render for Interval {
    fn render(&self) -> String {
        format!(
            "{} {}",
            self.to_string().green(),
            format!("({} min)", self.duration().num_minutes()).dimmed()
        )
    }
}

impl Render for Person {
    fn render(&self) -> String {
        let mut lines = vec![format!("{} {}", self.name.bold(), self.email.dimmed())];

        let fields = [
            ("username", Some(&self.username)),
            ("title", self.title.as_ref()),
            ("level", self.level.as_ref()),
            ("manager", self.manager.as_ref()),
            ("start date", self.start_date.as_ref()),
            ("tenure", self.tenure.as_ref()),
            ("metro", self.metro.as_ref()),
            ("location", self.location.as_ref()),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                lines.push(format!("   {:<11}{}", format!("{}:", label).dimmed(), value));
            }
        }

        lines.join("\n")
    }
}

/// One line per person: last 1:1, next due date, state.
pub fn render_recommendation(rec: &Recommendation, today: NaiveDate) -> String {
    let last = match (rec.last_meeting, rec.days_since_last(today)) {
        (Some(date), Some(days)) => format!("last {} ({} {} ago)", date, days, pluralize("day", days)),
        _ => "no recent 1:1".to_string(),
    };

    let last = format!("{:<32}", last);

    format!(
        "{:<16} {} next {}  {}",
        rec.username,
        last.dimmed(),
        rec.recommended,
        rec.state.render()
    )
}

pub fn pluralize(word: &str, count: i64) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
