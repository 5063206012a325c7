//! Free-slot calculation over busy intervals.
//!
//! Intervals are half-open `[start, end)` and expressed in the user's local
//! zone, so working hours can be applied per local calendar day.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::working_hours::WorkingHours;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// A free interval long enough for a meeting.
pub type FreeSlot = Interval;

impl Interval {
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        Interval { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Half-open overlap: touching intervals do not intersect.
    pub fn intersects(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn clip(&self, start: DateTime<Tz>, end: DateTime<Tz>) -> Interval {
        Interval {
            start: self.start.max(start),
            end: self.end.min(end),
        }
    }

    pub fn with_timezone(&self, tz: &Tz) -> Interval {
        Interval {
            start: self.start.with_timezone(tz),
            end: self.end.with_timezone(tz),
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start.date_naive() == self.end.date_naive() {
            write!(
                f,
                "{} {}-{}",
                self.start.format("%a %Y-%m-%d"),
                self.start.format("%H:%M"),
                self.end.format("%H:%M")
            )
        } else {
            write!(
                f,
                "{} - {}",
                self.start.format("%a %Y-%m-%d %H:%M"),
                self.end.format("%a %Y-%m-%d %H:%M")
            )
        }
    }
}

/// Sort by start and merge overlapping or touching intervals.
/// Empty intervals are dropped.
pub fn merge_intervals(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals.iter().filter(|i| !i.is_empty()).copied().collect();
    sorted.sort_by_key(|i| i.start);

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Resolve a local wall-clock time, skipping times that don't exist (DST gaps).
fn local_instant(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_time(time)).earliest()
}

/// Free slots within `[window_start, window_end)` that fall inside working
/// hours and last at least `min_duration`, in chronological order.
pub fn free_slots(
    busy: &[Interval],
    window_start: DateTime<Tz>,
    window_end: DateTime<Tz>,
    hours: &WorkingHours,
    min_duration: Duration,
) -> Vec<FreeSlot> {
    let mut slots = Vec::new();
    if window_end <= window_start {
        return slots;
    }

    let tz = window_start.timezone();
    let window_end = window_end.with_timezone(&tz);

    let clipped: Vec<Interval> = busy
        .iter()
        .map(|b| b.with_timezone(&tz).clip(window_start, window_end))
        .collect();
    let merged = merge_intervals(&clipped);

    let mut date = window_start.date_naive();
    let last_date = window_end.date_naive();

    while date <= last_date {
        if hours.is_working_day(date.weekday()) {
            if let (Some(open), Some(close)) = (
                local_instant(&tz, date, hours.start),
                local_instant(&tz, date, hours.end),
            ) {
                day_gaps(
                    &merged,
                    open.max(window_start),
                    close.min(window_end),
                    min_duration,
                    &mut slots,
                );
            }
        }

        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    slots
}

/// Push the gaps between `merged` busy intervals inside `[open, close)`.
fn day_gaps(
    merged: &[Interval],
    open: DateTime<Tz>,
    close: DateTime<Tz>,
    min_duration: Duration,
    slots: &mut Vec<FreeSlot>,
) {
    if close <= open {
        return;
    }

    let mut cursor = open;
    for busy in merged {
        if busy.end <= cursor {
            continue;
        }
        if busy.start >= close {
            break;
        }
        if busy.start > cursor {
            push_if_long_enough(Interval::new(cursor, busy.start), min_duration, slots);
        }
        cursor = cursor.max(busy.end);
        if cursor >= close {
            return;
        }
    }

    push_if_long_enough(Interval::new(cursor, close), min_duration, slots);
}

fn push_if_long_enough(slot: Interval, min_duration: Duration, slots: &mut Vec<FreeSlot>) {
    if !slot.is_empty() && slot.duration() >= min_duration {
        slots.push(slot);
    }
}

/// Whether `[start, start + duration)` is clear of every busy interval.
pub fn is_free(busy: &[Interval], start: DateTime<Tz>, duration: Duration) -> bool {
    let candidate = Interval::new(start, start + duration);
    !busy.iter().any(|b| b.intersects(&candidate))
}

/// First slot of `duration` that is free for everybody in `busy_sets`.
pub fn first_common_slot(
    busy_sets: &[Vec<Interval>],
    window_start: DateTime<Tz>,
    window_end: DateTime<Tz>,
    hours: &WorkingHours,
    duration: Duration,
) -> Option<FreeSlot> {
    let combined: Vec<Interval> = busy_sets.iter().flatten().copied().collect();

    free_slots(&combined, window_start, window_end, hours, duration)
        .into_iter()
        .next()
        .map(|slot| Interval::new(slot.start, slot.start + duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TZ: Tz = chrono_tz::Europe::Helsinki;

    fn at(day: u32, hour: u32, min: u32) -> DateTime<Tz> {
        // 2025-03-17 is a Monday
        TZ.with_ymd_and_hms(2025, 3, day, hour, min, 0).unwrap()
    }

    fn iv(day: u32, from: (u32, u32), to: (u32, u32)) -> Interval {
        Interval::new(at(day, from.0, from.1), at(day, to.0, to.1))
    }

    fn thirty() -> Duration {
        Duration::minutes(30)
    }

    #[test]
    fn adjacent_busy_blocks_merge_without_phantom_gap() {
        let busy = vec![iv(17, (9, 0), (10, 0)), iv(17, (10, 0), (11, 0))];

        let slots = free_slots(&busy, at(17, 9, 0), at(17, 12, 0), &WorkingHours::default(), thirty());

        assert_eq!(slots, vec![iv(17, (11, 0), (12, 0))]);
    }

    #[test]
    fn overlapping_busy_blocks_merge() {
        let busy = vec![
            iv(17, (10, 0), (12, 0)),
            iv(17, (9, 30), (10, 30)),
            iv(17, (11, 0), (11, 15)),
        ];

        let merged = merge_intervals(&busy);
        assert_eq!(merged, vec![iv(17, (9, 30), (12, 0))]);

        let slots = free_slots(&busy, at(17, 9, 0), at(17, 17, 0), &WorkingHours::default(), thirty());
        assert_eq!(slots, vec![iv(17, (9, 0), (9, 30)), iv(17, (12, 0), (17, 0))]);
    }

    #[test]
    fn complement_of_disjoint_busy_intervals() {
        let busy = vec![iv(17, (13, 0), (14, 0)), iv(17, (10, 0), (11, 0))];

        let slots = free_slots(&busy, at(17, 0, 0), at(18, 0, 0), &WorkingHours::default(), thirty());

        assert_eq!(
            slots,
            vec![
                iv(17, (9, 0), (10, 0)),
                iv(17, (11, 0), (13, 0)),
                iv(17, (14, 0), (17, 0)),
            ]
        );
    }

    #[test]
    fn gaps_shorter_than_minimum_are_dropped() {
        let busy = vec![iv(17, (9, 0), (10, 0)), iv(17, (10, 20), (16, 30))];

        let slots = free_slots(&busy, at(17, 9, 0), at(17, 17, 0), &WorkingHours::default(), thirty());

        assert_eq!(slots, vec![iv(17, (16, 30), (17, 0))]);
    }

    #[test]
    fn busy_abutting_window_boundaries_leaves_no_edge_slot() {
        let busy = vec![iv(17, (9, 0), (10, 0)), iv(17, (11, 0), (12, 0))];

        let slots = free_slots(&busy, at(17, 9, 0), at(17, 12, 0), &WorkingHours::default(), thirty());

        assert_eq!(slots, vec![iv(17, (10, 0), (11, 0))]);
    }

    #[test]
    fn busy_outside_window_is_ignored() {
        let busy = vec![iv(17, (7, 0), (9, 15)), iv(17, (16, 0), (20, 0))];

        let slots = free_slots(&busy, at(17, 9, 0), at(17, 17, 0), &WorkingHours::default(), thirty());

        assert_eq!(slots, vec![iv(17, (9, 15), (16, 0))]);
    }

    #[test]
    fn slots_span_days_and_skip_weekends() {
        // Fri 21st to Mon 24th
        let slots = free_slots(&[], at(21, 12, 0), at(24, 10, 0), &WorkingHours::default(), thirty());

        assert_eq!(slots, vec![iv(21, (12, 0), (17, 0)), iv(24, (9, 0), (10, 0))]);
    }

    #[test]
    fn busy_in_other_zone_is_normalized() {
        // 08:00-09:00 UTC is 10:00-11:00 in Helsinki (UTC+2 in March)
        let busy = vec![Interval::new(
            chrono_tz::UTC.with_ymd_and_hms(2025, 3, 17, 8, 0, 0).unwrap(),
            chrono_tz::UTC.with_ymd_and_hms(2025, 3, 17, 9, 0, 0).unwrap(),
        )];

        let slots = free_slots(&busy, at(17, 9, 0), at(17, 12, 0), &WorkingHours::default(), thirty());

        assert_eq!(slots, vec![iv(17, (9, 0), (10, 0)), iv(17, (11, 0), (12, 0))]);
    }

    #[test]
    fn empty_window_has_no_slots() {
        assert!(free_slots(&[], at(17, 12, 0), at(17, 12, 0), &WorkingHours::default(), thirty()).is_empty());
        assert!(free_slots(&[], at(17, 12, 0), at(17, 9, 0), &WorkingHours::default(), thirty()).is_empty());
    }

    #[test]
    fn is_free_checks_half_open_overlap() {
        let busy = vec![iv(17, (10, 0), (11, 0))];

        assert!(is_free(&busy, at(17, 9, 30), thirty()));
        assert!(is_free(&busy, at(17, 11, 0), thirty()));
        assert!(!is_free(&busy, at(17, 9, 45), thirty()));
        assert!(!is_free(&busy, at(17, 10, 15), thirty()));
        assert!(is_free(&[], at(17, 10, 15), thirty()));
    }

    #[test]
    fn first_common_slot_respects_everyone() {
        let mine = vec![iv(17, (9, 0), (10, 0))];
        let theirs = vec![iv(17, (10, 0), (10, 45)), iv(17, (11, 0), (12, 0))];

        let slot = first_common_slot(
            &[mine, theirs],
            at(17, 9, 0),
            at(17, 17, 0),
            &WorkingHours::default(),
            thirty(),
        );

        assert_eq!(slot, Some(iv(17, (12, 0), (12, 30))));
    }
}
