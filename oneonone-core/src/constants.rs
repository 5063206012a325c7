/// Lookback used by `get-last-by-username` when none is given.
pub const DEFAULT_LAST_LOOKBACK_DAYS: i64 = 30;

/// Lookback used when refreshing the dataset.
pub const DEFAULT_REFRESH_LOOKBACK_DAYS: i64 = 60;

/// How far ahead `recommend` searches for a free slot.
pub const DEFAULT_HORIZON_DAYS: i64 = 14;

/// Default range of `free-slots` when `--to` is omitted.
pub const DEFAULT_FREE_SLOT_DAYS: i64 = 7;

/// Shortest meeting worth proposing, in minutes.
pub const DEFAULT_MEETING_MINUTES: i64 = 30;

/// Directory name under the platform config/data dirs.
pub const APP_DIR: &str = "oneonone";
