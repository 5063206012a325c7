//! Google Calendar access for oneonone.
//!
//! - `app_config` reads the OAuth client credentials file
//! - `session` caches and refreshes the user's OAuth token
//! - `authenticate` runs the browser consent flow
//! - `calendar` implements `oneonone_core::source::CalendarSource`

pub mod app_config;
pub mod authenticate;
pub mod calendar;
mod convert;
mod error;
pub mod session;

pub use calendar::GoogleCalendar;
pub use session::Session;
