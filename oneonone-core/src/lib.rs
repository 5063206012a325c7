//! Core types for oneonone.
//!
//! This crate holds everything that does not talk to the network:
//! - `directory` for the organization file and person lookups
//! - `slots` for free/busy interval math within working hours
//! - `recommendation` and `one_on_one` for the cadence rule and 1:1 detection
//! - `dataset` for the persisted recommendation records
//! - `source` for the calendar access trait implemented by providers

pub mod config;
pub mod constants;
pub mod dataset;
pub mod directory;
pub mod error;
pub mod event;
pub mod input;
pub mod one_on_one;
pub mod person;
pub mod recommendation;
pub mod slots;
pub mod source;
pub mod working_hours;

pub use error::{Error, Result};
