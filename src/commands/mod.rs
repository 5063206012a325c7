pub mod free_slots;
pub mod get_last;
pub mod is_free;
pub mod next_one_on_one;
pub mod person;
pub mod recommend;
pub mod refresh_dataset;
pub mod validate_access;
