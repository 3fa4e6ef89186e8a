//! Recurrence descriptors and calendar feed rendering

pub mod feed;
pub mod rrule;
pub mod weekday;

pub use feed::build_ics;
pub use rrule::{generate_rrule, parse_rrule, StoredRule};
