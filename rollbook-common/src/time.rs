//! Clock helpers
//!
//! All scheduling data is naive wall-clock time; nothing here converts
//! between time zones. Core operations take the current instant as an
//! explicit argument, so these helpers only appear at call sites that
//! genuinely want "now".

use chrono::{Local, NaiveDate, NaiveDateTime};

/// Current wall-clock datetime
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Current wall-clock date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
