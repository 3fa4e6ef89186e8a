//! Subscription calendar feed rendering
//!
//! Renders one session as a VCALENDAR block for polling calendar clients.
//! The block is reproducible byte-for-byte from the same session state,
//! DTSTAMP aside. Field values are emitted as stored; reserved-character
//! escaping is not applied.

use chrono::{Datelike, Duration, NaiveDateTime};
use rollbook_common::db::models::Session;
use rollbook_common::{Error, Result};

use crate::calendar::rrule::{self, DESCRIPTOR_DATETIME_FORMAT};
use crate::calendar::weekday;

/// Move an anchor forward until it lands on the rule's weekday.
///
/// Stale anchors appear when a session's date range is edited without the
/// descriptor being regenerated; the feed must still start on the
/// advertised weekday. Never moves backward; lands within six days.
pub fn correct_dtstart(dtstart: NaiveDateTime, byday: &str) -> Result<NaiveDateTime> {
    let target = weekday::weekday_for_code(byday)
        .ok_or_else(|| Error::Format(format!("unknown BYDAY code '{}'", byday)))?;

    let mut dt = dtstart;
    while dt.weekday() != target {
        dt += Duration::days(1);
    }

    Ok(dt)
}

/// Render the calendar feed block for one session.
///
/// `now` becomes the DTSTAMP; pass a fixed value for reproducible output.
/// The correction applied to the anchor is render-only and is never
/// written back to the stored descriptor.
pub fn build_ics(session: &Session, now: NaiveDateTime) -> Result<String> {
    let rule = rrule::parse_rrule(&session.rrule)?;
    let dtstart = correct_dtstart(rule.dtstart, &rule.byday)?;

    Ok(format!(
        "BEGIN:VCALENDAR\n\
         VERSION:2.0\n\
         PRODID:-//Rollbook//EN\n\
         CALSCALE:GREGORIAN\n\
         BEGIN:VEVENT\n\
         UID:session-{guid}@rollbook.app\n\
         DTSTAMP:{dtstamp}\n\
         DTSTART:{dtstart}\n\
         {rrule_line}\n\
         SUMMARY:{title}\n\
         DESCRIPTION:Term {term} - Weekly Class\n\
         LOCATION:{location}, {city}\n\
         END:VEVENT\n\
         END:VCALENDAR\n",
        guid = session.guid,
        dtstamp = now.format(DESCRIPTOR_DATETIME_FORMAT),
        dtstart = dtstart.format(DESCRIPTOR_DATETIME_FORMAT),
        rrule_line = rule.rrule_line,
        title = session.title,
        term = session.term,
        location = session.location,
        city = session.city,
    ))
}
