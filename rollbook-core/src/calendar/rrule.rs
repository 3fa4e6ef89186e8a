//! Recurrence descriptor generation and parsing
//!
//! A descriptor is the stored two-line text form of one weekly rule:
//!
//! ```text
//! DTSTART:20251228T153000
//! RRULE:FREQ=WEEKLY;BYDAY=TH;UNTIL=20260102T173000
//! ```
//!
//! The first line is the anchor (first occurrence); the second carries the
//! weekly frequency, the weekday code and the until bound.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rollbook_common::{Error, Result};

use crate::calendar::weekday;

/// Datetime layout used inside descriptors
pub const DESCRIPTOR_DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Build the descriptor for a weekly session on one fixed weekday.
///
/// Times are kept exactly as provided (no timezone conversion). The anchor
/// is not checked against `day_of_week`; the feed renderer corrects any
/// mismatch at render time.
pub fn generate_rrule(
    start_date: NaiveDate,
    end_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    day_of_week: &str,
) -> Result<String> {
    let byday = weekday::code_for_name(day_of_week).ok_or_else(|| {
        Error::InvalidInput(format!(
            "invalid day_of_week '{}', expected 'Monday', 'Tuesday', etc.",
            day_of_week
        ))
    })?;

    if end_date < start_date {
        return Err(Error::InvalidInput(
            "end date must not be before start date".to_string(),
        ));
    }

    if end_time <= start_time {
        return Err(Error::InvalidInput(
            "end time must be after start time".to_string(),
        ));
    }

    let dtstart = start_date.and_time(start_time);
    let until = end_date.and_time(end_time);

    Ok(format!(
        "DTSTART:{}\nRRULE:FREQ=WEEKLY;BYDAY={};UNTIL={}",
        dtstart.format(DESCRIPTOR_DATETIME_FORMAT),
        byday,
        until.format(DESCRIPTOR_DATETIME_FORMAT)
    ))
}

/// Parsed form of a stored descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRule {
    /// First-occurrence anchor
    pub dtstart: NaiveDateTime,
    /// Two-letter weekday code from BYDAY
    pub byday: String,
    /// Recurrence end bound from UNTIL
    pub until: NaiveDateTime,
    /// Full RRULE line as stored
    pub rrule_line: String,
}

/// Parse a stored descriptor back into its components.
///
/// A missing DTSTART or RRULE line, a missing BYDAY or UNTIL component, or
/// a malformed datetime means the stored text is corrupt or was never
/// generated, and fails with [`Error::Format`].
pub fn parse_rrule(stored: &str) -> Result<StoredRule> {
    let dtstart_line = stored
        .lines()
        .find(|line| line.starts_with("DTSTART:"))
        .ok_or_else(|| Error::Format("descriptor missing DTSTART".to_string()))?;
    let rrule_line = stored
        .lines()
        .find(|line| line.starts_with("RRULE:"))
        .ok_or_else(|| Error::Format("descriptor missing RRULE".to_string()))?;

    let dtstart = parse_descriptor_datetime(dtstart_line.trim_start_matches("DTSTART:").trim())?;

    let byday = rule_component(rrule_line, "BYDAY=")
        .ok_or_else(|| Error::Format("RRULE missing BYDAY".to_string()))?;
    let until_raw = rule_component(rrule_line, "UNTIL=")
        .ok_or_else(|| Error::Format("RRULE missing UNTIL".to_string()))?;
    let until = parse_descriptor_datetime(&until_raw)?;

    Ok(StoredRule {
        dtstart,
        byday,
        until,
        rrule_line: rrule_line.to_string(),
    })
}

fn rule_component(rrule_line: &str, key: &str) -> Option<String> {
    rrule_line
        .trim_start_matches("RRULE:")
        .split(';')
        .find(|part| part.starts_with(key))
        .map(|part| part[key.len()..].to_string())
}

fn parse_descriptor_datetime(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DESCRIPTOR_DATETIME_FORMAT)
        .map_err(|e| Error::Format(format!("bad descriptor datetime '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_generate_exact_text() {
        let rrule = generate_rrule(
            date(2025, 12, 28),
            date(2026, 1, 2),
            time(15, 30),
            time(17, 30),
            "Thursday",
        )
        .unwrap();

        assert_eq!(
            rrule,
            "DTSTART:20251228T153000\nRRULE:FREQ=WEEKLY;BYDAY=TH;UNTIL=20260102T173000"
        );
    }

    #[test]
    fn test_generated_byday_matches_requested_weekday() {
        let names = [
            ("Monday", "MO"),
            ("Tuesday", "TU"),
            ("Wednesday", "WE"),
            ("Thursday", "TH"),
            ("Friday", "FR"),
            ("Saturday", "SA"),
            ("Sunday", "SU"),
        ];

        for (name, code) in names {
            let rrule =
                generate_rrule(date(2025, 1, 6), date(2025, 3, 31), time(16, 0), time(17, 30), name)
                    .unwrap();
            let parsed = parse_rrule(&rrule).unwrap();
            assert_eq!(parsed.byday, code, "weekday {} should map to {}", name, code);
        }
    }

    #[test]
    fn test_generate_rejects_unknown_weekday() {
        let result = generate_rrule(
            date(2025, 1, 6),
            date(2025, 3, 31),
            time(16, 0),
            time(17, 30),
            "Someday",
        );
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_generate_rejects_reversed_dates() {
        let result = generate_rrule(
            date(2025, 3, 31),
            date(2025, 1, 6),
            time(16, 0),
            time(17, 30),
            "Monday",
        );
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_generate_rejects_non_positive_time_range() {
        let result = generate_rrule(
            date(2025, 1, 6),
            date(2025, 3, 31),
            time(17, 30),
            time(16, 0),
            "Monday",
        );
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = generate_rrule(
            date(2025, 1, 6),
            date(2025, 3, 31),
            time(16, 0),
            time(16, 0),
            "Monday",
        );
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_generate_accepts_single_date_range() {
        let rrule = generate_rrule(
            date(2025, 1, 7),
            date(2025, 1, 7),
            time(16, 0),
            time(17, 30),
            "Tuesday",
        )
        .unwrap();
        let parsed = parse_rrule(&rrule).unwrap();
        assert_eq!(parsed.dtstart.date(), date(2025, 1, 7));
        assert_eq!(parsed.until.date(), date(2025, 1, 7));
    }

    #[test]
    fn test_parse_round_trip() {
        let rrule = generate_rrule(
            date(2025, 1, 6),
            date(2025, 3, 31),
            time(16, 0),
            time(17, 30),
            "Tuesday",
        )
        .unwrap();

        let parsed = parse_rrule(&rrule).unwrap();
        assert_eq!(parsed.dtstart, date(2025, 1, 6).and_time(time(16, 0)));
        assert_eq!(parsed.byday, "TU");
        assert_eq!(parsed.until, date(2025, 3, 31).and_time(time(17, 30)));
        assert_eq!(
            parsed.rrule_line,
            "RRULE:FREQ=WEEKLY;BYDAY=TU;UNTIL=20250331T173000"
        );
    }

    #[test]
    fn test_parse_rejects_missing_dtstart() {
        let result = parse_rrule("RRULE:FREQ=WEEKLY;BYDAY=TU;UNTIL=20250331T173000");
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_parse_rejects_missing_rrule() {
        let result = parse_rrule("DTSTART:20250106T160000");
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_parse_rejects_missing_byday() {
        let result = parse_rrule("DTSTART:20250106T160000\nRRULE:FREQ=WEEKLY;UNTIL=20250331T173000");
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_parse_rejects_bad_datetime() {
        let result = parse_rrule("DTSTART:not-a-datetime\nRRULE:FREQ=WEEKLY;BYDAY=TU;UNTIL=20250331T173000");
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(parse_rrule("").is_err());
    }
}
