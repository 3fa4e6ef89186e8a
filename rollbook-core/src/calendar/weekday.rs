//! Weekday name and code mapping
//!
//! Recurrence rules carry two-letter day codes ("MO" .. "SU"); session rows
//! carry full weekday names.

use chrono::Weekday;

/// Weekday name, rule code and chrono weekday, Monday first
const DAY_TABLE: [(&str, &str, Weekday); 7] = [
    ("Monday", "MO", Weekday::Mon),
    ("Tuesday", "TU", Weekday::Tue),
    ("Wednesday", "WE", Weekday::Wed),
    ("Thursday", "TH", Weekday::Thu),
    ("Friday", "FR", Weekday::Fri),
    ("Saturday", "SA", Weekday::Sat),
    ("Sunday", "SU", Weekday::Sun),
];

/// Rule code for a weekday name ("Tuesday" -> "TU")
pub fn code_for_name(name: &str) -> Option<&'static str> {
    DAY_TABLE
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, code, _)| *code)
}

/// Weekday for a rule code ("TU" -> `Weekday::Tue`)
pub fn weekday_for_code(code: &str) -> Option<Weekday> {
    DAY_TABLE
        .iter()
        .find(|(_, c, _)| *c == code)
        .map(|(_, _, weekday)| *weekday)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_names_round_trip() {
        for (name, code, weekday) in DAY_TABLE {
            assert_eq!(code_for_name(name), Some(code));
            assert_eq!(weekday_for_code(code), Some(weekday));
        }
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(code_for_name("Funday"), None);
        assert_eq!(code_for_name("monday"), None);
        assert_eq!(code_for_name(""), None);
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(weekday_for_code("XX"), None);
        assert_eq!(weekday_for_code("mo"), None);
    }
}
