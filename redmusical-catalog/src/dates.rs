//! Release-date normalization.
//!
//! Remote release dates come at year, month or day precision
//! (`"1982"`, `"1982-10"`, `"1982-10-05"`). Missing components default to
//! the first month/day. Anything else normalizes to `None`.

use chrono::NaiveDate;

/// Parse a remote release date into a calendar date.
pub fn normalize_release_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    let mut parts = s.split('-');

    let year = parse_component(parts.next()?, 4)?;
    let (month, day) = match s.len() {
        4 => (1, 1),
        7 => (parse_component(parts.next()?, 2)?, 1),
        10 => (
            parse_component(parts.next()?, 2)?,
            parse_component(parts.next()?, 2)?,
        ),
        _ => return None,
    };
    if parts.next().is_some() {
        return None;
    }

    NaiveDate::from_ymd_opt(year as i32, month, day)
}

/// Format a date the way it is stored in the catalog.
pub fn format_release_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_component(s: &str, width: usize) -> Option<u32> {
    if s.len() != width || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
