use chrono::NaiveDate;
use redmusical_catalog::{format_release_date, normalize_release_date};

fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

#[test]
fn year_only() {
    assert_eq!(normalize_release_date("1982"), ymd(1982, 1, 1));
}

#[test]
fn year_and_month() {
    assert_eq!(normalize_release_date("1982-10"), ymd(1982, 10, 1));
}

#[test]
fn full_date() {
    assert_eq!(normalize_release_date("1982-10-05"), ymd(1982, 10, 5));
}

#[test]
fn surrounding_whitespace_is_ignored() {
    assert_eq!(normalize_release_date(" 2001-07 "), ymd(2001, 7, 1));
}

#[test]
fn impossible_dates_are_none() {
    assert_eq!(normalize_release_date("1982-13"), None);
    assert_eq!(normalize_release_date("1982-02-30"), None);
    assert_eq!(normalize_release_date("0000-00-00"), None);
}

#[test]
fn garbage_is_none() {
    assert_eq!(normalize_release_date(""), None);
    assert_eq!(normalize_release_date("unknown"), None);
    assert_eq!(normalize_release_date("82"), None);
    assert_eq!(normalize_release_date("1982/10/05"), None);
    assert_eq!(normalize_release_date("19a2-10-05"), None);
    assert_eq!(normalize_release_date("1982-1-05x"), None);
}

#[test]
fn formats_as_iso_date() {
    let date = normalize_release_date("1999-03").unwrap();
    assert_eq!(format_release_date(date), "1999-03-01");
}
