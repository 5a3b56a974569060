// tests/ingest_dates.rs
use chrono::{TimeZone, Utc};
use press_watch::ingest::dates::normalize;

#[test]
fn rfc822_feed_date_is_utc() {
    assert_eq!(
        normalize(Some("Mon, 02 Jan 2023 10:00:00 GMT")),
        Some(Utc.with_ymd_and_hms(2023, 1, 2, 10, 0, 0).unwrap())
    );
}

#[test]
fn absent_and_garbage_are_null() {
    assert_eq!(normalize(None), None);
    assert_eq!(normalize(Some("not a date")), None);
}
