// src/ingest/dates.rs
//! Best-effort normalization of the date strings found in feeds.
//!
//! Feeds are inconsistent: RFC 2822 `pubDate`s, ISO 8601 `updated`s, naive
//! timestamps without zone, and localized long forms ("2 janvier 2023").
//! Every parser here returns `None` on failure; nothing is ever raised.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use time::{format_description::well_known::Iso8601, OffsetDateTime};

/// Marker shown instead of a formatted date when the timestamp is unknown.
pub const UNKNOWN_DATE: &str = "unknown";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Parse a raw feed date. `None` in, `None` out; garbage in, `None` out.
pub fn normalize(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }

    parse_rfc2822(s)
        .or_else(|| parse_rfc3339(s))
        .or_else(|| parse_iso8601(s))
        .or_else(|| parse_naive(s))
        .or_else(|| parse_localized(s))
}

/// `dd/mm/yyyy` (UTC) or [`UNKNOWN_DATE`].
pub fn display_date(ts: Option<&DateTime<Utc>>) -> String {
    match ts {
        Some(t) => t.format("%d/%m/%Y").to_string(),
        None => UNKNOWN_DATE.to_string(),
    }
}

fn parse_rfc2822(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// ISO 8601 with an explicit offset, including the basic form (`20230102T100000Z`).
fn parse_iso8601(s: &str) -> Option<DateTime<Utc>> {
    let odt = OffsetDateTime::parse(s, &Iso8601::DEFAULT).ok()?;
    DateTime::from_timestamp(odt.unix_timestamp(), odt.nanosecond())
}

/// Zone-less layouts are taken as UTC.
fn parse_naive(s: &str) -> Option<DateTime<Utc>> {
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    for fmt in NAIVE_DATE_FORMATS {
        if let Ok(nd) = NaiveDate::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&nd.and_time(NaiveTime::MIN)));
        }
    }
    None
}

/// Long forms with English or French month names:
/// "2 janvier 2023", "lundi 2 janvier 2023 à 10h00", "1er mars 2024",
/// "January 2, 2023", "Jan. 2 2023 10:00 PM", "Mon, 02 Jan 2023 10:00:00 CET".
///
/// The whole string must match. A trailing zone token must resolve through
/// [`zone_offset_secs`], otherwise the date is rejected rather than read as UTC.
fn parse_localized(s: &str) -> Option<DateTime<Utc>> {
    static DAY_FIRST: OnceCell<Regex> = OnceCell::new();
    static MONTH_FIRST: OnceCell<Regex> = OnceCell::new();

    let day_first = DAY_FIRST.get_or_init(|| {
        Regex::new(
            r"(?iu)^(?:\p{L}+\.?,?\s+)?(?P<day>\d{1,2})(?:er|st|nd|rd|th)?\s+(?P<month>\p{L}+)\.?,?\s+(?P<year>\d{4})(?:(?:\s*,)?\s+(?:à\s+|at\s+)?(?P<hour>\d{1,2})[:h](?P<min>\d{2})(?::(?P<sec>\d{2}))?(?:\s*(?P<ampm>[ap]\.?m\.?))?)?(?:\s+(?P<zone>[+-]\d{2}:?\d{2}|\p{L}{1,5}))?\s*$",
        )
        .expect("day-first date regex")
    });
    let month_first = MONTH_FIRST.get_or_init(|| {
        Regex::new(
            r"(?iu)^(?:\p{L}+\.?,?\s+)?(?P<month>\p{L}+)\.?\s+(?P<day>\d{1,2})(?:st|nd|rd|th)?,?\s+(?P<year>\d{4})(?:(?:\s*,)?\s+(?:at\s+)?(?P<hour>\d{1,2}):(?P<min>\d{2})(?::(?P<sec>\d{2}))?(?:\s*(?P<ampm>[ap]\.?m\.?))?)?(?:\s+(?P<zone>[+-]\d{2}:?\d{2}|\p{L}{1,5}))?\s*$",
        )
        .expect("month-first date regex")
    });

    let c = day_first
        .captures(s)
        .or_else(|| month_first.captures(s))?;
    let num = |name: &str| -> Option<u32> {
        c.name(name).map_or(Some(0), |m| m.as_str().parse().ok())
    };

    let day = num("day")?;
    let month = month_number(c.name("month")?.as_str())?;
    let year: i32 = c.name("year")?.as_str().parse().ok()?;
    let hour = to_24h(num("hour")?, c.name("ampm").map(|m| m.as_str()))?;
    let minute = num("min")?;
    let second = num("sec")?;
    let offset = match c.name("zone") {
        Some(z) => zone_offset_secs(z.as_str())?,
        None => 0,
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    FixedOffset::east_opt(offset)?
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// 12-hour clock to 24-hour; `None` for an impossible hour like "13 PM".
fn to_24h(hour: u32, ampm: Option<&str>) -> Option<u32> {
    let Some(marker) = ampm else {
        return Some(hour);
    };
    if !(1..=12).contains(&hour) {
        return None;
    }
    let pm = marker.to_ascii_lowercase().starts_with('p');
    Some(match (pm, hour) {
        (false, 12) => 0,
        (false, h) => h,
        (true, 12) => 12,
        (true, h) => h + 12,
    })
}

/// Offset east of UTC for a numeric (`+0100`, `-05:00`) or named zone.
fn zone_offset_secs(zone: &str) -> Option<i32> {
    if let Some(sign) = match zone.as_bytes().first()? {
        b'+' => Some(1),
        b'-' => Some(-1),
        _ => None,
    } {
        let digits: String = zone[1..].chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 {
            return None;
        }
        let h: i32 = digits[..2].parse().ok()?;
        let m: i32 = digits[2..].parse().ok()?;
        return Some(sign * (h * 3600 + m * 60));
    }

    let hours = match zone.to_ascii_lowercase().as_str() {
        "z" | "ut" | "utc" | "gmt" | "wet" => 0,
        "bst" | "cet" | "met" | "wat" | "west" => 1,
        "cest" | "mest" | "eet" | "cat" => 2,
        "eest" | "msk" | "eat" => 3,
        "ast" | "edt" => -4,
        "est" | "cdt" => -5,
        "cst" | "mdt" => -6,
        "mst" | "pdt" => -7,
        "pst" => -8,
        _ => return None,
    };
    Some(hours * 3600)
}

fn month_number(name: &str) -> Option<u32> {
    let n = name.to_lowercase();
    let m = match n.as_str() {
        "january" | "jan" | "janvier" | "janv" => 1,
        "february" | "feb" | "février" | "fevrier" | "févr" | "fevr" | "fév" => 2,
        "march" | "mar" | "mars" => 3,
        "april" | "apr" | "avril" | "avr" => 4,
        "may" | "mai" => 5,
        "june" | "jun" | "juin" => 6,
        "july" | "jul" | "juillet" | "juil" => 7,
        "august" | "aug" | "août" | "aout" => 8,
        "september" | "sep" | "sept" | "septembre" => 9,
        "october" | "oct" | "octobre" => 10,
        "november" | "nov" | "novembre" => 11,
        "december" | "dec" | "décembre" | "decembre" | "déc" => 12,
        _ => return None,
    };
    Some(m)
}
