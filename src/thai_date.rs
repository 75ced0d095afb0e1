// Date normalization for Thai procurement exports.
//
// Source columns mix native timestamps, machine formats like `2023-11-13`,
// and Thai Buddhist-era strings like `13 พ.ย. 57` or `5 ตุลาคม 2566`.
// Everything funnels through `normalize` into a Gregorian `NaiveDateTime`.
use crate::types::{Parsed, RawValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Offset between Buddhist-era and Gregorian year numbering.
pub const BE_OFFSET: i32 = 543;

/// Years below this are read as abbreviated Buddhist-era years (`57` -> `2557`).
pub const ABBREVIATED_YEAR_THRESHOLD: i64 = 2500;

/// Abbreviated and full Thai month names. Exact, case-sensitive match.
static TH_MONTHS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    [
        ("ม.ค.", 1),
        ("ก.พ.", 2),
        ("มี.ค.", 3),
        ("เม.ย.", 4),
        ("พ.ค.", 5),
        ("มิ.ย.", 6),
        ("ก.ค.", 7),
        ("ส.ค.", 8),
        ("ก.ย.", 9),
        ("ต.ค.", 10),
        ("พ.ย.", 11),
        ("ธ.ค.", 12),
        ("มกราคม", 1),
        ("กุมภาพันธ์", 2),
        ("มีนาคม", 3),
        ("เมษายน", 4),
        ("พฤษภาคม", 5),
        ("มิถุนายน", 6),
        ("กรกฎาคม", 7),
        ("สิงหาคม", 8),
        ("กันยายน", 9),
        ("ตุลาคม", 10),
        ("พฤศจิกายน", 11),
        ("ธันวาคม", 12),
    ]
    .into_iter()
    .collect()
});

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

pub fn to_be(year_ce: i32) -> i32 {
    year_ce + BE_OFFSET
}

pub fn to_ce(year_be: i32) -> i32 {
    year_be - BE_OFFSET
}

/// Look up a Thai month token, abbreviated (`พ.ย.`) or full (`พฤศจิกายน`).
pub fn thai_month(token: &str) -> Option<u32> {
    TH_MONTHS.get(token).copied()
}

/// Normalize one raw date cell.
///
/// Precedence: missing, native date/timestamp, generic machine formats
/// (always Gregorian), then `day month year` with a Thai month name and a
/// Buddhist-era year. Never panics; anything unusable is `Failed`.
pub fn normalize(raw: &RawValue) -> Parsed<NaiveDateTime> {
    match raw {
        RawValue::Missing => Parsed::Missing,
        RawValue::Timestamp(ts) => in_range(*ts).into(),
        RawValue::Date(d) => in_range(d.and_time(NaiveTime::MIN)).into(),
        RawValue::Number(n) => normalize_text(&n.to_string()),
        RawValue::Text(s) => normalize_text(s),
    }
}

fn normalize_text(s: &str) -> Parsed<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return Parsed::Missing;
    }
    // An out-of-range machine parse (e.g. `2566-10-05`) still gets the Thai path.
    if let Some(ts) = parse_generic(s).and_then(in_range) {
        return Parsed::Value(ts);
    }
    parse_thai(s).into()
}

/// Locale-agnostic parse of common machine-generated formats.
pub fn parse_generic(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Parse `day month year` where month is a Thai name and year is Buddhist era.
///
/// Commas count as whitespace and trailing tokens (e.g. a time) are ignored.
pub fn parse_thai(s: &str) -> Option<NaiveDateTime> {
    let cleaned = s.replace(',', " ");
    let parts: Vec<&str> = cleaned.split_whitespace().collect();
    if parts.len() < 3 {
        return None;
    }
    let day = u32::try_from(parse_int(parts[0])?).ok()?;
    let month = thai_month(parts[1])?;
    let mut year_be = parse_int(parts[2])?;
    if year_be < ABBREVIATED_YEAR_THRESHOLD {
        year_be += ABBREVIATED_YEAR_THRESHOLD;
    }
    let year_ce = i32::try_from(year_be - BE_OFFSET as i64).ok()?;
    let date = NaiveDate::from_ymd_opt(year_ce, month, day)?;
    in_range(date.and_time(NaiveTime::MIN))
}

// Integer token, accepting Thai digits (๐-๙) as well as ASCII.
fn parse_int(token: &str) -> Option<i64> {
    let ascii: String = token
        .chars()
        .map(|c| match c {
            '\u{0E50}'..='\u{0E59}' => char::from(b'0' + (c as u32 - 0x0E50) as u8),
            other => other,
        })
        .collect();
    ascii.parse().ok()
}

// Canonical timestamps span 1677-09-22 to 2262-04-11, the range of a
// nanosecond-precision i64 timestamp. A Buddhist-era year written where a
// Gregorian one belongs lands outside it.
fn in_range(ts: NaiveDateTime) -> Option<NaiveDateTime> {
    let first = NaiveDate::from_ymd_opt(1677, 9, 22)?;
    let last = NaiveDate::from_ymd_opt(2262, 4, 11)?;
    (first..=last).contains(&ts.date()).then_some(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(NaiveTime::MIN)
    }

    #[test]
    fn test_be_conversions_are_inverse() {
        for y in [1, 1999, 2014, 2023, 2024, 9999] {
            assert_eq!(to_be(y), y + 543);
            assert_eq!(to_ce(to_be(y)), y);
        }
        assert_eq!(to_ce(2567), 2024);
    }

    #[test]
    fn test_missing_and_blank() {
        assert_eq!(normalize(&RawValue::Missing), Parsed::Missing);
        assert_eq!(normalize(&RawValue::text("   ")), Parsed::Missing);
    }

    #[test]
    fn test_native_values_pass_through() {
        let ts = NaiveDate::from_ymd_opt(2023, 10, 1)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(normalize(&RawValue::Timestamp(ts)), Parsed::Value(ts));
        let d = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert_eq!(normalize(&RawValue::Date(d)), Parsed::Value(ymd(2023, 1, 1)));
    }

    #[test]
    fn test_buddhist_year_in_machine_format_fails() {
        // Never reinterpreted as Buddhist era, and out of range as Gregorian.
        let d = NaiveDate::from_ymd_opt(2566, 1, 1).unwrap();
        assert_eq!(normalize(&RawValue::Date(d)), Parsed::Failed);
        assert_eq!(normalize(&RawValue::text("2566-10-05")), Parsed::Failed);
        assert_eq!(normalize(&RawValue::text("05/10/2566")), Parsed::Failed);
    }

    #[test]
    fn test_timestamp_bounds() {
        assert_eq!(normalize(&RawValue::text("2262-04-11")), Parsed::Value(ymd(2262, 4, 11)));
        assert_eq!(normalize(&RawValue::text("2262-04-12")), Parsed::Failed);
        assert_eq!(normalize(&RawValue::text("1677-09-22")), Parsed::Value(ymd(1677, 9, 22)));
        assert_eq!(normalize(&RawValue::text("1600-01-01")), Parsed::Failed);
        // 3000 B.E. is 2457 C.E.
        assert_eq!(normalize(&RawValue::text("1 ม.ค. 3000")), Parsed::Failed);
    }

    #[test]
    fn test_iso_string_is_gregorian() {
        assert_eq!(normalize(&RawValue::text("2023-11-13")), Parsed::Value(ymd(2023, 11, 13)));
        assert_eq!(normalize(&RawValue::text(" 2023/11/13 ")), Parsed::Value(ymd(2023, 11, 13)));
        // Month-first when ambiguous, day-first when the month would overflow.
        assert_eq!(normalize(&RawValue::text("02/03/2023")), Parsed::Value(ymd(2023, 2, 3)));
        assert_eq!(normalize(&RawValue::text("13/11/2023")), Parsed::Value(ymd(2023, 11, 13)));
    }

    #[test]
    fn test_generic_datetime_keeps_time() {
        let Parsed::Value(ts) = normalize(&RawValue::text("2023-11-13 08:15:00")) else {
            panic!("expected a timestamp");
        };
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2023, 11, 13).unwrap());
        assert_eq!(ts.hour(), 8);
        assert_eq!(ts.minute(), 15);
    }

    #[test]
    fn test_rfc3339_uses_local_wall_clock() {
        let Parsed::Value(ts) = normalize(&RawValue::text("2023-11-13T23:30:00+07:00")) else {
            panic!("expected a timestamp");
        };
        assert_eq!(ts.day(), 13);
        assert_eq!(ts.hour(), 23);
    }

    #[test]
    fn test_abbreviated_thai_month_and_short_year() {
        assert_eq!(normalize(&RawValue::text("13 พ.ย. 57")), Parsed::Value(ymd(2014, 11, 13)));
    }

    #[test]
    fn test_full_thai_month_and_full_year() {
        assert_eq!(normalize(&RawValue::text("5 ตุลาคม 2566")), Parsed::Value(ymd(2023, 10, 5)));
        assert_eq!(normalize(&RawValue::text("1, มกราคม, 2567")), Parsed::Value(ymd(2024, 1, 1)));
    }

    #[test]
    fn test_trailing_tokens_are_ignored() {
        assert_eq!(
            normalize(&RawValue::text("30 ก.ย. 2566 10:45")),
            Parsed::Value(ymd(2023, 9, 30))
        );
    }

    #[test]
    fn test_unknown_month_fails() {
        assert_eq!(normalize(&RawValue::text("13 Nov. 57")), Parsed::Failed);
        assert_eq!(normalize(&RawValue::text("13 พย 57")), Parsed::Failed);
    }

    #[test]
    fn test_too_few_tokens_fails() {
        assert_eq!(normalize(&RawValue::text("13 พ.ย.")), Parsed::Failed);
        assert_eq!(normalize(&RawValue::text("garbage")), Parsed::Failed);
    }

    #[test]
    fn test_invalid_calendar_day_fails() {
        // September has 30 days.
        assert_eq!(normalize(&RawValue::text("31 ก.ย. 2566")), Parsed::Failed);
        assert_eq!(normalize(&RawValue::text("0 ม.ค. 2566")), Parsed::Failed);
        assert_eq!(normalize(&RawValue::text("29 ก.พ. 2566")), Parsed::Failed);
        assert_eq!(normalize(&RawValue::text("29 ก.พ. 2567")), Parsed::Value(ymd(2024, 2, 29)));
    }

    #[test]
    fn test_non_integer_tokens_fail() {
        assert_eq!(normalize(&RawValue::text("xx พ.ย. 2566")), Parsed::Failed);
        assert_eq!(normalize(&RawValue::text("13 พ.ย. 25x6")), Parsed::Failed);
    }

    #[test]
    fn test_thai_digits() {
        assert_eq!(normalize(&RawValue::text("๑๓ พ.ย. ๒๕๖๖")), Parsed::Value(ymd(2023, 11, 13)));
    }

    #[test]
    fn test_number_is_not_a_date() {
        assert_eq!(normalize(&RawValue::Number(44927.0)), Parsed::Failed);
    }

    #[test]
    fn test_month_table_is_complete() {
        for m in 1..=12u32 {
            let count = TH_MONTHS.values().filter(|v| **v == m).count();
            assert_eq!(count, 2, "month {} should have an abbreviated and a full name", m);
        }
    }
}
