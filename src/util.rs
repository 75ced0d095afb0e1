// Numeric coercion and display helpers.
//
// Amount columns in procurement exports arrive as native numbers, as text
// with thousands separators (`1,234.50`), or as junk. `coerce` turns all of
// them into `Parsed<f64>` so the aggregates can assume clean values.
use crate::types::{Parsed, RawValue};
use num_format::{Locale, ToFormattedString};

/// Coerce a raw cell into `f64`.
///
/// - Missing (or blank text) stays `Missing`.
/// - Native numbers are taken as-is (NaN counts as missing).
/// - Text has commas and all whitespace stripped before parsing.
/// - Dates and anything unparseable are `Failed`; never panics.
pub fn coerce(raw: &RawValue) -> Parsed<f64> {
    match raw {
        RawValue::Missing => Parsed::Missing,
        RawValue::Number(n) if n.is_nan() => Parsed::Missing,
        RawValue::Number(n) => Parsed::Value(*n),
        RawValue::Text(s) => coerce_str(s),
        RawValue::Date(_) | RawValue::Timestamp(_) => Parsed::Failed,
    }
}

pub fn coerce_str(s: &str) -> Parsed<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return if s.is_empty() { Parsed::Missing } else { Parsed::Failed };
    }
    cleaned.parse::<f64>().ok().filter(|v| !v.is_nan()).into()
}

/// Mean of `values`, or 0 when there are none.
pub fn average(values: &[f64]) -> f64 {
    match values.len() {
        0 => 0.0,
        n => values.iter().sum::<f64>() / n as f64,
    }
}

/// Round half away from zero to 2 decimal places.
pub fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

/// Baht amount with `decimals` places and thousands separators: `1,234,567.89`.
/// A value that rounds to zero never carries a minus sign.
pub fn format_number(n: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (whole, frac) = match fixed.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (fixed.as_str(), None),
    };
    let grouped = whole
        .parse::<u64>()
        .map(|w| w.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| whole.to_string());
    let sign = if n < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        "-"
    } else {
        ""
    };
    match frac {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Row and vendor counts for console messages, e.g. `9,855`.
pub fn format_int(n: impl ToFormattedString) -> String {
    n.to_formatted_string(&Locale::en)
}
