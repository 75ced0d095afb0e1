// Fiscal aggregation: normalize a dataset once, pick a year and window, then
// reduce the filtered rows into the figures a dashboard shows.
//
// Every reduction is a pure function over `&[&NormalizedRecord]`; nothing is
// cached between filter changes.
use crate::config::ColumnMapping;
use crate::error::{DashboardError, Result};
use crate::fiscal::{available_years, bucket, default_window, latest_year, YearMode, YearWindow};
use crate::thai_date;
use crate::types::{Dataset, KeyField, NormalizedRecord, RawValue, ValueField};
use crate::util::{average, coerce, round2};
use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use tracing::{debug, info, warn};

static MISSING: RawValue = RawValue::Missing;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub total_rows: usize,
    pub dated_rows: usize,
    pub date_failures: usize,
    pub value_failures: usize,
    pub money_failures: usize,
}

/// A dataset after normalization and year bucketing.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub mode: YearMode,
    pub records: Vec<NormalizedRecord>,
    pub years: Vec<i32>,
    pub stats: NormalizeStats,
}

impl PreparedDataset {
    /// The year selected when the user has not picked one.
    pub fn default_year(&self) -> Option<i32> {
        latest_year(&self.years)
    }

    /// Re-bucket under a different year mode without re-parsing.
    pub fn with_mode(&self, mode: YearMode) -> PreparedDataset {
        let records: Vec<NormalizedRecord> = self
            .records
            .iter()
            .map(|r| NormalizedRecord {
                year_be: r.date.as_ref().map(|d| bucket(d, mode)),
                ..r.clone()
            })
            .collect();
        let years = available_years(records.iter().filter_map(|r| r.year_be));
        PreparedDataset {
            mode,
            records,
            years,
            stats: self.stats.clone(),
        }
    }
}

/// Normalize every record and bucket it by year.
///
/// Per-field failures become `None` on that record. Fails with
/// `EmptyDateDomain` when no record has a usable date.
pub fn prepare(dataset: &Dataset, columns: &ColumnMapping, mode: YearMode) -> Result<PreparedDataset> {
    if !dataset.is_empty()
        && !dataset.has_column(&columns.date)
        && !dataset.records.iter().any(|r| r.contains_key(&columns.date))
    {
        return Err(DashboardError::UnknownColumn(columns.date.clone()));
    }

    let mut stats = NormalizeStats {
        total_rows: dataset.len(),
        ..NormalizeStats::default()
    };
    let mut records = Vec::with_capacity(dataset.len());
    for (idx, row) in dataset.records.iter().enumerate() {
        let field = |name: &str| row.get(name).unwrap_or(&MISSING);

        let date = thai_date::normalize(field(&columns.date));
        let value = coerce(field(&columns.value));
        let money = coerce(field(&columns.money));
        if date.is_failed() {
            stats.date_failures += 1;
        }
        if value.is_failed() {
            stats.value_failures += 1;
        }
        if money.is_failed() {
            stats.money_failures += 1;
        }

        let date = date.ok();
        records.push(NormalizedRecord {
            source: idx,
            date,
            value: value.ok(),
            money: money.ok(),
            year_be: date.as_ref().map(|d| bucket(d, mode)),
            type_of_work: group_key(field(&columns.type_)),
            vendor: group_key(field(&columns.vendor)),
        });
    }
    stats.dated_rows = records.iter().filter(|r| r.date.is_some()).count();

    if stats.dated_rows == 0 {
        warn!(column = %columns.date, rows = stats.total_rows, "no parseable dates");
        return Err(DashboardError::EmptyDateDomain {
            column: columns.date.clone(),
        });
    }

    let years = available_years(records.iter().filter_map(|r| r.year_be));
    info!(
        rows = stats.total_rows,
        dated = stats.dated_rows,
        date_failures = stats.date_failures,
        value_failures = stats.value_failures,
        money_failures = stats.money_failures,
        %mode,
        "normalized dataset"
    );
    Ok(PreparedDataset {
        mode,
        records,
        years,
        stats,
    })
}

// Blank and missing keys are excluded from every grouping.
fn group_key(raw: &RawValue) -> Option<String> {
    match raw {
        RawValue::Missing => None,
        RawValue::Text(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        RawValue::Number(n) if n.is_nan() => None,
        other => Some(other.to_string()),
    }
}

/// Selected year plus the active date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFilter {
    pub year_be: i32,
    pub window: YearWindow,
}

impl DateFilter {
    /// Filter for `year_be` (or the latest year) with its default window.
    pub fn for_year(prepared: &PreparedDataset, year_be: Option<i32>, today: NaiveDate) -> Option<DateFilter> {
        let year_be = year_be.or_else(|| prepared.default_year())?;
        let window = default_window(year_be, prepared.mode, today)?;
        debug!(year_be, start = %window.start, end = %window.end, "default window");
        Some(DateFilter { year_be, window })
    }

    /// Replace either bound of the window, keeping the year.
    pub fn with_bounds(self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> DateFilter {
        DateFilter {
            year_be: self.year_be,
            window: YearWindow::new(start.unwrap_or(self.window.start), end.unwrap_or(self.window.end)),
        }
    }
}

/// Rows in the selected year bucket whose date falls inside the window.
pub fn filter<'a>(prepared: &'a PreparedDataset, f: &DateFilter) -> Vec<&'a NormalizedRecord> {
    prepared
        .records
        .iter()
        .filter(|r| r.year_be == Some(f.year_be))
        .filter(|r| r.date.as_ref().is_some_and(|d| f.window.contains(d)))
        .collect()
}

pub fn count(rows: &[&NormalizedRecord]) -> usize {
    rows.len()
}

pub fn sum(rows: &[&NormalizedRecord], field: ValueField) -> f64 {
    rows.iter().filter_map(|r| r.amount(field)).sum()
}

/// Mean over non-null values; 0 when there are none.
pub fn mean(rows: &[&NormalizedRecord], field: ValueField) -> f64 {
    let values: Vec<f64> = rows.iter().filter_map(|r| r.amount(field)).collect();
    average(&values)
}

pub fn unique_count(rows: &[&NormalizedRecord], key: KeyField) -> usize {
    rows.iter()
        .filter_map(|r| r.key(key))
        .collect::<HashSet<_>>()
        .len()
}

/// Summed value per key, in first-encounter order.
pub fn group_sum(rows: &[&NormalizedRecord], key: KeyField, value: ValueField) -> Vec<(String, f64)> {
    group_count_sum(rows, key, value)
        .into_iter()
        .map(|g| (g.key, g.sum))
        .collect()
}

/// Largest `n` groups by summed value. Ties keep encounter order.
pub fn top_n(rows: &[&NormalizedRecord], key: KeyField, value: ValueField, n: usize) -> Vec<(String, f64)> {
    let mut groups = group_sum(rows, key, value);
    sort_desc_stable(&mut groups, |g| g.1);
    groups.truncate(n);
    groups
}

/// Each group's share of the total, in percent, rounded to 2 places.
/// A zero total gives every group a share of 0.
pub fn percentage_share(groups: &[(String, f64)]) -> Vec<(String, f64)> {
    let total: f64 = groups.iter().map(|(_, v)| v).sum();
    let denom = if total == 0.0 { 1.0 } else { total };
    groups
        .iter()
        .map(|(k, v)| (k.clone(), round2(v / denom * 100.0)))
        .collect()
}

/// Calendar month key, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Summed value per calendar month, ascending.
pub fn period_sum(rows: &[&NormalizedRecord], value: ValueField) -> Vec<(YearMonth, f64)> {
    let mut months: BTreeMap<YearMonth, f64> = BTreeMap::new();
    for r in rows {
        let Some(d) = r.date else { continue };
        let e = months
            .entry(YearMonth {
                year: d.year(),
                month: d.month(),
            })
            .or_insert(0.0);
        *e += r.amount(value).unwrap_or(0.0);
    }
    months.into_iter().collect()
}

/// Mean of the monthly sums; 0 when no month is present.
pub fn average_per_month(rows: &[&NormalizedRecord], value: ValueField) -> f64 {
    let sums: Vec<f64> = period_sum(rows, value).into_iter().map(|(_, v)| v).collect();
    average(&sums)
}

/// Summed value per year bucket, ascending by year.
pub fn year_sum(rows: &[&NormalizedRecord], value: ValueField) -> Vec<(i32, f64)> {
    let mut years: BTreeMap<i32, f64> = BTreeMap::new();
    for r in rows {
        if let Some(y) = r.year_be {
            *years.entry(y).or_insert(0.0) += r.amount(value).unwrap_or(0.0);
        }
    }
    years.into_iter().collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    pub key: String,
    pub count: usize,
    pub sum: f64,
}

/// Record count and summed value per key, in first-encounter order.
pub fn group_count_sum(rows: &[&NormalizedRecord], key: KeyField, value: ValueField) -> Vec<GroupTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<GroupTotal> = Vec::new();
    for r in rows {
        let Some(k) = r.key(key) else { continue };
        let i = *index.entry(k).or_insert_with(|| {
            groups.push(GroupTotal {
                key: k.to_string(),
                count: 0,
                sum: 0.0,
            });
            groups.len() - 1
        });
        groups[i].count += 1;
        groups[i].sum += r.amount(value).unwrap_or(0.0);
    }
    groups
}

/// `group_count_sum` ranked by sum, descending, with each group's share.
pub fn ranked_shares(rows: &[&NormalizedRecord], key: KeyField, value: ValueField) -> Vec<(GroupTotal, f64)> {
    let mut groups = group_count_sum(rows, key, value);
    sort_desc_stable(&mut groups, |g| g.sum);
    let sums: Vec<(String, f64)> = groups.iter().map(|g| (g.key.clone(), g.sum)).collect();
    groups
        .into_iter()
        .zip(percentage_share(&sums))
        .map(|(g, (_, share))| (g, share))
        .collect()
}

fn sort_desc_stable<T, F: Fn(&T) -> f64>(items: &mut [T], by: F) {
    items.sort_by(|a, b| by(b).partial_cmp(&by(a)).unwrap_or(Ordering::Equal));
}
