use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tabled::Tabled;

/// An untyped cell as it arrives from the source dataset.
///
/// Loaders decide the variant: CSV cells are always `Text` (or `Missing` when
/// empty), JSON numbers become `Number`, and callers embedding the library may
/// hand over native `Date`/`Timestamp` values directly.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Missing,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl RawValue {
    pub fn text(s: impl Into<String>) -> Self {
        RawValue::Text(s.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RawValue::Missing)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Missing => Ok(()),
            RawValue::Text(s) => f.write_str(s),
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            RawValue::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Outcome of coercing a single field.
///
/// `Failed` and `Missing` are treated the same by every aggregate; they are
/// kept apart only so load diagnostics can count genuine parse failures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parsed<T> {
    Value(T),
    Missing,
    Failed,
}

impl<T> Parsed<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Parsed::Value(v) => Some(v),
            Parsed::Missing | Parsed::Failed => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Parsed::Failed)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Parsed<U> {
        match self {
            Parsed::Value(v) => Parsed::Value(f(v)),
            Parsed::Missing => Parsed::Missing,
            Parsed::Failed => Parsed::Failed,
        }
    }
}

impl<T> From<Option<T>> for Parsed<T> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => Parsed::Value(v),
            None => Parsed::Failed,
        }
    }
}

/// One source row: column name to raw cell.
pub type Record = HashMap<String, RawValue>;

/// The immutable source table. Column order is kept for exports.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Dataset { columns, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

/// Derived view of a source row. `source` indexes into `Dataset::records`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub source: usize,
    pub date: Option<NaiveDateTime>,
    pub value: Option<f64>,
    pub money: Option<f64>,
    pub year_be: Option<i32>,
    pub type_of_work: Option<String>,
    pub vendor: Option<String>,
}

/// Grouping keys a dashboard can aggregate by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyField {
    Type,
    Vendor,
}

/// Numeric fields a dashboard can sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueField {
    Value,
    Money,
}

impl NormalizedRecord {
    pub fn key(&self, field: KeyField) -> Option<&str> {
        match field {
            KeyField::Type => self.type_of_work.as_deref(),
            KeyField::Vendor => self.vendor.as_deref(),
        }
    }

    pub fn amount(&self, field: ValueField) -> Option<f64> {
        match field {
            ValueField::Value => self.value,
            ValueField::Money => self.money,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct KpiSummary {
    pub year_be: i32,
    pub mode: String,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub record_count: usize,
    pub total_value: f64,
    pub unique_vendors: usize,
    pub average_per_month: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MonthlyTrendRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "TotalValue")]
    #[tabled(rename = "TotalValue")]
    pub total_value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct VendorRankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Vendor")]
    #[tabled(rename = "Vendor")]
    pub vendor: String,
    #[serde(rename = "TotalValue")]
    #[tabled(rename = "TotalValue")]
    pub total_value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TypeShareRow {
    #[serde(rename = "TypeOfWork")]
    #[tabled(rename = "TypeOfWork")]
    pub type_of_work: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "TotalValue")]
    #[tabled(rename = "TotalValue")]
    pub total_value: String,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct YearMoneyRow {
    #[serde(rename = "YearBE")]
    #[tabled(rename = "YearBE")]
    pub year_be: i32,
    #[serde(rename = "TotalMoney")]
    #[tabled(rename = "TotalMoney")]
    pub total_money: String,
}
