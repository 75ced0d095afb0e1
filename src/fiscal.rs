// Year bucketing and default date windows.
//
// Thai fiscal years run 1 October to 30 September and carry the Buddhist-era
// label of the year they end in: fiscal 2567 spans Oct 2023 to Sep 2024.
use crate::thai_date::{to_be, to_ce};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearMode {
    #[default]
    Fiscal,
    Calendar,
}

impl YearMode {
    pub fn from_fiscal_flag(fiscal: bool) -> Self {
        if fiscal {
            YearMode::Fiscal
        } else {
            YearMode::Calendar
        }
    }

    pub fn is_fiscal(self) -> bool {
        self == YearMode::Fiscal
    }
}

impl fmt::Display for YearMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearMode::Fiscal => f.write_str("fiscal"),
            YearMode::Calendar => f.write_str("calendar"),
        }
    }
}

/// Inclusive date range used to filter records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl YearWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        YearWindow { start, end }
    }

    /// Date-only comparison; time of day is ignored.
    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        let d = ts.date();
        self.start <= d && d <= self.end
    }
}

/// Buddhist-era year bucket for a date.
pub fn bucket(date: &NaiveDateTime, mode: YearMode) -> i32 {
    match mode {
        YearMode::Calendar => to_be(date.year()),
        YearMode::Fiscal if date.month() >= 10 => to_be(date.year() + 1),
        YearMode::Fiscal => to_be(date.year()),
    }
}

/// Default filter window for a selected Buddhist-era year.
///
/// Fiscal: 1 Oct of the previous Gregorian year to 30 Sep. Calendar: 1 Jan to
/// 31 Dec, with the end clamped to `today`. Returns `None` only for years
/// outside chrono's range.
pub fn default_window(year_be: i32, mode: YearMode, today: NaiveDate) -> Option<YearWindow> {
    let y_ce = to_ce(year_be);
    match mode {
        YearMode::Fiscal => Some(YearWindow::new(
            NaiveDate::from_ymd_opt(y_ce - 1, 10, 1)?,
            NaiveDate::from_ymd_opt(y_ce, 9, 30)?,
        )),
        YearMode::Calendar => {
            let end = NaiveDate::from_ymd_opt(y_ce, 12, 31)?;
            Some(YearWindow::new(
                NaiveDate::from_ymd_opt(y_ce, 1, 1)?,
                end.min(today),
            ))
        }
    }
}

/// Distinct year buckets, ascending.
pub fn available_years<I>(buckets: I) -> Vec<i32>
where
    I: IntoIterator<Item = i32>,
{
    let mut years: Vec<i32> = buckets.into_iter().collect();
    years.sort_unstable();
    years.dedup();
    years
}

/// Most recent year, used as the selection when none has been made.
pub fn latest_year(years: &[i32]) -> Option<i32> {
    years.last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(NaiveTime::MIN)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fiscal_boundary() {
        assert_eq!(bucket(&at(2023, 10, 1), YearMode::Fiscal), 2567);
        assert_eq!(bucket(&at(2023, 9, 30), YearMode::Fiscal), 2566);
        assert_eq!(bucket(&at(2023, 12, 31), YearMode::Fiscal), 2567);
        assert_eq!(bucket(&at(2024, 1, 1), YearMode::Fiscal), 2567);
    }

    #[test]
    fn test_calendar_bucket() {
        assert_eq!(bucket(&at(2023, 10, 1), YearMode::Calendar), 2566);
        assert_eq!(bucket(&at(2023, 9, 30), YearMode::Calendar), 2566);
    }

    #[test]
    fn test_fiscal_default_window() {
        let w = default_window(2567, YearMode::Fiscal, day(2020, 1, 1)).unwrap();
        assert_eq!(w.start, day(2023, 10, 1));
        assert_eq!(w.end, day(2024, 9, 30));
    }

    #[test]
    fn test_calendar_window_clamped_to_today() {
        let today = day(2024, 5, 17);
        let w = default_window(2567, YearMode::Calendar, today).unwrap();
        assert_eq!(w.start, day(2024, 1, 1));
        assert_eq!(w.end, today);

        let w = default_window(2566, YearMode::Calendar, today).unwrap();
        assert_eq!(w.end, day(2023, 12, 31));
    }

    #[test]
    fn test_window_ignores_time_of_day() {
        let w = YearWindow::new(day(2023, 10, 1), day(2024, 9, 30));
        let late = day(2024, 9, 30).and_hms_opt(23, 59, 59).unwrap();
        assert!(w.contains(&late));
        assert!(w.contains(&at(2023, 10, 1)));
        assert!(!w.contains(&at(2024, 10, 1)));
        assert!(!w.contains(&at(2023, 9, 30)));
    }

    #[test]
    fn test_available_and_latest_years() {
        let years = available_years(vec![2567, 2565, 2567, 2566]);
        assert_eq!(years, vec![2565, 2566, 2567]);
        assert_eq!(latest_year(&years), Some(2567));
        assert_eq!(latest_year(&[]), None);
    }
}
