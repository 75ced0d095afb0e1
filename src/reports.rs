use crate::aggregate::{
    average_per_month, count, period_sum, ranked_shares, sum, top_n, unique_count, year_sum, DateFilter,
};
use crate::fiscal::YearMode;
use crate::types::{
    KeyField, KpiSummary, MonthlyTrendRow, NormalizedRecord, TypeShareRow, ValueField, VendorRankingRow,
    YearMoneyRow,
};
use crate::util::format_number;

pub fn generate_kpis(rows: &[&NormalizedRecord], filter: &DateFilter, mode: YearMode) -> KpiSummary {
    KpiSummary {
        year_be: filter.year_be,
        mode: mode.to_string(),
        window_start: filter.window.start,
        window_end: filter.window.end,
        record_count: count(rows),
        total_value: sum(rows, ValueField::Value),
        unique_vendors: unique_count(rows, KeyField::Vendor),
        average_per_month: average_per_month(rows, ValueField::Value),
    }
}

pub fn generate_monthly_trend(rows: &[&NormalizedRecord]) -> Vec<MonthlyTrendRow> {
    period_sum(rows, ValueField::Value)
        .into_iter()
        .map(|(month, total)| MonthlyTrendRow {
            month: month.to_string(),
            total_value: format_number(total, 2),
        })
        .collect()
}

pub fn generate_vendor_ranking(rows: &[&NormalizedRecord], n: usize) -> Vec<VendorRankingRow> {
    top_n(rows, KeyField::Vendor, ValueField::Value, n)
        .into_iter()
        .enumerate()
        .map(|(idx, (vendor, total))| VendorRankingRow {
            rank: idx + 1,
            vendor,
            total_value: format_number(total, 2),
        })
        .collect()
}

pub fn generate_type_shares(rows: &[&NormalizedRecord]) -> Vec<TypeShareRow> {
    ranked_shares(rows, KeyField::Type, ValueField::Value)
        .into_iter()
        .map(|(g, share)| TypeShareRow {
            type_of_work: g.key,
            count: g.count,
            total_value: format_number(g.sum, 2),
            share_pct: format!("{:.2}", share),
        })
        .collect()
}

pub fn generate_money_by_year(rows: &[&NormalizedRecord]) -> Vec<YearMoneyRow> {
    year_sum(rows, ValueField::Money)
        .into_iter()
        .map(|(year_be, total)| YearMoneyRow {
            year_be,
            total_money: format_number(total, 2),
        })
        .collect()
}
