use crate::error::Result;
use crate::types::{Dataset, NormalizedRecord};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write the filtered rows with their source columns followed by the
/// normalized `_date`, `_value`, `_money` and `_year_be` columns.
pub fn export_filtered<W: Write>(writer: W, dataset: &Dataset, rows: &[&NormalizedRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header: Vec<&str> = dataset.columns.iter().map(String::as_str).collect();
    header.extend(["_date", "_value", "_money", "_year_be"]);
    wtr.write_record(&header)?;

    for r in rows {
        let Some(source) = dataset.records.get(r.source) else { continue };
        let mut line: Vec<String> = dataset
            .columns
            .iter()
            .map(|c| source.get(c).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        line.push(
            r.date
                .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        );
        line.push(r.value.map(|v| v.to_string()).unwrap_or_default());
        line.push(r.money.map(|v| v.to_string()).unwrap_or_default());
        line.push(r.year_be.map(|y| y.to_string()).unwrap_or_default());
        wtr.write_record(&line)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Export to a file, prefixed with a UTF-8 BOM so spreadsheet tools pick up Thai text.
pub fn export_filtered_to_path(path: impl AsRef<Path>, dataset: &Dataset, rows: &[&NormalizedRecord]) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(b"\xEF\xBB\xBF")?;
    export_filtered(file, dataset, rows)
}

/// Markdown rendering of the first `max_rows` report rows under a title,
/// noting how many rows were left out.
pub fn render_preview<T: Tabled>(title: &str, rows: &[T], max_rows: usize) -> String {
    if rows.is_empty() {
        return format!("{}\n\n(no rows)\n", title);
    }
    let shown = rows.len().min(max_rows);
    let table = Table::new(&rows[..shown]).with(Style::markdown()).to_string();
    let mut out = format!("{}\n\n{}\n", title, table);
    if rows.len() > shown {
        out.push_str(&format!("({} more rows in the CSV export)\n", rows.len() - shown));
    }
    out
}

pub fn print_preview<T: Tabled>(title: &str, rows: &[T], max_rows: usize) {
    println!("{}", render_preview(title, rows, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawValue, Record, YearMoneyRow};
    use chrono::NaiveDate;

    #[test]
    fn test_render_preview_truncates() {
        let rows: Vec<YearMoneyRow> = (2565..2569)
            .map(|y| YearMoneyRow {
                year_be: y,
                total_money: "1,000.00".to_string(),
            })
            .collect();
        let text = render_preview("Project Money by Year (B.E.)", &rows, 2);
        assert!(text.starts_with("Project Money by Year (B.E.)\n"));
        assert!(text.contains("| YearBE | TotalMoney |"));
        assert!(text.contains("2566"));
        assert!(!text.contains("2567"));
        assert!(text.contains("(2 more rows in the CSV export)"));

        let empty: Vec<YearMoneyRow> = Vec::new();
        assert!(render_preview("Empty", &empty, 5).contains("(no rows)"));
    }

    #[test]
    fn test_export_filtered_appends_normalized_columns() {
        let mut rec = Record::new();
        rec.insert("transaction_date".to_string(), RawValue::text("13 พ.ย. 57"));
        rec.insert("winner_name".to_string(), RawValue::text("บริษัท ก"));
        let ds = Dataset::new(
            vec!["transaction_date".to_string(), "winner_name".to_string(), "note".to_string()],
            vec![rec],
        );
        let norm = NormalizedRecord {
            source: 0,
            date: NaiveDate::from_ymd_opt(2014, 11, 13).unwrap().and_hms_opt(0, 0, 0),
            value: Some(1234.5),
            money: None,
            year_be: Some(2558),
            type_of_work: None,
            vendor: Some("บริษัท ก".to_string()),
        };

        let mut out = Vec::new();
        export_filtered(&mut out, &ds, &[&norm]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "transaction_date,winner_name,note,_date,_value,_money,_year_be");
        assert_eq!(lines[1], "13 พ.ย. 57,บริษัท ก,,2014-11-13 00:00:00,1234.5,,2558");
    }
}
