// Entry point and console menu.
//
// - Option [1] loads the procurement export and normalizes dates/amounts.
// - Option [2] switches between Thai fiscal and calendar years and picks the
//   year (defaults to the latest one found) and, optionally, a narrower window.
// - Option [3] prints KPI and report previews and writes CSV/JSON outputs.
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use procurement_dashboard::aggregate::{self, DateFilter, PreparedDataset};
use procurement_dashboard::config::DashboardSettings;
use procurement_dashboard::fiscal::YearMode;
use procurement_dashboard::types::Dataset;
use procurement_dashboard::{loader, output, reports, util};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// Loaded once per session; year/window selections are recomputed from it.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        settings: DashboardSettings::default(),
        dataset: None,
        prepared: None,
        selection: None,
    })
});

struct AppState {
    settings: DashboardSettings,
    dataset: Option<Dataset>,
    prepared: Option<PreparedDataset>,
    selection: Option<DateFilter>,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(PoisonError::into_inner)
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    prompt("Enter choice: ")
}

fn prompt_yes_no(label: &str) -> bool {
    loop {
        match prompt(label).to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn prompt_date(label: &str) -> Option<NaiveDate> {
    loop {
        let s = prompt(label);
        if s.is_empty() {
            return None;
        }
        match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            Ok(d) => return Some(d),
            Err(_) => println!("Invalid date. Use YYYY-MM-DD or leave blank."),
        }
    }
}

fn settings_path() -> PathBuf {
    std::env::var("DASHBOARD_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("dashboard.json"))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Handle option [1]: load the source file and normalize it.
fn handle_load() {
    let mut state = state();
    let path = state.settings.data_path.clone();
    let (dataset, load_report) = match loader::load(&path) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "load failed");
            eprintln!("Failed to load file: {}\n", e);
            return;
        }
    };
    println!(
        "Loaded {} rows, {} columns from {}.",
        util::format_int(load_report.total_rows),
        util::format_int(load_report.total_columns),
        path
    );
    if load_report.skipped_rows > 0 {
        println!(
            "Note: {} malformed rows skipped.",
            util::format_int(load_report.skipped_rows)
        );
    }

    let mode = YearMode::from_fiscal_flag(state.settings.fiscal_year);
    match aggregate::prepare(&dataset, &state.settings.columns, mode) {
        Ok(prepared) => {
            println!(
                "Dates parsed: {} of {} ({} unparseable).",
                util::format_int(prepared.stats.dated_rows),
                util::format_int(prepared.stats.total_rows),
                util::format_int(prepared.stats.date_failures)
            );
            println!("Years available (B.E.): {:?}\n", prepared.years);
            state.selection = DateFilter::for_year(&prepared, None, today());
            state.prepared = Some(prepared);
            state.dataset = Some(dataset);
        }
        Err(e) => {
            eprintln!("Error: {}\n", e);
            state.prepared = None;
            state.selection = None;
            state.dataset = None;
        }
    }
}

/// Handle option [2]: choose year mode, year and window.
fn handle_select_year() {
    let mut state = state();
    let Some(prepared) = state.prepared.as_ref() else {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
        return;
    };

    let fiscal = prompt_yes_no("Use Thai fiscal year (Oct previous year -> Sep)? (Y/N): ");
    let prepared = prepared.with_mode(YearMode::from_fiscal_flag(fiscal));
    println!("Years available (B.E.): {:?}", prepared.years);

    let year = loop {
        let s = prompt("Select year (B.E., blank = latest): ");
        if s.is_empty() {
            break None;
        }
        match s.parse::<i32>() {
            Ok(y) if prepared.years.contains(&y) => break Some(y),
            _ => println!("Invalid year. Pick one of the listed years."),
        }
    };

    let Some(filter) = DateFilter::for_year(&prepared, year, today()) else {
        warn!(?year, "could not build a window for year");
        println!("Error: could not build a date window for that year.\n");
        return;
    };
    println!("Default window: {} to {}", filter.window.start, filter.window.end);
    let filter = filter.with_bounds(prompt_date("Start date (blank = default): "), prompt_date("End date (blank = default): "));
    info!(year_be = filter.year_be, start = %filter.window.start, end = %filter.window.end, mode = %prepared.mode, "selection changed");
    println!("Selected {} year {}: {} to {}\n", prepared.mode, filter.year_be, filter.window.start, filter.window.end);

    state.selection = Some(filter);
    state.prepared = Some(prepared);
}

/// Handle option [3]: generate all reports for the current selection.
///
/// Writes a filtered CSV export, one CSV per report and a JSON KPI summary,
/// and prints markdown previews to the console.
fn handle_generate_reports() {
    let state = state();
    let (Some(dataset), Some(prepared), Some(filter)) =
        (state.dataset.as_ref(), state.prepared.as_ref(), state.selection.as_ref())
    else {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
        return;
    };
    let settings = &state.settings;
    let out_dir = Path::new(&settings.output_dir);
    let rows = aggregate::filter(prepared, filter);

    let kpis = reports::generate_kpis(&rows, filter, prepared.mode);
    println!("Year {} ({}): {} to {}\n", kpis.year_be, kpis.mode, kpis.window_start, kpis.window_end);
    println!("Records:            {}", util::format_int(kpis.record_count));
    println!("Total value (THB):  {}", util::format_number(kpis.total_value, 2));
    println!("Unique vendors:     {}", util::format_int(kpis.unique_vendors));
    println!("Average per month:  {}\n", util::format_number(kpis.average_per_month, 2));

    let monthly = reports::generate_monthly_trend(&rows);
    output::print_preview("Monthly Value Trend", &monthly, 12);
    report_write(output::write_csv(out_dir.join("monthly_trend.csv"), &monthly));

    let vendors = reports::generate_vendor_ranking(&rows, settings.top_n);
    output::print_preview(&format!("Top {} Vendors by Contract Value", settings.top_n), &vendors, settings.preview_rows);
    report_write(output::write_csv(out_dir.join("vendor_ranking.csv"), &vendors));

    let types = reports::generate_type_shares(&rows);
    output::print_preview("Value Share by Type of Work", &types, settings.preview_rows);
    report_write(output::write_csv(out_dir.join("type_shares.csv"), &types));

    let money = reports::generate_money_by_year(&rows);
    output::print_preview("Project Money by Year (B.E.)", &money, settings.preview_rows);
    report_write(output::write_csv(out_dir.join("money_by_year.csv"), &money));

    report_write(output::export_filtered_to_path(out_dir.join("filtered.csv"), dataset, &rows));
    report_write(output::write_json(out_dir.join("summary.json"), &kpis));
    println!("(Outputs saved to {})\n", out_dir.display());
}

fn report_write(result: procurement_dashboard::Result<()>) {
    if let Err(e) = result {
        error!(error = %e, "write failed");
        eprintln!("Write error: {}", e);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    match DashboardSettings::load(settings_path()) {
        Ok(settings) => state().settings = settings,
        Err(e) => {
            eprintln!("Invalid settings file: {}", e);
            return;
        }
    }

    loop {
        println!("Procurement Spending Dashboard");
        println!("[1] Load the file");
        println!("[2] Select year and date range");
        println!("[3] Generate Reports");
        println!("[4] Exit\n");
        match read_choice().as_str() {
            "1" => handle_load(),
            "2" => handle_select_year(),
            "3" => {
                println!();
                handle_generate_reports();
            }
            "4" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1, 2, 3 or 4.\n"),
        }
    }
}
