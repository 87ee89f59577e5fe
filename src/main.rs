use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use polars::prelude::DataFrame;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use estat_dashboard::catalog::CatalogGroup;
use estat_dashboard::{
    CachedSource, CsvSource, DashboardConfig, FieldReport, OverviewReport, SeriesDrilldown,
    WindowSelector,
};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Print e-Stat access ranking aggregates for a date window"
)]
struct Args {
    /// Directory holding the ranking and catalog CSVs (default: ESTAT_DATA_DIR or .)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// past-week, past-month, past-year, past-2-years, past-3-years, past-5-years, all-time or custom
    #[arg(short, long)]
    window: Option<WindowSelector>,
    /// First day of a custom window (implies --window custom)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Last day of a custom window (implies --window custom)
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Field to analyse instead of the whole portal
    #[arg(short, long)]
    field: Option<String>,
    /// Series to drill into; needs --field
    #[arg(short, long, requires = "field")]
    series: Option<String>,
    #[arg(long)]
    top_n: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = DashboardConfig::from_env();
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(n) = args.top_n {
        config.top_n = n;
    }
    let top_n = config.top_n;

    let source = CachedSource::new(CsvSource::new(config.clone()));
    let dataset = source.get().with_context(|| {
        format!(
            "loading {} and {}",
            config.ranking_path().display(),
            config.catalog_path().display()
        )
    })?;

    let custom: Vec<NaiveDate> = args.start.into_iter().chain(args.end).collect();
    let selector = if custom.is_empty() {
        args.window.unwrap_or(config.default_window)
    } else {
        WindowSelector::Custom
    };
    let resolution = dataset.resolve_window(
        selector,
        (selector == WindowSelector::Custom).then_some(custom.as_slice()),
    );
    if let Some(warning) = &resolution.warning {
        warn!("{warning}");
    }
    let window = resolution.window;
    info!(%selector, %window, days = window.days(), "window resolved");

    match (args.field.as_deref(), args.series.as_deref()) {
        (Some(field), Some(series)) => {
            let drill = SeriesDrilldown::build(&dataset, window, field, series)?;
            println!("{} / {} ({window})", field, drill.series);
            println!("total access: {}", drill.total_access);
            match drill.average_rank {
                Some(rank) => println!("average rank: {rank:.1}"),
                None => println!("average rank: -"),
            }
            println!("days in ranking: {} / {}", drill.days_in_ranking, drill.days_in_window);
            section("files", &drill.files);
        }
        (Some(field), None) => {
            let report = FieldReport::build(&dataset, window, field, top_n)?;
            println!("{} ({window})", report.field);
            println!("total access: {}", report.total_access);
            println!("average daily access: {:.1}", report.average_daily_access);
            println!("organizations: {}", report.organizations);
            println!("ranked: {}  unranked: {}", report.ranked, report.unranked);
            section("monthly", &report.monthly_totals);
            section(&format!("top {top_n} files"), &report.top_files);
            section("organizations", &report.organization_ranking);
            section("file types", &report.file_types);
            section("unranked by organization", &report.unranked_by_organization);
            println!("series: {}", report.series_choices.join(", "));
        }
        (None, _) => {
            let report = OverviewReport::build(&dataset, window)?;
            println!("e-Stat ({window})");
            println!("total access: {}", report.total_access);
            println!("ranked: {}  unranked: {}", report.ranked, report.unranked);
            section("monthly", &report.monthly_totals);
            section("by field", &report.by_field);
            section("by organization", &report.by_organization);
            print_groups("never ranked", &report.unranked_by_field);
        }
    }

    Ok(())
}

fn section(title: &str, df: &DataFrame) {
    println!("\n== {title} ==");
    println!("{df}");
}

fn print_groups(title: &str, groups: &[CatalogGroup]) {
    println!("\n== {title} ==");
    for group in groups {
        println!("{} ({})", group.key, group.rows.height());
    }
}
