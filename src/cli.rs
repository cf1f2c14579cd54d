use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Generate the daily plant KPI report from production workbooks
#[derive(Debug, Parser)]
#[command(name = "plant-kpi", version, about)]
pub struct Cli {
    /// Workbook files or directories; append `=YYYY-MM-DD` to set a per-file date
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<String>,

    /// Default report date (defaults to today)
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Output directory (overrides the configured one)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Persist the effective output directory to the config file
    #[arg(long)]
    pub save_config: bool,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}
