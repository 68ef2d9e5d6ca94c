use anyhow::{Context, Result};
use clap::Parser;

use std::path::PathBuf;

use sales_analysis::{
    insights::{DEFAULT_LOW_SALES_THRESHOLD, DEFAULT_MARGIN_PERCENT},
    Report, SalesTable,
};

/// Analyse sales data and report revenue by category, product and day.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path to sales data CSV file
    #[arg(long, default_value = "data/sales_data.csv")]
    data: PathBuf,
    /// Show detailed daily breakdown
    #[arg(long)]
    verbose: bool,
    /// Add an insights section: most expensive product, estimated profit, low sales
    #[arg(long)]
    insights: bool,
    /// Profit margin, in percent, for the estimated profit
    #[arg(long, default_value_t = DEFAULT_MARGIN_PERCENT, value_parser = clap::value_parser!(u32).range(0..=100))]
    margin: u32,
    /// Transactions with fewer units than this count as low sales
    #[arg(long, default_value_t = DEFAULT_LOW_SALES_THRESHOLD)]
    low_sales: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let table = SalesTable::load(&args.data)?;
    let mut report = Report::new(&table, args.verbose)
        .with_context(|| format!("analysing {}", args.data.display()))?;
    if args.insights {
        report = report.with_insights(&table, args.margin, args.low_sales)?;
    }
    print!("{report}");
    Ok(())
}
