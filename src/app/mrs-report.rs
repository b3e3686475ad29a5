use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use mrstats::config::ReportOptions;
use mrstats::report;
use mrstats::utils::init_tracing;

/// Build the leaderboard report: join finalized aggregates with the title
/// table, filter by review count, rank, and export a BOM-prefixed CSV.
/// Thresholds come from the environment: MRS_MIN_REVIEWS, MRS_TOP_N,
/// MRS_COUNT_ORDER.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Finalized-aggregate stream from the reduce phase
    #[arg(short, long)]
    aggregates: PathBuf,

    /// Title lookup file (movie_id,year,title; latin-1)
    #[arg(short, long)]
    titles: PathBuf,

    /// Report CSV to write
    #[arg(short, long)]
    output: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let opts = ReportOptions::from_env();
    let boards = report::generate(&args.aggregates, &args.titles, &args.output, &opts)?;

    println!("Saved: {}", args.output.display());
    for board in &boards {
        for row in &board.rows {
            println!(
                "{}\t{}\t{:.2}\t{:.2}\t{:.2}",
                board.category,
                row.title,
                row.avg_rating,
                row.positive_percentage,
                row.negative_percentage
            );
        }
    }
    Ok(())
}
