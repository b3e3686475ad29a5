use std::io::{self, BufWriter, Write};

use anyhow::Result;
use clap::Parser;
use mrstats::merge::merge_stream;
use mrstats::utils::init_tracing;
use tracing::info;

/// Reduce phase: merge grouped partial-aggregate lines from stdin into one
/// finalized comma-delimited line per movie on stdout. Input must be grouped
/// by key (the upstream sort over padded keys guarantees this).
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut out = BufWriter::new(io::stdout().lock());
    let (emitted, skipped) = merge_stream(io::stdin().lock(), &mut out)?;
    out.flush()?;

    info!(emitted, skipped, "reduce phase done");
    Ok(())
}
