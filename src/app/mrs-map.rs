use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;
use glob::glob;
use mrstats::aggregate::LocalAggregator;
use mrstats::utils::init_tracing;
use tracing::info;

/// Map phase: fold raw rating lines into one partial-aggregate line per
/// movie. Reads stdin (the streaming-framework contract) or a glob of shard
/// files, writes tab-delimited partials on stdout.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Glob spec for raw input shards; reads stdin when omitted
    #[arg(short, long)]
    input: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut agg = LocalAggregator::new();
    match &args.input {
        Some(pattern) => {
            for path in glob(pattern)?.flatten() {
                let file = File::open(&path)
                    .with_context(|| format!("cannot open shard {}", path.display()))?;
                agg.fold_stream(BufReader::new(file))?;
            }
        }
        None => agg.fold_stream(io::stdin().lock())?,
    }

    let mut out = BufWriter::new(io::stdout().lock());
    agg.write_partials(&mut out)?;
    out.flush()?;

    info!(
        lines = agg.lines_seen(),
        skipped = agg.lines_skipped(),
        keys = agg.distinct_keys(),
        "map phase done"
    );
    Ok(())
}
