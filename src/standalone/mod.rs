use clap::{Parser, Subcommand};

pub mod engine;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a job in a single process
    Submit {
        /// Glob spec for the input shard files
        #[arg(short, long)]
        input: String,

        // Name of the workload
        #[arg(short, long)]
        workload: String,

        /// Output directory
        #[arg(short, long)]
        output: String,

        /// Number of reduce buckets. One bucket yields a single
        /// globally-ordered output file.
        #[arg(short, long, default_value_t = 1)]
        n_reduce: u32,

        /// Auxiliary arguments to pass to the MapReduce application.
        #[clap(value_parser, last = true)]
        args: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Job {
    pub input: String,
    pub workload: String,
    pub output: String,
    pub n_reduce: u32,
    pub args: Vec<String>,
}
