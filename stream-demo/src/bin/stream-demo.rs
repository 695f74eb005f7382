//! CLI tool running the example pipelines.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use stream_demo::{grep_lines, partial_sums, random_walk};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Run one of the example lazy-streams pipelines.
#[derive(Parser)]
#[command(name = "stream-demo")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log stage connections and window materialization on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Partial sums of a geometric series
    PartialSums {
        /// Ratio between consecutive terms
        #[arg(long, default_value_t = 0.5)]
        ratio: f64,

        /// How many partial sums to print
        #[arg(long, default_value_t = 10)]
        count: usize,
    },

    /// Random walk on the grid until it returns to the origin
    Walk {
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Give up after this many steps
        #[arg(long, default_value_t = 10_000)]
        max_steps: usize,
    },

    /// Print the lines of a file containing a pattern
    Grep {
        file: PathBuf,
        pattern: String,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default.into())
                .from_env_lossy(),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::PartialSums { ratio, count } => match partial_sums(ratio, count) {
            Ok(sums) => {
                for (n, sum) in sums.iter().enumerate() {
                    println!("{:>4}  {sum}", n + 1);
                }
            }
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                process::exit(1);
            }
        },
        Command::Walk { seed, max_steps } => {
            let report = random_walk(seed, max_steps);
            match report.returned_after {
                Some(steps) => println!("Returned to the origin after {steps} steps"),
                None => println!("No return within {max_steps} steps"),
            }
            let [x, y] = report.farthest;
            println!("Farthest point: ({x}, {y})");
        }
        Command::Grep { file, pattern } => match grep_lines(&file, &pattern) {
            Ok(lines) => {
                for line in lines {
                    println!("{line}");
                }
            }
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
    }
}
