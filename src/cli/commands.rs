//! CLI definition using clap.
//!
//! Polytally takes no subcommands: it runs one batch and exits. Flags
//! override the matching configuration values.

use clap::Parser;
use std::path::PathBuf;

/// Polytally - run the polynomial-search simulation and tally its outcomes
#[derive(Parser, Debug)]
#[command(name = "polytally")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of runs; prompts on stdin when omitted
    #[arg(short = 'n', long)]
    pub runs: Option<u64>,

    /// Replay recorded results from this file instead of running the simulator
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Print the run report as JSON instead of the three tallies
    #[arg(long)]
    pub json: bool,

    /// Exit without waiting for a key press
    #[arg(long)]
    pub no_pause: bool,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}
