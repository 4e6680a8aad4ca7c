use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "architect-ledger")]
pub struct Opt {
    #[arg(
        long = "config",
        global = true,
        help = "TOML file with cut_off_age and log_level"
    )]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        name = "simulate",
        about = "Grow a local chain with payments, forks and pruning"
    )]
    Simulate {
        #[arg(long, default_value_t = 20, help = "Number of blocks to mine")]
        blocks: usize,
        #[arg(
            long = "fork-every",
            default_value_t = 0,
            help = "Add a competing sibling every N blocks (0 disables forks)"
        )]
        fork_every: usize,
        #[arg(long = "cut-off-age", help = "Override the configured cutoff age")]
        cut_off_age: Option<usize>,
        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },
    #[command(name = "config", about = "Print the effective settings")]
    Config,
}
