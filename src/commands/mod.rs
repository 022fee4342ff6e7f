use crate::commands::image::{ExtractArgs, MergeCommand, SplitCommand};
use clap::{Parser, Subcommand};

pub mod image;

/// CLI for splitting and merging BIN/CUE disc images.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print sector and byte ranges of every track
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Split(SplitCommand),
    Merge(MergeCommand),
}

impl Commands {
    pub fn extract_args(&self) -> &ExtractArgs {
        match self {
            Commands::Split(cmd) => &cmd.extract,
            Commands::Merge(cmd) => &cmd.extract,
        }
    }
}
