pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tophits",
    version,
    about = "Extract the top BLAST hits of every query into per-query FASTA files",
    long_about = "tophits groups tabular BLAST results by query, keeps the first N distinct hits \
                  of each query and writes them, together with the query and any putative \
                  identification sequences, to one FASTA file per query plus a report."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads to use (0 = all available, default from config)
    #[arg(short = 'j', long, global = true)]
    pub threads: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write per-query top hit FASTA files and a hit report
    Extract(commands::extract::ExtractArgs),

    /// Rename FASTA headers to their first three words joined by '_'
    Rename(commands::rename::RenameArgs),
}
