use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Content-addressed file index: find, clean and verify duplicate files.
#[derive(Clone, Parser)]
#[command(name = "boxfile")]
#[command(about = "Index files by content; clean duplicates; verify integrity.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug logs and progress bars).
    #[arg(long, short = 'v', global = true, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Override worker thread count.
    #[arg(long, short = 'w', global = true)]
    pub workers: Option<usize>,

    /// Walk directories in parallel.
    #[arg(long, global = true, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub parallel_walk: Option<bool>,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Initialize a repository in the current directory.
    Init,
    /// Index (or re-index) every file under the repository root.
    Index {
        #[command(flatten)]
        filters: FilterArgs,
        /// Only files created on or after this date (YYYY-MM-DD, local time).
        #[arg(long, value_name = "DATE")]
        after: Option<String>,
    },
    /// Show repository statistics.
    Stats,
    /// Remove duplicates, keeping the first recorded copy of each content.
    Clean {
        /// Replace duplicates with symbolic links instead of deleting them.
        #[arg(long, short = 'l')]
        link: bool,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Report indexed paths that no longer exist.
    Check {
        /// Remove missing paths (and empty entries) from the index.
        #[arg(long, short = 'p')]
        prune: bool,
    },
    /// Delete the repository's index directory.
    Reset {
        /// Skip confirmation.
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Check whether an external file's content is already indexed.
    Locate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Rehash indexed files and report corruption or missing files.
    Verify,
    /// Compare this index with another repository (directory) or index file.
    Diff {
        #[arg(value_name = "TARGET")]
        target: PathBuf,
    },
}

#[derive(Clone, Debug, Default, Args)]
pub struct FilterArgs {
    /// Extension allow-list, e.g. `--ext jpg png`.
    #[arg(long = "ext", num_args = 1..)]
    pub extensions: Vec<String>,

    /// Minimum file size in bytes.
    #[arg(long)]
    pub min_size: Option<u64>,
}
