//! CLI argument definitions using clap
//!
//! Commands:
//! - indexkv query --data <jsonl> --index NAME=FIELD... --where NAME=VALUE

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// indexkv - secondary indexes over an ordered key-value store
#[derive(Parser, Debug)]
#[command(name = "indexkv")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load JSON lines into an in-memory collection and run one index query
    Query {
        /// File with one JSON object per line
        #[arg(long)]
        data: PathBuf,

        /// Record field holding the primary key
        #[arg(long, default_value = "id")]
        key: String,

        /// Index a top-level field, as NAME=FIELD (repeatable)
        #[arg(long = "index", value_name = "NAME=FIELD", required = true)]
        indexes: Vec<String>,

        /// Index value to look up, as NAME=VALUE. VALUE is read as JSON,
        /// falling back to a plain string.
        #[arg(long = "where", value_name = "NAME=VALUE")]
        condition: String,

        /// Collection config file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print collection metrics as a final line
        #[arg(long)]
        stats: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
