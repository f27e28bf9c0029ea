//! CLI module for indexkv
//!
//! Provides command-line interface for:
//! - query: index a JSON lines file in memory and run one lookup

mod args;
mod commands;
mod errors;
mod io;

use std::io::Write as _;
use std::sync::Arc;

pub use args::{Cli, Command};
pub use commands::{query, run_command, QueryRequest};
pub use errors::{CliError, CliResult};
pub use io::{read_records, write_line};

use crate::observability::{self, JsonLogger};

/// Parse process arguments and run the command.
///
/// Results go to stdout, log events to stderr.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let logger = Arc::new(JsonLogger::stderr());
    observability::install(logger.clone());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = run_command(cli.command, &mut out, logger);
    out.flush()?;
    result
}
