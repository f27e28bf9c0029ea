//! JSON lines I/O for the CLI
//!
//! - Input: one JSON object per line, blank lines skipped
//! - Output: one JSON value per line
//! - UTF-8 only

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read every record of a JSON lines file, with its 1-based line number
pub fn read_records(path: &Path) -> CliResult<Vec<(usize, Value)>> {
    let read_error = |source| CliError::Read {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(read_error)?;

    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(read_error)?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line)
            .map_err(|e| CliError::input(idx + 1, format!("invalid JSON: {}", e)))?;
        if !value.is_object() {
            return Err(CliError::input(idx + 1, "expected a JSON object"));
        }
        records.push((idx + 1, value));
    }
    Ok(records)
}

/// Write one value as a single line
pub fn write_line<W: Write, T: Serialize>(out: &mut W, value: &T) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
