//! CLI command implementations
//!
//! `query` builds a throwaway in-memory collection from a JSON lines file:
//!
//! 1. Load config (defaults when `--config` is absent)
//! 2. Register one field index per `--index NAME=FIELD`
//! 3. Put every record under the value of its `--key` field
//! 4. Run the `--where` lookup and print matches as JSON lines

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::collection::{Collection, CollectionConfig};
use crate::encoding::IndexKey;
use crate::index::IndexDefinition;
use crate::observability::LogSink;
use crate::store::MemoryStore;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_records, write_line};

/// Collection name used for CLI input
const COLLECTION_NAME: &str = "records";

/// Run a parsed command, writing results to `out` and events to `sink`
pub fn run_command<W: Write>(
    command: Command,
    out: &mut W,
    sink: Arc<dyn LogSink>,
) -> CliResult<()> {
    match command {
        Command::Query {
            data,
            key,
            indexes,
            condition,
            config,
            stats,
        } => {
            let config = match config {
                Some(path) => CollectionConfig::load(path)?,
                None => CollectionConfig::default(),
            };
            let request = QueryRequest {
                data: &data,
                key_field: &key,
                indexes: &indexes,
                condition: &condition,
                stats,
            };
            query(&request, config, out, sink)
        }
    }
}

/// Arguments of one `query` invocation
pub struct QueryRequest<'a> {
    pub data: &'a Path,
    pub key_field: &'a str,
    pub indexes: &'a [String],
    pub condition: &'a str,
    pub stats: bool,
}

/// Load, index and query
pub fn query<W: Write>(
    request: &QueryRequest<'_>,
    config: CollectionConfig,
    out: &mut W,
    sink: Arc<dyn LogSink>,
) -> CliResult<()> {
    let definitions = request
        .indexes
        .iter()
        .map(|raw| {
            let (name, field) = split_assignment(raw, "--index", "NAME=FIELD")?;
            Ok((name.to_string(), IndexDefinition::field(field)))
        })
        .collect::<CliResult<Vec<_>>>()?;
    let (index_name, raw_value) = split_assignment(request.condition, "--where", "NAME=VALUE")?;
    let value = parse_value(raw_value);

    let records = read_records(request.data)?;
    let collection: Collection<Value, MemoryStore> = Collection::open_with(
        Arc::new(MemoryStore::new()),
        COLLECTION_NAME,
        definitions,
        config,
        sink,
    )?;

    for (line, record) in &records {
        let key = record
            .get(request.key_field)
            .and_then(IndexKey::from_json)
            .ok_or_else(|| {
                CliError::input(
                    *line,
                    format!("missing scalar key field {:?}", request.key_field),
                )
            })?;
        collection.put(key, record)?;
    }

    for record in collection.query(index_name, value)? {
        write_line(out, &record)?;
    }
    if request.stats {
        write_line(out, &serde_json::json!({ "stats": collection.metrics() }))?;
    }
    out.flush()?;
    Ok(())
}

/// Split `NAME=REST`, requiring both sides to be non-empty
fn split_assignment<'a>(raw: &'a str, flag: &str, shape: &str) -> CliResult<(&'a str, &'a str)> {
    match raw.split_once('=') {
        Some((name, rest)) if !name.is_empty() && !rest.is_empty() => Ok((name, rest)),
        _ => Err(CliError::usage(format!("{} expects {}, got {:?}", flag, shape, raw))),
    }
}

/// JSON scalar if `raw` parses as one, otherwise the raw string
fn parse_value(raw: &str) -> IndexKey {
    serde_json::from_str::<Value>(raw)
        .ok()
        .as_ref()
        .and_then(IndexKey::from_json)
        .unwrap_or_else(|| IndexKey::from(raw))
}
