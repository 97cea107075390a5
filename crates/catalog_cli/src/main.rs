//! Catalog command-line entry point.
//!
//! # Responsibility
//! - Wire configuration (args + env) into core logging and storage.
//! - Print JSON results on stdout and errors on stderr.

mod args;

use args::{Cli, Command};
use catalog_core::db::open_db;
use catalog_core::{
    default_log_level, init_logging, CatalogService, SqliteRecordRepository,
    TransformRequest,
};
use clap::Parser;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, String> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
        init_logging(level, log_dir)?;
    }

    // Ping must work without touching storage.
    let output = if let Command::Ping = cli.command {
        ping_output()
    } else {
        let conn = open_db(&cli.db_path).map_err(|err| err.to_string())?;
        let service = CatalogService::new(SqliteRecordRepository::new(&conn));
        execute(&service, cli.command)?
    };

    serde_json::to_string_pretty(&output).map_err(|err| err.to_string())
}

fn ping_output() -> Value {
    json!({ "ping": catalog_core::ping(), "version": catalog_core::core_version() })
}

fn execute(
    service: &CatalogService<SqliteRecordRepository<'_>>,
    command: Command,
) -> Result<Value, String> {
    let output = match command {
        Command::Ping => ping_output(),
        Command::Ingest { file } => {
            let text = std::fs::read_to_string(&file)
                .map_err(|err| format!("cannot read `{}`: {err}", file.display()))?;
            let items = parse_items(&text)?;
            let outcome = service.ingest(&items).map_err(|err| err.to_string())?;
            let rejected: Vec<Value> = outcome
                .rejected
                .iter()
                .map(|rejection| {
                    json!({ "index": rejection.index, "error": rejection.error.to_string() })
                })
                .collect();
            json!({ "created": outcome.created, "rejected": rejected })
        }
        Command::List => json!({ "data": service.list_all().map_err(|err| err.to_string())? }),
        Command::Filter {
            field,
            value,
            operator,
        } => transform(
            service,
            "filter",
            &[("field", field), ("value", value), ("operator", operator)],
        )?,
        Command::Sort { field, descending } => transform(
            service,
            "sort",
            &[("field", field), ("ascending", (!descending).to_string())],
        )?,
        Command::Aggregate { field, operation } => transform(
            service,
            "aggregate",
            &[("field", field), ("operation", operation)],
        )?,
        Command::Delete { id } => {
            service.delete(id).map_err(|err| err.to_string())?;
            json!({ "deleted": id })
        }
    };
    Ok(output)
}

fn transform(
    service: &CatalogService<SqliteRecordRepository<'_>>,
    kind: &str,
    pairs: &[(&str, String)],
) -> Result<Value, String> {
    let params: BTreeMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    let request = TransformRequest::from_params(kind, &params).map_err(|err| err.to_string())?;
    let output = service.transform(&request).map_err(|err| err.to_string())?;
    Ok(output.to_json())
}

/// Accepts either a JSON array or a single object.
///
/// Array elements are passed through as-is; non-object elements come back
/// from ingest as rejected items.
fn parse_items(text: &str) -> Result<Vec<Value>, String> {
    let value: Value = serde_json::from_str(text).map_err(|err| format!("invalid JSON: {err}"))?;
    match value {
        Value::Object(_) => Ok(vec![value]),
        Value::Array(values) => Ok(values),
        _ => Err("expected a JSON object or array of objects".to_string()),
    }
}
