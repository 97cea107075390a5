use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Ingest product records and filter, sort or aggregate them",
    long_about = "Stores semi-structured product records in SQLite, split into numeric and string fields, and runs in-memory filter/sort/aggregate queries over the stored snapshot."
)]
pub struct Cli {
    #[arg(
        long = "db",
        env = "CATALOG_DB_PATH",
        default_value = "catalog.sqlite3",
        value_name = "FILE",
        help = "SQLite database file"
    )]
    pub db_path: PathBuf,

    #[arg(
        long,
        env = "CATALOG_LOG_LEVEL",
        value_name = "LEVEL",
        help = "Log level (trace|debug|info|warn|error); defaults by build mode"
    )]
    pub log_level: Option<String>,

    #[arg(
        long,
        env = "CATALOG_LOG_DIR",
        value_name = "DIR",
        help = "Absolute directory for rolling log files; logging is off when unset"
    )]
    pub log_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(about = "Ingest a JSON object or array of objects from FILE")]
    Ingest { file: PathBuf },
    #[command(about = "List every stored record")]
    List,
    #[command(about = "Keep records whose field matches a predicate")]
    Filter {
        #[arg(long)]
        field: String,
        #[arg(long)]
        value: String,
        #[arg(long, default_value = "eq", help = "eq|neq|gt|lt|contains")]
        operator: String,
    },
    #[command(about = "Order records by a field, dropping records without it")]
    Sort {
        #[arg(long)]
        field: String,
        #[arg(long, default_value_t = false)]
        descending: bool,
    },
    #[command(about = "Reduce the numeric values of a field")]
    Aggregate {
        #[arg(long)]
        field: String,
        #[arg(long, default_value = "sum", help = "sum|avg|min|max|count")]
        operation: String,
    },
    #[command(about = "Delete one record by id")]
    Delete { id: i64 },
    #[command(about = "Print core linkage and version")]
    Ping,
}
