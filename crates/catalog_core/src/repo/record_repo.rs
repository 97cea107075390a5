//! Record repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the storage collaborator the engine reads snapshots from.
//! - Keep SQL and JSON column encoding inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Record::validate()` before SQL mutations.
//! - Batch inserts are atomic: either every record is stored or none.
//! - Reads reject corrupt JSON columns instead of masking them.

use crate::db::DbError;
use crate::model::record::{Record, RecordId, RecordSet, RecordValidationError};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    numeric_fields,
    string_fields
FROM records";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record persistence and reads.
#[derive(Debug)]
pub enum RepoError {
    Validation(RecordValidationError),
    Db(DbError),
    NotFound(RecordId),
    /// Update requested for a record that was never persisted.
    MissingId,
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::MissingId => write!(f, "record has no id; persist it before updating"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::MissingId | Self::InvalidData(_) => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage collaborator consumed by the catalog service.
pub trait RecordRepository {
    /// Returns every stored record in id order.
    fn load_all(&self) -> RepoResult<RecordSet>;
    /// Stores a batch and returns it with assigned ids.
    fn persist(&self, records: &[Record]) -> RepoResult<Vec<Record>>;
    fn get_record(&self, id: RecordId) -> RepoResult<Option<Record>>;
    fn update_record(&self, record: &Record) -> RepoResult<()>;
    fn delete_record(&self, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed record repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn load_all(&self) -> RepoResult<RecordSet> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        Ok(RecordSet::new(records))
    }

    fn persist(&self, records: &[Record]) -> RepoResult<Vec<Record>> {
        for record in records {
            record.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut stored = Vec::with_capacity(records.len());
        {
            let mut insert = tx.prepare(
                "INSERT INTO records (id, numeric_fields, string_fields)
                 VALUES (?1, ?2, ?3);",
            )?;
            for record in records {
                let (numeric, strings) = encode_fields(record)?;
                if let Err(err) = insert.execute(params![record.id, numeric, strings]) {
                    error!(
                        "event=record_persist module=repo status=error batch={} error={}",
                        records.len(),
                        err
                    );
                    return Err(err.into());
                }
                let mut persisted = record.clone();
                persisted.id = Some(tx.last_insert_rowid());
                stored.push(persisted);
            }
        }
        tx.commit()?;

        info!(
            "event=record_persist module=repo status=ok batch={}",
            stored.len()
        );
        Ok(stored)
    }

    fn get_record(&self, id: RecordId) -> RepoResult<Option<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt
            .query_row([id], |row| {
                Ok((
                    row.get::<_, RecordId>("id")?,
                    row.get::<_, String>("numeric_fields")?,
                    row.get::<_, String>("string_fields")?,
                ))
            })
            .optional()?;

        row.map(|(id, numeric, strings)| decode_record(id, &numeric, &strings))
            .transpose()
    }

    fn update_record(&self, record: &Record) -> RepoResult<()> {
        let id = record.id.ok_or(RepoError::MissingId)?;
        record.validate()?;
        let (numeric, strings) = encode_fields(record)?;

        let changed = self.conn.execute(
            "UPDATE records
             SET
                numeric_fields = ?1,
                string_fields = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?3;",
            params![numeric, strings, id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_record(&self, id: RecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM records WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<Record> {
    let id: RecordId = row.get("id")?;
    let numeric: String = row.get("numeric_fields")?;
    let strings: String = row.get("string_fields")?;
    decode_record(id, &numeric, &strings)
}

fn decode_record(id: RecordId, numeric: &str, strings: &str) -> RepoResult<Record> {
    let numeric_fields: BTreeMap<String, f64> = serde_json::from_str(numeric).map_err(|err| {
        RepoError::InvalidData(format!(
            "records.numeric_fields for id {id} is not a number map: {err}"
        ))
    })?;
    let string_fields: BTreeMap<String, String> =
        serde_json::from_str(strings).map_err(|err| {
            RepoError::InvalidData(format!(
                "records.string_fields for id {id} is not a string map: {err}"
            ))
        })?;

    let record = Record {
        id: Some(id),
        numeric_fields,
        string_fields,
    };
    record.validate()?;
    Ok(record)
}

fn encode_fields(record: &Record) -> RepoResult<(String, String)> {
    let numeric = serde_json::to_string(&record.numeric_fields)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode numeric fields: {err}")))?;
    let strings = serde_json::to_string(&record.string_fields)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode string fields: {err}")))?;
    Ok((numeric, strings))
}
