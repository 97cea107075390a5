//! Catalog use-case service.
//!
//! # Responsibility
//! - Ingest raw product batches through normalization into storage.
//! - Run filter/sort/aggregate against a storage snapshot.
//!
//! # Invariants
//! - The engine only ever sees a snapshot returned by `load_all`.
//! - A batch with no valid items never touches storage.

use crate::engine::query::{run_transform, TransformOutput, TransformRequest};
use crate::engine::TransformError;
use crate::ingest::{normalize_batch, IngestRejection};
use crate::model::record::{FlatRecord, Record, RecordId, RecordSet};
use crate::repo::record_repo::{RecordRepository, RepoError};
use log::{error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for catalog use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Caller-side parameter or value error.
    Transform(TransformError),
    /// Storage failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transform(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transform(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<TransformError> for ServiceError {
    fn from(value: TransformError) -> Self {
        Self::Transform(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of one ingest call.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    /// Stored records, flattened, with assigned ids.
    pub created: Vec<FlatRecord>,
    /// Items skipped during normalization.
    pub rejected: Vec<IngestRejection>,
}

/// Use-case service over an injected record repository.
pub struct CatalogService<R: RecordRepository> {
    repo: R,
}

impl<R: RecordRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Normalizes and stores a raw batch.
    ///
    /// Invalid items, including non-object elements, are reported in
    /// `rejected` and do not abort the batch.
    pub fn ingest(&self, items: &[Value]) -> ServiceResult<IngestOutcome> {
        let report = normalize_batch(items);
        if report.records.is_empty() {
            warn!(
                "event=ingest module=service status=skip reason=no_valid_items items={}",
                items.len()
            );
            return Ok(IngestOutcome {
                created: Vec::new(),
                rejected: report.rejected,
            });
        }

        let stored = self.repo.persist(&report.records).map_err(|err| {
            error!("event=ingest module=service status=error error={}", err);
            err
        })?;
        info!(
            "event=ingest module=service status=ok created={} rejected={}",
            stored.len(),
            report.rejected.len()
        );

        Ok(IngestOutcome {
            created: stored.iter().map(Record::flatten).collect(),
            rejected: report.rejected,
        })
    }

    /// Returns every stored record, flattened.
    pub fn list_all(&self) -> ServiceResult<Vec<FlatRecord>> {
        Ok(self.repo.load_all()?.flatten())
    }

    /// Loads a snapshot and runs one transformation over it.
    pub fn transform(&self, request: &TransformRequest) -> ServiceResult<TransformOutput> {
        let started_at = Instant::now();
        let snapshot: RecordSet = self.repo.load_all()?;

        match run_transform(&snapshot, request) {
            Ok(output) => {
                info!(
                    "event=transform module=service status=ok kind={} field={} snapshot={} duration_ms={}",
                    request.kind(),
                    request.field(),
                    snapshot.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(output)
            }
            Err(err) => {
                warn!(
                    "event=transform module=service status=error kind={} field={} error={}",
                    request.kind(),
                    request.field(),
                    err
                );
                Err(err.into())
            }
        }
    }

    pub fn get(&self, id: RecordId) -> ServiceResult<Option<Record>> {
        Ok(self.repo.get_record(id)?)
    }

    /// Replaces the stored fields of an existing record.
    pub fn update(&self, record: &Record) -> ServiceResult<()> {
        Ok(self.repo.update_record(record)?)
    }

    pub fn delete(&self, id: RecordId) -> ServiceResult<()> {
        Ok(self.repo.delete_record(id)?)
    }
}
