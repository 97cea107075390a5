//! Core domain logic for the product catalog.
//! Records are split into numeric and string buckets, persisted through an
//! injected repository, and queried with an in-memory filter/sort/aggregate
//! engine.

pub mod db;
pub mod engine;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use engine::aggregate::{aggregate_records, AggregateOperation, AggregateResult, AggregateValue};
pub use engine::coerce::{coerce_numeric, coerce_value, infer_value, RESERVED_NUMERIC_FIELDS};
pub use engine::filter::{filter_records, FilterOperator};
pub use engine::query::{run_transform, TransformOutput, TransformRequest};
pub use engine::resolve::{resolve_field, ResolvedField};
pub use engine::sort::sort_records;
pub use engine::{ExpectedType, TransformError, TransformResult};
pub use ingest::{normalize_batch, normalize_item, IngestRejection, IngestReport, RawItem};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::record::{FlatRecord, Record, RecordId, RecordSet, RecordValidationError};
pub use model::value::TypedValue;
pub use repo::record_repo::{RecordRepository, RepoError, RepoResult, SqliteRecordRepository};
pub use service::catalog_service::{CatalogService, IngestOutcome, ServiceError, ServiceResult};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
