//! Ingest boundary: raw JSON items to typed records.
//!
//! # Responsibility
//! - Validate mandatory fields on untrusted input.
//! - Split raw fields into numeric and string buckets.
//!
//! # Invariants
//! - One bad item never aborts the rest of a batch.
//! - Normalized records carry an id only when the raw item supplied one.

mod normalize;

pub use normalize::{
    normalize_batch, normalize_item, IngestRejection, IngestReport, RawItem, REQUIRED_NAME_FIELD,
};
