//! Product record model shared by ingest, engine and storage layers.
//!
//! # Responsibility
//! - Define the split numeric/string record shape used everywhere in core.
//! - Define typed scalar values produced by coercion.
//!
//! # Invariants
//! - Records are never mutated by filter/sort/aggregate; operations build
//!   new collections.
//! - String fields override numeric fields with the same key when a record
//!   is flattened.

pub mod record;
pub mod value;
