//! Storage collaborator contracts and SQLite implementation.
//!
//! # Responsibility
//! - Define the snapshot/persist contract the service depends on.
//! - Isolate SQLite details from service and engine code.
//!
//! # Invariants
//! - Repository writes enforce `Record::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod record_repo;
