//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate ingest, storage and engine calls into use-case APIs.
//! - Keep CLI/transport layers decoupled from storage details.

pub mod catalog_service;
