//! In-memory transformation engine over record collections.
//!
//! # Responsibility
//! - Resolve field names against sparse records.
//! - Coerce loosely-typed parameters into typed values.
//! - Filter, sort and aggregate snapshot collections.
//!
//! # Invariants
//! - Every operation is a pure function of its inputs; no shared state.
//! - Unknown filter operators and aggregate operations degrade to an empty
//!   collection or `null` instead of an error.
//! - Input collections and records are never mutated.

use crate::model::record::RecordValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod aggregate;
pub mod coerce;
pub mod filter;
pub mod query;
pub mod resolve;
pub mod sort;

pub type TransformResult<T> = Result<T, TransformError>;

/// Type a raw value was required to convert into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    Integer,
    Number,
    Boolean,
}

impl Display for ExpectedType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => write!(f, "an integer"),
            Self::Number => write!(f, "a number"),
            Self::Boolean => write!(f, "a boolean"),
        }
    }
}

/// Caller-visible failures of ingest, coercion and query operations.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Raw ingest item lacks a mandatory field.
    MissingRequiredField { field: String },
    /// Value cannot be converted to the type its target field requires.
    InvalidValue {
        field: String,
        value: String,
        expected: ExpectedType,
    },
    /// Operation kind outside `filter|sort|aggregate`.
    UnsupportedOperation(String),
    /// Query boundary parameter that has no default was not supplied.
    MissingParameter(&'static str),
    /// Normalized ingest item breaks a record invariant.
    InvalidRecord(RecordValidationError),
}

impl TransformError {
    pub(crate) fn invalid_value(
        field: &str,
        value: impl ToString,
        expected: ExpectedType,
    ) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            expected,
        }
    }
}

impl Display for TransformError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequiredField { field } => write!(f, "{field} is required"),
            Self::InvalidValue {
                field,
                value,
                expected,
            } => write!(f, "{field} must be {expected}, got `{value}`"),
            Self::UnsupportedOperation(kind) => write!(
                f,
                "unsupported transformation type `{kind}`; expected filter|sort|aggregate"
            ),
            Self::MissingParameter(name) => write!(f, "missing required parameter `{name}`"),
            Self::InvalidRecord(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TransformError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRecord(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for TransformError {
    fn from(value: RecordValidationError) -> Self {
        Self::InvalidRecord(value)
    }
}
