//! Record domain model.
//!
//! # Responsibility
//! - Define the canonical record (optional id + numeric and string maps).
//! - Provide the flattened external view and write-path validation.
//!
//! # Invariants
//! - `id` is assigned by storage and is positive once assigned.
//! - Field names are non-empty; numeric values are finite.
//! - On key collision the string value wins in [`Record::flatten`].

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned record identifier.
pub type RecordId = i64;

/// Flattened external representation of one record.
pub type FlatRecord = Map<String, Value>;

/// Field name reserved for the record identifier.
pub const ID_FIELD: &str = "id";

/// Canonical product record.
///
/// Both maps are ordered so flattened output and persisted JSON are stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// `None` for ephemeral records that were never persisted.
    pub id: Option<RecordId>,
    pub numeric_fields: BTreeMap<String, f64>,
    pub string_fields: BTreeMap<String, String>,
}

/// Validation failures for record write paths.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValidationError {
    NonPositiveId(RecordId),
    EmptyFieldName,
    NonFiniteNumber { field: String, value: f64 },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveId(id) => write!(f, "record id must be positive, got {id}"),
            Self::EmptyFieldName => write!(f, "record field names cannot be empty"),
            Self::NonFiniteNumber { field, value } => {
                write!(f, "numeric field `{field}` must be finite, got {value}")
            }
        }
    }
}

impl Error for RecordValidationError {}

impl Record {
    /// Creates an empty ephemeral record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty record with a caller-provided identifier.
    pub fn with_id(id: RecordId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Builder-style numeric field insert.
    pub fn numeric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.numeric_fields.insert(name.into(), value);
        self
    }

    /// Builder-style string field insert.
    pub fn string(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.string_fields.insert(name.into(), value.into());
        self
    }

    /// Checks invariants required before persistence.
    ///
    /// # Errors
    /// - `NonPositiveId` when an assigned id is zero or negative.
    /// - `EmptyFieldName` when any map has a blank key.
    /// - `NonFiniteNumber` for NaN or infinite numeric values.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if let Some(id) = self.id {
            if id <= 0 {
                return Err(RecordValidationError::NonPositiveId(id));
            }
        }

        let names = self.numeric_fields.keys().chain(self.string_fields.keys());
        for name in names {
            if name.trim().is_empty() {
                return Err(RecordValidationError::EmptyFieldName);
            }
        }

        for (field, value) in &self.numeric_fields {
            if !value.is_finite() {
                return Err(RecordValidationError::NonFiniteNumber {
                    field: field.clone(),
                    value: *value,
                });
            }
        }

        Ok(())
    }

    /// Merges id, numeric and string fields into one external map.
    ///
    /// String values are inserted last so they override numeric values on
    /// key collision. Non-finite numbers flatten to `null`.
    pub fn flatten(&self) -> FlatRecord {
        let mut flat = Map::new();
        if let Some(id) = self.id {
            flat.insert(ID_FIELD.to_string(), Value::from(id));
        }
        for (name, value) in &self.numeric_fields {
            let number = Number::from_f64(*value).map_or(Value::Null, Value::Number);
            flat.insert(name.clone(), number);
        }
        for (name, value) in &self.string_fields {
            flat.insert(name.clone(), Value::String(value.clone()));
        }
        flat
    }
}

/// Ordered record collection handed to and produced by the engine.
///
/// Order is insertion/storage order unless produced by a sort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    items: Vec<Record>,
}

impl RecordSet {
    pub fn new(items: Vec<Record>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Record] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Record> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Identifiers in collection order; ephemeral records are skipped.
    pub fn ids(&self) -> Vec<RecordId> {
        self.items.iter().filter_map(|record| record.id).collect()
    }

    /// Flattens every record, preserving collection order.
    pub fn flatten(&self) -> Vec<FlatRecord> {
        self.items.iter().map(Record::flatten).collect()
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(items: Vec<Record>) -> Self {
        Self::new(items)
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, RecordValidationError};
    use serde_json::json;

    #[test]
    fn flatten_includes_id_and_both_buckets() {
        let record = Record::with_id(1)
            .numeric("price", 10.99)
            .string("name", "Test Product");

        let flat = record.flatten();
        assert_eq!(flat.get("id"), Some(&json!(1)));
        assert_eq!(flat.get("price"), Some(&json!(10.99)));
        assert_eq!(flat.get("name"), Some(&json!("Test Product")));
    }

    #[test]
    fn flatten_without_id_omits_id_key() {
        let flat = Record::new().numeric("price", 1.0).flatten();
        assert!(!flat.contains_key("id"));
    }

    #[test]
    fn string_value_overrides_numeric_on_collision() {
        let flat = Record::new().numeric("x", 1.0).string("x", "a").flatten();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat.get("x"), Some(&json!("a")));
    }

    #[test]
    fn validate_rejects_non_finite_and_blank_names() {
        let nan = Record::new().numeric("price", f64::NAN);
        assert!(matches!(
            nan.validate(),
            Err(RecordValidationError::NonFiniteNumber { .. })
        ));

        let blank = Record::new().string("  ", "value");
        assert_eq!(blank.validate(), Err(RecordValidationError::EmptyFieldName));

        let zero_id = Record::with_id(0);
        assert_eq!(zero_id.validate(), Err(RecordValidationError::NonPositiveId(0)));
    }
}
