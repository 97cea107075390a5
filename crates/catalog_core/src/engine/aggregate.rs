//! Numeric reductions over one field.
//!
//! # Invariants
//! - Only numeric-bucket values contribute; identifiers and strings are
//!   skipped silently.
//! - `count` of no contributors is `0`; every other operation is `null`.
//! - Unknown operations yield `null`.

use super::resolve::{resolve_field, ResolvedField};
use crate::model::record::RecordSet;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Aggregate reduction kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AggregateOperation {
    #[default]
    Sum,
    Avg,
    Min,
    Max,
    Count,
    /// Unrecognized operation name; always yields `null`.
    Unsupported(String),
}

impl AggregateOperation {
    /// Parses an operation name. Unknown names are kept, not rejected.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "sum" => Self::Sum,
            "avg" => Self::Avg,
            "min" => Self::Min,
            "max" => Self::Max,
            "count" => Self::Count,
            _ => Self::Unsupported(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Min => "min",
            Self::Max => "max",
            Self::Count => "count",
            Self::Unsupported(name) => name.as_str(),
        }
    }
}

impl From<String> for AggregateOperation {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<AggregateOperation> for String {
    fn from(value: AggregateOperation) -> Self {
        value.as_str().to_string()
    }
}

impl Display for AggregateOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar produced by an aggregate. `Count` stays integral in output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AggregateValue {
    Count(u64),
    Number(f64),
}

impl AggregateValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Count(count) => *count as f64,
            Self::Number(number) => *number,
        }
    }
}

/// Aggregate envelope; `result` is `None` when the reduction is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub result: Option<AggregateValue>,
}

/// Reduces the numeric values of `field` across `records`.
pub fn aggregate_records(
    records: &RecordSet,
    field: &str,
    operation: &AggregateOperation,
) -> AggregateResult {
    let values: Vec<f64> = records
        .items()
        .iter()
        .filter_map(|record| match resolve_field(record, field) {
            ResolvedField::Numeric(number) => Some(number),
            _ => None,
        })
        .collect();

    let result = match operation {
        AggregateOperation::Count => Some(AggregateValue::Count(values.len() as u64)),
        _ if values.is_empty() => None,
        AggregateOperation::Sum => Some(AggregateValue::Number(values.iter().sum())),
        AggregateOperation::Avg => {
            let sum: f64 = values.iter().sum();
            Some(AggregateValue::Number(sum / values.len() as f64))
        }
        AggregateOperation::Min => values
            .iter()
            .copied()
            .reduce(f64::min)
            .map(AggregateValue::Number),
        AggregateOperation::Max => values
            .iter()
            .copied()
            .reduce(f64::max)
            .map(AggregateValue::Number),
        AggregateOperation::Unsupported(_) => None,
    };

    debug!(
        "event=aggregate module=engine status=ok field={} operation={} contributors={} defined={}",
        field,
        operation,
        values.len(),
        result.is_some()
    );
    AggregateResult { result }
}

#[cfg(test)]
mod tests {
    use super::{aggregate_records, AggregateOperation, AggregateValue};
    use crate::model::record::{Record, RecordSet};

    fn products() -> RecordSet {
        RecordSet::new(vec![
            Record::with_id(1).numeric("price", 10.99).string("name", "A"),
            Record::with_id(2).numeric("price", 5.99).string("name", "B"),
            Record::with_id(3).numeric("price", 15.99).string("name", "C"),
            Record::with_id(4).string("name", "D"),
        ])
    }

    fn number(set: &RecordSet, field: &str, operation: &str) -> Option<f64> {
        aggregate_records(set, field, &AggregateOperation::parse(operation))
            .result
            .map(|value| value.as_f64())
    }

    #[test]
    fn sum_avg_min_max_over_contributors() {
        let set = products();
        assert!((number(&set, "price", "sum").unwrap() - 32.97).abs() < 1e-9);
        assert!((number(&set, "price", "avg").unwrap() - 10.99).abs() < 1e-9);
        assert_eq!(number(&set, "price", "min"), Some(5.99));
        assert_eq!(number(&set, "price", "max"), Some(15.99));
    }

    #[test]
    fn count_skips_records_without_numeric_value() {
        let result = aggregate_records(&products(), "price", &AggregateOperation::Count);
        assert_eq!(result.result, Some(AggregateValue::Count(3)));
    }

    #[test]
    fn string_field_is_null_except_count_zero() {
        let set = products();
        assert_eq!(number(&set, "name", "sum"), None);
        assert_eq!(number(&set, "name", "avg"), None);
        assert_eq!(
            aggregate_records(&set, "name", &AggregateOperation::Count).result,
            Some(AggregateValue::Count(0))
        );
    }

    #[test]
    fn identifier_does_not_contribute() {
        assert_eq!(number(&products(), "id", "max"), None);
    }

    #[test]
    fn deserializing_unknown_operation_keeps_the_name() {
        let parsed: AggregateOperation =
            serde_json::from_str(r#""median""#).expect("any string should deserialize");
        assert_eq!(parsed, AggregateOperation::Unsupported("median".to_string()));

        let known: AggregateOperation = serde_json::from_str(r#""AVG""#).expect("known name");
        assert_eq!(known, AggregateOperation::Avg);
    }

    #[test]
    fn unsupported_operation_is_null() {
        assert_eq!(number(&products(), "price", "median"), None);
    }

    #[test]
    fn empty_collection_is_null() {
        assert_eq!(number(&RecordSet::default(), "price", "sum"), None);
    }

    #[test]
    fn count_serializes_as_integer() {
        let result = aggregate_records(&products(), "price", &AggregateOperation::Count);
        assert_eq!(serde_json::to_string(&result).unwrap(), r#"{"result":3}"#);
    }
}
