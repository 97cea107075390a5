//! Transport-independent query boundary.
//!
//! # Responsibility
//! - Turn `(kind, field, raw text parameters)` into a typed request.
//! - Dispatch a request to the filter, sort or aggregate engine.
//!
//! # Invariants
//! - Parameters are coerced exactly once, here, before any engine runs.
//! - Operator/operation defaults: `eq`, `ascending=true`, `sum`.

use super::aggregate::{aggregate_records, AggregateOperation, AggregateResult};
use super::coerce::{coerce_value, parse_flag};
use super::filter::{filter_records, FilterOperator};
use super::sort::sort_records;
use super::{TransformError, TransformResult};
use crate::model::record::RecordSet;
use crate::model::value::TypedValue;
use serde_json::{json, Value};
use std::collections::BTreeMap;

const PARAM_FIELD: &str = "field";
const PARAM_VALUE: &str = "value";
const PARAM_OPERATOR: &str = "operator";
const PARAM_ASCENDING: &str = "ascending";
const PARAM_OPERATION: &str = "operation";

/// Typed transformation request.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformRequest {
    Filter {
        field: String,
        value: TypedValue,
        operator: FilterOperator,
    },
    Sort {
        field: String,
        ascending: bool,
    },
    Aggregate {
        field: String,
        operation: AggregateOperation,
    },
}

impl TransformRequest {
    /// Builds a request from an operation kind and raw text parameters.
    ///
    /// # Errors
    /// - `UnsupportedOperation` when `kind` is not `filter|sort|aggregate`.
    /// - `MissingParameter` when `field` (or `value` for filter) is absent.
    /// - `InvalidValue` when a parameter fails coercion.
    pub fn from_params(kind: &str, params: &BTreeMap<String, String>) -> TransformResult<Self> {
        let kind = kind.trim().to_ascii_lowercase();
        if !matches!(kind.as_str(), "filter" | "sort" | "aggregate") {
            return Err(TransformError::UnsupportedOperation(kind));
        }

        let field = params
            .get(PARAM_FIELD)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .ok_or(TransformError::MissingParameter(PARAM_FIELD))?
            .to_string();

        match kind.as_str() {
            "filter" => {
                let raw = params
                    .get(PARAM_VALUE)
                    .ok_or(TransformError::MissingParameter(PARAM_VALUE))?;
                let value = coerce_value(&field, raw)?;
                let operator = params
                    .get(PARAM_OPERATOR)
                    .map(|name| FilterOperator::parse(name))
                    .unwrap_or_default();
                Ok(Self::Filter {
                    field,
                    value,
                    operator,
                })
            }
            "sort" => {
                let ascending = match params.get(PARAM_ASCENDING) {
                    Some(raw) => parse_flag(PARAM_ASCENDING, raw)?,
                    None => true,
                };
                Ok(Self::Sort { field, ascending })
            }
            _ => {
                let operation = params
                    .get(PARAM_OPERATION)
                    .map(|name| AggregateOperation::parse(name))
                    .unwrap_or_default();
                Ok(Self::Aggregate { field, operation })
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Filter { .. } => "filter",
            Self::Sort { .. } => "sort",
            Self::Aggregate { .. } => "aggregate",
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::Filter { field, .. } | Self::Sort { field, .. } | Self::Aggregate { field, .. } => {
                field.as_str()
            }
        }
    }
}

/// Result of one transformation.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOutput {
    Records(RecordSet),
    Aggregate(AggregateResult),
}

impl TransformOutput {
    /// External JSON envelope: `{"data": [...]}` or `{"result": ...}`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Records(records) => json!({ "data": records.flatten() }),
            Self::Aggregate(result) => json!({ "result": result.result }),
        }
    }
}

/// Runs `request` against a snapshot collection.
pub fn run_transform(
    records: &RecordSet,
    request: &TransformRequest,
) -> TransformResult<TransformOutput> {
    match request {
        TransformRequest::Filter {
            field,
            value,
            operator,
        } => filter_records(records, field, value, operator).map(TransformOutput::Records),
        TransformRequest::Sort { field, ascending } => Ok(TransformOutput::Records(sort_records(
            records, field, *ascending,
        ))),
        TransformRequest::Aggregate { field, operation } => Ok(TransformOutput::Aggregate(
            aggregate_records(records, field, operation),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{run_transform, TransformOutput, TransformRequest};
    use crate::engine::aggregate::AggregateOperation;
    use crate::engine::filter::FilterOperator;
    use crate::engine::TransformError;
    use crate::model::record::{Record, RecordSet};
    use crate::model::value::TypedValue;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn filter_params_are_coerced_and_defaulted() {
        let request =
            TransformRequest::from_params("filter", &params(&[("field", "price"), ("value", "10")]))
                .unwrap();
        assert_eq!(
            request,
            TransformRequest::Filter {
                field: "price".to_string(),
                value: TypedValue::Float(10.0),
                operator: FilterOperator::Eq,
            }
        );
    }

    #[test]
    fn sort_and_aggregate_defaults() {
        let sort = TransformRequest::from_params("sort", &params(&[("field", "name")])).unwrap();
        assert_eq!(
            sort,
            TransformRequest::Sort {
                field: "name".to_string(),
                ascending: true
            }
        );

        let aggregate = TransformRequest::from_params(
            "aggregate",
            &params(&[("field", "price"), ("operation", "median")]),
        )
        .unwrap();
        assert_eq!(
            aggregate,
            TransformRequest::Aggregate {
                field: "price".to_string(),
                operation: AggregateOperation::Unsupported("median".to_string()),
            }
        );
    }

    #[test]
    fn unknown_kind_is_unsupported() {
        let err = TransformRequest::from_params("group", &params(&[("field", "price")]))
            .unwrap_err();
        assert_eq!(err, TransformError::UnsupportedOperation("group".to_string()));
    }

    #[test]
    fn missing_field_and_value_are_reported() {
        let err = TransformRequest::from_params("sort", &params(&[])).unwrap_err();
        assert_eq!(err, TransformError::MissingParameter("field"));

        let err = TransformRequest::from_params("filter", &params(&[("field", "name")]))
            .unwrap_err();
        assert_eq!(err, TransformError::MissingParameter("value"));
    }

    #[test]
    fn invalid_ascending_flag_is_rejected() {
        let err = TransformRequest::from_params(
            "sort",
            &params(&[("field", "price"), ("ascending", "sideways")]),
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::InvalidValue { .. }));
    }

    #[test]
    fn output_envelopes() {
        let records = RecordSet::new(vec![Record::with_id(1).numeric("price", 2.5)]);

        let sorted = run_transform(
            &records,
            &TransformRequest::Sort {
                field: "price".to_string(),
                ascending: true,
            },
        )
        .unwrap();
        assert_eq!(sorted.to_json(), json!({ "data": [{ "id": 1, "price": 2.5 }] }));

        let total = run_transform(
            &records,
            &TransformRequest::Aggregate {
                field: "name".to_string(),
                operation: AggregateOperation::Sum,
            },
        )
        .unwrap();
        assert!(matches!(total, TransformOutput::Aggregate(_)));
        assert_eq!(total.to_json(), json!({ "result": null }));
    }
}
