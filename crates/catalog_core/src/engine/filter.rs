//! Single-predicate filtering.
//!
//! # Invariants
//! - Matching records keep their original relative order.
//! - Records without the field never match.
//! - `contains` only applies to string fields; `gt`/`lt` only to identifier
//!   and numeric fields.
//! - Float equality is exact IEEE comparison.

use super::coerce::{value_as_float, value_as_integer};
use super::resolve::{resolve_field, ResolvedField};
use super::TransformResult;
use crate::model::record::{Record, RecordSet};
use crate::model::value::TypedValue;
use log::debug;
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Filter comparison operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    #[default]
    Eq,
    Neq,
    Gt,
    Lt,
    Contains,
    /// Unrecognized operator name; matches nothing.
    Unsupported(String),
}

impl FilterOperator {
    /// Parses an operator name. Unknown names are kept, not rejected.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "eq" => Self::Eq,
            "neq" => Self::Neq,
            "gt" => Self::Gt,
            "lt" => Self::Lt,
            "contains" => Self::Contains,
            _ => Self::Unsupported(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Contains => "contains",
            Self::Unsupported(name) => name.as_str(),
        }
    }
}

impl From<String> for FilterOperator {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<FilterOperator> for String {
    fn from(value: FilterOperator) -> Self {
        value.as_str().to_string()
    }
}

impl Display for FilterOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns records whose `field` satisfies `operator` against `value`.
///
/// The comparison value is converted to an integer (identifier) or float
/// (numeric field) at most once per call, the first time a record needs it.
///
/// # Errors
/// - `InvalidValue` when `value` cannot convert to the type of a resolved
///   identifier or numeric field. The whole call fails.
pub fn filter_records(
    records: &RecordSet,
    field: &str,
    value: &TypedValue,
    operator: &FilterOperator,
) -> TransformResult<RecordSet> {
    if let FilterOperator::Unsupported(name) = operator {
        debug!(
            "event=filter module=engine status=skip reason=unsupported_operator operator={} field={}",
            name, field
        );
        return Ok(RecordSet::default());
    }

    let as_integer: OnceCell<i64> = OnceCell::new();
    let as_float: OnceCell<f64> = OnceCell::new();
    let mut matched: Vec<Record> = Vec::new();

    for record in records.items() {
        let keep = match resolve_field(record, field) {
            ResolvedField::Absent => false,
            ResolvedField::Identifier(_) | ResolvedField::Numeric(_)
                if *operator == FilterOperator::Contains =>
            {
                false
            }
            ResolvedField::Identifier(id) => {
                let target = *as_integer.get_or_try_init(|| value_as_integer(field, value))?;
                compare(operator, id, target)
            }
            ResolvedField::Numeric(number) => {
                let target = *as_float.get_or_try_init(|| value_as_float(field, value))?;
                compare(operator, number, target)
            }
            ResolvedField::Text(text) => match_text(operator, text, value),
        };

        if keep {
            matched.push(record.clone());
        }
    }

    debug!(
        "event=filter module=engine status=ok field={} operator={} input={} matched={}",
        field,
        operator,
        records.len(),
        matched.len()
    );
    Ok(RecordSet::new(matched))
}

fn compare<T: PartialOrd>(operator: &FilterOperator, left: T, right: T) -> bool {
    match operator {
        FilterOperator::Eq => left == right,
        FilterOperator::Neq => left != right,
        FilterOperator::Gt => left > right,
        FilterOperator::Lt => left < right,
        FilterOperator::Contains | FilterOperator::Unsupported(_) => false,
    }
}

fn match_text(operator: &FilterOperator, text: &str, value: &TypedValue) -> bool {
    match operator {
        FilterOperator::Eq => value.as_text() == Some(text),
        FilterOperator::Neq => value.as_text() != Some(text),
        FilterOperator::Contains => value
            .as_text()
            .is_some_and(|needle| text.to_uppercase().contains(&needle.to_uppercase())),
        // String ordering is not supported.
        FilterOperator::Gt | FilterOperator::Lt | FilterOperator::Unsupported(_) => false,
    }
}
