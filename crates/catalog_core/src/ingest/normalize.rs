use crate::engine::{ExpectedType, TransformError, TransformResult};
use crate::model::record::{Record, ID_FIELD};
use log::{debug, warn};
use serde_json::{Map, Value};

/// Untyped key/value item received at the ingest boundary.
pub type RawItem = Map<String, Value>;

/// Mandatory display-name field for every item.
pub const REQUIRED_NAME_FIELD: &str = "name";

const NUMERIC_FIELDS_KEY: &str = "numeric_fields";
const STRING_FIELDS_KEY: &str = "string_fields";
const CATEGORY_FIELD: &str = "category";
const PRICE_FIELD: &str = "price";
const QUANTITY_FIELD: &str = "quantity";

/// One item dropped from a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestRejection {
    /// Position of the item in the submitted batch.
    pub index: usize,
    pub error: TransformError,
}

/// Outcome of normalizing a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Normalized records in submission order.
    pub records: Vec<Record>,
    pub rejected: Vec<IngestRejection>,
}

/// Normalizes one raw item into a record.
///
/// Explicit `numeric_fields`/`string_fields` objects are merged first, then
/// the reserved fields, then any remaining top-level scalars.
///
/// # Errors
/// - `MissingRequiredField` when `name` is absent, null or empty.
/// - `InvalidValue` when `id` is present but not an integer.
/// - `InvalidRecord` when the result would fail `Record::validate`
///   (blank field names, non-positive id).
pub fn normalize_item(raw: &RawItem) -> TransformResult<Record> {
    let name = raw
        .get(REQUIRED_NAME_FIELD)
        .and_then(render_text)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| TransformError::MissingRequiredField {
            field: REQUIRED_NAME_FIELD.to_string(),
        })?;

    let mut record = Record::new();
    record.id = match raw.get(ID_FIELD) {
        None | Some(Value::Null) => None,
        Some(value) => Some(parse_id(value)?),
    };

    if let Some(Value::Object(numeric)) = raw.get(NUMERIC_FIELDS_KEY) {
        for (key, value) in numeric {
            if let Some(number) = value.as_f64() {
                record.numeric_fields.insert(key.clone(), number);
            }
        }
    }
    if let Some(Value::Object(strings)) = raw.get(STRING_FIELDS_KEY) {
        for (key, value) in strings {
            if let Value::String(text) = value {
                record.string_fields.insert(key.clone(), text.clone());
            }
        }
    }

    record
        .string_fields
        .insert(REQUIRED_NAME_FIELD.to_string(), name);
    if let Some(category) = raw
        .get(CATEGORY_FIELD)
        .and_then(render_text)
        .filter(|category| !category.is_empty())
    {
        record
            .string_fields
            .insert(CATEGORY_FIELD.to_string(), category);
    }
    if let Some(price) = raw.get(PRICE_FIELD).and_then(number_of) {
        record.numeric_fields.insert(PRICE_FIELD.to_string(), price);
    }
    if let Some(quantity) = raw.get(QUANTITY_FIELD).and_then(number_of) {
        record
            .numeric_fields
            .insert(QUANTITY_FIELD.to_string(), quantity.trunc());
    }

    for (key, value) in raw {
        if is_reserved_key(key) {
            continue;
        }
        match value {
            Value::Number(number) => {
                if let Some(number) = number.as_f64() {
                    record.numeric_fields.insert(key.clone(), number);
                }
            }
            Value::String(text) => {
                record.string_fields.insert(key.clone(), text.clone());
            }
            _ => {}
        }
    }

    record.validate()?;
    Ok(record)
}

/// Normalizes a batch with partial-failure semantics.
///
/// Elements that are not JSON objects are rejected as missing `name`.
pub fn normalize_batch(items: &[Value]) -> IngestReport {
    let mut report = IngestReport::default();
    for (index, item) in items.iter().enumerate() {
        let normalized = match item {
            Value::Object(raw) => normalize_item(raw),
            _ => Err(TransformError::MissingRequiredField {
                field: REQUIRED_NAME_FIELD.to_string(),
            }),
        };
        match normalized {
            Ok(record) => report.records.push(record),
            Err(error) => {
                warn!(
                    "event=ingest_item module=ingest status=skip index={} error={}",
                    index, error
                );
                report.rejected.push(IngestRejection { index, error });
            }
        }
    }
    debug!(
        "event=ingest_batch module=ingest status=ok items={} accepted={} rejected={}",
        items.len(),
        report.records.len(),
        report.rejected.len()
    );
    report
}

fn is_reserved_key(key: &str) -> bool {
    matches!(
        key,
        ID_FIELD
            | REQUIRED_NAME_FIELD
            | CATEGORY_FIELD
            | PRICE_FIELD
            | QUANTITY_FIELD
            | NUMERIC_FIELDS_KEY
            | STRING_FIELDS_KEY
    )
}

fn render_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn parse_id(value: &Value) -> TransformResult<i64> {
    let parsed = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| TransformError::invalid_value(ID_FIELD, value, ExpectedType::Integer))
}
