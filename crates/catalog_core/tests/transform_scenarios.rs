use catalog_core::{
    aggregate_records, filter_records, run_transform, sort_records, AggregateOperation,
    AggregateValue, FilterOperator, Record, RecordSet, TransformError, TransformOutput,
    TransformRequest, TypedValue,
};
use serde_json::json;
use std::collections::BTreeMap;

fn inventory() -> RecordSet {
    RecordSet::new(vec![
        Record::with_id(1)
            .numeric("price", 10.99)
            .numeric("qty", 5.0)
            .string("name", "Headphones")
            .string("category", "Electronics"),
        Record::with_id(2)
            .numeric("price", 5.99)
            .numeric("qty", 10.0)
            .string("name", "Notebook")
            .string("category", "Stationery"),
        Record::with_id(3)
            .numeric("price", 15.99)
            .numeric("qty", 2.0)
            .string("name", "Charger")
            .string("category", "Electronics"),
    ])
}

fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[test]
fn filter_price_greater_than_ten() {
    let result = filter_records(
        &inventory(),
        "price",
        &TypedValue::Integer(10),
        &FilterOperator::Gt,
    )
    .unwrap();
    assert_eq!(result.ids(), vec![1, 3]);
}

#[test]
fn sort_price_ascending() {
    assert_eq!(sort_records(&inventory(), "price", true).ids(), vec![2, 1, 3]);
}

#[test]
fn aggregate_price_sum_and_count() {
    let sum = aggregate_records(&inventory(), "price", &AggregateOperation::Sum);
    let total = sum.result.unwrap().as_f64();
    assert!((total - 32.97).abs() < 1e-9);

    let count = aggregate_records(&inventory(), "price", &AggregateOperation::Count);
    assert_eq!(count.result, Some(AggregateValue::Count(3)));
}

#[test]
fn contains_matches_category_case_insensitively() {
    let set = RecordSet::new(vec![Record::with_id(9).string("category", "Electronics")]);
    let result = filter_records(
        &set,
        "category",
        &TypedValue::from("electronics"),
        &FilterOperator::Contains,
    )
    .unwrap();
    assert_eq!(result.ids(), vec![9]);
}

#[test]
fn aggregate_over_string_field_is_null() {
    let result = aggregate_records(&inventory(), "name", &AggregateOperation::Sum);
    assert_eq!(result.result, None);
}

#[test]
fn non_integer_id_filter_fails() {
    let engine_err = filter_records(
        &inventory(),
        "id",
        &TypedValue::from("abc"),
        &FilterOperator::Eq,
    )
    .unwrap_err();
    assert!(matches!(engine_err, TransformError::InvalidValue { .. }));

    let boundary_err = TransformRequest::from_params(
        "filter",
        &params(&[("field", "id"), ("value", "abc"), ("operator", "eq")]),
    )
    .unwrap_err();
    assert_eq!(boundary_err.to_string(), "id must be an integer, got `abc`");
}

#[test]
fn filter_is_idempotent() {
    let operator = FilterOperator::Contains;
    let value = TypedValue::from("electr");
    let once = filter_records(&inventory(), "category", &value, &operator).unwrap();
    let twice = filter_records(&once, "category", &value, &operator).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn descending_sort_is_reverse_of_ascending() {
    let set = RecordSet::new(vec![
        Record::with_id(1).numeric("qty", 3.0),
        Record::with_id(2).numeric("qty", 1.0),
        Record::with_id(3).numeric("qty", 3.0),
        Record::with_id(4).numeric("qty", 2.0),
    ]);

    let mut ascending = sort_records(&set, "qty", true).ids();
    ascending.reverse();
    assert_eq!(ascending, sort_records(&set, "qty", false).ids());
}

#[test]
fn count_matches_numeric_contributors_and_null_iff_zero() {
    let set = RecordSet::new(vec![
        Record::with_id(1).numeric("weight", 2.0),
        Record::with_id(2).string("weight", "heavy"),
        Record::with_id(3),
    ]);

    let count = aggregate_records(&set, "weight", &AggregateOperation::Count);
    assert_eq!(count.result, Some(AggregateValue::Count(1)));
    for operation in ["sum", "avg", "min", "max"] {
        let result = aggregate_records(&set, "weight", &AggregateOperation::parse(operation));
        assert_eq!(result.result, Some(AggregateValue::Number(2.0)), "{operation}");
    }

    for operation in ["sum", "avg", "min", "max"] {
        let result = aggregate_records(&set, "height", &AggregateOperation::parse(operation));
        assert_eq!(result.result, None, "{operation}");
    }
}

#[test]
fn empty_collection_never_errors() {
    let empty = RecordSet::default();
    let filtered = filter_records(&empty, "price", &TypedValue::from("x"), &FilterOperator::Gt)
        .unwrap();
    assert!(filtered.is_empty());
    assert!(sort_records(&empty, "price", false).is_empty());
    assert_eq!(
        aggregate_records(&empty, "price", &AggregateOperation::Max).result,
        None
    );
}

#[test]
fn operations_leave_input_untouched() {
    let set = inventory();
    let before = set.clone();

    let _ = sort_records(&set, "price", false);
    let _ = filter_records(&set, "price", &TypedValue::Float(1.0), &FilterOperator::Gt).unwrap();
    let _ = aggregate_records(&set, "price", &AggregateOperation::Avg);

    assert_eq!(set, before);
}

#[test]
fn query_boundary_runs_end_to_end() {
    let request = TransformRequest::from_params(
        "filter",
        &params(&[("field", "category"), ("value", "electronics"), ("operator", "contains")]),
    )
    .unwrap();

    let output = run_transform(&inventory(), &request).expect("aggregate request runs");
    let TransformOutput::Records(records) = &output else {
        panic!("filter should produce records");
    };
    assert_eq!(records.ids(), vec![1, 3]);
    assert_eq!(output.to_json()["data"][1]["name"], json!("Charger"));

    let unknown = TransformRequest::from_params(
        "filter",
        &params(&[("field", "price"), ("value", "1"), ("operator", "like")]),
    )
    .unwrap();
    let output = run_transform(&inventory(), &unknown)
        .expect("unknown operator degrades instead of failing");
    assert_eq!(output.to_json(), json!({ "data": [] }));
}
