//! Type-aware ordering of records by one field.
//!
//! # Invariants
//! - Records without the field are dropped from the result.
//! - Ascending order is stable; descending is the exact reverse of it.
//! - Numbers order before strings when a field mixes both across records.

use super::resolve::{resolve_field, ResolvedField};
use crate::model::record::{Record, RecordSet};
use log::debug;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
enum SortKey<'a> {
    Integer(i64),
    Number(f64),
    Text(&'a str),
}

impl SortKey<'_> {
    fn cmp_natural(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(left), Self::Integer(right)) => left.cmp(right),
            (Self::Number(left), Self::Number(right)) => left.total_cmp(right),
            (Self::Integer(left), Self::Number(right)) => (*left as f64).total_cmp(right),
            (Self::Number(left), Self::Integer(right)) => left.total_cmp(&(*right as f64)),
            (Self::Text(left), Self::Text(right)) => left.cmp(right),
            (Self::Text(_), _) => Ordering::Greater,
            (_, Self::Text(_)) => Ordering::Less,
        }
    }
}

/// Returns a new collection ordered by `field`.
pub fn sort_records(records: &RecordSet, field: &str, ascending: bool) -> RecordSet {
    let mut keyed: Vec<(SortKey<'_>, &Record)> = records
        .items()
        .iter()
        .filter_map(|record| {
            let key = match resolve_field(record, field) {
                ResolvedField::Identifier(id) => SortKey::Integer(id),
                ResolvedField::Numeric(number) => SortKey::Number(number),
                ResolvedField::Text(text) => SortKey::Text(text),
                ResolvedField::Absent => return None,
            };
            Some((key, record))
        })
        .collect();

    keyed.sort_by(|(left, _), (right, _)| left.cmp_natural(right));
    if !ascending {
        keyed.reverse();
    }

    debug!(
        "event=sort module=engine status=ok field={} ascending={} input={} kept={}",
        field,
        ascending,
        records.len(),
        keyed.len()
    );
    keyed.into_iter().map(|(_, record)| record.clone()).collect()
}
