//! Field resolution against sparse records.

use crate::model::record::{Record, RecordId, ID_FIELD};

/// Typed view of one field on one record.
///
/// Resolved per record and per operation since records may carry
/// different field sets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedField<'a> {
    Identifier(RecordId),
    Numeric(f64),
    Text(&'a str),
    Absent,
}

impl ResolvedField<'_> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Resolves `field` on `record`.
///
/// Lookup order is identifier, numeric map, string map. An ephemeral
/// record resolves `id` to `Absent`.
pub fn resolve_field<'a>(record: &'a Record, field: &str) -> ResolvedField<'a> {
    if field == ID_FIELD {
        return record.id.map_or(ResolvedField::Absent, ResolvedField::Identifier);
    }
    if let Some(value) = record.numeric_fields.get(field) {
        return ResolvedField::Numeric(*value);
    }
    if let Some(value) = record.string_fields.get(field) {
        return ResolvedField::Text(value.as_str());
    }
    ResolvedField::Absent
}
