/// Field registry for the water quality monitoring service.
///
/// Defines display labels, value kinds, and form defaults for every field in
/// the record vocabulary. This is the single source of truth for how a field
/// is presented and what the submission form pre-fills; wire names live in
/// `model` next to the `Field` enum.

use crate::model::Field;

// ---------------------------------------------------------------------------
// Field metadata
// ---------------------------------------------------------------------------

/// How a field's value is interpreted after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Whole-number input. Integral values are written as JSON integers.
    Integer,
    Decimal,
}

/// Metadata for a single record field.
pub struct FieldSpec {
    pub field: Field,
    /// Label shown in forms and report headings.
    pub label: &'static str,
    pub kind: FieldKind,
    /// Value the submission form pre-fills when the user leaves the field
    /// unset. These are form placeholders, not typical readings, and must
    /// not feed any analysis.
    pub form_default: Option<f64>,
}

/// All record fields, in `Field::ALL` order.
pub static FIELD_REGISTRY: &[FieldSpec] = &[
    FieldSpec {
        field: Field::Station,
        label: "Station Code",
        kind: FieldKind::Text,
        form_default: None,
    },
    FieldSpec {
        field: Field::Location,
        label: "Location",
        kind: FieldKind::Text,
        form_default: None,
    },
    FieldSpec {
        field: Field::Region,
        label: "State",
        kind: FieldKind::Text,
        form_default: None,
    },
    FieldSpec {
        field: Field::Year,
        label: "Year",
        kind: FieldKind::Integer,
        form_default: Some(2000.0), // lower bound of the form's year input
    },
    FieldSpec {
        field: Field::Temperature,
        label: "Temperature (°C)",
        kind: FieldKind::Decimal,
        form_default: Some(25.0),
    },
    FieldSpec {
        field: Field::Ph,
        label: "pH",
        kind: FieldKind::Decimal,
        form_default: Some(7.0),
    },
    FieldSpec {
        field: Field::DissolvedOxygen,
        label: "D.O. (mg/l)",
        kind: FieldKind::Decimal,
        form_default: Some(6.5),
    },
    FieldSpec {
        field: Field::Conductivity,
        label: "Conductivity (µmhos/cm)",
        kind: FieldKind::Integer,
        form_default: Some(200.0),
    },
    FieldSpec {
        field: Field::Bod,
        label: "B.O.D. (mg/l)",
        kind: FieldKind::Decimal,
        form_default: Some(2.0),
    },
    FieldSpec {
        field: Field::Nitrate,
        label: "Nitrate+Nitrite (mg/l)",
        kind: FieldKind::Decimal,
        form_default: Some(0.1),
    },
    FieldSpec {
        field: Field::FecalColiform,
        label: "Fecal Coliform (MPN/100ml)",
        kind: FieldKind::Integer,
        form_default: Some(10.0),
    },
    FieldSpec {
        field: Field::TotalColiform,
        label: "Total Coliform (MPN/100ml)",
        kind: FieldKind::Integer,
        form_default: Some(25.0),
    },
];

/// Earliest year the submission form accepts.
pub const MIN_YEAR: i32 = 2000;

/// Latest year the submission form accepts.
pub const MAX_YEAR: i32 = 2100;

/// Returns the registry entry for `field`.
pub fn spec(field: Field) -> &'static FieldSpec {
    &FIELD_REGISTRY[field.index()]
}

/// Shorthand for `spec(field).label`.
pub fn label(field: Field) -> &'static str {
    spec(field).label
}

/// Looks up a field's registry entry by wire name. Returns `None` if the
/// name is outside the vocabulary.
pub fn find_by_wire_name(name: &str) -> Option<&'static FieldSpec> {
    Field::from_wire_name(name).map(spec)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
