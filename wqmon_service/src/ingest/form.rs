//! Submission of new water quality records.
//!
//! One form becomes one document. Field names are fixed by the wire
//! vocabulary in `model`. Unset numeric fields take the form defaults from
//! `fields::FIELD_REGISTRY`; unset text fields are stored as empty strings,
//! the same as an untouched text box. There is no duplicate detection.

use serde::Deserialize;
use serde_json::Value;

use crate::fields::{self, FieldKind, MAX_YEAR, MIN_YEAR};
use crate::logging::{self, Component};
use crate::model::{Document, Field, IngestError};
use crate::store::RecordStore;

/// Values entered on the "add record" form. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SubmissionForm {
    pub station: Option<String>,
    pub location: Option<String>,
    pub region: Option<String>,
    pub year: Option<i32>,
    pub temperature: Option<f64>,
    pub ph: Option<f64>,
    pub dissolved_oxygen: Option<f64>,
    pub conductivity: Option<f64>,
    pub bod: Option<f64>,
    pub nitrate: Option<f64>,
    pub fecal_coliform: Option<f64>,
    pub total_coliform: Option<f64>,
}

/// Whole-number fields keep integral values as JSON integers, the way the
/// form's integer inputs post them.
fn number_value(field: Field, number: f64) -> Value {
    let whole = fields::spec(field).kind == FieldKind::Integer
        && number.fract() == 0.0
        && number.abs() < 9.0e15;
    if whole {
        Value::from(number as i64)
    } else {
        Value::from(number)
    }
}

impl SubmissionForm {
    fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Station => self.station.as_deref(),
            Field::Location => self.location.as_deref(),
            Field::Region => self.region.as_deref(),
            _ => None,
        }
    }

    fn number(&self, field: Field) -> Option<f64> {
        match field {
            Field::Temperature => self.temperature,
            Field::Ph => self.ph,
            Field::DissolvedOxygen => self.dissolved_oxygen,
            Field::Conductivity => self.conductivity,
            Field::Bod => self.bod,
            Field::Nitrate => self.nitrate,
            Field::FecalColiform => self.fecal_coliform,
            Field::TotalColiform => self.total_coliform,
            _ => None,
        }
    }

    fn resolved_year(&self) -> Result<i32, IngestError> {
        let year = match self.year {
            Some(year) => year,
            None => fields::spec(Field::Year).form_default.map_or(MIN_YEAR, |y| y as i32),
        };
        if (MIN_YEAR..=MAX_YEAR).contains(&year) {
            Ok(year)
        } else {
            Err(IngestError::Invalid(format!(
                "year {} is outside {}-{}",
                year, MIN_YEAR, MAX_YEAR
            )))
        }
    }

    /// Validates the form and builds the document that would be stored.
    pub fn to_document(&self) -> Result<Document, IngestError> {
        let mut doc = Document::new();

        for field in Field::ALL {
            let value = match field {
                Field::Station | Field::Location | Field::Region => {
                    Value::String(self.text(field).unwrap_or_default().to_string())
                }
                Field::Year => Value::from(self.resolved_year()?),
                _ => {
                    let number = self
                        .number(field)
                        .or(fields::spec(field).form_default)
                        .unwrap_or_default();
                    if !number.is_finite() {
                        return Err(IngestError::Invalid(format!(
                            "{} must be a finite number",
                            fields::label(field)
                        )));
                    }
                    number_value(field, number)
                }
            };
            doc.insert(field.wire_name().to_string(), value);
        }

        Ok(doc)
    }
}

/// Validates `form` and appends it to `store` as one new record.
///
/// Returns the stored document. Validation failures leave the store
/// untouched; store failures are returned to the caller, never swallowed.
pub fn submit(store: &mut dyn RecordStore, form: &SubmissionForm) -> Result<Document, IngestError> {
    let station = form.station.as_deref().filter(|s| !s.is_empty());

    let doc = form.to_document().inspect_err(|e| {
        logging::warn(Component::Ingest, station, &e.to_string());
    })?;

    store.insert(&doc).inspect_err(|e| {
        logging::log_store_failure(station, "insert", e);
    })?;

    logging::info(Component::Ingest, station, "New record added to the store");
    Ok(doc)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
