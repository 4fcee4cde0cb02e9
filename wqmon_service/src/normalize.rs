/// Schema normalization for freshly fetched documents.
///
/// Documents come back from the store exactly as they were written, and
/// older rows were loaded from spreadsheets where numbers are often strings
/// ("7.1"), blanks, or placeholders ("NA"). This module coerces the known
/// numeric fields and drops anything that does not parse. It never fails:
/// a bad value becomes an absent field, not zero and not an error.
///
/// Normalization is idempotent. Feeding the documents of an already
/// normalized set back through `normalize` yields the same records.

use serde::Serialize;
use serde_json::Value;

use crate::model::{Document, Field, WaterQualityRecord};

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// Why a value could not be coerced. Local to this module; callers only
/// ever see the field as absent.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ParseError {
    /// Null, which pandas-style sources use for "no reading".
    Missing,
    /// A string that is not a number, or a non-scalar value.
    NotNumeric,
    /// Parsed, but NaN or infinite.
    NonFinite,
    /// A year with a fractional part or outside `i32`.
    NotIntegral,
}

fn coerce_number(value: &Value) -> Result<f64, ParseError> {
    let parsed = match value {
        Value::Null => return Err(ParseError::Missing),
        Value::Number(n) => n.as_f64().ok_or(ParseError::NotNumeric)?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ParseError::NotNumeric)?,
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            return Err(ParseError::NotNumeric);
        }
    };

    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(ParseError::NonFinite)
    }
}

fn coerce_year(value: &Value) -> Result<i32, ParseError> {
    let n = coerce_number(value)?;
    if n.fract() != 0.0 || n < f64::from(i32::MIN) || n > f64::from(i32::MAX) {
        return Err(ParseError::NotIntegral);
    }
    Ok(n as i32)
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

// ---------------------------------------------------------------------------
// Coverage statistics
// ---------------------------------------------------------------------------

/// How one numeric field fared across a batch of documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCoverage {
    pub field: Field,
    /// Values that parsed and were kept.
    pub present: usize,
    /// Values that existed but were dropped.
    pub unparseable: usize,
    /// Documents without the key, or with null.
    pub missing: usize,
}

/// Coverage for every numeric field over one normalization pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    pub total: usize,
    pub coverage: Vec<FieldCoverage>,
}

impl NormalizeStats {
    fn new() -> Self {
        Self {
            total: 0,
            coverage: Field::NUMERIC
                .iter()
                .map(|&field| FieldCoverage {
                    field,
                    present: 0,
                    unparseable: 0,
                    missing: 0,
                })
                .collect(),
        }
    }

    /// Total values dropped across all fields.
    pub fn total_unparseable(&self) -> usize {
        self.coverage.iter().map(|c| c.unparseable).sum()
    }

    pub fn coverage_for(&self, field: Field) -> Option<&FieldCoverage> {
        self.coverage.iter().find(|c| c.field == field)
    }

    fn record(&mut self, field: Field, outcome: Option<Result<(), ParseError>>) {
        let Some(entry) = self.coverage.iter_mut().find(|c| c.field == field) else {
            return;
        };
        match outcome {
            None | Some(Err(ParseError::Missing)) => entry.missing += 1,
            Some(Ok(())) => entry.present += 1,
            Some(Err(_)) => entry.unparseable += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn normalize_one(doc: &Document, stats: &mut NormalizeStats) -> WaterQualityRecord {
    let mut record = WaterQualityRecord::default();

    for (key, value) in doc {
        let Some(field) = Field::from_wire_name(key) else {
            record.extra.insert(key.clone(), value.clone());
            continue;
        };

        match field {
            Field::Station => record.station = coerce_text(value),
            Field::Location => record.location = coerce_text(value),
            Field::Region => record.region = coerce_text(value),
            Field::Year => {
                let parsed = coerce_year(value);
                stats.record(field, Some(parsed.map(|_| ())));
                record.year = parsed.ok();
            }
            _ => {
                let parsed = coerce_number(value);
                stats.record(field, Some(parsed.map(|_| ())));
                let slot = match field {
                    Field::Temperature => &mut record.temperature,
                    Field::Ph => &mut record.ph,
                    Field::DissolvedOxygen => &mut record.dissolved_oxygen,
                    Field::Conductivity => &mut record.conductivity,
                    Field::Bod => &mut record.bod,
                    Field::Nitrate => &mut record.nitrate,
                    Field::FecalColiform => &mut record.fecal_coliform,
                    _ => &mut record.total_coliform,
                };
                *slot = parsed.ok();
            }
        }
    }

    for field in Field::NUMERIC {
        if !doc.contains_key(field.wire_name()) {
            stats.record(field, None);
        }
    }
    stats.total += 1;

    record
}

/// Normalizes a single document.
pub fn normalize_document(doc: &Document) -> WaterQualityRecord {
    normalize_one(doc, &mut NormalizeStats::new())
}

/// Normalizes every document, preserving order.
pub fn normalize(docs: &[Document]) -> Vec<WaterQualityRecord> {
    normalize_with_stats(docs).0
}

/// Like `normalize`, but also reports per-field coverage so callers can log
/// how much of the collection was usable.
pub fn normalize_with_stats(docs: &[Document]) -> (Vec<WaterQualityRecord>, NormalizeStats) {
    let mut stats = NormalizeStats::new();
    let records = docs.iter().map(|d| normalize_one(d, &mut stats)).collect();
    (records, stats)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FIELD_PH, to_documents};
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("test document must be an object, got {}", other),
        }
    }

    fn messy_documents() -> Vec<Document> {
        vec![
            doc(json!({"STATE": "A", "year": 2020, "PH": "7.1", "Temp": " 24.5 "})),
            doc(json!({"STATE": "A", "year": "2021", "PH": "NA", "Temp": null})),
            doc(json!({"STATE": 12, "year": 2020.0, "PH": 6.9, "Remarks": "clear"})),
            doc(json!({"year": "2020.5", "PH": "", "D.O. (mg/l)": true})),
            doc(json!({"PH": "NaN", "B.O.D. (mg/l)": "inf", "LOCATIONS": null})),
            doc(json!({})),
        ]
    }

    #[test]
    fn test_numeric_strings_are_parsed() {
        let record = normalize_document(&doc(json!({"PH": "7.1", "Temp": " 24.5 "})));
        assert_eq!(record.ph, Some(7.1));
        assert_eq!(record.temperature, Some(24.5), "surrounding whitespace is ignored");
    }

    #[test]
    fn test_unparseable_values_become_absent_not_zero() {
        let values = [
            json!("NA"),
            json!(""),
            json!("seven"),
            json!(null),
            json!(true),
            json!("NaN"),
            json!("-inf"),
            json!([7.0]),
            json!({"value": 7.0}),
        ];
        for value in values {
            let mut d = Document::new();
            d.insert(FIELD_PH.to_string(), value.clone());
            let record = normalize_document(&d);
            assert_eq!(record.ph, None, "{} should normalize to absent", value);
        }
    }

    #[test]
    fn test_missing_key_is_absent() {
        let record = normalize_document(&Document::new());
        assert_eq!(record, WaterQualityRecord::default());
    }

    #[test]
    fn test_year_must_be_integral() {
        assert_eq!(normalize_document(&doc(json!({"year": "2021"}))).year, Some(2021));
        assert_eq!(normalize_document(&doc(json!({"year": 2020.0}))).year, Some(2020));
        assert_eq!(normalize_document(&doc(json!({"year": "2020.5"}))).year, None);
        assert_eq!(normalize_document(&doc(json!({"year": 1e12}))).year, None);
    }

    #[test]
    fn test_text_fields_are_stringified() {
        let record = normalize_document(&doc(json!({"STATION CODE": 1312, "STATE": "Goa"})));
        assert_eq!(record.station.as_deref(), Some("1312"));
        assert_eq!(record.region.as_deref(), Some("Goa"));
    }

    #[test]
    fn test_unknown_fields_pass_through_unchanged() {
        let record = normalize_document(&doc(json!({"Remarks": "clear", "Depth": "2m"})));
        assert_eq!(record.extra.get("Remarks"), Some(&json!("clear")));
        assert_eq!(record.extra.get("Depth"), Some(&json!("2m")), "unknown fields are not coerced");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = normalize(&messy_documents());
        let twice = normalize(&to_documents(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalization_preserves_order_and_count() {
        let docs = messy_documents();
        let records = normalize(&docs);
        assert_eq!(records.len(), docs.len());
        assert_eq!(records[0].region.as_deref(), Some("A"));
        assert_eq!(records[2].region.as_deref(), Some("12"));
    }

    #[test]
    fn test_stats_count_present_unparseable_and_missing() {
        let (_, stats) = normalize_with_stats(&messy_documents());
        assert_eq!(stats.total, 6);

        let ph = stats.coverage_for(Field::Ph).expect("pH is a numeric field");
        assert_eq!(ph.present, 2, "7.1 and 6.9");
        assert_eq!(ph.unparseable, 3, "NA, empty string and NaN");
        assert_eq!(ph.missing, 1);

        let temp = stats.coverage_for(Field::Temperature).expect("temperature is numeric");
        assert_eq!(temp.present, 1);
        assert_eq!(temp.unparseable, 0);
        assert_eq!(temp.missing, 5, "null counts as missing");

        let year = stats.coverage_for(Field::Year).expect("year is numeric");
        assert_eq!((year.present, year.unparseable, year.missing), (3, 1, 2));

        for c in &stats.coverage {
            assert_eq!(c.present + c.unparseable + c.missing, stats.total, "{}", c.field);
        }
    }

    #[test]
    fn test_stats_do_not_cover_text_fields() {
        let (_, stats) = normalize_with_stats(&[doc(json!({"STATE": "A"}))]);
        assert!(stats.coverage_for(Field::Region).is_none());
        assert_eq!(stats.total_unparseable(), 0);
    }

    #[test]
    fn test_region_and_year_keys_are_exact() {
        // Lower-case "state" is not the region field; it is carried as extra.
        let record = normalize_document(&doc(json!({"state": "A", "STATE": "B", "year": 2022, "Temp": 20})));
        assert_eq!(record.region.as_deref(), Some("B"));
        assert_eq!(record.year, Some(2022));
        assert_eq!(record.extra.get("state"), Some(&json!("A")));
        assert_eq!(record.temperature, Some(20.0));
    }
}
