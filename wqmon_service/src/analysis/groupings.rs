//! Aggregations over a filtered record set.
//!
//! Means are taken over present values only. A set where nothing is present
//! has no mean (`None`), which callers render as "nothing to display".
//! Values are kept at full precision; rounding happens in `report`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Field, WaterQualityRecord};

/// Arithmetic mean of a sequence, or `None` if it is empty.
///
/// Each term is scaled by the count before summing, so the running total
/// never exceeds the largest magnitude in the input.
fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let values: Vec<f64> = values.into_iter().collect();
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    Some(values.iter().map(|v| v / n).sum())
}

// ---------------------------------------------------------------------------
// Means
// ---------------------------------------------------------------------------

/// Mean of `field` over the records where it is present.
pub fn mean_of(records: &[WaterQualityRecord], field: Field) -> Option<f64> {
    mean(records.iter().filter_map(|r| r.value(field)))
}

/// One point of a per-year trend line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearMean {
    pub year: i32,
    /// `None` when no record for that year has the field.
    pub mean: Option<f64>,
}

/// Mean of `field` per year, ascending by year.
///
/// Every distinct year present in `records` gets exactly one entry, even if
/// none of that year's records carry `field`; records without a year are
/// ignored.
pub fn group_mean_by_year(records: &[WaterQualityRecord], field: Field) -> Vec<YearMean> {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for record in records {
        if let Some(year) = record.year {
            let values = by_year.entry(year).or_default();
            if let Some(v) = record.value(field) {
                values.push(v);
            }
        }
    }

    by_year
        .into_iter()
        .map(|(year, values)| YearMean {
            year,
            mean: mean(values),
        })
        .collect()
}

/// A per-year trend line for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub field: Field,
    pub points: Vec<YearMean>,
}

/// `group_mean_by_year` for each of `fields`, in the order given.
pub fn trend(records: &[WaterQualityRecord], fields: &[Field]) -> Vec<TrendSeries> {
    fields
        .iter()
        .map(|&field| TrendSeries {
            field,
            points: group_mean_by_year(records, field),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Per-location series
// ---------------------------------------------------------------------------

/// A single bar in a by-location chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationValue {
    pub location: String,
    pub value: f64,
}

/// `(location, value)` pairs for records that have both, in record order.
/// Locations may repeat; one bar per record.
pub fn location_series(records: &[WaterQualityRecord], field: Field) -> Vec<LocationValue> {
    records
        .iter()
        .filter_map(|r| {
            let location = r.location.clone()?;
            let value = r.value(field)?;
            Some(LocationValue { location, value })
        })
        .collect()
}

/// One point of the fecal vs total coliform comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColiformPoint {
    pub location: Option<String>,
    pub fecal: f64,
    pub total: f64,
    /// Marker size in the scatter view.
    pub ph: Option<f64>,
}

/// Records that carry both coliform counts.
pub fn coliform_points(records: &[WaterQualityRecord]) -> Vec<ColiformPoint> {
    records
        .iter()
        .filter_map(|r| {
            Some(ColiformPoint {
                location: r.location.clone(),
                fecal: r.fecal_coliform?,
                total: r.total_coliform?,
                ph: r.ph,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
