/// Dashboard report assembly and plain-text rendering.
///
/// `build_report` turns the full normalized collection plus a selection into
/// everything the dashboard shows: the selector values, a summary of the
/// filtered set, by-location series, coliform points, the yearly trend for
/// the selected region, and the raw table. Values keep full precision in the
/// report; `render_text` rounds to two decimals when printing.

use chrono::Utc;
use serde::Serialize;

use crate::analysis::filters::{Selection, distinct_regions, distinct_years, filter_by_region};
use crate::analysis::groupings::{
    ColiformPoint, LocationValue, TrendSeries, coliform_points, location_series, mean_of, trend,
};
use crate::fields;
use crate::model::{Document, Field, WaterQualityRecord, to_documents};

/// Fields charted by location, in display order.
pub const LOCATION_CHART_FIELDS: [Field; 4] =
    [Field::Ph, Field::DissolvedOxygen, Field::Bod, Field::Conductivity];

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Headline means over the filtered set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub record_count: usize,
    pub mean_ph: Option<f64>,
    pub mean_temperature: Option<f64>,
    pub mean_dissolved_oxygen: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSeries {
    pub field: Field,
    pub values: Vec<LocationValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub generated_at: String,
    pub selection: Selection,
    /// Values offered by the region selector.
    pub regions: Vec<String>,
    /// Values offered by the year selector, given the selected region.
    pub years: Vec<i32>,
    /// `None` when the filtered set is empty.
    pub summary: Option<Summary>,
    pub location_series: Vec<LocationSeries>,
    pub coliform: Vec<ColiformPoint>,
    pub trend: Vec<TrendSeries>,
    /// The filtered set, or the whole collection when the filter matched
    /// nothing.
    pub raw: Vec<Document>,
    pub raw_is_filtered: bool,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Builds the dashboard for `selection` over the full collection.
///
/// The trend covers every year of the selected region (the year filter is
/// not applied), or the whole collection when no region is selected.
pub fn build_report(
    records: &[WaterQualityRecord],
    selection: &Selection,
    trend_fields: &[Field],
) -> DashboardReport {
    let in_region = filter_by_region(records.to_vec(), selection.region.as_deref());
    let filtered = selection.apply(records.to_vec());

    let summary = if filtered.is_empty() {
        None
    } else {
        Some(Summary {
            record_count: filtered.len(),
            mean_ph: mean_of(&filtered, Field::Ph),
            mean_temperature: mean_of(&filtered, Field::Temperature),
            mean_dissolved_oxygen: mean_of(&filtered, Field::DissolvedOxygen),
        })
    };

    let location_series = LOCATION_CHART_FIELDS
        .iter()
        .map(|&field| LocationSeries {
            field,
            values: location_series(&filtered, field),
        })
        .collect();

    let raw_is_filtered = !filtered.is_empty();
    let raw = if raw_is_filtered {
        to_documents(&filtered)
    } else {
        to_documents(records)
    };

    DashboardReport {
        generated_at: Utc::now().to_rfc3339(),
        selection: selection.clone(),
        regions: distinct_regions(records),
        years: distinct_years(&in_region),
        summary,
        location_series,
        coliform: coliform_points(&filtered),
        trend: trend(&in_region, trend_fields),
        raw,
        raw_is_filtered,
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Rounds to two decimal places for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn fmt_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", round2(v)),
        None => "-".to_string(),
    }
}

fn fmt_cell(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => "-".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

const RULE: &str = "═══════════════════════════════════════════════════════════";

/// Renders the report as plain text for a terminal.
pub fn render_text(report: &DashboardReport) -> String {
    let mut out = String::new();
    let region = report.selection.region.as_deref().unwrap_or("all regions");
    let year = report
        .selection
        .year
        .map_or_else(|| "all years".to_string(), |y| y.to_string());

    out.push_str(&format!("{}\n💧 WATER QUALITY REPORT\n{}\n", RULE, RULE));
    out.push_str(&format!("Regions available: {}\n", report.regions.len()));
    out.push_str(&format!(
        "Years available:   {}\n\n",
        report
            .years
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    ));

    match &report.summary {
        Some(s) => {
            out.push_str(&format!("📊 Summary for {} in {} ({} records)\n", region, year, s.record_count));
            out.push_str(&format!("  Average pH:              {}\n", fmt_value(s.mean_ph)));
            out.push_str(&format!("  Avg Temperature (°C):    {}\n", fmt_value(s.mean_temperature)));
            out.push_str(&format!("  Avg D.O. (mg/l):         {}\n", fmt_value(s.mean_dissolved_oxygen)));

            for series in report.location_series.iter().filter(|s| !s.values.is_empty()) {
                out.push_str(&format!("\n  {} by location\n", fields::label(series.field)));
                for lv in &series.values {
                    out.push_str(&format!("    {:<40} {:>10}\n", lv.location, fmt_value(Some(lv.value))));
                }
            }

            if !report.coliform.is_empty() {
                out.push_str("\n  Fecal vs Total Coliform\n");
                for p in &report.coliform {
                    out.push_str(&format!(
                        "    {:<40} {:>10} {:>10}\n",
                        p.location.as_deref().unwrap_or("-"),
                        fmt_value(Some(p.fecal)),
                        fmt_value(Some(p.total))
                    ));
                }
            }
        }
        None => out.push_str(&format!("No records for {} in {}\n", region, year)),
    }

    if report.trend.iter().any(|s| !s.points.is_empty()) {
        out.push_str(&format!("\n📈 Yearly trend - {}\n", region));
        for series in &report.trend {
            out.push_str(&format!("  {}\n", fields::label(series.field)));
            for point in &series.points {
                out.push_str(&format!("    {}  {:>10}\n", point.year, fmt_value(point.mean)));
            }
        }
    }

    out.push_str(&format!(
        "\n🔍 Raw data ({}, {} rows)\n",
        if report.raw_is_filtered { "filtered" } else { "all records" },
        report.raw.len()
    ));
    for doc in &report.raw {
        out.push_str(&format!(
            "  {:<10} {:<16} {:<30} {:>6} {:>8}\n",
            fmt_cell(doc.get(Field::Station.wire_name())),
            fmt_cell(doc.get(Field::Region.wire_name())),
            fmt_cell(doc.get(Field::Location.wire_name())),
            fmt_cell(doc.get(Field::Year.wire_name())),
            fmt_cell(doc.get(Field::Ph.wire_name())),
        ));
    }
    out.push_str(RULE);
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(region: &str, location: &str, year: i32, ph: f64) -> WaterQualityRecord {
        WaterQualityRecord {
            region: Some(region.to_string()),
            location: Some(location.to_string()),
            year: Some(year),
            ph: Some(ph),
            ..Default::default()
        }
    }

    fn collection() -> Vec<WaterQualityRecord> {
        vec![
            record("A", "Upstream", 2020, 7.1),
            record("A", "Downstream", 2021, 7.3),
            record("B", "Harbour", 2020, 6.9),
        ]
    }

    #[test]
    fn test_round2_applies_only_at_presentation() {
        assert_eq!(round2(7.126), 7.13);
        assert_eq!(round2(7.124), 7.12);
        assert_eq!(fmt_value(Some(7.0)), "7.00");
        assert_eq!(fmt_value(None), "-");
    }

    #[test]
    fn test_report_for_selection() {
        let selection = Selection::new(Some("A".to_string()), Some(2020));
        let report = build_report(&collection(), &selection, &[Field::Ph]);

        assert_eq!(report.regions, vec!["A", "B"]);
        assert_eq!(report.years, vec![2020, 2021], "years come from the selected region");

        let summary = report.summary.expect("filtered set is not empty");
        assert_eq!(summary.record_count, 1);
        assert_eq!(summary.mean_ph, Some(7.1));
        assert_eq!(summary.mean_temperature, None);

        assert!(report.raw_is_filtered);
        assert_eq!(report.raw.len(), 1);

        // Trend ignores the year filter.
        assert_eq!(report.trend.len(), 1);
        let years: Vec<i32> = report.trend[0].points.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2020, 2021]);

        let ph_series = &report.location_series[0];
        assert_eq!(ph_series.field, Field::Ph);
        assert_eq!(ph_series.values.len(), 1);
        assert_eq!(ph_series.values[0].location, "Upstream");
    }

    #[test]
    fn test_empty_filter_falls_back_to_full_raw_table() {
        let selection = Selection::new(Some("B".to_string()), Some(2021));
        let report = build_report(&collection(), &selection, &[Field::Ph]);
        assert!(report.summary.is_none());
        assert!(!report.raw_is_filtered);
        assert_eq!(report.raw.len(), 3);
        assert!(report.coliform.is_empty());
    }

    #[test]
    fn test_empty_collection_renders_without_panicking() {
        let report = build_report(&[], &Selection::default(), &[Field::Ph, Field::Temperature]);
        assert!(report.regions.is_empty());
        assert!(report.years.is_empty());
        assert!(report.summary.is_none());
        assert!(report.raw.is_empty());

        let text = render_text(&report);
        assert!(text.contains("No records for all regions in all years"));
    }

    #[test]
    fn test_rendered_text_rounds_means() {
        let records = vec![record("A", "Upstream", 2020, 7.0), record("A", "Mid", 2020, 7.34)];
        let selection = Selection::new(Some("A".to_string()), Some(2020));
        let text = render_text(&build_report(&records, &selection, &[Field::Ph]));
        assert!(text.contains("Average pH:              7.17"), "got:\n{}", text);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let selection = Selection::new(Some("A".to_string()), None);
        let report = build_report(&collection(), &selection, &[Field::Ph]);
        let json = serde_json::to_value(&report).expect("report serializes");
        assert_eq!(json["selection"]["region"], "A");
        assert_eq!(json["trend"][0]["field"], "PH");

        // Series name their field the way raw rows key it.
        let raw_keys = json["raw"][0].as_object().expect("raw row is an object");
        for series in json["location_series"].as_array().expect("series array") {
            let field = series["field"].as_str().expect("field is a string");
            assert!(Field::from_wire_name(field).is_some(), "unknown field {}", field);
        }
        assert!(raw_keys.contains_key(json["trend"][0]["field"].as_str().expect("field is a string")));
    }
}
