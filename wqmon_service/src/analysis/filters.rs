//! Region and year filters.
//!
//! Both filters are exact-match predicates, so applying them in either order
//! yields the same set. Records missing the filtered field are excluded;
//! an unset filter passes everything through.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::WaterQualityRecord;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Keeps records whose region equals `region` exactly. `None` is a no-op.
pub fn filter_by_region(
    records: Vec<WaterQualityRecord>,
    region: Option<&str>,
) -> Vec<WaterQualityRecord> {
    match region {
        None => records,
        Some(region) => records
            .into_iter()
            .filter(|r| r.region.as_deref() == Some(region))
            .collect(),
    }
}

/// Keeps records whose year equals `year`. `None` is a no-op.
pub fn filter_by_year(records: Vec<WaterQualityRecord>, year: Option<i32>) -> Vec<WaterQualityRecord> {
    match year {
        None => records,
        Some(year) => records.into_iter().filter(|r| r.year == Some(year)).collect(),
    }
}

// ---------------------------------------------------------------------------
// Selector values
// ---------------------------------------------------------------------------

/// Distinct present regions, sorted.
pub fn distinct_regions(records: &[WaterQualityRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.region.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct present years, ascending.
pub fn distinct_years(records: &[WaterQualityRecord]) -> Vec<i32> {
    records
        .iter()
        .filter_map(|r| r.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// The region/year pair a report is filtered by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub region: Option<String>,
    pub year: Option<i32>,
}

impl Selection {
    pub fn new(region: Option<String>, year: Option<i32>) -> Self {
        Self { region, year }
    }

    /// Fills unset parts the way the dashboard selectors do: the first
    /// region in sorted order, then the earliest year reported for that
    /// region. Parts that are already set are kept even if no record
    /// matches them.
    pub fn with_defaults(self, records: &[WaterQualityRecord]) -> Self {
        let region = self
            .region
            .or_else(|| distinct_regions(records).into_iter().next());

        let year = self.year.or_else(|| {
            let in_region = records
                .iter()
                .filter(|r| region.is_none() || r.region == region)
                .cloned()
                .collect::<Vec<_>>();
            distinct_years(&in_region).into_iter().next()
        });

        Self { region, year }
    }

    /// Applies the region filter, then the year filter.
    pub fn apply(&self, records: Vec<WaterQualityRecord>) -> Vec<WaterQualityRecord> {
        let by_region = filter_by_region(records, self.region.as_deref());
        filter_by_year(by_region, self.year)
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_none() && self.year.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(region: Option<&str>, year: Option<i32>, ph: Option<f64>) -> WaterQualityRecord {
        WaterQualityRecord {
            region: region.map(str::to_string),
            year,
            ph,
            ..Default::default()
        }
    }

    fn sample() -> Vec<WaterQualityRecord> {
        vec![
            record(Some("Kerala"), Some(2020), Some(7.1)),
            record(Some("Kerala"), Some(2021), Some(7.3)),
            record(Some("Goa"), Some(2020), Some(6.9)),
            record(Some("Goa"), None, Some(6.5)),
            record(None, Some(2020), Some(8.0)),
            record(Some("kerala"), Some(2020), Some(7.7)),
        ]
    }

    #[test]
    fn test_region_filter_is_exact_and_excludes_missing() {
        let kept = filter_by_region(sample(), Some("Kerala"));
        assert_eq!(kept.len(), 2, "case differs for 'kerala'; missing region is excluded");
        assert!(kept.iter().all(|r| r.region.as_deref() == Some("Kerala")));
    }

    #[test]
    fn test_year_filter_excludes_missing_year() {
        let kept = filter_by_year(sample(), Some(2020));
        assert_eq!(kept.len(), 4);
        assert!(kept.iter().all(|r| r.year == Some(2020)));
    }

    #[test]
    fn test_unset_filters_pass_everything_through() {
        assert_eq!(filter_by_region(sample(), None), sample());
        assert_eq!(filter_by_year(sample(), None), sample());
        assert_eq!(Selection::default().apply(sample()), sample());
    }

    #[test]
    fn test_filter_order_does_not_matter() {
        let regions = [None, Some("Kerala"), Some("Goa"), Some("Nowhere")];
        let years = [None, Some(2020), Some(2021), Some(1999)];
        for region in regions {
            for year in years {
                let region_first = filter_by_year(filter_by_region(sample(), region), year);
                let year_first = filter_by_region(filter_by_year(sample(), year), region);
                assert_eq!(region_first, year_first, "region={:?} year={:?}", region, year);
            }
        }
    }

    #[test]
    fn test_distinct_values_are_sorted_and_unique() {
        assert_eq!(distinct_regions(&sample()), vec!["Goa", "Kerala", "kerala"]);
        assert_eq!(distinct_years(&sample()), vec![2020, 2021]);
    }

    #[test]
    fn test_distinct_values_of_empty_set_are_empty() {
        assert!(distinct_regions(&[]).is_empty());
        assert!(distinct_years(&[]).is_empty());
    }

    #[test]
    fn test_default_selection_picks_first_region_then_its_first_year() {
        let records = vec![
            record(Some("Kerala"), Some(2018), None),
            record(Some("Goa"), Some(2021), None),
            record(Some("Goa"), Some(2019), None),
        ];
        let selection = Selection::default().with_defaults(&records);
        assert_eq!(selection, Selection::new(Some("Goa".to_string()), Some(2019)));
    }

    #[test]
    fn test_explicit_selection_is_kept() {
        let selection = Selection::new(Some("Kerala".to_string()), None).with_defaults(&sample());
        assert_eq!(selection.region.as_deref(), Some("Kerala"));
        assert_eq!(selection.year, Some(2020));
    }

    #[test]
    fn test_default_selection_of_empty_set_is_empty() {
        let selection = Selection::default().with_defaults(&[]);
        assert!(selection.is_empty());
    }
}
