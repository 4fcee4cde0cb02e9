//! Store Verification Module
//!
//! Checks that the configured collection is reachable and reports how usable
//! its contents are: record count and, per numeric field, how many values
//! are present, unparseable, or missing.
//!
//! Run this before pointing the dashboard at a new collection.

use chrono::Utc;
use serde::Serialize;

use crate::fields;
use crate::normalize::{FieldCoverage, normalize_with_stats};
use crate::store::RecordStore;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum VerificationStatus {
    /// Reachable, non-empty, and every numeric value parsed.
    Success,
    /// Reachable, but empty or some values had to be dropped.
    PartialSuccess,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub collection: String,
    pub status: VerificationStatus,
    pub reachable: bool,
    pub record_count: usize,
    pub coverage: Vec<FieldCoverage>,
    pub error_message: Option<String>,
}

// ============================================================================
// Verification
// ============================================================================

pub fn verify_store(store: &mut dyn RecordStore, collection: &str) -> VerificationReport {
    let mut report = VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        collection: collection.to_string(),
        status: VerificationStatus::Failed,
        reachable: false,
        record_count: 0,
        coverage: Vec::new(),
        error_message: None,
    };

    match store.fetch_all() {
        Ok(docs) => {
            report.reachable = true;
            report.record_count = docs.len();

            let (_, stats) = normalize_with_stats(&docs);
            let clean = stats.total_unparseable() == 0;
            report.coverage = stats.coverage;

            report.status = if report.record_count > 0 && clean {
                VerificationStatus::Success
            } else {
                VerificationStatus::PartialSuccess
            };
        }
        Err(e) => {
            report.error_message = Some(e.to_string());
        }
    }

    report
}

pub fn print_summary(report: &VerificationReport) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("📊 VERIFICATION SUMMARY");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!("Collection:  {}", report.collection);
    println!("Status:      {:?}", report.status);

    if !report.reachable {
        println!(
            "✗ Store unreachable: {}",
            report.error_message.as_deref().unwrap_or("Unknown")
        );
        println!("═══════════════════════════════════════════════════════════");
        return;
    }

    println!("Records:     {}", report.record_count);
    println!();
    println!("{:<30} {:>8} {:>12} {:>8}", "Field", "Present", "Unparseable", "Missing");
    for c in &report.coverage {
        let marker = if c.unparseable > 0 { "⚠" } else { " " };
        println!(
            "{}{:<29} {:>8} {:>12} {:>8}",
            marker,
            fields::label(c.field),
            c.present,
            c.unparseable,
            c.missing
        );
    }
    println!("═══════════════════════════════════════════════════════════");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, Field};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn doc(ph: serde_json::Value) -> Document {
        let mut d = Document::new();
        d.insert("PH".to_string(), ph);
        d
    }

    #[test]
    fn test_clean_collection_is_success() {
        let mut store = MemoryStore::with_documents(vec![doc(json!(7.1)), doc(json!("6.8"))]);
        let report = verify_store(&mut store, "water_quality");
        assert_eq!(report.status, VerificationStatus::Success);
        assert_eq!(report.record_count, 2);

        let ph = report.coverage.iter().find(|c| c.field == Field::Ph).expect("pH covered");
        assert_eq!(ph.present, 2);
    }

    #[test]
    fn test_dropped_values_make_partial_success() {
        let mut store = MemoryStore::with_documents(vec![doc(json!(7.1)), doc(json!("NA"))]);
        let report = verify_store(&mut store, "water_quality");
        assert_eq!(report.status, VerificationStatus::PartialSuccess);
    }

    #[test]
    fn test_empty_collection_is_partial_success() {
        let mut store = MemoryStore::new();
        let report = verify_store(&mut store, "water_quality");
        assert!(report.reachable);
        assert_eq!(report.status, VerificationStatus::PartialSuccess);
    }

    #[test]
    fn test_unreachable_store_fails() {
        let mut store = MemoryStore::new();
        store.set_unreachable(true);
        let report = verify_store(&mut store, "water_quality");
        assert_eq!(report.status, VerificationStatus::Failed);
        assert!(!report.reachable);
        assert!(report.error_message.is_some());
    }
}
