/// Daily water quality processing pipeline.
///
/// Four stages run strictly in sequence:
///   start → check_data_available → process_water_quality_data → end
///
/// A failed stage stops the run; every later stage is reported as skipped.
/// Scheduling is left to the host (cron, systemd timer); there are no
/// retries.

use std::fmt;

use serde::Serialize;

use crate::logging::{self, Component};
use crate::model::Document;
use crate::normalize::normalize_with_stats;
use crate::store::RecordStore;

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Start,
    CheckDataAvailable,
    ProcessWaterQualityData,
    End,
}

impl Stage {
    /// Execution order.
    pub const ORDER: [Stage; 4] = [
        Stage::Start,
        Stage::CheckDataAvailable,
        Stage::ProcessWaterQualityData,
        Stage::End,
    ];

    pub fn task_id(self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::CheckDataAvailable => "check_data_available",
            Stage::ProcessWaterQualityData => "process_water_quality_data",
            Stage::End => "end",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.task_id())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StageOutcome {
    Completed(String),
    Failed(String),
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineRun {
    pub started_at: String,
    pub outcomes: Vec<(Stage, StageOutcome)>,
}

impl PipelineRun {
    pub fn succeeded(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, o)| matches!(o, StageOutcome::Completed(_)))
    }

    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.outcomes.iter().find(|(s, _)| *s == stage).map(|(_, o)| o)
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Documents fetched by `check_data_available`, handed on to
/// `process_water_quality_data` so one run reads the collection once.
type Fetched = Option<Vec<Document>>;

fn run_stage(stage: Stage, store: &mut dyn RecordStore, fetched: &mut Fetched) -> Result<String, String> {
    match stage {
        Stage::Start | Stage::End => Ok("ok".to_string()),
        Stage::CheckDataAvailable => {
            let docs = store.fetch_all().map_err(|e| e.to_string())?;
            if docs.is_empty() {
                return Err("collection is empty".to_string());
            }
            let detail = format!("{} records available", docs.len());
            *fetched = Some(docs);
            Ok(detail)
        }
        Stage::ProcessWaterQualityData => {
            let docs = match fetched.take() {
                Some(docs) => docs,
                None => store.fetch_all().map_err(|e| e.to_string())?,
            };
            let (records, stats) = normalize_with_stats(&docs);
            logging::log_normalize_summary(&stats);
            Ok(format!(
                "{} records normalized, {} values dropped",
                records.len(),
                stats.total_unparseable()
            ))
        }
    }
}

/// Runs every stage in order against `store`.
pub fn run_pipeline(store: &mut dyn RecordStore) -> PipelineRun {
    let mut run = PipelineRun {
        started_at: chrono::Utc::now().to_rfc3339(),
        outcomes: Vec::with_capacity(Stage::ORDER.len()),
    };
    let mut failed = false;
    let mut fetched: Fetched = None;

    for stage in Stage::ORDER {
        if failed {
            run.outcomes.push((stage, StageOutcome::Skipped));
            continue;
        }

        match run_stage(stage, store, &mut fetched) {
            Ok(detail) => {
                logging::info(Component::Pipeline, None, &format!("{}: {}", stage, detail));
                run.outcomes.push((stage, StageOutcome::Completed(detail)));
            }
            Err(reason) => {
                logging::error(Component::Pipeline, None, &format!("{} failed: {}", stage, reason));
                run.outcomes.push((stage, StageOutcome::Failed(reason)));
                failed = true;
            }
        }
    }

    run
}
