//! Run summary written after a successful run

use crate::error::{CoreError, CoreResult};
use crate::pipeline::{PipelineOutput, PipelineStats};
use crate::quality::QualityReport;
use crate::table::TableShape;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the summary inside the output directory
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

/// What a run consumed and produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub project: String,
    pub ingestion_date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stats: PipelineStats,
    pub tables: Vec<TableShape>,
    pub quality: QualityReport,
}

impl RunSummary {
    /// Summarize a finished pipeline run
    pub fn new(
        project: impl Into<String>,
        ingestion_date: NaiveDate,
        started_at: DateTime<Utc>,
        output: &PipelineOutput,
    ) -> Self {
        Self {
            project: project.into(),
            ingestion_date,
            started_at,
            finished_at: Utc::now(),
            stats: output.stats.clone(),
            tables: output.star.shapes(),
            quality: output.quality.clone(),
        }
    }

    /// Duration of the run in milliseconds
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// Write the summary as pretty JSON
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Read a previously written summary
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}
