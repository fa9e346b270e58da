//! Summary document: the assembled records plus run metadata.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::OutputError;
use crate::summary::MatchSummary;

/// Schema version stamped on every document.
pub const SCHEMA_VERSION: &str = "2025-06-11";

/// Value of the document's `$schema` key.
pub const SCHEMA_URL: &str = "https://github.com/alextrx818/codexstart/schemas/match-summary/v2025-06-11";

/// Human-readable run time, e.g. `06/11/2025 03:04:05 PM UTC`.
const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p %Z";

/// Value of `metadata.source`.
pub const SOURCE: &str = "match-summary";

/// Provenance for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub source: String,
    /// Display form of the run time, see `TIMESTAMP_FORMAT`.
    pub timestamp: String,
    /// Same instant, UTC RFC 3339.
    pub generated_at: String,
    pub input_file: String,
    pub output_file: String,
    pub total_matches: usize,
    pub in_play_matches: usize,
    pub matches_with_odds: usize,
    /// e.g. `"0.42 seconds"`.
    pub processing_time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryDocument {
    pub summaries: Vec<MatchSummary>,
    pub metadata: RunMetadata,
    #[serde(rename = "$schema")]
    pub schema_url: String,
    pub version: String,
}

impl SummaryDocument {
    pub fn new(summaries: Vec<MatchSummary>, input: &Path, output: &Path, elapsed: Duration) -> Self {
        let now = Utc::now();
        let metadata = RunMetadata {
            run_id: Uuid::new_v4(),
            source: SOURCE.to_string(),
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
            generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            input_file: input.display().to_string(),
            output_file: output.display().to_string(),
            total_matches: summaries.len(),
            in_play_matches: summaries.iter().filter(|s| s.is_in_play()).count(),
            matches_with_odds: summaries.iter().filter(|s| s.has_odds()).count(),
            processing_time: format_elapsed(elapsed),
        };

        Self {
            summaries,
            metadata,
            schema_url: SCHEMA_URL.to_string(),
            version: SCHEMA_VERSION.to_string(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, OutputError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize fully, then write in one call.
    pub async fn write_to(&self, path: &Path) -> Result<PathBuf, OutputError> {
        let body = self.to_json_pretty()?;
        tokio::fs::write(path, body)
            .await
            .map_err(|source| OutputError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            "Wrote {} summaries to {} (run {})",
            self.metadata.total_matches,
            path.display(),
            self.metadata.run_id
        );
        Ok(path.to_path_buf())
    }
}

pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2} seconds", elapsed.as_secs_f64())
}
