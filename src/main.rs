//! Match summary: one-shot snapshot consolidation.
//!
//! Reads the collector snapshot, assembles one summary per live event, writes
//! the summary document and reports odds coverage. All policy lives in the
//! library; this binary only does I/O around `assemble`.

use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use match_summary::{assemble, OddsCoverage, RunConfig, Snapshot, SummaryDocument};

/// Load, assemble, write. Returns the number of summaries written.
async fn run_once(config: &RunConfig) -> Result<usize> {
    let started = Instant::now();

    let snapshot = Snapshot::from_path(&config.snapshot_path)
        .await
        .with_context(|| format!("Failed to load snapshot {}", config.snapshot_path.display()))?;

    let summaries = assemble(&snapshot.events, &snapshot.tables, &config.engine);

    let coverage = OddsCoverage::from_summaries(&summaries);
    info!(
        "Odds coverage over {} in-play matches: {:?}",
        coverage.in_play_matches, coverage.populated
    );
    if coverage.has_field_mismatch() {
        warn!(
            "money_line_american populated for {} matches but money_line only for {}",
            coverage.count("money_line_american"),
            coverage.count("money_line")
        );
    }

    let document = SummaryDocument::new(
        summaries,
        &config.snapshot_path,
        &config.summary_path,
        started.elapsed(),
    );
    document
        .write_to(&config.summary_path)
        .await
        .with_context(|| format!("Failed to write summary {}", config.summary_path.display()))?;

    info!(
        "Processed {} matches ({} in play) in {}",
        document.metadata.total_matches,
        document.metadata.in_play_matches,
        document.metadata.processing_time
    );
    Ok(document.metadata.total_matches)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Optional .env; real environment wins
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("match_summary=info".parse()?),
        )
        .init();

    info!("Match Summary Engine v{}", env!("CARGO_PKG_VERSION"));

    let config = RunConfig::from_env()?;
    info!(
        "Snapshot: {}, summary: {}, minutes {}-{}",
        config.snapshot_path.display(),
        config.summary_path.display(),
        config.engine.minute_window.min,
        config.engine.minute_window.max
    );

    match run_once(&config).await {
        Ok(count) => {
            info!("Run completed: {} summaries written", count);
            Ok(())
        }
        Err(e) => {
            error!("Run failed: {:?}", e);
            Err(e)
        }
    }
}
