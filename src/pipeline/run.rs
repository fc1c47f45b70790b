// src/pipeline/run.rs

//! One pass of the stats pipeline.
//!
//! `load → fetch → diff → send → save`. Loading and fetching are fatal on
//! failure and leave the stored snapshot alone. Delivery never is: whatever
//! Bark answers, the fresh counts are saved so the next run diffs against
//! them.

use std::fmt;

use crate::error::Result;
use crate::models::{DeliveryResult, Snapshot};
use crate::pipeline::{DeltaReport, diff};
use crate::services::{BarkClient, CatalogFetcher};
use crate::storage::SnapshotStore;
use crate::utils::http::truncate_body;

/// Where a run currently is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Loaded,
    Fetched,
    Diffed,
    Sent,
    Saved,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Loaded => "loaded",
            Stage::Fetched => "fetched",
            Stage::Diffed => "diffed",
            Stage::Sent => "sent",
            Stage::Saved => "saved",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What happened to the push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Bark answered 200
    Delivered(DeliveryResult),
    /// Bark answered with another status
    Rejected(DeliveryResult),
    /// The request could not be built or sent
    Errored(String),
    /// Dry run, nothing was sent
    Skipped,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered(_))
    }
}

/// Run switches.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Fetch and diff only; do not send and do not save
    pub dry_run: bool,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stage: Stage,
    pub report: DeltaReport,
    pub delivery: DeliveryOutcome,
}

impl RunSummary {
    pub fn item_count(&self) -> usize {
        self.report.len()
    }
}

struct StageTracker {
    stage: Stage,
}

impl StageTracker {
    fn new() -> Self {
        Self { stage: Stage::Idle }
    }

    fn advance(&mut self, next: Stage) {
        log::debug!("Pipeline: {} -> {}", self.stage, next);
        self.stage = next;
    }

    /// Mark the run failed and hand the error back.
    fn fail<T>(&mut self, err: crate::error::AppError) -> Result<T> {
        log::error!("Pipeline failed after stage '{}': {}", self.stage, err);
        self.stage = Stage::Failed;
        Err(err)
    }
}

/// Run one pass of the pipeline.
pub async fn run_pipeline(
    store: &dyn SnapshotStore,
    fetcher: &CatalogFetcher,
    bark: &BarkClient,
    options: &RunOptions,
) -> Result<RunSummary> {
    let mut tracker = StageTracker::new();

    let previous = match store.load().await {
        Ok(snapshot) => snapshot,
        Err(e) => return tracker.fail(e),
    };
    tracker.advance(Stage::Loaded);

    let items = match fetcher.fetch().await {
        Ok(items) => items,
        Err(e) => return tracker.fail(e),
    };
    tracker.advance(Stage::Fetched);

    let report = diff(&items, &previous);
    tracker.advance(Stage::Diffed);
    log::info!(
        "Report: {} extensions, {} with new downloads (+{} total)",
        report.len(),
        report.changed_count(),
        report.total_increase()
    );

    if options.dry_run {
        log::info!("Dry run, skipping delivery and snapshot save");
        for line in report.render().lines() {
            log::info!("    {}", line);
        }
        return Ok(RunSummary {
            stage: tracker.stage,
            report,
            delivery: DeliveryOutcome::Skipped,
        });
    }

    let delivery = deliver(bark, &report).await;
    tracker.advance(Stage::Sent);

    if let Err(e) = store.save(&Snapshot::from_items(&items)).await {
        return tracker.fail(e);
    }
    tracker.advance(Stage::Saved);

    Ok(RunSummary {
        stage: tracker.stage,
        report,
        delivery,
    })
}

/// Push the report and log the outcome; never fails the run.
async fn deliver(bark: &BarkClient, report: &DeltaReport) -> DeliveryOutcome {
    match bark.send(report).await {
        Ok(result) if result.success => {
            log::info!("Delivery succeeded: {}", result.status_code);
            DeliveryOutcome::Delivered(result)
        }
        Ok(result) => {
            log::error!(
                "Delivery failed: {} - {}",
                result.status_code,
                truncate_body(result.body.as_deref().unwrap_or(""), 500)
            );
            DeliveryOutcome::Rejected(result)
        }
        Err(e) => {
            log::error!("Delivery failed: {}", e);
            DeliveryOutcome::Errored(e.to_string())
        }
    }
}
