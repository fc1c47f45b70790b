//! Pipeline entry points.
//!
//! - `diff`: Compare current download counts against the stored snapshot
//! - `run_pipeline`: Load, fetch, diff, deliver and save in one pass

pub mod diff;
pub mod run;

pub use diff::{DeltaEntry, DeltaReport, diff};
pub use run::{DeliveryOutcome, RunOptions, RunSummary, Stage, run_pipeline};
