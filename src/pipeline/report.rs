//! Structured result of one extraction run.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{MetadataIssue, PerIconError};
use crate::geometry::GridSpec;

/// What happened to one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IconOutcome {
    /// The icon was written.
    Success {
        /// Output file.
        output: PathBuf,
    },
    /// The icon was skipped.
    Failed {
        /// Why.
        error: PerIconError,
    },
}

/// One manifest entry and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IconRecord {
    /// Zero-based grid index (manifest line order).
    pub index: u32,
    /// Name as listed in the manifest.
    pub filename: String,
    /// Whether the output name came from the icon name map.
    pub resolved: bool,
    /// Result for this entry.
    #[serde(flatten)]
    pub outcome: IconOutcome,
}

/// What happened to the full-sheet snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SnapshotOutcome {
    /// Disabled by configuration.
    #[default]
    Skipped,
    /// Snapshot written.
    Written {
        /// Output file.
        path: PathBuf,
    },
    /// Snapshot could not be written; icons were still processed.
    Failed {
        /// Intended output file.
        path: PathBuf,
        /// Encoder message.
        message: String,
    },
}

/// Ordered per-icon results plus run-level totals.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    /// Geometry used for slicing.
    pub grid: GridSpec,
    /// Cells per sheet row derived from `grid`.
    pub per_row: u32,
    /// Entries in manifest order.
    pub items: Vec<IconRecord>,
    /// Icons written.
    pub succeeded: usize,
    /// Icons that failed.
    pub failed: usize,
    /// Writes that replaced a file written earlier in the same run.
    pub overwritten: usize,
    /// Full-sheet snapshot result.
    pub snapshot: SnapshotOutcome,
    /// Name metadata problems that were skipped.
    pub name_issues: Vec<MetadataIssue>,
}

impl ExtractionReport {
    /// Empty report for a run over `grid`.
    pub fn new(grid: GridSpec, per_row: u32) -> Self {
        Self {
            grid,
            per_row,
            items: Vec::new(),
            succeeded: 0,
            failed: 0,
            overwritten: 0,
            snapshot: SnapshotOutcome::Skipped,
            name_issues: Vec::new(),
        }
    }

    /// Append a record, keeping the totals in step.
    pub fn push(&mut self, record: IconRecord) {
        match record.outcome {
            IconOutcome::Success { .. } => self.succeeded += 1,
            IconOutcome::Failed { .. } => self.failed += 1,
        }
        self.items.push(record);
    }

    /// Number of manifest entries processed.
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Failed entries, in manifest order.
    pub fn failures(&self) -> impl Iterator<Item = (&IconRecord, &PerIconError)> {
        self.items.iter().filter_map(|item| match &item.outcome {
            IconOutcome::Failed { error } => Some((item, error)),
            IconOutcome::Success { .. } => None,
        })
    }

    /// Whether every entry succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
