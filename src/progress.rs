//! Progress event types for an extraction run.
//!
//! Provides callback-based progress reporting that decouples the pipeline
//! from presentation (the CLI renders these with an indicatif bar).

use std::path::PathBuf;

use crate::error::PerIconError;

/// Progress events emitted while a run proceeds.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The sheet image was decoded.
    SheetDecoded {
        /// Decoded width in pixels.
        width: u32,
        /// Decoded height in pixels.
        height: u32,
    },

    /// The icon name map is ready.
    NamesResolved {
        /// Number of icon names with an identifier.
        entries: usize,
        /// Number of metadata problems skipped.
        issues: usize,
    },

    /// Icon slicing is about to start.
    ExtractionStarted {
        /// Number of manifest entries.
        total: usize,
    },

    /// One icon was written.
    IconWritten {
        /// Grid index.
        index: u32,
        /// Manifest name.
        filename: String,
        /// Where it was written.
        path: PathBuf,
    },

    /// One icon failed; the run continues.
    IconFailed {
        /// Grid index.
        index: u32,
        /// Manifest name.
        filename: String,
        /// What went wrong.
        error: PerIconError,
    },

    /// All manifest entries were processed.
    ExtractionFinished {
        /// Icons written.
        succeeded: usize,
        /// Icons that failed.
        failed: usize,
    },
}

/// Callback type for receiving progress events.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Invoke `callback` if one is installed.
pub(crate) fn emit(callback: Option<&ProgressCallback>, event: ProgressEvent) {
    if let Some(callback) = callback {
        callback(event);
    }
}
