//! End-to-end extraction run.
//!
//! [`run`] checks the selected inputs, decodes the sheet, parses the
//! manifest, resolves icon names, writes an optional sheet snapshot and then
//! hands everything to the [`Extractor`].

pub mod extractor;
pub mod report;

use std::path::{Path, PathBuf};

pub use extractor::{Extractor, output_file_name};
pub use report::{ExtractionReport, IconOutcome, IconRecord, SnapshotOutcome};

use image::RgbaImage;

use crate::config::ExtractionRequest;
use crate::error::{PreconditionError, Result};
use crate::geometry::Rect;
use crate::image_io::{IconEncoder, SheetDecoder};
use crate::manifest::Manifest;
use crate::names::resolve_names;
use crate::progress::{ProgressCallback, ProgressEvent, emit};

/// Input paths that passed [`check_preconditions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedInputs {
    /// Existing sheet image file.
    pub sheet: PathBuf,
    /// Existing manifest file.
    pub manifest: PathBuf,
    /// Existing output directory.
    pub output_dir: PathBuf,
}

/// Verify that the sheet, manifest and output directory are selected and usable.
///
/// Nothing is read or written; the first problem found is returned.
///
/// # Errors
///
/// Returns the matching [`PreconditionError`].
pub fn check_preconditions(
    request: &ExtractionRequest,
) -> std::result::Result<CheckedInputs, PreconditionError> {
    let sheet = request
        .sheet
        .clone()
        .ok_or(PreconditionError::SheetNotSelected)?;
    if !sheet.exists() {
        return Err(PreconditionError::SheetMissing(sheet));
    }
    if !sheet.is_file() {
        return Err(PreconditionError::SheetUnreadable {
            path: sheet,
            reason: "not a file".to_owned(),
        });
    }

    let manifest = request
        .manifest
        .clone()
        .ok_or(PreconditionError::ManifestNotSelected)?;
    if !manifest.exists() {
        return Err(PreconditionError::ManifestMissing(manifest));
    }
    if !manifest.is_file() {
        return Err(PreconditionError::ManifestUnreadable {
            path: manifest,
            reason: "not a file".to_owned(),
        });
    }

    let Some(output_dir) = request.output_dir.clone() else {
        return Err(PreconditionError::OutputDirUnusable {
            path: PathBuf::new(),
            reason: "not selected".to_owned(),
        });
    };
    if !output_dir.exists() {
        return Err(PreconditionError::OutputDirUnusable {
            path: output_dir,
            reason: "does not exist".to_owned(),
        });
    }
    if !output_dir.is_dir() {
        return Err(PreconditionError::OutputDirUnusable {
            path: output_dir,
            reason: "not a directory".to_owned(),
        });
    }

    Ok(CheckedInputs {
        sheet,
        manifest,
        output_dir,
    })
}

/// Run one extraction with `codec` decoding the sheet and encoding icons.
///
/// # Errors
///
/// Fails before any icon is written if a precondition does not hold, the
/// sheet cannot be decoded or the manifest header is invalid. Per-icon
/// failures are recorded in the returned report instead.
pub fn run<C>(
    request: &ExtractionRequest,
    codec: &C,
    progress: Option<ProgressCallback>,
) -> Result<ExtractionReport>
where
    C: SheetDecoder + IconEncoder + ?Sized,
{
    let inputs = check_preconditions(request)?;

    let sheet = codec
        .decode(&inputs.sheet)
        .map_err(|e| PreconditionError::SheetUnreadable {
            path: inputs.sheet.clone(),
            reason: e.to_string(),
        })?;
    tracing::info!(
        path = %inputs.sheet.display(),
        width = sheet.width(),
        height = sheet.height(),
        "sheet decoded"
    );
    emit(
        progress.as_ref(),
        ProgressEvent::SheetDecoded {
            width: sheet.width(),
            height: sheet.height(),
        },
    );

    let manifest = Manifest::load(&inputs.manifest, &request.decoder, request.grid_unit)?;
    manifest.grid.per_row()?;

    let names = resolve_names(&request.names, request.decoder);
    for issue in &names.issues {
        tracing::warn!(issue = ?issue, "skipped icon name metadata");
    }
    emit(
        progress.as_ref(),
        ProgressEvent::NamesResolved {
            entries: names.map.len(),
            issues: names.issues.len(),
        },
    );

    let snapshot = match request.snapshot_dir.as_deref() {
        Some(dir) => write_snapshot(codec, &sheet, &inputs.sheet, dir),
        None => SnapshotOutcome::Skipped,
    };

    let reserved = match &snapshot {
        SnapshotOutcome::Written { path } => Some(path.clone()),
        SnapshotOutcome::Skipped | SnapshotOutcome::Failed { .. } => None,
    };
    let mut report = Extractor::new(codec)
        .with_progress(progress)
        .with_snapshot(reserved)
        .extract(&sheet, &manifest, &inputs.output_dir, &names.map)?;
    report.snapshot = snapshot;
    report.name_issues = names.issues;
    Ok(report)
}

/// Path of the full-sheet snapshot: `<dir>/<sheet stem>.png`.
pub fn snapshot_path(sheet: &Path, dir: &Path) -> PathBuf {
    let stem = sheet
        .file_stem()
        .map_or_else(|| "sheet".into(), |s| s.to_string_lossy());
    dir.join(format!("{stem}.png"))
}

fn write_snapshot<E: IconEncoder + ?Sized>(
    encoder: &E,
    sheet: &RgbaImage,
    sheet_path: &Path,
    dir: &Path,
) -> SnapshotOutcome {
    let path = snapshot_path(sheet_path, dir);
    let whole = Rect {
        x: 0,
        y: 0,
        width: sheet.width(),
        height: sheet.height(),
    };
    match encoder.encode_region(sheet, whole, &path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "sheet snapshot written");
            SnapshotOutcome::Written { path }
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "sheet snapshot failed");
            SnapshotOutcome::Failed {
                path,
                message: e.to_string(),
            }
        }
    }
}
