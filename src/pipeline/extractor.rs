//! Per-icon slicing loop.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use super::report::{ExtractionReport, IconOutcome, IconRecord};
use crate::error::{PerIconError, PreconditionError, Result};
use crate::geometry::{GridSpec, GridUnit, Rect, cell_rect};
use crate::image_io::IconEncoder;
use crate::manifest::Manifest;
use crate::names::IconNameMap;
use crate::progress::{ProgressCallback, ProgressEvent, emit};

/// Slices a decoded sheet into named icon files.
pub struct Extractor<'a, E: IconEncoder + ?Sized> {
    encoder: &'a E,
    progress: Option<ProgressCallback>,
    snapshot: Option<PathBuf>,
}

impl<'a, E: IconEncoder + ?Sized> Extractor<'a, E> {
    /// Create an extractor writing through `encoder`.
    pub fn new(encoder: &'a E) -> Self {
        Self {
            encoder,
            progress: None,
            snapshot: None,
        }
    }

    /// Report progress through `callback`.
    pub fn with_progress(mut self, callback: Option<ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Refuse to write any icon over the sheet snapshot at `path`.
    pub fn with_snapshot(mut self, path: Option<PathBuf>) -> Self {
        self.snapshot = path;
        self
    }

    /// Crop every manifest entry out of `sheet` and write it to `output_dir`.
    ///
    /// Entry `k` of the manifest is always grid cell `k`, whatever happened to
    /// earlier entries. Per-entry failures are recorded in the report.
    ///
    /// # Errors
    ///
    /// Fails only if the grid yields no cells per row or `output_dir` is not
    /// a directory.
    pub fn extract(
        &self,
        sheet: &RgbaImage,
        manifest: &Manifest,
        output_dir: &Path,
        names: &IconNameMap,
    ) -> Result<ExtractionReport> {
        let per_row = manifest.grid.per_row()?;
        if !output_dir.is_dir() {
            return Err(PreconditionError::OutputDirUnusable {
                path: output_dir.to_path_buf(),
                reason: "not a directory".to_owned(),
            }
            .into());
        }
        warn_on_sheet_mismatch(&manifest.grid, per_row, sheet);

        let mut report = ExtractionReport::new(manifest.grid, per_row);
        let mut written: HashSet<PathBuf> = HashSet::new();
        emit(
            self.progress.as_ref(),
            ProgressEvent::ExtractionStarted {
                total: manifest.names.len(),
            },
        );

        for (i, filename) in manifest.names.iter().enumerate() {
            let index = u32::try_from(i).unwrap_or(u32::MAX);
            let resolved = names.contains(filename);
            let rect = cell_rect(index, manifest.grid.cell, per_row)?;
            let outcome = match self.extract_one(filename, rect, sheet, output_dir, names) {
                Ok(path) => {
                    if !written.insert(path.clone()) {
                        report.overwritten += 1;
                        tracing::warn!(index, path = %path.display(), "output written twice, later icon kept");
                    }
                    tracing::debug!(index, filename = %filename, path = %path.display(), "icon written");
                    emit(
                        self.progress.as_ref(),
                        ProgressEvent::IconWritten {
                            index,
                            filename: filename.clone(),
                            path: path.clone(),
                        },
                    );
                    IconOutcome::Success { output: path }
                }
                Err(error) => {
                    tracing::warn!(index, filename = %filename, error = %error, "icon failed");
                    emit(
                        self.progress.as_ref(),
                        ProgressEvent::IconFailed {
                            index,
                            filename: filename.clone(),
                            error: error.clone(),
                        },
                    );
                    IconOutcome::Failed { error }
                }
            };
            report.push(IconRecord {
                index,
                filename: filename.clone(),
                resolved,
                outcome,
            });
        }

        emit(
            self.progress.as_ref(),
            ProgressEvent::ExtractionFinished {
                succeeded: report.succeeded,
                failed: report.failed,
            },
        );
        tracing::info!(
            total = report.total(),
            succeeded = report.succeeded,
            failed = report.failed,
            "extraction finished"
        );
        Ok(report)
    }

    fn extract_one(
        &self,
        filename: &str,
        rect: Rect,
        sheet: &RgbaImage,
        output_dir: &Path,
        names: &IconNameMap,
    ) -> std::result::Result<PathBuf, PerIconError> {
        let output_name = output_file_name(filename, names)?;
        if !rect.fits_within(sheet.width(), sheet.height()) {
            return Err(PerIconError::OutOfBounds {
                rect,
                sheet_width: sheet.width(),
                sheet_height: sheet.height(),
            });
        }

        let path = output_dir.join(output_name);
        if let Some(snapshot) = &self.snapshot
            && same_output(&path, snapshot)
        {
            return Err(PerIconError::SnapshotCollision {
                path: snapshot.clone(),
            });
        }
        self.encoder
            .encode_region(sheet, rect, &path)
            .map_err(|e| PerIconError::Write {
                path: path.clone(),
                message: e.to_string(),
            })?;
        Ok(path)
    }
}

/// Output file name for a manifest entry.
///
/// Mapped icons become `<id>.png`; anything else keeps its manifest name,
/// lower-cased, with the last extension swapped for `.png` (`.dds` becomes
/// `.png`).
///
/// # Errors
///
/// Blank names are [`PerIconError::EmptyName`]. Names containing a path
/// separator, and the bare `.` and `..` entries, are
/// [`PerIconError::InvalidName`].
pub fn output_file_name(filename: &str, names: &IconNameMap) -> std::result::Result<String, PerIconError> {
    let filename = filename.trim();
    if filename.is_empty() {
        return Err(PerIconError::EmptyName);
    }
    let invalid = || PerIconError::InvalidName {
        name: filename.to_owned(),
    };
    let base = match names.get(filename) {
        Some(id) => format!("{id}.png"),
        None => {
            let lower = filename.to_lowercase();
            if lower == "." || lower == ".." || lower.contains(['/', '\\']) {
                return Err(invalid());
            }
            let stem = lower.rfind('.').map_or(lower.as_str(), |dot| &lower[..dot]);
            format!("{stem}.png")
        }
    };
    if base.contains(['/', '\\']) {
        return Err(invalid());
    }
    Ok(base)
}

/// Whether two output paths name the same file. File names compare without
/// ASCII case; directories compare after canonicalisation when possible.
fn same_output(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    let names_match = match (a.file_name(), b.file_name()) {
        (Some(x), Some(y)) => x.to_string_lossy().eq_ignore_ascii_case(&y.to_string_lossy()),
        _ => false,
    };
    if !names_match {
        return false;
    }
    match (a.parent(), b.parent()) {
        (Some(x), Some(y)) if x == y => true,
        (Some(x), Some(y)) => match (x.canonicalize(), y.canonicalize()) {
            (Ok(x), Ok(y)) => x == y,
            _ => false,
        },
        _ => false,
    }
}

fn warn_on_sheet_mismatch(grid: &GridSpec, per_row: u32, sheet: &RgbaImage) {
    let (expected_width, expected_height) = match grid.unit {
        GridUnit::Pixels => (grid.sheet_width, grid.sheet_height),
        GridUnit::Cells => (
            per_row.saturating_mul(grid.cell.width),
            grid.sheet_height.saturating_mul(grid.cell.height),
        ),
    };
    if (expected_width, expected_height) != sheet.dimensions() {
        tracing::warn!(
            manifest_width = expected_width,
            manifest_height = expected_height,
            sheet_width = sheet.width(),
            sheet_height = sheet.height(),
            "manifest sheet size differs from decoded image"
        );
    }
}
