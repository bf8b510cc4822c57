//! Icon manifest parsing.
//!
//! A manifest is a legacy-encoded text file:
//!
//! ```text
//! 32          cell height
//! 32          cell width
//! 256         sheet height
//! 256         sheet width
//! fx_fire.dds first icon  -> grid index 0
//! fx_ice.dds  second icon -> grid index 1
//! ...
//! ```

use std::path::Path;

use crate::error::{ExtractError, PreconditionError, Result};
use crate::geometry::{CellSize, GridSpec, GridUnit};
use crate::text::LegacyDecoder;

/// Number of integer lines before the icon names.
const HEADER_LINES: usize = 4;

/// Parsed manifest: grid geometry plus icon names in grid order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Grid geometry from the header.
    pub grid: GridSpec,
    /// Icon filenames; position in this list is the grid index.
    pub names: Vec<String>,
}

impl Manifest {
    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// A missing or unreadable file is a [`PreconditionError`]; a bad header
    /// is [`ExtractError::ManifestHeader`] or [`ExtractError::InvalidGridSpec`].
    pub fn load(path: &Path, decoder: &LegacyDecoder, unit: GridUnit) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PreconditionError::ManifestMissing(path.to_path_buf())
            } else {
                PreconditionError::ManifestUnreadable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        })?;
        let manifest = Self::parse(&decoder.decode(&bytes), unit)?;
        tracing::info!(
            path = %path.display(),
            icons = manifest.names.len(),
            cell_width = manifest.grid.cell.width,
            cell_height = manifest.grid.cell.height,
            "manifest loaded"
        );
        Ok(manifest)
    }

    /// Parse already-decoded manifest text.
    ///
    /// # Errors
    ///
    /// See [`Manifest::load`].
    pub fn parse(text: &str, unit: GridUnit) -> Result<Self> {
        let mut lines = text.lines();
        let mut header = [0_u32; HEADER_LINES];
        for (i, slot) in header.iter_mut().enumerate() {
            let line = lines.next().ok_or_else(|| ExtractError::ManifestHeader {
                line: i + 1,
                reason: "missing".to_owned(),
            })?;
            *slot = parse_header_value(line, i + 1)?;
        }
        let [cell_height, cell_width, sheet_height, sheet_width] = header;

        let names = lines.map(|line| line.trim().to_owned()).collect();

        Ok(Self {
            grid: GridSpec {
                cell: CellSize {
                    width: cell_width,
                    height: cell_height,
                },
                sheet_height,
                sheet_width,
                unit,
            },
            names,
        })
    }
}

fn parse_header_value(line: &str, line_number: usize) -> Result<u32> {
    let value: i64 = line
        .trim()
        .parse()
        .map_err(|e| ExtractError::ManifestHeader {
            line: line_number,
            reason: format!("{:?} is not an integer: {e}", line.trim()),
        })?;
    if value <= 0 {
        return Err(ExtractError::InvalidGridSpec {
            reason: format!("header line {line_number} must be positive, got {value}"),
        });
    }
    u32::try_from(value).map_err(|_| ExtractError::InvalidGridSpec {
        reason: format!("header line {line_number} value {value} is too large"),
    })
}
