//! Grid geometry for icon sheets.
//!
//! Icons are laid out row-major: index 0 is the top-left cell, indices grow
//! left to right and wrap to the next row after `per_row` cells.

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};

/// Pixel rectangle inside a sheet image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Whether the rectangle lies entirely inside a `width` x `height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        let right = u64::from(self.x) + u64::from(self.width);
        let bottom = u64::from(self.y) + u64::from(self.height);
        right <= u64::from(width) && bottom <= u64::from(height)
    }
}

/// Size of one icon cell in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSize {
    /// Cell width in pixels.
    pub width: u32,
    /// Cell height in pixels.
    pub height: u32,
}

/// How the second pair of manifest header values is interpreted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridUnit {
    /// Sheet height/width in pixels; cells per row is `sheet_width / cell_width`.
    #[default]
    Pixels,
    /// Row/column counts; the second value is the number of cells per row.
    Cells,
}

/// Grid geometry read from a manifest header. Immutable after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridSpec {
    /// Size of each icon cell.
    pub cell: CellSize,
    /// First sheet value from the header (pixel height, or row count).
    pub sheet_height: u32,
    /// Second sheet value from the header (pixel width, or column count).
    pub sheet_width: u32,
    /// Unit of `sheet_height` / `sheet_width`.
    pub unit: GridUnit,
}

impl GridSpec {
    /// Number of cells in one sheet row.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidGridSpec`] when the count is zero.
    pub fn per_row(&self) -> Result<u32> {
        let per_row = match self.unit {
            GridUnit::Pixels => {
                if self.cell.width == 0 {
                    return Err(ExtractError::InvalidGridSpec {
                        reason: "cell width is zero".to_owned(),
                    });
                }
                self.sheet_width / self.cell.width
            }
            GridUnit::Cells => self.sheet_width,
        };
        if per_row == 0 {
            return Err(ExtractError::InvalidGridSpec {
                reason: format!(
                    "sheet width {} holds no {}px cells per row",
                    self.sheet_width, self.cell.width
                ),
            });
        }
        Ok(per_row)
    }
}

/// Pixel rectangle of the `index`-th cell in a row-major grid.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidGridSpec`] when `per_row` is zero.
pub fn cell_rect(index: u32, cell: CellSize, per_row: u32) -> Result<Rect> {
    if per_row == 0 {
        return Err(ExtractError::InvalidGridSpec {
            reason: "zero cells per row".to_owned(),
        });
    }
    let row = index / per_row;
    let col = index % per_row;
    let x = col.checked_mul(cell.width);
    let y = row.checked_mul(cell.height);
    match (x, y) {
        (Some(x), Some(y)) => Ok(Rect {
            x,
            y,
            width: cell.width,
            height: cell.height,
        }),
        // Only reachable for absurd indices; saturate so the caller's bounds
        // check reports it as an out-of-bounds cell.
        _ => Ok(Rect {
            x: x.unwrap_or(u32::MAX),
            y: y.unwrap_or(u32::MAX),
            width: cell.width,
            height: cell.height,
        }),
    }
}
