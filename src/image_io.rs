//! Image codec collaborators: decoding the sheet and writing icons.
//!
//! The pipeline only talks to [`SheetDecoder`] and [`IconEncoder`]; the
//! default [`ImageCodec`] decodes DDS sheets through `image_dds` and any other
//! raster format through `image`, and always writes PNG.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{ImageFormat, RgbaImage};

use crate::error::CodecError;
use crate::geometry::Rect;

/// Decodes a sheet image into RGBA pixels.
pub trait SheetDecoder {
    /// Decode the image at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if the file cannot be read or decoded.
    fn decode(&self, path: &Path) -> Result<RgbaImage, CodecError>;
}

/// Writes a rectangular region of an image as a standalone file.
pub trait IconEncoder {
    /// Write `rect` of `image` to `path`. `rect` must lie within `image`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if encoding or writing fails.
    fn encode_region(&self, image: &RgbaImage, rect: Rect, path: &Path) -> Result<(), CodecError>;
}

/// Default codec backed by `image` and `image_dds`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl ImageCodec {
    fn decode_dds(path: &Path) -> Result<RgbaImage, CodecError> {
        let file = File::open(path).map_err(|source| CodecError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dds = image_dds::ddsfile::Dds::read(BufReader::new(file)).map_err(|e| {
            CodecError::Dds {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        image_dds::image_from_dds(&dds, 0).map_err(|e| CodecError::Dds {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

impl SheetDecoder for ImageCodec {
    fn decode(&self, path: &Path) -> Result<RgbaImage, CodecError> {
        let is_dds = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("dds"));
        let image = if is_dds {
            Self::decode_dds(path)?
        } else {
            image::open(path)
                .map_err(|source| CodecError::Image {
                    path: path.to_path_buf(),
                    source,
                })?
                .to_rgba8()
        };
        tracing::debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "sheet decoded"
        );
        Ok(image)
    }
}

impl IconEncoder for ImageCodec {
    fn encode_region(&self, image: &RgbaImage, rect: Rect, path: &Path) -> Result<(), CodecError> {
        let region = image::imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height);
        region
            .to_image()
            .save_with_format(path, ImageFormat::Png)
            .map_err(|source| CodecError::Image {
                path: path.to_path_buf(),
                source,
            })
    }
}
