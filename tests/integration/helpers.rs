//! Shared fixtures for integration tests.

use std::path::{Path, PathBuf};

use icon_extractor::{ExtractionRequest, ExtractorConfig, NameSourceKind};
use image::{Rgba, RgbaImage};

/// Solid colour of grid cell `index` in [`write_sheet`] fixtures.
pub(crate) fn cell_colour(index: u32) -> Rgba<u8> {
    let i = u8::try_from(index % 251).expect("fits");
    Rgba([i, 255 - i, i.wrapping_mul(7), 255])
}

/// Write a PNG sheet of `cols` x `rows` cells, each `cell` pixels square and
/// filled with [`cell_colour`] of its row-major index.
pub(crate) fn write_sheet(path: &Path, cell: u32, cols: u32, rows: u32) {
    let sheet = RgbaImage::from_fn(cell * cols, cell * rows, |x, y| {
        cell_colour((y / cell) * cols + x / cell)
    });
    sheet.save(path).expect("write sheet fixture");
}

/// Write a UTF-8 manifest with the four header values followed by `names`.
pub(crate) fn write_manifest(path: &Path, header: [u32; 4], names: &[&str]) {
    let mut text = String::new();
    for value in header {
        text.push_str(&format!("{value}\r\n"));
    }
    for name in names {
        text.push_str(name);
        text.push_str("\r\n");
    }
    std::fs::write(path, text).expect("write manifest fixture");
}

/// Working directory with `sheet.png`, `iconlist.txt` and an `out/` directory.
pub(crate) struct Workspace {
    pub dir: tempfile::TempDir,
    pub sheet: PathBuf,
    pub manifest: PathBuf,
    pub out: PathBuf,
}

impl Workspace {
    pub(crate) fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let sheet = dir.path().join("sheet.png");
        let manifest = dir.path().join("iconlist.txt");
        let out = dir.path().join("out");
        std::fs::create_dir(&out).expect("create out dir");
        Self {
            dir,
            sheet,
            manifest,
            out,
        }
    }

    /// Config pointing at this workspace's files, without a name source.
    pub(crate) fn config(&self) -> ExtractorConfig {
        let mut config = ExtractorConfig::default();
        config.input.sheet = Some(self.sheet.clone());
        config.input.manifest = Some(self.manifest.clone());
        config.output.dir = Some(self.out.clone());
        config
    }

    /// Request using static headers from `headers_dir`.
    pub(crate) fn request_with_headers(&self, headers_dir: &Path) -> ExtractionRequest {
        let mut config = self.config();
        config.names.source = NameSourceKind::StaticHeaders;
        config.names.headers.dir = Some(headers_dir.to_path_buf());
        config.to_request().expect("valid request")
    }

    /// Sorted file names in the output directory.
    pub(crate) fn outputs(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.out)
            .expect("read out dir")
            .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
