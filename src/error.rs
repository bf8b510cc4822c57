//! Error types for the icon extractor.
//!
//! Only [`ExtractError`] aborts a run. [`MetadataIssue`] and [`PerIconError`]
//! are collected into the run report and never stop the batch.

use std::path::PathBuf;

use serde::Serialize;

use crate::geometry::Rect;

/// Top-level error type for an extraction run.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// An input or output precondition failed before any processing started.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// The grid geometry cannot produce any icon rectangle.
    #[error("invalid grid spec: {reason}")]
    InvalidGridSpec {
        /// What is wrong with the geometry.
        reason: String,
    },

    /// One of the four manifest header lines is missing or not an integer.
    #[error("manifest header line {line}: {reason}")]
    ManifestHeader {
        /// One-based line number within the manifest.
        line: usize,
        /// Why the line was rejected.
        reason: String,
    },

    /// The configured name source could not be used at all.
    #[error("name source error: {0}")]
    NameSource(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Image decoding or encoding error.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Fatal input/output checks, each reported distinctly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    /// No sheet image was selected.
    #[error("sheet image not selected")]
    SheetNotSelected,

    /// The sheet image path does not exist.
    #[error("sheet image not found: {}", .0.display())]
    SheetMissing(PathBuf),

    /// The sheet image exists but could not be decoded.
    #[error("sheet image {} unreadable: {reason}", .path.display())]
    SheetUnreadable {
        /// Path of the sheet image.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// No manifest was selected.
    #[error("manifest not selected")]
    ManifestNotSelected,

    /// The manifest path does not exist.
    #[error("manifest not found: {}", .0.display())]
    ManifestMissing(PathBuf),

    /// The manifest exists but could not be read.
    #[error("manifest {} unreadable: {reason}", .path.display())]
    ManifestUnreadable {
        /// Path of the manifest.
        path: PathBuf,
        /// I/O message.
        reason: String,
    },

    /// The output directory is missing or not a directory.
    #[error("output directory {} unusable: {reason}", .path.display())]
    OutputDirUnusable {
        /// Path of the output directory (empty when none was selected).
        path: PathBuf,
        /// Why it cannot be used.
        reason: String,
    },
}

/// A problem with one piece of name metadata. Logged, collected, skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetadataIssue {
    /// A header file could not be read.
    #[error("failed to read {}: {reason}", .path.display())]
    UnreadableFile {
        /// The file that failed.
        path: PathBuf,
        /// I/O message.
        reason: String,
    },

    /// A header file name does not carry the expected prefix.
    #[error("{} does not start with prefix {prefix:?}", .path.display())]
    UnexpectedFileName {
        /// The skipped file.
        path: PathBuf,
        /// The prefix that was expected.
        prefix: String,
    },

    /// An icon line had no usable quoted `.dds` filename.
    #[error("{}:{line_number}: malformed icon reference", .path.display())]
    MalformedLine {
        /// The file containing the line.
        path: PathBuf,
        /// One-based line number.
        line_number: usize,
    },

    /// The whole source was unavailable; the name map stays empty.
    #[error("name source unavailable: {reason}")]
    SourceUnavailable {
        /// Why the source could not be used.
        reason: String,
    },
}

/// Failure for a single manifest entry. The run continues with the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PerIconError {
    /// The manifest line was blank.
    #[error("empty icon name")]
    EmptyName,

    /// The name would escape the output directory.
    #[error("icon name {name:?} contains a path separator")]
    InvalidName {
        /// The offending name.
        name: String,
    },

    /// The cell rectangle does not fit inside the sheet.
    #[error(
        "cell {}x{} at ({}, {}) lies outside the {sheet_width}x{sheet_height} sheet",
        .rect.width, .rect.height, .rect.x, .rect.y
    )]
    OutOfBounds {
        /// The rectangle that was requested.
        rect: Rect,
        /// Decoded sheet width in pixels.
        sheet_width: u32,
        /// Decoded sheet height in pixels.
        sheet_height: u32,
    },

    /// The output path is the full-sheet snapshot written for this run.
    #[error("output {} would overwrite the sheet snapshot", .path.display())]
    SnapshotCollision {
        /// The snapshot path.
        path: PathBuf,
    },

    /// The encoder failed to write the icon.
    #[error("failed to write {}: {message}", .path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Encoder message.
        message: String,
    },
}

/// Image codec collaborator error.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Reading or writing the file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The DDS container could not be parsed or decompressed.
    #[error("DDS decode failed for {}: {message}", .path.display())]
    Dds {
        /// File involved.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },

    /// The `image` crate rejected the data.
    #[error("image error on {}: {source}", .path.display())]
    Image {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: image::ImageError,
    },
}
