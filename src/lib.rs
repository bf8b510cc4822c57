//! Icon extractor: slices DDS icon sheets into individually named PNG files.
//!
//! A run takes three inputs:
//! - **Sheet**: one image holding a row-major grid of equally sized icons
//! - **Manifest**: legacy-encoded text giving the grid geometry and one icon
//!   filename per cell
//! - **Name source** (optional): skill metadata mapping icon filenames to
//!   skill identifiers, read from static header files or a native library
//!
//! # Architecture
//!
//! - [`manifest`] parses the grid header and icon list
//! - [`names`] builds the case-insensitive [`IconNameMap`]
//! - [`image_io`] decodes the sheet and writes PNG regions
//! - [`pipeline`] checks inputs, runs the per-icon loop and produces an
//!   [`ExtractionReport`]

pub mod config;
pub mod error;
pub mod geometry;
pub mod image_io;
pub mod manifest;
pub mod names;
pub mod pipeline;
pub mod progress;
pub mod text;

pub use config::{ExtractionRequest, ExtractorConfig, NameSourceKind};
pub use error::{ExtractError, MetadataIssue, PerIconError, PreconditionError, Result};
pub use geometry::{CellSize, GridSpec, GridUnit, Rect};
pub use image_io::ImageCodec;
pub use manifest::Manifest;
pub use names::{IconNameMap, resolve_names};
pub use pipeline::{ExtractionReport, IconOutcome, run};
pub use progress::{ProgressCallback, ProgressEvent};
