//! Configuration types for the icon extractor.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ExtractError, Result};
use crate::geometry::GridUnit;
use crate::text::{DEFAULT_ENCODING, LegacyDecoder};

/// Top-level configuration, usually loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Sheet image and manifest.
    pub input: InputConfig,
    /// Where icons and the sheet snapshot are written.
    pub output: OutputConfig,
    /// Icon name resolution.
    pub names: NamesConfig,
    /// Manifest grid interpretation.
    pub grid: GridConfig,
    /// Legacy text decoding.
    pub text: TextConfig,
}

/// Input files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// The DDS icon sheet.
    pub sheet: Option<PathBuf>,
    /// The manifest listing grid geometry and icon names.
    pub manifest: Option<PathBuf>,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the extracted icons. Must already exist.
    pub dir: Option<PathBuf>,
    /// Whether to write a PNG snapshot of the whole decoded sheet.
    pub snapshot: bool,
    /// Directory for the snapshot (None = same as `dir`).
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            snapshot: true,
            snapshot_dir: None,
        }
    }
}

/// Which metadata source resolves icon names.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameSourceKind {
    /// Keep manifest names for every icon.
    #[default]
    None,
    /// Scan static skill header files.
    StaticHeaders,
    /// Query a native skill table library.
    Native,
}

/// Icon name resolution settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamesConfig {
    /// Selected source.
    pub source: NameSourceKind,
    /// Static header source settings.
    pub headers: HeaderSourceConfig,
    /// Native library source settings.
    pub native: NativeSourceConfig,
}

/// Static skill header settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderSourceConfig {
    /// Directory holding `skill<ID>.h` files.
    pub dir: Option<PathBuf>,
    /// File name prefix preceding the skill id.
    pub prefix: String,
    /// Header file extension, without the dot.
    pub extension: String,
}

impl Default for HeaderSourceConfig {
    fn default() -> Self {
        Self {
            dir: None,
            prefix: "skill".to_owned(),
            extension: "h".to_owned(),
        }
    }
}

/// Native skill table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeSourceConfig {
    /// Path of the shared library.
    pub library: Option<PathBuf>,
    /// Exported initialisation function.
    pub init_symbol: String,
    /// Exported `skill id -> icon name` function.
    pub lookup_symbol: String,
    /// First skill id queried (inclusive).
    pub first_id: u32,
    /// Last skill id queried (inclusive).
    pub last_id: u32,
}

impl Default for NativeSourceConfig {
    fn default() -> Self {
        Self {
            library: None,
            init_symbol: "initStaticData".to_owned(),
            lookup_symbol: "getIcon".to_owned(),
            first_id: 1,
            last_id: 10_000,
        }
    }
}

/// Manifest grid settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Unit of the sheet values in the manifest header.
    pub unit: GridUnit,
}

/// Legacy text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// WHATWG label of the legacy encoding.
    pub encoding: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_owned(),
        }
    }
}

impl TextConfig {
    /// Resolve the configured encoding.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Config`] for unknown labels.
    pub fn decoder(&self) -> Result<LegacyDecoder> {
        LegacyDecoder::for_label(&self.encoding)
    }
}

impl ExtractorConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ExtractError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ExtractError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/icon-extractor/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("icon-extractor")
            .join("config.toml")
    }

    /// Freeze this configuration into the request for one run.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Config`] if the text encoding is unknown or the
    /// native id range is empty.
    pub fn to_request(&self) -> Result<ExtractionRequest> {
        let decoder = self.text.decoder()?;
        if self.names.source == NameSourceKind::Native
            && self.names.native.first_id > self.names.native.last_id
        {
            return Err(ExtractError::Config(format!(
                "native id range {}..={} is empty",
                self.names.native.first_id, self.names.native.last_id
            )));
        }
        let snapshot_dir = if self.output.snapshot {
            self.output
                .snapshot_dir
                .clone()
                .or_else(|| self.output.dir.clone())
        } else {
            None
        };
        Ok(ExtractionRequest {
            sheet: self.input.sheet.clone(),
            manifest: self.input.manifest.clone(),
            output_dir: self.output.dir.clone(),
            snapshot_dir,
            names: self.names.clone(),
            grid_unit: self.grid.unit,
            decoder,
        })
    }
}

/// Everything one extraction run needs, fixed before the run starts.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Sheet image to slice.
    pub sheet: Option<PathBuf>,
    /// Manifest describing the grid.
    pub manifest: Option<PathBuf>,
    /// Destination for the icons.
    pub output_dir: Option<PathBuf>,
    /// Destination for the sheet snapshot (None = no snapshot).
    pub snapshot_dir: Option<PathBuf>,
    /// Name source selection.
    pub names: NamesConfig,
    /// Unit of the manifest sheet values.
    pub grid_unit: GridUnit,
    /// Legacy text decoder for manifest and metadata.
    pub decoder: LegacyDecoder,
}
