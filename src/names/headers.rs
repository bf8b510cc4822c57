//! Static skill header scanning.
//!
//! Each skill is described by one `<prefix><id>.<ext>` file (by default
//! `skill1001.h`). Any line mentioning both `icon` and `.dds` is expected to
//! carry the icon filename in double quotes:
//!
//! ```text
//! icon = "fx_fire.dds",
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::SkillIconSource;
use crate::error::MetadataIssue;
use crate::text::LegacyDecoder;

/// Scans a directory of skill header files.
pub struct StaticHeaderSource {
    dir: PathBuf,
    prefix: String,
    extension: String,
    decoder: LegacyDecoder,
    order: Vec<String>,
    icons: HashMap<String, Vec<String>>,
}

impl StaticHeaderSource {
    /// Create a source over `dir`. Nothing is read until [`SkillIconSource::init`].
    pub fn new(dir: &Path, prefix: &str, extension: &str, decoder: LegacyDecoder) -> Self {
        Self {
            dir: dir.to_path_buf(),
            prefix: prefix.to_owned(),
            extension: extension.trim_start_matches('.').to_owned(),
            decoder,
            order: Vec::new(),
            icons: HashMap::new(),
        }
    }

    /// Header files in `dir`, sorted case-insensitively by file name.
    fn header_files(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
            })
            .collect();
        files.sort_by_cached_key(|path| {
            path.file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default()
        });
        Ok(files)
    }

    fn scan_file(&mut self, path: &Path, skill_id: String, issues: &mut Vec<MetadataIssue>) {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read skill header");
                issues.push(MetadataIssue::UnreadableFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
                return;
            }
        };

        let text = self.decoder.decode(&bytes);
        let mut found = Vec::new();
        for (i, line) in text.lines().enumerate() {
            if !is_icon_line(line) {
                continue;
            }
            match extract_icon_file_name(line) {
                Some(icon) => found.push(icon),
                None => {
                    tracing::debug!(path = %path.display(), line = i + 1, "malformed icon line");
                    issues.push(MetadataIssue::MalformedLine {
                        path: path.to_path_buf(),
                        line_number: i + 1,
                    });
                }
            }
        }

        if !self.icons.contains_key(&skill_id) {
            self.order.push(skill_id.clone());
        }
        self.icons.entry(skill_id).or_default().extend(found);
    }
}

impl SkillIconSource for StaticHeaderSource {
    type SkillId = String;

    fn label(&self) -> &str {
        "static-headers"
    }

    fn init(&mut self) -> Vec<MetadataIssue> {
        self.order.clear();
        self.icons.clear();
        let mut issues = Vec::new();

        let files = match self.header_files() {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "skill header directory unavailable");
                issues.push(MetadataIssue::SourceUnavailable {
                    reason: format!("{}: {e}", self.dir.display()),
                });
                return issues;
            }
        };

        for path in files {
            match skill_id_from_file_name(&path, &self.prefix) {
                Some(skill_id) => self.scan_file(&path, skill_id, &mut issues),
                None => {
                    tracing::warn!(path = %path.display(), prefix = %self.prefix, "skipping header without skill prefix");
                    issues.push(MetadataIssue::UnexpectedFileName {
                        path,
                        prefix: self.prefix.clone(),
                    });
                }
            }
        }
        issues
    }

    fn skill_ids(&self) -> Vec<String> {
        self.order.clone()
    }

    fn lookup(&self, skill_id: &String) -> Vec<String> {
        self.icons.get(skill_id).cloned().unwrap_or_default()
    }
}

/// The part of the file stem after `prefix`, if any.
pub fn skill_id_from_file_name(path: &Path, prefix: &str) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let id = stem.strip_prefix(prefix)?;
    (!id.is_empty()).then(|| id.to_owned())
}

/// Whether a line mentions both `icon` and `.dds`, ignoring case.
pub fn is_icon_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("icon") && lower.contains(".dds")
}

/// Lower-cased filename between the first `"` and the first `.dds"`.
///
/// Returns `None` when the line has no quote or the first `.dds"` does not
/// come after it with at least one character in between.
pub fn extract_icon_file_name(line: &str) -> Option<String> {
    const CLOSING: &[u8] = b".dds\"";

    let start = line.find('"')? + 1;
    let end = line
        .as_bytes()
        .windows(CLOSING.len())
        .position(|w| w.eq_ignore_ascii_case(CLOSING))?;
    if end <= start {
        return None;
    }
    // Both bounds sit on ASCII bytes, so they are char boundaries.
    let name = line[start..end + ".dds".len()].trim();
    (!name.is_empty()).then(|| name.to_lowercase())
}
