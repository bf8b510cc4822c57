//! Icon name resolution: maps icon filenames to skill identifiers.
//!
//! Two interchangeable sources feed the same [`IconNameMap`]:
//!
//! 1. **Static headers** ([`headers::StaticHeaderSource`]): scans per-skill
//!    `skill<ID>.h` files for quoted `*.dds` icon references.
//! 2. **Native table** ([`native::NativeTableSource`]): asks a loaded shared
//!    library for the icon of every skill id in a bounded range.
//!
//! Both implement [`SkillIconSource`]; [`build_name_map`] drives either one.

pub mod headers;
pub mod native;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::config::{NameSourceKind, NamesConfig};
use crate::error::MetadataIssue;
use crate::text::LegacyDecoder;

/// Case-insensitive mapping from icon filename to output identifier.
///
/// Keys are stored lower-cased. The first value inserted for a key wins;
/// later inserts for the same key are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IconNameMap {
    entries: BTreeMap<String, String>,
}

impl IconNameMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `icon -> id` unless the lower-cased icon name is already present.
    ///
    /// Returns `true` if the entry was inserted.
    pub fn insert(&mut self, icon: &str, id: impl Into<String>) -> bool {
        let key = icon.to_lowercase();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, id.into());
        true
    }

    /// Identifier for `icon`, compared case-insensitively.
    pub fn get(&self, icon: &str) -> Option<&str> {
        self.entries.get(&icon.to_lowercase()).map(String::as_str)
    }

    /// Whether `icon` has an identifier.
    pub fn contains(&self, icon: &str) -> bool {
        self.get(icon).is_some()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A metadata source that knows which icon belongs to which skill.
///
/// Implementors are prepared once with [`init`](Self::init) and then queried
/// per skill id. Sources never fail hard: anything that goes wrong is
/// returned as a [`MetadataIssue`] and the source simply knows fewer icons.
pub trait SkillIconSource {
    /// Native skill id type; rendered with `Display` as the output identifier.
    type SkillId: fmt::Display;

    /// Short machine-readable name used in logs (e.g. `"static-headers"`).
    fn label(&self) -> &str;

    /// Load or initialise the underlying data. Called once, before lookups.
    fn init(&mut self) -> Vec<MetadataIssue>;

    /// Skill ids to query, in first-writer-wins priority order.
    fn skill_ids(&self) -> Vec<Self::SkillId>;

    /// Icon filenames registered for `skill_id`; empty when there are none.
    fn lookup(&self, skill_id: &Self::SkillId) -> Vec<String>;
}

/// Result of building a name map: the map plus everything that was skipped.
#[derive(Debug, Default)]
pub struct NameMapBuild {
    /// The finished, read-only map.
    pub map: IconNameMap,
    /// Problems encountered while reading metadata.
    pub issues: Vec<MetadataIssue>,
}

/// Initialise `source` and collect every `(icon, skill id)` pair it reports.
pub fn build_name_map<S: SkillIconSource + ?Sized>(source: &mut S) -> NameMapBuild {
    let issues = source.init();
    let mut map = IconNameMap::new();
    let mut duplicates = 0_usize;

    for skill_id in source.skill_ids() {
        for icon in source.lookup(&skill_id) {
            if !map.insert(&icon, skill_id.to_string()) {
                duplicates += 1;
                tracing::debug!(icon = %icon, skill_id = %skill_id, "icon already mapped, keeping first");
            }
        }
    }

    tracing::info!(
        source = source.label(),
        entries = map.len(),
        duplicates,
        issues = issues.len(),
        "icon name map built"
    );
    NameMapBuild { map, issues }
}

/// Build the name map from whatever source `config` selects.
///
/// An unusable source (missing directory, library that fails to load) is
/// reported as [`MetadataIssue::SourceUnavailable`] and yields an empty map,
/// so every icon falls back to its manifest name.
pub fn resolve_names(config: &NamesConfig, decoder: LegacyDecoder) -> NameMapBuild {
    match config.source {
        NameSourceKind::None => NameMapBuild::default(),
        NameSourceKind::StaticHeaders => {
            let Some(dir) = config.headers.dir.as_deref() else {
                return unavailable("no static header directory configured".to_owned());
            };
            let mut source = headers::StaticHeaderSource::new(
                dir,
                &config.headers.prefix,
                &config.headers.extension,
                decoder,
            );
            build_name_map(&mut source)
        }
        NameSourceKind::Native => {
            let Some(library) = config.native.library.as_deref() else {
                return unavailable("no native library configured".to_owned());
            };
            let symbols = native::NativeSymbols {
                init: config.native.init_symbol.clone(),
                lookup: config.native.lookup_symbol.clone(),
            };
            match native::NativeIconLibrary::open(library, &symbols) {
                Ok(lookup) => {
                    let mut source = native::NativeTableSource::new(
                        lookup,
                        config.native.first_id..=config.native.last_id,
                        decoder,
                    );
                    build_name_map(&mut source)
                }
                Err(e) => unavailable(e.to_string()),
            }
        }
    }
}

fn unavailable(reason: String) -> NameMapBuild {
    tracing::warn!(%reason, "icon name source unavailable, using manifest names");
    NameMapBuild {
        map: IconNameMap::new(),
        issues: vec![MetadataIssue::SourceUnavailable { reason }],
    }
}
