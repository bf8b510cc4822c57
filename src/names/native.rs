//! Skill icon table exported by a native shared library.
//!
//! The library exposes two C functions:
//!
//! ```text
//! void        initStaticData(void);
//! const char* getIcon(uint32_t skill_id);   // NULL or "" when unregistered
//! ```
//!
//! Returned strings are owned by the library and are in the legacy text
//! encoding; they are copied and transcoded immediately.

use std::ffi::{CStr, c_char};
use std::ops::RangeInclusive;
use std::path::Path;

use libloading::Library;

use super::SkillIconSource;
use crate::error::{ExtractError, MetadataIssue, Result};
use crate::text::LegacyDecoder;

/// Raw access to a skill icon table.
///
/// Split from [`NativeTableSource`] so the table walk can be exercised
/// without a real shared library.
pub trait IconLookup {
    /// Prepare the table. Called exactly once before any [`get_icon`](Self::get_icon).
    fn init_static_data(&mut self);

    /// Raw (legacy-encoded) icon name for `skill_id`, if one is registered.
    fn get_icon(&self, skill_id: u32) -> Option<Vec<u8>>;
}

/// Exported symbol names to resolve in the library.
#[derive(Debug, Clone)]
pub struct NativeSymbols {
    /// Initialisation function, `void()`.
    pub init: String,
    /// Lookup function, `const char*(uint32_t)`.
    pub lookup: String,
}

impl Default for NativeSymbols {
    fn default() -> Self {
        Self {
            init: "initStaticData".to_owned(),
            lookup: "getIcon".to_owned(),
        }
    }
}

type InitFn = unsafe extern "C" fn();
type GetIconFn = unsafe extern "C" fn(u32) -> *const c_char;

/// Resolved `initStaticData` / `getIcon` entry points.
///
/// `get_icon` results are handled as the C side documents them: a null
/// pointer or an empty string means no icon is registered for that id.
#[derive(Clone, Copy)]
struct NativeTableFns {
    init_static_data: InitFn,
    get_icon: GetIconFn,
}

impl IconLookup for NativeTableFns {
    fn init_static_data(&mut self) {
        // SAFETY: the pointer was resolved with the matching signature.
        unsafe { (self.init_static_data)() }
    }

    fn get_icon(&self, skill_id: u32) -> Option<Vec<u8>> {
        // SAFETY: the pointer was resolved with the matching signature.
        let ptr = unsafe { (self.get_icon)(skill_id) };
        if ptr.is_null() {
            return None;
        }
        // SAFETY: non-null results are NUL-terminated strings owned by the
        // library's static data; they are copied before the next call.
        let bytes = unsafe { CStr::from_ptr(ptr) }.to_bytes();
        (!bytes.is_empty()).then(|| bytes.to_vec())
    }
}

/// A loaded skill table library.
pub struct NativeIconLibrary {
    fns: NativeTableFns,
    // Keeps the function pointers in `fns` valid; must outlive them.
    _library: Library,
}

impl NativeIconLibrary {
    /// Load `path` and resolve both symbols.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::NameSource`] if the library cannot be loaded or
    /// either symbol is missing.
    pub fn open(path: &Path, symbols: &NativeSymbols) -> Result<Self> {
        // SAFETY: loading a library runs its initialisers. The path is chosen
        // by the operator, who vouches for the library.
        let library = unsafe { Library::new(path) }.map_err(|e| {
            ExtractError::NameSource(format!("failed to load {}: {e}", path.display()))
        })?;

        // SAFETY: the symbol types match the documented C signatures. The
        // copied pointers stay valid because `library` is stored alongside.
        let init_static_data = unsafe {
            *library
                .get::<InitFn>(symbols.init.as_bytes())
                .map_err(|e| ExtractError::NameSource(format!("symbol {}: {e}", symbols.init)))?
        };
        // SAFETY: as above.
        let get_icon = unsafe {
            *library
                .get::<GetIconFn>(symbols.lookup.as_bytes())
                .map_err(|e| ExtractError::NameSource(format!("symbol {}: {e}", symbols.lookup)))?
        };

        tracing::info!(path = %path.display(), "native skill table loaded");
        Ok(Self {
            fns: NativeTableFns {
                init_static_data,
                get_icon,
            },
            _library: library,
        })
    }
}

impl IconLookup for NativeIconLibrary {
    fn init_static_data(&mut self) {
        self.fns.init_static_data();
    }

    fn get_icon(&self, skill_id: u32) -> Option<Vec<u8>> {
        self.fns.get_icon(skill_id)
    }
}

/// Walks a bounded skill id range through an [`IconLookup`].
pub struct NativeTableSource<L: IconLookup> {
    lookup: L,
    ids: RangeInclusive<u32>,
    decoder: LegacyDecoder,
    initialised: bool,
}

impl<L: IconLookup> NativeTableSource<L> {
    /// Query `ids` (typically `1..=10000`) through `lookup`.
    pub fn new(lookup: L, ids: RangeInclusive<u32>, decoder: LegacyDecoder) -> Self {
        Self {
            lookup,
            ids,
            decoder,
            initialised: false,
        }
    }
}

impl<L: IconLookup> SkillIconSource for NativeTableSource<L> {
    type SkillId = u32;

    fn label(&self) -> &str {
        "native"
    }

    fn init(&mut self) -> Vec<MetadataIssue> {
        if !self.initialised {
            self.lookup.init_static_data();
            self.initialised = true;
        }
        Vec::new()
    }

    fn skill_ids(&self) -> Vec<u32> {
        self.ids.clone().collect()
    }

    fn lookup(&self, skill_id: &u32) -> Vec<String> {
        match self.lookup.get_icon(*skill_id) {
            Some(raw) => {
                let name = self.decoder.decode(&raw);
                if name.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![name.to_lowercase()]
                }
            }
            None => Vec::new(),
        }
    }
}
