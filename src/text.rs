//! Legacy multi-byte text decoding.
//!
//! Manifests, skill headers and strings returned by the native skill table
//! are all encoded in the same legacy Chinese code page. Every boundary goes
//! through [`LegacyDecoder`] so the transcoding is identical everywhere.

use encoding_rs::{Encoding, GB18030};

use crate::error::{ExtractError, Result};

/// Default encoding label. GB18030 is a superset of GBK and GB2312.
pub const DEFAULT_ENCODING: &str = "gb18030";

/// Decodes legacy bytes into UTF-8 strings.
#[derive(Debug, Clone, Copy)]
pub struct LegacyDecoder {
    encoding: &'static Encoding,
}

impl Default for LegacyDecoder {
    fn default() -> Self {
        Self { encoding: GB18030 }
    }
}

impl LegacyDecoder {
    /// Resolve a WHATWG encoding label such as `"gb18030"` or `"gbk"`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Config`] if the label is unknown.
    pub fn for_label(label: &str) -> Result<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .map(|encoding| Self { encoding })
            .ok_or_else(|| ExtractError::Config(format!("unknown text encoding {label:?}")))
    }

    /// Canonical name of the resolved encoding.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decode `bytes`. Invalid sequences become U+FFFD rather than failing.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, had_errors) = self.encoding.decode_without_bom_handling(bytes);
        if had_errors {
            tracing::debug!(
                encoding = self.encoding.name(),
                "replaced malformed byte sequences while decoding"
            );
        }
        text.into_owned()
    }
}

/// Decode `bytes` with the default legacy encoding.
pub fn decode_legacy_text(bytes: &[u8]) -> String {
    LegacyDecoder::default().decode(bytes)
}
