//! Filename recovery for legacy-encoded archive entries and property fields.
//!
//! Submission archives from localized DOS/Windows tooling store names under a
//! small closed set of code pages. Candidates are tried strictly, in a fixed
//! priority order, and the first decode whose NFC-normalized output passes
//! the allow-list wins.

use encoding_rs::{ISO_8859_2, UTF_8, WINDOWS_1252};
use oem_cp::code_table::{DECODING_TABLE_CP_MAP, ENCODING_TABLE_CP_MAP};
use oem_cp::encode_string_checked;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::config::ScanConfig;


/// Code page the zip ecosystem assumes for entry names without the UTF-8
/// flag. Names read through such tooling arrive pre-decoded under this page
/// and have to be re-encoded before the real candidates can be tried.
const MANGLED_NAME_CODEPAGE: u16 = 437;

/// A candidate source encoding for legacy filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyEncoding {
    /// DOS Central European (code page 852).
    Cp852,
    Utf8,
    /// Windows Central European fallback (code page 1252 in the wild, even
    /// though 1250 would have been the "correct" one for the region).
    Windows1252,
    /// ISO 8859-2 (Latin-2).
    Iso8859_2,
}

impl LegacyEncoding {
    /// Strict decode: any byte sequence invalid under the encoding
    /// disqualifies the candidate. No replacement characters, ever.
    pub fn decode_strict(self, bytes: &[u8]) -> Option<String> {
        match self {
            LegacyEncoding::Cp852 => DECODING_TABLE_CP_MAP
                .get(&852)
                .and_then(|table| table.decode_string_checked(bytes)),
            LegacyEncoding::Utf8 => UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|cow| cow.into_owned()),
            LegacyEncoding::Windows1252 => WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|cow| cow.into_owned()),
            LegacyEncoding::Iso8859_2 => ISO_8859_2
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|cow| cow.into_owned()),
        }
    }
}

/// Decoder for filenames and free-text property fields written under an
/// unknown legacy encoding. Pure over its inputs; carries no global state.
#[derive(Debug, Clone)]
pub struct NameDecoder {
    encodings: Vec<LegacyEncoding>,
    allowlist: Regex,
}

impl NameDecoder {
    pub fn new(encodings: Vec<LegacyEncoding>, allowlist: Regex) -> Self {
        Self {
            encodings,
            allowlist,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.encodings.clone(), config.name_allowlist.clone())
    }

    /// Try every candidate encoding in priority order; return the first
    /// whose NFC-normalized decode validates. `None` when the candidate
    /// list is exhausted; callers fall back to the raw representation or
    /// to absence, depending on the call site.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Option<String> {
        for encoding in &self.encodings {
            let Some(decoded) = encoding.decode_strict(bytes) else {
                continue;
            };
            let normalized: String = decoded.nfc().collect();
            if self.validate(&normalized) {
                return Some(normalized);
            }
        }
        None
    }

    /// Variant for optional free-text fields: empty input is absence, and a
    /// total decode failure stays absent instead of echoing raw bytes.
    pub fn decode_nullable(&self, bytes: &[u8]) -> Option<String> {
        if bytes.is_empty() {
            return None;
        }
        self.decode_bytes(bytes)
    }

    /// Recover a name that was already force-decoded under CP437 by archive
    /// tooling: re-encode it back to the original bytes, then run the
    /// regular candidate list over those.
    pub fn decode_mangled(&self, name: &str) -> Option<String> {
        let table = ENCODING_TABLE_CP_MAP.get(&MANGLED_NAME_CODEPAGE)?;
        let bytes = encode_string_checked(name, table)?;
        self.decode_bytes(&bytes)
    }

    /// Whole-string validation: non-empty, printable, and every character on
    /// the allow-list (case-insensitively). One bad character rejects the
    /// whole string.
    pub fn validate(&self, name: &str) -> bool {
        !name.is_empty()
            && name.chars().all(|c| !c.is_control())
            && self.allowlist.is_match(name)
    }
}

impl Default for NameDecoder {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}
