use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::decoding::LegacyEncoding;

/// Candidate encodings in priority order. The set is closed-world: the
/// archives come from a handful of localized tools, so a fixed first-match
/// list beats statistical detection.
pub const DEFAULT_SOURCE_ENCODINGS: &[LegacyEncoding] = &[
    LegacyEncoding::Cp852,
    LegacyEncoding::Utf8,
    LegacyEncoding::Windows1252,
    LegacyEncoding::Iso8859_2,
];

/// Characters a recovered filename may consist of: path separators, digits,
/// parentheses, the Slovak accented alphabet and a little punctuation.
/// Plain `\w` would also admit Slavic characters that never occur in the
/// target language, which is exactly the mojibake this filter exists to
/// reject.
pub const VALID_NAME_PATTERN: &str = r"(?i)^[0-9a-záäčďéíĺľňóôŕšťúýž()@#$&., _*\\/\-]+$";

static VALID_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VALID_NAME_PATTERN).expect("valid filename pattern"));

/// Explicitly passed pipeline configuration. Replaces what used to live as
/// module-level globals: the encoding priority list, the filename
/// allow-list and the external metadata process location.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Candidate encodings tried by the filename decoder, in order.
    pub encodings: Vec<LegacyEncoding>,
    /// Allow-list a decoded name must fully match.
    pub name_allowlist: Regex,
    /// Executable spawned for portable-document metadata extraction.
    pub exiftool_path: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            encodings: DEFAULT_SOURCE_ENCODINGS.to_vec(),
            name_allowlist: VALID_NAME_REGEX.clone(),
            exiftool_path: PathBuf::from("exiftool"),
        }
    }
}
