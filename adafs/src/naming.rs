//! Crunched filename decoding.
//!
//! GNAT-style crunching reduces a hierarchical package name to a single
//! flat, filesystem-safe basename: dots become the reserved `_sep_`
//! token and a disambiguating hash is appended after a final `-`.
//!
//! Examples:
//! - `textio-1f00ba.ads` declares the top-level package `TEXTIO`
//! - `ada_sep_strings-9f3a21.adb` is the body of `ADA.STRINGS`
//!
//! Decoding is pure and total: every input string gets a definite
//! classification, and anything that is not a crunched package file
//! (wrong extension, missing hash, malformed basename) comes back as
//! `None` and must never surface in the virtual tree. That one rule
//! subsumes hiding object files, backups, build artifacts and docs.

use regex::Regex;
use std::sync::OnceLock;

/// Extension of a package declaration ("spec") file.
pub const SPEC_EXTENSION: &str = "ads";

/// Extension of a package implementation ("body") file.
pub const BODY_EXTENSION: &str = "adb";

/// Reserved token standing in for `.` inside a crunched basename.
pub const SEGMENT_SEPARATOR: &str = "_sep_";

/// Which half of a package an entry provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Declaration (`.ads`).
    Spec,
    /// Implementation (`.adb`).
    Body,
}

impl SourceKind {
    /// The on-disk extension for this kind, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            SourceKind::Spec => SPEC_EXTENSION,
            SourceKind::Body => BODY_EXTENSION,
        }
    }

    /// Classify an extension. Matching is case-sensitive: the crunching
    /// tool only ever emits lowercase extensions.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            SPEC_EXTENSION => Some(SourceKind::Spec),
            BODY_EXTENSION => Some(SourceKind::Body),
            _ => None,
        }
    }
}

/// A successfully decoded crunched filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedName {
    /// Package name segments, outermost first, already uppercased.
    pub segments: Vec<String>,
    /// Spec or body.
    pub kind: SourceKind,
    /// The hash token after the final `-`. Opaque; only ever used to
    /// tell two crunched files apart, never shown to callers.
    pub hash: String,
}

impl DecodedName {
    /// Innermost package segment; doubles as the name of the virtual
    /// directory the file lives in.
    pub fn leaf(&self) -> &str {
        self.segments.last().expect("decoded name has >= 1 segment")
    }

    /// Display filename inside the virtual tree: the leaf segment plus
    /// the original (lowercase) extension, e.g. `STRINGS.ads`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.leaf(), self.kind.extension())
    }
}

/// Crunched filename pattern.
///
/// We capture:
/// - Group 1: encoded basename (greedy, so the hash is split off the
///   *last* `-`; earlier dashes stay part of the basename)
/// - Group 2: hash token (alphanumeric, e.g. `2adb2f`)
/// - Group 3: extension (`ads` or `adb`)
fn crunched_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(.+)-([0-9A-Za-z]+)\.(ads|adb)$").expect("static pattern compiles")
    })
}

/// Decode a crunched filename into its package path.
///
/// Returns `None` for anything that is not a package file. A basename
/// with zero separator tokens decodes to a single-segment, top-level
/// package. Segments are uppercased but otherwise taken verbatim; no
/// attempt is made to check that they are valid Ada identifiers.
///
/// # Examples
///
/// ```
/// use adafs::naming::{decode_file_name, SourceKind};
///
/// let name = decode_file_name("ada_sep_strings-9f3a21.ads").unwrap();
/// assert_eq!(name.segments, vec!["ADA", "STRINGS"]);
/// assert_eq!(name.kind, SourceKind::Spec);
/// assert_eq!(name.file_name(), "STRINGS.ads");
///
/// assert!(decode_file_name("notes.txt").is_none());
/// ```
pub fn decode_file_name(file_name: &str) -> Option<DecodedName> {
    let captures = crunched_pattern().captures(file_name)?;

    let encoded = captures.get(1).expect("group 1 always present").as_str();
    let hash = captures.get(2).expect("group 2 always present").as_str();
    let kind = SourceKind::from_extension(captures.get(3).expect("group 3 always present").as_str())
        .expect("pattern only matches known extensions");

    let segments: Vec<String> = encoded
        .split(SEGMENT_SEPARATOR)
        .map(str::to_uppercase)
        .collect();
    if segments.iter().any(String::is_empty) {
        // Leading, trailing or doubled separator. Not a package file.
        return None;
    }

    Some(DecodedName {
        segments,
        kind,
        hash: hash.to_string(),
    })
}
