//! Filename conventions for source images and their derived variants.
//!
//! ## Sources
//!
//! Gallery sources are named `<prefix><anything>.<ext>`, where the prefix is
//! `photo_` by default and `<ext>` is one of `jpg`, `jpeg` or `png` in any
//! letter case:
//!
//! - `photo_sunset.jpg` → base name `photo_sunset`
//! - `photo_IMG_0042.JPEG` → base name `photo_IMG_0042`
//! - `photo_.png` → base name `photo_`
//! - `sunset.jpg`, `photo_notes.txt`, `.photo_x.jpg` → not a source
//!
//! ## Variants
//!
//! Every derived file is `<base>@<size>.<ext>`, where `<size>` is the active
//! size parameter of its class (long-edge bound or thumbnail side), not the
//! pixel dimensions actually produced. The path alone is the memoization key.

use crate::types::Encoding;

/// Source extensions accepted by discovery (compared case-insensitively).
pub const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Result of parsing a source file name like `photo_sunset.JPG`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSource {
    /// File name with the final extension removed.
    pub base_name: String,
    /// Extension as written on disk (case preserved).
    pub extension: String,
}

/// Parse a file name against the source naming convention.
///
/// Returns `None` for dot-files, names without the prefix, and names whose
/// extension is not in [`SOURCE_EXTENSIONS`].
pub fn parse_source_name(file_name: &str, prefix: &str) -> Option<ParsedSource> {
    if file_name.starts_with('.') || !file_name.starts_with(prefix) {
        return None;
    }
    let (base, ext) = file_name.rsplit_once('.')?;
    if base.len() < prefix.len() {
        // The only dot sits inside the prefix itself.
        return None;
    }
    if !SOURCE_EXTENSIONS
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
    {
        return None;
    }
    Some(ParsedSource {
        base_name: base.to_string(),
        extension: ext.to_string(),
    })
}

/// File name of a derived variant: `<base>@<size>.<ext>`.
pub fn variant_file_name(base_name: &str, size: u32, encoding: Encoding) -> String {
    format!("{}@{}.{}", base_name, size, encoding.extension())
}
