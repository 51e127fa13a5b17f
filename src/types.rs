//! Shared types used across discovery, imaging and the batch runner.
//!
//! A source image is rendered into two [`SizeClass`]es, each in three
//! [`Encoding`]s. Every (class, encoding) pair is one *variant*; the outcome
//! of producing it is reported as a [`VariantInfo`].

use std::path::PathBuf;

/// The two size classes every source image is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    /// Fit inside a square of the long-edge bound (lightbox display).
    Large,
    /// Square crop toward the salient region (gallery grid).
    Thumb,
}

impl SizeClass {
    pub fn label(self) -> &'static str {
        match self {
            SizeClass::Large => "large",
            SizeClass::Thumb => "thumb",
        }
    }
}

/// Output encodings, in production order.
///
/// JPEG comes first: WebP and AVIF are always derived from the JPEG of the
/// same size class, never from the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Jpeg,
    Webp,
    Avif,
}

impl Encoding {
    /// Every output encoding, in production order.
    pub const ALL: [Encoding; 3] = [Encoding::Jpeg, Encoding::Webp, Encoding::Avif];

    /// File extension used for outputs in this encoding.
    pub fn extension(self) -> &'static str {
        match self {
            Encoding::Jpeg => "jpg",
            Encoding::Webp => "webp",
            Encoding::Avif => "avif",
        }
    }
}

/// A source image picked up by discovery.
///
/// `base_name` is the file name without its extension and is the join key
/// for every derived output (`<base_name>@<size>.<ext>`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceImage {
    pub path: PathBuf,
    pub base_name: String,
}

/// What happened to a single variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantStatus {
    /// The output was written during this run.
    Encoded,
    /// The output already existed and was left untouched.
    Skipped,
}

/// Outcome of producing one variant of one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantInfo {
    pub class: SizeClass,
    pub encoding: Encoding,
    pub path: PathBuf,
    pub status: VariantStatus,
}

impl VariantInfo {
    /// Display label, e.g. `large jpg` or `thumb avif`.
    pub fn label(&self) -> String {
        format!("{} {}", self.class.label(), self.encoding.extension())
    }
}
