//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what images to create and whether they already exist) and
//! the [`backend`](super::backend) (which does the actual pixel work). This
//! separation allows swapping backends (e.g. for testing with a mock) without
//! changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100). Clamped on construction.
//! - [`Effort`] — AVIF encoding effort (0–9). Clamped on construction.
//! - [`JpegOptions`] — Quality and progressive scans for the (4:4:4) JPEG base.
//! - [`ResizeParams`] — Fit-inside render of a source into a JPEG at exact target dimensions.
//! - [`ThumbnailParams`] — Fill-resize plus attention crop of a source into a JPEG.
//! - [`DeriveParams`] — Re-encode an existing JPEG as WebP or AVIF.

use crate::types::Encoding;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

/// AVIF encoding effort: 0 is fastest, 9 produces the smallest files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effort(u8);

impl Effort {
    pub fn new(value: u8) -> Self {
        Self(value.min(9))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Equivalent rav1e speed preset (1 = slowest, 10 = fastest).
    pub fn encoder_speed(self) -> u8 {
        10 - self.0
    }
}

/// Encoder settings for the JPEG base of a size class. Chroma is always
/// kept at full resolution (4:4:4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegOptions {
    pub quality: Quality,
    pub progressive: bool,
}

impl JpegOptions {
    /// Progressive, full-chroma JPEG as served to browsers.
    pub fn web(quality: Quality) -> Self {
        Self {
            quality,
            progressive: true,
        }
    }
}

/// Target encoding for a variant derived from the JPEG base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeriveEncoding {
    Webp { quality: Quality },
    Avif { quality: Quality, effort: Effort },
}

impl DeriveEncoding {
    pub fn encoding(self) -> Encoding {
        match self {
            DeriveEncoding::Webp { .. } => Encoding::Webp,
            DeriveEncoding::Avif { .. } => Encoding::Avif,
        }
    }
}

/// Parameters for a fit-inside render (decode, orient, resize, JPEG encode).
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Exact output dimensions, already clamped so nothing is upscaled.
    pub width: u32,
    pub height: u32,
    pub jpeg: JpegOptions,
}

/// Parameters for a thumbnail render (fill-resize, attention crop, JPEG encode).
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Dimensions the upright source is resized to before cropping. Equal to
    /// the source dimensions when no scaling is needed.
    pub fill_width: u32,
    pub fill_height: u32,
    /// Final crop dimensions.
    pub crop_width: u32,
    pub crop_height: u32,
    pub jpeg: JpegOptions,
}

/// Parameters for re-encoding a JPEG base into another format.
#[derive(Debug, Clone, PartialEq)]
pub struct DeriveParams {
    /// The JPEG base of the same size class.
    pub source: PathBuf,
    pub output: PathBuf,
    pub encoding: DeriveEncoding,
}
