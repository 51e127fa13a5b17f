//! Shared test utilities for the folio-images test suite.
//!
//! Provides synthetic source images (plain, EXIF-rotated and corrupt) and a
//! gallery directory layout rooted in a temp dir.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let gallery = setup_gallery();
//! create_test_jpeg(&gallery.paths.source_dir.join("photo_dawn.jpg"), 800, 600);
//! write_corrupt_file(&gallery.paths.source_dir.join("photo_broken.png"));
//! ```

use image::{ImageEncoder, RgbImage};
use std::path::Path;
use tempfile::TempDir;

use crate::config::{OptimizeConfig, ResolvedPaths};

// =========================================================================
// Gallery layout
// =========================================================================

/// A temp directory laid out like a site root with default paths.
pub struct Gallery {
    /// Keeps the directory alive for the test.
    pub _tmp: TempDir,
    pub config: OptimizeConfig,
    pub paths: ResolvedPaths,
}

/// Create a temp site root with the source directory in place. Output
/// directories are left for the code under test to create.
pub fn setup_gallery() -> Gallery {
    let tmp = TempDir::new().unwrap();
    let config = OptimizeConfig::default();
    let paths = config.paths.resolve(tmp.path());
    std::fs::create_dir_all(&paths.source_dir).unwrap();
    Gallery {
        _tmp: tmp,
        config,
        paths,
    }
}

// =========================================================================
// Synthetic images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

fn encode_jpeg(img: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, 90)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    bytes
}

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, encode_jpeg(&gradient(width, height))).unwrap();
}

/// Create a small valid PNG file with the given dimensions.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::png::PngEncoder::new(writer)
        .write_image(
            gradient(width, height).as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
}

/// Create a JPEG stored as `stored_width`×`stored_height` with an EXIF
/// Orientation tag of 6 (rotate 90° clockwise to display).
pub fn create_rotated_jpeg(path: &Path, stored_width: u32, stored_height: u32) {
    let jpeg = encode_jpeg(&gradient(stored_width, stored_height));

    // Little-endian TIFF with a single IFD0 entry: Orientation (0x0112), SHORT, 6.
    let mut exif = b"Exif\0\0".to_vec();
    exif.extend_from_slice(b"II\x2a\x00\x08\x00\x00\x00");
    exif.extend_from_slice(&[0x01, 0x00]);
    exif.extend_from_slice(&[0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00]);
    exif.extend_from_slice(&[0x06, 0x00, 0x00, 0x00]);
    exif.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    let segment_len = (exif.len() + 2) as u16;
    let mut bytes = Vec::with_capacity(jpeg.len() + exif.len() + 4);
    bytes.extend_from_slice(&jpeg[..2]); // SOI
    bytes.extend_from_slice(&[0xFF, 0xE1]);
    bytes.extend_from_slice(&segment_len.to_be_bytes());
    bytes.extend_from_slice(&exif);
    bytes.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, bytes).unwrap();
}

/// Write bytes that no decoder will accept.
pub fn write_corrupt_file(path: &Path) {
    std::fs::write(path, b"definitely not an image").unwrap();
}
