//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations every backend must
//! support: identify, resize, thumbnail and derive.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use the
//! [`MockBackend`](tests::MockBackend) below, which records operations and
//! touches output files instead of encoding pixels.

use super::params::{DeriveParams, ResizeParams, ThumbnailParams};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Dimensions reported by `identify` are always *upright*: EXIF orientation
/// has been applied, so they match what `resize` and `thumbnail` see after
/// decoding.
pub trait ImageBackend: Sync {
    /// Get upright image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Render a source into a JPEG at exact target dimensions.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;

    /// Render a source into a JPEG: fill-resize, then crop toward the salient region.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;

    /// Re-encode a JPEG base as WebP or AVIF at the same dimensions.
    fn derive(&self, params: &DeriveParams) -> Result<(), BackendError>;
}
