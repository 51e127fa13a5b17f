//! Image processing.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image` decoder header + EXIF orientation, `avif-parse` for AVIF |
//! | **Resize → JPEG** | Lanczos3 + `jpeg-encoder` (progressive, 4:4:4) |
//! | **Thumbnail → JPEG** | Lanczos3 fill + saliency crop + `jpeg-encoder` |
//! | **Derive → WebP** | `webp` (libwebp) |
//! | **Derive → AVIF** | `image` AVIF encoder (rav1e) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Saliency**: Attention-based crop placement
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;
mod saliency;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    ThumbnailGeometry, calculate_fill_dimensions, fit_inside_dimensions, plan_thumbnail_geometry,
};
pub use operations::{
    VariantConfig, create_large_variants, create_thumbnail_variants, get_dimensions,
};
pub use params::{
    DeriveEncoding, DeriveParams, Effort, JpegOptions, Quality, ResizeParams,
    ThumbnailParams,
};
pub use rust_backend::RustBackend;
pub use saliency::attention_offset;
