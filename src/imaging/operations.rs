//! High-level image operations.
//!
//! These functions combine calculations with backend execution. For one
//! source and one size class they decide which variants are missing, compute
//! parameters, and call the backend:
//!
//! 1. The JPEG base is rendered from the source unless it already exists.
//! 2. WebP and AVIF are derived from that JPEG, each only if missing.
//!
//! Existence is the only memoization check: an output file that is present is
//! never rewritten, whatever its content or age.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{fit_inside_dimensions, plan_thumbnail_geometry};
use super::params::{
    DeriveEncoding, DeriveParams, Effort, JpegOptions, Quality, ResizeParams, ThumbnailParams,
};
use crate::config::{EncodingConfig, LargeConfig, ThumbnailsConfig};
use crate::naming::variant_file_name;
use crate::types::{Encoding, SizeClass, SourceImage, VariantInfo, VariantStatus};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Everything needed to produce the three variants of one size class.
#[derive(Debug, Clone)]
pub struct VariantConfig {
    pub class: SizeClass,
    /// Long-edge bound (large) or square side (thumb). Also the `@<size>` in file names.
    pub size: u32,
    pub output_dir: PathBuf,
    pub jpeg: JpegOptions,
    pub webp_quality: Quality,
    pub avif_quality: Quality,
    pub avif_effort: Effort,
}

impl VariantConfig {
    pub fn large(config: &LargeConfig, encoding: &EncodingConfig, output_dir: &Path) -> Self {
        Self {
            class: SizeClass::Large,
            size: config.long_edge,
            output_dir: output_dir.to_path_buf(),
            jpeg: JpegOptions::web(Quality::new(config.jpeg_quality)),
            webp_quality: Quality::new(config.webp_quality),
            avif_quality: Quality::new(config.avif_quality),
            avif_effort: Effort::new(encoding.avif_effort),
        }
    }

    pub fn thumbnail(
        config: &ThumbnailsConfig,
        encoding: &EncodingConfig,
        output_dir: &Path,
    ) -> Self {
        Self {
            class: SizeClass::Thumb,
            size: config.size,
            output_dir: output_dir.to_path_buf(),
            jpeg: JpegOptions::web(Quality::new(config.jpeg_quality)),
            webp_quality: Quality::new(config.webp_quality),
            avif_quality: Quality::new(config.avif_quality),
            avif_effort: Effort::new(encoding.avif_effort),
        }
    }

    /// Output path of one variant: `<output_dir>/<base>@<size>.<ext>`.
    pub fn output_path(&self, base_name: &str, encoding: Encoding) -> PathBuf {
        self.output_dir
            .join(variant_file_name(base_name, self.size, encoding))
    }

    /// Derived encodings in production order.
    fn derived(&self) -> [DeriveEncoding; 2] {
        [
            DeriveEncoding::Webp {
                quality: self.webp_quality,
            },
            DeriveEncoding::Avif {
                quality: self.avif_quality,
                effort: self.avif_effort,
            },
        ]
    }
}

/// Plan a fit-inside render without executing it.
pub fn plan_resize(
    source: &Path,
    output: &Path,
    original_dims: (u32, u32),
    config: &VariantConfig,
) -> ResizeParams {
    let (width, height) = fit_inside_dimensions(original_dims, config.size);
    ResizeParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width,
        height,
        jpeg: config.jpeg,
    }
}

/// Plan a thumbnail render without executing it.
pub fn plan_thumbnail(
    source: &Path,
    output: &Path,
    original_dims: (u32, u32),
    config: &VariantConfig,
) -> ThumbnailParams {
    let geometry = plan_thumbnail_geometry(original_dims, config.size);
    ThumbnailParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        fill_width: geometry.fill.0,
        fill_height: geometry.fill.1,
        crop_width: geometry.crop.0,
        crop_height: geometry.crop.1,
        jpeg: config.jpeg,
    }
}

/// Produce the large JPEG, WebP and AVIF of one source, skipping existing files.
pub fn create_large_variants(
    backend: &impl ImageBackend,
    source: &SourceImage,
    config: &VariantConfig,
) -> Result<Vec<VariantInfo>> {
    create_variants(backend, source, config, |jpeg_path| {
        let dims = get_dimensions(backend, &source.path)?;
        backend.resize(&plan_resize(&source.path, jpeg_path, dims, config))
    })
}

/// Produce the thumbnail JPEG, WebP and AVIF of one source, skipping existing files.
pub fn create_thumbnail_variants(
    backend: &impl ImageBackend,
    source: &SourceImage,
    config: &VariantConfig,
) -> Result<Vec<VariantInfo>> {
    create_variants(backend, source, config, |jpeg_path| {
        let dims = get_dimensions(backend, &source.path)?;
        backend.thumbnail(&plan_thumbnail(&source.path, jpeg_path, dims, config))
    })
}

fn create_variants(
    backend: &impl ImageBackend,
    source: &SourceImage,
    config: &VariantConfig,
    render_jpeg: impl FnOnce(&Path) -> Result<()>,
) -> Result<Vec<VariantInfo>> {
    let mut variants = Vec::with_capacity(3);

    let jpeg_path = config.output_path(&source.base_name, Encoding::Jpeg);
    let status = if jpeg_path.exists() {
        VariantStatus::Skipped
    } else {
        render_jpeg(&jpeg_path)?;
        VariantStatus::Encoded
    };
    variants.push(report(config.class, Encoding::Jpeg, jpeg_path.clone(), status));

    for target in config.derived() {
        let encoding = target.encoding();
        let output = config.output_path(&source.base_name, encoding);
        let status = if output.exists() {
            VariantStatus::Skipped
        } else {
            backend.derive(&DeriveParams {
                source: jpeg_path.clone(),
                output: output.clone(),
                encoding: target,
            })?;
            VariantStatus::Encoded
        };
        variants.push(report(config.class, encoding, output, status));
    }

    Ok(variants)
}

fn report(
    class: SizeClass,
    encoding: Encoding,
    path: PathBuf,
    status: VariantStatus,
) -> VariantInfo {
    let info = VariantInfo {
        class,
        encoding,
        path,
        status,
    };
    let outcome = match status {
        VariantStatus::Encoded => "encoded",
        VariantStatus::Skipped => "exists, skipped",
    };
    debug!(variant = %info.label(), path = %info.path.display(), "{outcome}");
    info
}
