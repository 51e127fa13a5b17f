//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate (pure Rust decoders) |
//! | EXIF orientation | `ImageDecoder::orientation` + `DynamicImage::apply_orientation` |
//! | Identify (AVIF) | `avif-parse` (container metadata, no decode) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Thumbnail crop | fill-resize, then [`attention_offset`](super::saliency::attention_offset) |
//! | Encode → JPEG | `jpeg-encoder` (progressive, 4:4:4) |
//! | Encode → WebP | `webp` (libwebp, lossy) |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e) |
//!
//! Every encoder writes into memory first and the file is created only once
//! encoding succeeded, so a failed encode never leaves a file behind that a
//! later run would mistake for a finished variant.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{
    DeriveEncoding, DeriveParams, Effort, JpegOptions, Quality, ResizeParams,
    ThumbnailParams,
};
use super::saliency::attention_offset;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn is_avif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("avif"))
}

fn decode_error(path: &Path, err: impl std::fmt::Display) -> BackendError {
    BackendError::Decode {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

fn open_decoder(path: &Path) -> Result<impl ImageDecoder, BackendError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()
        .map_err(|e| decode_error(path, e))
}

/// Load and decode an image from disk, ignoring any EXIF orientation.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    let decoder = open_decoder(path)?;
    DynamicImage::from_decoder(decoder).map_err(|e| decode_error(path, e))
}

/// Load and decode an image and rotate/flip it upright.
///
/// Unreadable or malformed EXIF is treated as "no transform".
fn load_upright(path: &Path) -> Result<DynamicImage, BackendError> {
    let mut decoder = open_decoder(path)?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder).map_err(|e| decode_error(path, e))?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Dimensions after applying `orientation` to a `width`×`height` frame.
fn upright_dimensions(width: u32, height: u32, orientation: Orientation) -> Dimensions {
    match orientation {
        Orientation::Rotate90
        | Orientation::Rotate270
        | Orientation::Rotate90FlipH
        | Orientation::Rotate270FlipH => Dimensions {
            width: height,
            height: width,
        },
        _ => Dimensions { width, height },
    }
}

/// Extract dimensions from an AVIF file's container metadata (no full decode needed).
fn identify_avif(path: &Path) -> Result<Dimensions, BackendError> {
    let file_data = std::fs::read(path)?;
    let avif = avif_parse::read_avif(&mut std::io::Cursor::new(&file_data))
        .map_err(|e| decode_error(path, format!("{e:?}")))?;
    let meta = avif
        .primary_item_metadata()
        .map_err(|e| decode_error(path, format!("{e:?}")))?;
    Ok(Dimensions {
        width: meta.max_frame_width.get(),
        height: meta.max_frame_height.get(),
    })
}

fn encode_failed(format: &str, err: impl std::fmt::Display) -> BackendError {
    BackendError::ProcessingFailed(format!("{format} encode failed: {err}"))
}

/// Encode as JPEG with the given options and write to `path`.
fn save_jpeg(img: &DynamicImage, path: &Path, options: &JpegOptions) -> Result<(), BackendError> {
    // JPEG has no alpha channel; transparent sources are flattened here.
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let too_large = |edge: u32| {
        BackendError::ProcessingFailed(format!("JPEG edge {edge} exceeds 65535 pixels"))
    };
    let width16 = u16::try_from(width).map_err(|_| too_large(width))?;
    let height16 = u16::try_from(height).map_err(|_| too_large(height))?;

    let mut bytes = Vec::new();
    let mut encoder = jpeg_encoder::Encoder::new(&mut bytes, options.quality.value() as u8);
    encoder.set_progressive(options.progressive);
    encoder.set_sampling_factor(jpeg_encoder::SamplingFactor::R_4_4_4);
    encoder
        .encode(rgb.as_raw(), width16, height16, jpeg_encoder::ColorType::Rgb)
        .map_err(|e| encode_failed("JPEG", e))?;

    std::fs::write(path, bytes)?;
    Ok(())
}

/// Encode as lossy WebP and write to `path`.
fn save_webp(img: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let encoder = webp::Encoder::from_image(&rgb).map_err(|e| encode_failed("WebP", e))?;
    let memory = encoder.encode(quality.value() as f32);
    std::fs::write(path, &*memory)?;
    Ok(())
}

/// Encode as AVIF via rav1e and write to `path`.
fn save_avif(
    img: &DynamicImage,
    path: &Path,
    quality: Quality,
    effort: Effort,
) -> Result<(), BackendError> {
    let mut bytes = Vec::new();
    let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(
        &mut bytes,
        effort.encoder_speed(),
        quality.value() as u8,
    );
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| encode_failed("AVIF", e))?;
    std::fs::write(path, bytes)?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        if is_avif(path) {
            return identify_avif(path);
        }
        let mut decoder = open_decoder(path)?;
        let (width, height) = decoder.dimensions();
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        Ok(upright_dimensions(width, height, orientation))
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = load_upright(&params.source)?;
        let resized = if (img.width(), img.height()) == (params.width, params.height) {
            img
        } else {
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };
        save_jpeg(&resized, &params.output, &params.jpeg)
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let img = load_upright(&params.source)?;
        let filled = if (img.width(), img.height()) == (params.fill_width, params.fill_height) {
            img
        } else {
            img.resize_exact(params.fill_width, params.fill_height, FilterType::Lanczos3)
        };

        let rgb = filled.to_rgb8();
        let crop_width = params.crop_width.min(rgb.width());
        let crop_height = params.crop_height.min(rgb.height());
        let (x, y) = attention_offset(&rgb, crop_width, crop_height);
        let cropped = image::imageops::crop_imm(&rgb, x, y, crop_width, crop_height).to_image();

        save_jpeg(
            &DynamicImage::ImageRgb8(cropped),
            &params.output,
            &params.jpeg,
        )
    }

    fn derive(&self, params: &DeriveParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        match params.encoding {
            DeriveEncoding::Webp { quality } => save_webp(&img, &params.output, quality),
            DeriveEncoding::Avif { quality, effort } => {
                save_avif(&img, &params.output, quality, effort)
            }
        }
    }
}
