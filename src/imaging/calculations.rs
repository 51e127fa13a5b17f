//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Fit `original` inside a `bound`×`bound` square, preserving aspect ratio.
///
/// Never upscales: when the longer edge already fits, the original dimensions
/// are returned unchanged. Neither output edge is allowed to round to zero.
///
/// # Examples
/// ```
/// # use folio_images::imaging::fit_inside_dimensions;
/// // 4000x3000 landscape into 1600 → 1600x1200
/// assert_eq!(fit_inside_dimensions((4000, 3000), 1600), (1600, 1200));
///
/// // Already small enough: untouched
/// assert_eq!(fit_inside_dimensions((1200, 900), 1600), (1200, 900));
/// ```
pub fn fit_inside_dimensions(original: (u32, u32), bound: u32) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    let longer_edge = orig_w.max(orig_h);
    if longer_edge <= bound {
        return original;
    }

    let ratio = bound as f64 / longer_edge as f64;
    if orig_w >= orig_h {
        // Landscape or square
        (bound, scale_edge(orig_h, ratio))
    } else {
        // Portrait
        (scale_edge(orig_w, ratio), bound)
    }
}

fn scale_edge(edge: u32, ratio: f64) -> u32 {
    ((edge as f64 * ratio).round() as u32).max(1)
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target area dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Fill dimensions (at least one matches target)
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = ((h as f64 * src_aspect).round() as u32).max(tgt_w);
        (w, h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = ((w as f64 / src_aspect).round() as u32).max(tgt_h);
        (w, h)
    }
}

/// Resize-then-crop plan for a square thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailGeometry {
    /// Dimensions the upright source is resized to.
    pub fill: (u32, u32),
    /// Dimensions of the final crop taken from the filled image.
    pub crop: (u32, u32),
}

/// Plan a `size`×`size` cover thumbnail for an upright source.
///
/// When both edges are at least `size`, the source is scaled so its short
/// edge equals `size` and a square is cropped from it. Otherwise the source is
/// left unscaled and the crop is `size` clamped to each edge, so small
/// sources produce a thumbnail no larger than themselves.
pub fn plan_thumbnail_geometry(original: (u32, u32), size: u32) -> ThumbnailGeometry {
    let (orig_w, orig_h) = original;
    if orig_w >= size && orig_h >= size {
        ThumbnailGeometry {
            fill: calculate_fill_dimensions(original, (size, size)),
            crop: (size, size),
        }
    } else {
        ThumbnailGeometry {
            fill: original,
            crop: (size.min(orig_w), size.min(orig_h)),
        }
    }
}
