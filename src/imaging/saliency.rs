//! Attention-based crop placement.
//!
//! Thumbnails crop toward the region most likely to draw the eye. Each pixel
//! of a downsampled copy is scored by local luminance contrast, colour
//! saturation and a skin-tone bonus; a summed-area table then finds the crop
//! window with the highest total score. Ties go to the window nearest the
//! centre, so an image with no salient region gets a centred crop.

use image::RgbImage;
use image::imageops::{self, FilterType};

/// Longest side of the analysis copy.
const ANALYSIS_MAX_SIDE: u32 = 128;

const EDGE_WEIGHT: f64 = 1.0;
const SATURATION_WEIGHT: f64 = 0.6;
const SKIN_WEIGHT: f64 = 0.8;

/// Top-left offset of the most salient `crop_w`×`crop_h` window in `img`.
///
/// Crop dimensions larger than the image are clamped to it.
pub fn attention_offset(img: &RgbImage, crop_w: u32, crop_h: u32) -> (u32, u32) {
    let (width, height) = img.dimensions();
    let crop_w = crop_w.min(width);
    let crop_h = crop_h.min(height);
    if crop_w == width && crop_h == height {
        return (0, 0);
    }

    let scale = (ANALYSIS_MAX_SIDE as f64 / width.max(height) as f64).min(1.0);
    let aw = ((width as f64 * scale).round() as u32).max(1);
    let ah = ((height as f64 * scale).round() as u32).max(1);
    let analysis = if (aw, ah) == (width, height) {
        img.clone()
    } else {
        imageops::resize(img, aw, ah, FilterType::Triangle)
    };

    let win_w = ((crop_w as f64 * aw as f64 / width as f64).round() as u32).clamp(1, aw);
    let win_h = ((crop_h as f64 * ah as f64 / height as f64).round() as u32).clamp(1, ah);

    let scores = saliency_map(&analysis);
    let table = SummedArea::new(&scores, aw, ah);
    let (bx, by) = best_window(&table, win_w, win_h);

    // Map the window centre back to full resolution.
    let x = place_axis(bx, win_w, aw, width, crop_w);
    let y = place_axis(by, win_h, ah, height, crop_h);
    (x, y)
}

fn place_axis(start: u32, window: u32, analysis_len: u32, full_len: u32, crop_len: u32) -> u32 {
    let centre = (start as f64 + window as f64 / 2.0) * full_len as f64 / analysis_len as f64;
    let offset = (centre - crop_len as f64 / 2.0).round().max(0.0) as u32;
    offset.min(full_len - crop_len)
}

/// Per-pixel interest score, row-major.
fn saliency_map(img: &RgbImage) -> Vec<f64> {
    let (width, height) = img.dimensions();
    let luma: Vec<f64> = img.pixels().map(|p| luminance(p.0)).collect();
    let at = |x: u32, y: u32| luma[(y * width + x) as usize];

    let mut scores = Vec::with_capacity(luma.len());
    for (x, y, pixel) in img.enumerate_pixels() {
        let here = at(x, y);
        let mut edge = 0.0;
        if x + 1 < width {
            edge += (here - at(x + 1, y)).abs();
        }
        if y + 1 < height {
            edge += (here - at(x, y + 1)).abs();
        }
        let edge = edge / 255.0;

        let [r, g, b] = pixel.0;
        let skin = if is_skin_tone(r, g, b) { 1.0 } else { 0.0 };

        scores.push(
            EDGE_WEIGHT * edge + SATURATION_WEIGHT * saturation(r, g, b) + SKIN_WEIGHT * skin,
        );
    }
    scores
}

fn luminance([r, g, b]: [u8; 3]) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

fn saturation(r: u8, g: u8, b: u8) -> f64 {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == 0 {
        0.0
    } else {
        (max - min) as f64 / max as f64
    }
}

// Classic RGB skin-tone rule (uniform daylight).
fn is_skin_tone(r: u8, g: u8, b: u8) -> bool {
    r > 95 && g > 40 && b > 20 && r > g && r > b && r - g.min(b) > 15 && r.abs_diff(g) > 15
}

struct SummedArea {
    width: u32,
    height: u32,
    /// (width + 1) × (height + 1), first row and column are zero.
    sums: Vec<f64>,
}

impl SummedArea {
    fn new(values: &[f64], width: u32, height: u32) -> Self {
        let stride = width as usize + 1;
        let mut sums = vec![0.0; stride * (height as usize + 1)];
        for y in 0..height as usize {
            let mut row = 0.0;
            for x in 0..width as usize {
                row += values[y * width as usize + x];
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
            }
        }
        Self {
            width,
            height,
            sums,
        }
    }

    fn window(&self, x: u32, y: u32, w: u32, h: u32) -> f64 {
        let stride = self.width as usize + 1;
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + w as usize, y0 + h as usize);
        self.sums[y1 * stride + x1] - self.sums[y0 * stride + x1] - self.sums[y1 * stride + x0]
            + self.sums[y0 * stride + x0]
    }
}

fn best_window(table: &SummedArea, win_w: u32, win_h: u32) -> (u32, u32) {
    const EPSILON: f64 = 1e-9;

    let max_x = table.width - win_w;
    let max_y = table.height - win_h;
    let centre_x = max_x as f64 / 2.0;
    let centre_y = max_y as f64 / 2.0;
    let distance = |x: u32, y: u32| (x as f64 - centre_x).powi(2) + (y as f64 - centre_y).powi(2);

    let mut best = (0, 0);
    let mut best_score = f64::NEG_INFINITY;
    let mut best_distance = f64::INFINITY;
    for y in 0..=max_y {
        for x in 0..=max_x {
            let score = table.window(x, y, win_w, win_h);
            let dist = distance(x, y);
            let better = score > best_score + EPSILON
                || ((score - best_score).abs() <= EPSILON && dist < best_distance);
            if better {
                best = (x, y);
                best_score = score;
                best_distance = dist;
            }
        }
    }
    best
}
