//! # Folio Images
//!
//! Batch generator of responsive image variants for a static photography
//! portfolio. Every `photo_*` source in the image directory is rendered into a
//! *large* lightbox image and a square grid *thumbnail*, each as JPEG, WebP and
//! AVIF, so the site can serve the smallest format a browser understands.
//!
//! # Pipeline
//!
//! ```text
//! 1. Discover  images/photo_*.{jpg,jpeg,png}  →  sorted source list
//! 2. Process   each source (bounded pool)     →  large/ and thumbs/ variants
//! 3. Report    per-source progress            →  summary with output globs
//! ```
//!
//! Within a size class the JPEG is rendered from the source first; WebP and
//! AVIF are then encoded from that JPEG, so all three formats share exact
//! pixel dimensions.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`discover`] | Lists source images in the source directory |
//! | [`process`] | Runs every source through the imaging operations on a bounded worker pool |
//! | [`imaging`] | Dimension math, saliency crop, backend trait, pure-Rust codecs |
//! | [`config`] | `folio.toml` loading, merging with defaults, validation |
//! | [`naming`] | Source and variant filename conventions |
//! | [`types`] | Shared types: size classes, encodings, variant outcomes |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Existence Is the Cache
//!
//! An output whose path exists is never rewritten, whatever its content or
//! age. Re-running is cheap and safe; regenerating a variant means deleting
//! it. Changing a size parameter changes every output path (`@<size>` is part
//! of the name), so new sizes never collide with old files.
//!
//! ## One Failure, One Photo
//!
//! A corrupt or unsupported source is reported and skipped. Only problems that
//! make the whole run meaningless (bad config, unwritable output directories)
//! end it with a non-zero exit code.

pub mod config;
pub mod discover;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
