//! Optimizer configuration.
//!
//! Handles loading, validating, and merging `folio.toml`. Configuration is
//! layered: stock defaults are overridden by the project's `folio.toml`, which
//! is in turn overridden by the positional size arguments on the command line.
//!
//! ## Config File Location
//!
//! ```text
//! site/                        # Project root (--root, default ".")
//! ├── folio.toml               # Optional, sparse
//! └── images/
//!     ├── photo_sunset.jpg     # Sources
//!     └── optimized/
//!         ├── large/           # <base>@1600.{jpg,webp,avif}
//!         └── thumbs/          # <base>@480.{jpg,webp,avif}
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! source_dir = "images"
//! large_dir = "images/optimized/large"
//! thumbs_dir = "images/optimized/thumbs"
//! prefix = "photo_"
//!
//! [large]
//! long_edge = 1600          # Longer edge bound, never upscaled
//! jpeg_quality = 82
//! webp_quality = 82
//! avif_quality = 48
//!
//! [thumbnails]
//! size = 480                # Square side, never upscaled
//! jpeg_quality = 80
//! webp_quality = 75
//! avif_quality = 46
//!
//! [encoding]
//! avif_effort = 5           # 0 (fastest) to 9 (smallest)
//!
//! [processing]
//! max_processes = 4         # Source images in flight at once
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILENAME: &str = "folio.toml";

/// Largest accepted size parameter. JPEG frames are limited to 65535 px per
/// side; this keeps the bound well inside that.
pub const MAX_DIMENSION: u32 = 16384;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Optimizer configuration loaded from `folio.toml`.
///
/// All fields have defaults matching the published gallery layout. User
/// config files need only specify the values they want to override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizeConfig {
    /// Source and output locations.
    pub paths: PathsConfig,
    /// Large (lightbox) variant settings.
    pub large: LargeConfig,
    /// Square thumbnail settings.
    pub thumbnails: ThumbnailsConfig,
    /// Encoder settings shared by both size classes.
    pub encoding: EncodingConfig,
    /// Worker pool settings.
    pub processing: ProcessingConfig,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            large: LargeConfig::default(),
            thumbnails: ThumbnailsConfig::default(),
            encoding: EncodingConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl OptimizeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_size("large.long_edge", self.large.long_edge)?;
        check_size("thumbnails.size", self.thumbnails.size)?;
        check_quality("large.jpeg_quality", self.large.jpeg_quality)?;
        check_quality("large.webp_quality", self.large.webp_quality)?;
        check_quality("large.avif_quality", self.large.avif_quality)?;
        check_quality("thumbnails.jpeg_quality", self.thumbnails.jpeg_quality)?;
        check_quality("thumbnails.webp_quality", self.thumbnails.webp_quality)?;
        check_quality("thumbnails.avif_quality", self.thumbnails.avif_quality)?;
        if self.encoding.avif_effort > 9 {
            return Err(ConfigError::Validation(
                "encoding.avif_effort must be 0-9".into(),
            ));
        }
        if self.processing.max_processes == 0 {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        if self.paths.prefix.is_empty() {
            return Err(ConfigError::Validation(
                "paths.prefix must not be empty".into(),
            ));
        }
        for (key, dir) in [
            ("paths.source_dir", &self.paths.source_dir),
            ("paths.large_dir", &self.paths.large_dir),
            ("paths.thumbs_dir", &self.paths.thumbs_dir),
        ] {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        let source_dir = lexical(&self.paths.source_dir);
        for (key, dir) in [
            ("paths.large_dir", &self.paths.large_dir),
            ("paths.thumbs_dir", &self.paths.thumbs_dir),
        ] {
            if lexical(dir) == source_dir {
                return Err(ConfigError::Validation(format!(
                    "{key} must differ from paths.source_dir; outputs there would be picked up as sources"
                )));
            }
        }
        if lexical(&self.paths.large_dir) == lexical(&self.paths.thumbs_dir)
            && self.large.long_edge == self.thumbnails.size
        {
            return Err(ConfigError::Validation(
                "large and thumbnail outputs would share file names; use different directories or sizes"
                    .into(),
            ));
        }
        Ok(())
    }

    /// Apply the positional command-line size overrides.
    pub fn with_size_overrides(mut self, long_edge: Option<u32>, thumb_size: Option<u32>) -> Self {
        if let Some(edge) = long_edge {
            self.large.long_edge = edge;
        }
        if let Some(size) = thumb_size {
            self.thumbnails.size = size;
        }
        self
    }
}

/// `path` without `.` components, so `./images` and `images/` compare equal.
fn lexical(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn check_size(key: &str, value: u32) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_DIMENSION {
        return Err(ConfigError::Validation(format!(
            "{key} must be 1-{MAX_DIMENSION}, got {value}"
        )));
    }
    Ok(())
}

fn check_quality(key: &str, value: u32) -> Result<(), ConfigError> {
    if !(1..=100).contains(&value) {
        return Err(ConfigError::Validation(format!(
            "{key} must be 1-100, got {value}"
        )));
    }
    Ok(())
}

/// Source and output locations, relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory scanned (non-recursively) for source images.
    pub source_dir: PathBuf,
    /// Output directory for large variants.
    pub large_dir: PathBuf,
    /// Output directory for thumbnails.
    pub thumbs_dir: PathBuf,
    /// File name prefix a source must start with.
    pub prefix: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("images"),
            large_dir: PathBuf::from("images/optimized/large"),
            thumbs_dir: PathBuf::from("images/optimized/thumbs"),
            prefix: "photo_".to_string(),
        }
    }
}

impl PathsConfig {
    /// Resolve every directory against the project root.
    ///
    /// Absolute paths in the config are kept as they are.
    pub fn resolve(&self, root: &Path) -> ResolvedPaths {
        ResolvedPaths {
            source_dir: root.join(&self.source_dir),
            large_dir: root.join(&self.large_dir),
            thumbs_dir: root.join(&self.thumbs_dir),
        }
    }
}

/// Directories after resolution against the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub source_dir: PathBuf,
    pub large_dir: PathBuf,
    pub thumbs_dir: PathBuf,
}

/// Large variant settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LargeConfig {
    /// Bound on the longer edge in pixels. Smaller sources keep their size.
    pub long_edge: u32,
    pub jpeg_quality: u32,
    pub webp_quality: u32,
    pub avif_quality: u32,
}

impl Default for LargeConfig {
    fn default() -> Self {
        Self {
            long_edge: 1600,
            jpeg_quality: 82,
            webp_quality: 82,
            avif_quality: 48,
        }
    }
}

/// Thumbnail settings. Thumbnails are viewed small, so qualities are lower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Side of the square crop in pixels.
    pub size: u32,
    pub jpeg_quality: u32,
    pub webp_quality: u32,
    pub avif_quality: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            size: 480,
            jpeg_quality: 80,
            webp_quality: 75,
            avif_quality: 46,
        }
    }
}

/// Encoder settings shared by both size classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// AVIF effort, 0 (fastest) to 9 (slowest, smallest files).
    pub avif_effort: u8,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self { avif_effort: 5 }
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of source images processed at once. Values larger
    /// than the core count are clamped down.
    pub max_processes: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_processes: DEFAULT_MAX_PROCESSES,
        }
    }
}

/// Pool size used when the config does not set one.
pub const DEFAULT_MAX_PROCESSES: usize = 4;

/// Resolve the effective worker count from config.
///
/// The configured count is capped at the available cores (the user can
/// constrain down, not up) and is never below 1.
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.min(cores).max(1)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(OptimizeConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `folio.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize.
///
/// Validation is left to the caller so that command-line overrides can be
/// applied before the final check.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<OptimizeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: OptimizeConfig = merged.try_into()?;
    Ok(config)
}

/// Load config from `folio.toml` in the project root, apply the command-line
/// size overrides, and validate the result.
pub fn load_config(
    root: &Path,
    long_edge: Option<u32>,
    thumb_size: Option<u32>,
) -> Result<OptimizeConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    let config = resolve_config(base, overlay)?.with_size_overrides(long_edge, thumb_size);
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `folio.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# folio-images configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at the project root as folio.toml. Positional arguments
# on the command line (LONG_EDGE, THUMB_SIZE) override the sizes below.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Locations (relative to the project root)
# ---------------------------------------------------------------------------
[paths]
# Directory scanned for sources (not recursive).
source_dir = "images"

# Output directories, created if missing.
large_dir = "images/optimized/large"
thumbs_dir = "images/optimized/thumbs"

# Only files named <prefix>*.jpg|jpeg|png (any case) are processed.
prefix = "photo_"

# ---------------------------------------------------------------------------
# Large variants (lightbox)
# ---------------------------------------------------------------------------
[large]
# Longer edge in pixels. Smaller sources are never upscaled.
long_edge = 1600

# Encoding quality (1 = worst, 100 = best).
jpeg_quality = 82
webp_quality = 82
avif_quality = 48

# ---------------------------------------------------------------------------
# Square thumbnails (gallery grid)
# ---------------------------------------------------------------------------
[thumbnails]
# Side of the square crop. Smaller sources are cropped, never upscaled.
size = 480

jpeg_quality = 80
webp_quality = 75
avif_quality = 46

# ---------------------------------------------------------------------------
# Encoders
# ---------------------------------------------------------------------------
[encoding]
# AVIF effort: 0 = fastest, 9 = slowest with the smallest files.
avif_effort = 5

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Source images processed at once. Clamped to the number of CPU cores.
max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_sizes() {
        let config = OptimizeConfig::default();
        assert_eq!(config.large.long_edge, 1600);
        assert_eq!(config.thumbnails.size, 480);
    }

    #[test]
    fn default_config_qualities() {
        let config = OptimizeConfig::default();
        assert_eq!(
            (
                config.large.jpeg_quality,
                config.large.webp_quality,
                config.large.avif_quality
            ),
            (82, 82, 48)
        );
        assert_eq!(
            (
                config.thumbnails.jpeg_quality,
                config.thumbnails.webp_quality,
                config.thumbnails.avif_quality
            ),
            (80, 75, 46)
        );
        assert_eq!(config.encoding.avif_effort, 5);
        assert_eq!(config.processing.max_processes, 4);
    }

    #[test]
    fn default_config_paths() {
        let paths = OptimizeConfig::default().paths;
        assert_eq!(paths.source_dir, PathBuf::from("images"));
        assert_eq!(paths.large_dir, PathBuf::from("images/optimized/large"));
        assert_eq!(paths.thumbs_dir, PathBuf::from("images/optimized/thumbs"));
        assert_eq!(paths.prefix, "photo_");
    }

    #[test]
    fn default_config_is_valid() {
        OptimizeConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[thumbnails]
size = 320
"#;
        let config: OptimizeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.thumbnails.size, 320);
        // Defaults preserved
        assert_eq!(config.thumbnails.jpeg_quality, 80);
        assert_eq!(config.large.long_edge, 1600);
    }

    #[test]
    fn unknown_keys_rejected() {
        let toml = r#"
[large]
long_edge = 1200
sharpen = true
"#;
        assert!(toml::from_str::<OptimizeConfig>(toml).is_err());
    }

    #[test]
    fn paths_resolve_against_root() {
        let resolved = PathsConfig::default().resolve(Path::new("/site"));
        assert_eq!(resolved.source_dir, PathBuf::from("/site/images"));
        assert_eq!(
            resolved.large_dir,
            PathBuf::from("/site/images/optimized/large")
        );
        assert_eq!(
            resolved.thumbs_dir,
            PathBuf::from("/site/images/optimized/thumbs")
        );
    }

    #[test]
    fn size_overrides_replace_config_values() {
        let config = OptimizeConfig::default().with_size_overrides(Some(2048), Some(512));
        assert_eq!(config.large.long_edge, 2048);
        assert_eq!(config.thumbnails.size, 512);

        let untouched = OptimizeConfig::default().with_size_overrides(None, None);
        assert_eq!(untouched, OptimizeConfig::default());
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_rejects_zero_size() {
        let config = OptimizeConfig::default().with_size_overrides(Some(0), None);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_oversized_bound() {
        let config = OptimizeConfig::default().with_size_overrides(None, Some(MAX_DIMENSION + 1));
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_quality_out_of_range() {
        let mut config = OptimizeConfig::default();
        config.thumbnails.webp_quality = 0;
        assert!(config.validate().is_err());

        let mut config = OptimizeConfig::default();
        config.large.avif_quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_effort_above_nine() {
        let mut config = OptimizeConfig::default();
        config.encoding.avif_effort = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let mut config = OptimizeConfig::default();
        config.processing.max_processes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_prefix() {
        let mut config = OptimizeConfig::default();
        config.paths.prefix = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_colliding_outputs() {
        let mut config = OptimizeConfig::default();
        config.paths.thumbs_dir = config.paths.large_dir.clone();
        config.thumbnails.size = config.large.long_edge;
        assert!(config.validate().is_err());

        // Same directory is fine while the size parameters differ.
        config.thumbnails.size = 480;
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_output_dir_equal_to_source_dir() {
        let mut config = OptimizeConfig::default();
        config.paths.large_dir = PathBuf::from("images");
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = OptimizeConfig::default();
        config.paths.thumbs_dir = PathBuf::from("./images/");
        assert!(config.validate().is_err());

        // A subdirectory of the source dir is not scanned.
        let mut config = OptimizeConfig::default();
        config.paths.large_dir = PathBuf::from("images/large");
        config.validate().unwrap();
    }

    #[test]
    fn load_config_rejects_outputs_in_source_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[paths]\nlarge_dir = \"images\"\n",
        )
        .unwrap();
        assert!(matches!(
            load_config(tmp.path(), Some(64), Some(32)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn effective_threads_never_exceeds_request() {
        let config = ProcessingConfig { max_processes: 1 };
        assert_eq!(effective_threads(&config), 1);

        let threads = effective_threads(&ProcessingConfig::default());
        assert!((1..=DEFAULT_MAX_PROCESSES).contains(&threads));
    }

    // =========================================================================
    // merge_toml / load_config
    // =========================================================================

    #[test]
    fn merge_toml_overlay_wins_and_base_preserved() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n[b]\nz = 4\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
        assert_eq!(merged["b"]["z"].as_integer(), Some(4));
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path(), None, None).unwrap();
        assert_eq!(config, OptimizeConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
[paths]
source_dir = "assets/gallery"

[large]
long_edge = 2048
"#,
        )
        .unwrap();

        let config = load_config(tmp.path(), None, None).unwrap();
        assert_eq!(config.paths.source_dir, PathBuf::from("assets/gallery"));
        assert_eq!(config.large.long_edge, 2048);
        // Unspecified values should be defaults
        assert_eq!(config.paths.prefix, "photo_");
        assert_eq!(config.thumbnails.size, 480);
    }

    #[test]
    fn cli_overrides_take_precedence_over_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[large]\nlong_edge = 2048\n[thumbnails]\nsize = 300\n",
        )
        .unwrap();

        let config = load_config(tmp.path(), Some(1200), None).unwrap();
        assert_eq!(config.large.long_edge, 1200);
        assert_eq!(config.thumbnails.size, 300);
    }

    #[test]
    fn load_config_invalid_toml_errors() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[large\nlong_edge = ").unwrap();
        assert!(matches!(
            load_config(tmp.path(), None, None),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn load_config_invalid_values_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[thumbnails]\njpeg_quality = 0\n",
        )
        .unwrap();
        assert!(matches!(
            load_config(tmp.path(), None, None),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: OptimizeConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, OptimizeConfig::default());
    }
}
