//! Source discovery.
//!
//! Lists the immediate children of the source directory and keeps the files
//! that follow the naming convention in [`naming`](crate::naming). The scan is
//! not recursive, so the optimized output directories that usually live below
//! the source directory are never picked up as sources.
//!
//! ## Rules
//!
//! - Regular files only (symlinks are followed; directories are ignored)
//! - Dot-files are ignored
//! - Result is sorted by file name and contains each file at most once
//! - A missing source directory yields an empty list, not an error
//! - Two sources with the same base name (`photo_a.jpg` and `photo_a.png`)
//!   would write the same outputs; only the first in file-name order is kept

use crate::naming::parse_source_name;
use crate::types::SourceImage;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("Failed to read source directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Find every source image directly inside `dir`.
pub fn discover_sources(dir: &Path, prefix: &str) -> Result<Vec<SourceImage>, DiscoverError> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "source directory missing");
        return Ok(Vec::new());
    }

    // Keyed by base name; walk order is file-name order, so the first wins.
    let mut sources: BTreeMap<String, SourceImage> = BTreeMap::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(err.into()),
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        let Some(parsed) = parse_source_name(file_name, prefix) else {
            continue;
        };

        if let Some(existing) = sources.get(&parsed.base_name) {
            warn!(
                kept = %existing.path.display(),
                ignored = %entry.path().display(),
                "sources share a base name"
            );
            continue;
        }
        sources.insert(
            parsed.base_name.clone(),
            SourceImage {
                path: entry.path().to_path_buf(),
                base_name: parsed.base_name,
            },
        );
    }

    let mut sources: Vec<SourceImage> = sources.into_values().collect();
    sources.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    debug!(count = sources.len(), dir = %dir.display(), "discovered sources");
    Ok(sources)
}
