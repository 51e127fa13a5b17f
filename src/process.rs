//! Batch processing of discovered sources.
//!
//! Takes the source list from [`discover`](crate::discover) and produces every
//! missing variant for each source.
//!
//! ## Output Formats
//!
//! For each source image, generates:
//! - **Large**: fit inside `long_edge`×`long_edge`, never upscaled
//! - **Thumbnail**: `size`×`size` crop toward the salient region
//!
//! each as JPEG, WebP and AVIF. Within a size class the JPEG is produced first
//! and the other two are encoded from it.
//!
//! ## Output Structure
//!
//! ```text
//! images/
//! ├── photo_dawn.jpg
//! └── optimized/
//!     ├── large/
//!     │   ├── photo_dawn@1600.jpg
//!     │   ├── photo_dawn@1600.webp
//!     │   └── photo_dawn@1600.avif
//!     └── thumbs/
//!         ├── photo_dawn@480.jpg
//!         ├── photo_dawn@480.webp
//!         └── photo_dawn@480.avif
//! ```
//!
//! ## Parallel Processing
//!
//! Sources run on a dedicated [rayon](https://docs.rs/rayon) pool with a fixed
//! number of workers pulling from a shared cursor, so at most
//! [`ProcessConfig::threads`] sources are in flight at once. A failure in one
//! source (decode error, encode error, even a panic inside a codec) is reported
//! for that source and never stops the others.

use crate::config::{OptimizeConfig, ResolvedPaths, effective_threads};
use crate::imaging::{
    BackendError, ImageBackend, VariantConfig, create_large_variants, create_thumbnail_variants,
};
use crate::types::{Encoding, SourceImage, VariantInfo, VariantStatus};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info_span, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Configuration for a processing run.
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    pub large: VariantConfig,
    pub thumbnail: VariantConfig,
    /// Sources processed concurrently.
    pub threads: usize,
}

impl ProcessConfig {
    /// Build a ProcessConfig from the validated config and resolved directories.
    pub fn new(config: &OptimizeConfig, paths: &ResolvedPaths) -> Self {
        Self {
            large: VariantConfig::large(&config.large, &config.encoding, &paths.large_dir),
            thumbnail: VariantConfig::thumbnail(
                &config.thumbnails,
                &config.encoding,
                &paths.thumbs_dir,
            ),
            threads: effective_threads(&config.processing),
        }
    }
}

/// Progress events emitted as each source finishes.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    ImageProcessed {
        /// 1-based position in the discovered source list.
        index: usize,
        source_path: PathBuf,
        variants: Vec<VariantInfo>,
    },
    ImageFailed {
        index: usize,
        source_path: PathBuf,
        error: String,
    },
}

/// What happened to one source.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub source: SourceImage,
    pub result: Result<Vec<VariantInfo>, String>,
}

/// Result of a whole batch, in source order.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub outcomes: Vec<SourceOutcome>,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&SourceImage, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.source, e.as_str())))
    }

    /// Variant count with the given status across all successful sources.
    pub fn count(&self, status: VariantStatus) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .flatten()
            .filter(|v| v.status == status)
            .count()
    }
}

/// Create both output directories (and parents) if missing.
pub fn ensure_output_dirs(config: &ProcessConfig) -> Result<(), ProcessError> {
    for dir in [&config.large.output_dir, &config.thumbnail.output_dir] {
        std::fs::create_dir_all(dir).map_err(|source| ProcessError::OutputDir {
            path: dir.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Produce all variants of one source: large first, then thumbnail.
pub fn process_source(
    backend: &impl ImageBackend,
    source: &SourceImage,
    config: &ProcessConfig,
) -> Result<Vec<VariantInfo>, BackendError> {
    let mut variants = create_large_variants(backend, source, &config.large)?;
    variants.extend(create_thumbnail_variants(
        backend,
        source,
        &config.thumbnail,
    )?);
    Ok(variants)
}

/// Output paths of `source` that do not exist yet, large first.
pub fn missing_variants(source: &SourceImage, config: &ProcessConfig) -> Vec<PathBuf> {
    [&config.large, &config.thumbnail]
        .into_iter()
        .flat_map(|class| {
            Encoding::ALL
                .into_iter()
                .map(move |encoding| class.output_path(&source.base_name, encoding))
        })
        .filter(|path| !path.exists())
        .collect()
}

/// Process every source, reporting each one on `progress` as it finishes.
///
/// Only failing to start the worker pool is an error here; per-source
/// failures are collected in the returned summary.
pub fn process_batch(
    backend: &impl ImageBackend,
    sources: &[SourceImage],
    config: &ProcessConfig,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<BatchSummary, ProcessError> {
    let start = Instant::now();

    let outcomes = run_bounded(sources, config.threads, |index, source| {
        let _span = info_span!("source", name = %source.base_name).entered();
        let result = isolate(|| process_source(backend, source, config));

        let event = match &result {
            Ok(variants) => {
                debug!(variants = variants.len(), "done");
                ProcessEvent::ImageProcessed {
                    index: index + 1,
                    source_path: source.path.clone(),
                    variants: variants.clone(),
                }
            }
            Err(error) => {
                warn!(source = %source.path.display(), %error, "failed");
                ProcessEvent::ImageFailed {
                    index: index + 1,
                    source_path: source.path.clone(),
                    error: error.clone(),
                }
            }
        };
        if let Some(tx) = &progress {
            // A closed receiver only means nobody is watching.
            tx.send(event).ok();
        }

        SourceOutcome {
            source: source.clone(),
            result,
        }
    })?;

    Ok(BatchSummary {
        outcomes,
        elapsed: start.elapsed(),
    })
}

/// Run `work`, turning both errors and panics into an error message.
fn isolate<T, E: std::fmt::Display>(work: impl FnOnce() -> Result<T, E>) -> Result<T, String> {
    match panic::catch_unwind(AssertUnwindSafe(work)) {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(format!("panicked: {message}"))
        }
    }
}

/// Apply `work` to every item with at most `threads` items in flight.
///
/// Each of the `threads` workers repeatedly claims the next unclaimed item, so
/// a slow item only holds up its own worker. Results come back in item order.
pub fn run_bounded<T, R, F>(items: &[T], threads: usize, work: F) -> Result<Vec<R>, ProcessError>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> R + Sync,
{
    let workers = threads.max(1).min(items.len().max(1));
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("folio-worker-{i}"))
        .build()?;

    let cursor = AtomicUsize::new(0);
    let results: Mutex<Vec<(usize, R)>> = Mutex::new(Vec::with_capacity(items.len()));

    pool.scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|_| {
                loop {
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(item) = items.get(index) else {
                        break;
                    };
                    let result = work(index, item);
                    results
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push((index, result));
                }
            });
        }
    });

    let mut results = results
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    results.sort_by_key(|(index, _)| *index);
    Ok(results.into_iter().map(|(_, result)| result).collect())
}
