//! Async handlers running the blocking pipeline off the runtime threads.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::core::{LocalUpload, OptimizationResult, OptimizeOptions, OptimizedImage, UploadedFile};
use crate::processing::{ImageOptimizer, Imaging};
use crate::utils::get_file_size;

/// Which pipeline a request goes through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizeMode {
    /// Format-preserving, skips small files
    #[default]
    Standard,
    /// Always JPEG, with the corrective pass
    Raster,
}

impl OptimizeMode {
    fn run<B: Imaging>(self, optimizer: &ImageOptimizer<B>, upload: &LocalUpload, options: OptimizeOptions) -> OptimizedImage {
        match self {
            Self::Standard => optimizer.optimize(upload, options),
            Self::Raster => optimizer.optimize_with_raster(upload, options),
        }
    }
}

/// Optimizes a single upload.
///
/// This is a convenience wrapper around [`optimize_uploads`].
pub async fn optimize_upload<B>(
    optimizer: Arc<ImageOptimizer<B>>,
    upload: LocalUpload,
    mode: OptimizeMode,
    options: OptimizeOptions,
) -> OptimizationResult
where
    B: Imaging + 'static,
{
    let original_path = upload.real_path().to_path_buf();
    let original_size = upload.size();
    optimize_uploads(optimizer, vec![upload], mode, options)
        .await
        .into_iter()
        .next()
        .unwrap_or_else(|| OptimizationResult::failed(&original_path, original_size, "No result returned".to_string()))
}

/// Optimizes uploads one after another on tokio's blocking pool.
///
/// Always yields one result per upload, in order. A worker that panics
/// produces a failed result for its upload instead of aborting the batch.
pub async fn optimize_uploads<B>(
    optimizer: Arc<ImageOptimizer<B>>,
    uploads: Vec<LocalUpload>,
    mode: OptimizeMode,
    options: OptimizeOptions,
) -> Vec<OptimizationResult>
where
    B: Imaging + 'static,
{
    let total = uploads.len();
    debug!("Optimizing {} uploads ({:?} mode)", total, mode);
    let mut results = Vec::with_capacity(total);

    for (idx, upload) in uploads.into_iter().enumerate() {
        let original_path = upload.real_path().to_path_buf();
        let original_size = upload.size();
        let name = upload.client_original_name().to_string();
        let worker = Arc::clone(&optimizer);

        let joined = tokio::task::spawn_blocking(move || mode.run(&*worker, &upload, options)).await;

        let result = match joined {
            Ok(image) => {
                let optimized_size = if image.is_new_file() {
                    match get_file_size(image.path()).await {
                        Ok(size) => size,
                        Err(e) => {
                            warn!("Cannot stat optimized output for {}: {}", name, e);
                            0
                        }
                    }
                } else {
                    original_size
                };
                OptimizationResult::new(&original_path, original_size, image, optimized_size)
            }
            Err(e) => {
                warn!("Optimization worker for {} died: {}", name, e);
                OptimizationResult::failed(&original_path, original_size, format!("Task panicked: {e}"))
            }
        };

        let saved_kb = result.saved_bytes as f64 / 1024.0;
        debug!(
            "[{}/{}] {name} ({saved_kb:.2} KB saved / {:.0}% compression)",
            idx + 1, total, result.compression_ratio
        );
        results.push(result);
    }

    results
}
