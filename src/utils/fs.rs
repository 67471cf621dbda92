use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use crate::utils::{OptimizerError, OptimizerResult};

const TEMP_PREFIX: &str = "img-opt-";

/// Get file size in bytes
pub fn file_size(path: impl AsRef<Path>) -> OptimizerResult<u64> {
    std::fs::metadata(path.as_ref())
        .map(|m| m.len())
        .map_err(|e| OptimizerError::IO(format!(
            "Failed to get file size of {}: {}", path.as_ref().display(), e
        )))
}

/// Async variant of [`file_size`] for the batch handlers.
pub async fn get_file_size(path: impl AsRef<Path>) -> OptimizerResult<u64> {
    tokio::fs::metadata(path.as_ref())
        .await
        .map(|m| m.len())
        .map_err(|e| OptimizerError::IO(format!("Failed to get file size: {}", e)))
}

/// Get the lowercase extension of a file name, if any.
pub fn get_extension(name: impl AsRef<Path>) -> Option<String> {
    name.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Creates a uniquely named scratch file in `dir` ending in `.{extension}`.
///
/// The file is removed on drop until [`keep_temp`] hands it over.
pub fn create_temp_output(dir: &Path, extension: &str) -> OptimizerResult<NamedTempFile> {
    tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(&format!(".{extension}"))
        .tempfile_in(dir)
        .map_err(|e| OptimizerError::IO(format!(
            "Cannot create temp file in {}: {}", dir.display(), e
        )))
}

/// Disables auto-deletion; the returned path belongs to the caller from here on.
pub fn keep_temp(file: NamedTempFile) -> OptimizerResult<PathBuf> {
    file.keep()
        .map(|(_, path)| path)
        .map_err(|e| OptimizerError::IO(format!("Cannot keep temp file: {}", e.error)))
}

/// Atomically replaces `target` with `file`.
pub fn replace_with_temp(file: NamedTempFile, target: &Path) -> OptimizerResult<()> {
    file.persist(target)
        .map(|_| ())
        .map_err(|e| OptimizerError::IO(format!(
            "Cannot replace {}: {}", target.display(), e.error
        )))
}
