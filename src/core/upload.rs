//! Uploaded-file abstraction consumed by the optimizer.

use std::path::{Path, PathBuf};
use crate::utils::{OptimizerResult, file_size, get_extension, validate_input_path};

/// An incoming file as handed over by the request layer.
///
/// The backing file usually has a random temp name; format decisions go by
/// the client's declared name instead.
pub trait UploadedFile {
    /// Size of the backing file in bytes
    fn size(&self) -> u64;

    /// Where the bytes currently live
    fn real_path(&self) -> &Path;

    /// Extension of the client-declared file name, as sent (case preserved)
    fn client_original_extension(&self) -> &str;

    /// File name the client declared
    fn client_original_name(&self) -> &str;
}

/// An upload already spooled to local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalUpload {
    path: PathBuf,
    size: u64,
    client_name: String,
    client_extension: String,
}

impl LocalUpload {
    /// Wraps a file whose own name is the client-declared name.
    pub fn from_path(path: impl Into<PathBuf>) -> OptimizerResult<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::with_client_name(path, name)
    }

    /// Wraps a spooled file whose client-declared name differs from its path.
    pub fn with_client_name(path: impl Into<PathBuf>, client_name: impl Into<String>) -> OptimizerResult<Self> {
        let path = path.into();
        validate_input_path(&path)?;
        let size = file_size(&path)?;
        let client_name = client_name.into();
        let client_extension = Path::new(&client_name)
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            path,
            size,
            client_name,
            client_extension,
        })
    }
}

impl UploadedFile for LocalUpload {
    fn size(&self) -> u64 {
        self.size
    }

    fn real_path(&self) -> &Path {
        &self.path
    }

    fn client_original_extension(&self) -> &str {
        &self.client_extension
    }

    fn client_original_name(&self) -> &str {
        &self.client_name
    }
}

impl<T: UploadedFile + ?Sized> UploadedFile for &T {
    fn size(&self) -> u64 {
        (**self).size()
    }

    fn real_path(&self) -> &Path {
        (**self).real_path()
    }

    fn client_original_extension(&self) -> &str {
        (**self).client_original_extension()
    }

    fn client_original_name(&self) -> &str {
        (**self).client_original_name()
    }
}

/// Lower-cased declared extension.
pub(crate) fn declared_extension(file: &impl UploadedFile) -> String {
    let ext = file.client_original_extension();
    if ext.is_empty() {
        get_extension(file.client_original_name()).unwrap_or_default()
    } else {
        ext.to_lowercase()
    }
}
