//! Local filesystem storage backend.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use bytes::Bytes;
use tracing::warn;

use presigned_core::error::{PresignedUrlError, PresignedUrlResult};

use crate::backend::{ObjectRead, StorageBackend};

/// Storage backend serving files from under a base directory.
///
/// Object paths are resolved relative to the base directory; any path
/// containing a parent-directory component is rejected before touching
/// the filesystem, so objects can never escape the root.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    base_dir: PathBuf,
}

impl LocalBackend {
    /// Create a backend rooted at `base_dir`.
    ///
    /// The directory is not required to exist yet; lookups against a
    /// missing directory simply report the object as absent.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolve an object path to an absolute filesystem path.
    ///
    /// # Errors
    ///
    /// Returns [`PresignedUrlError::InvalidPath`] when the path contains
    /// a `..` component or is absolute.
    fn resolve(&self, path: &str) -> PresignedUrlResult<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));

        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    warn!(path, "rejected path escaping the storage root");
                    return Err(PresignedUrlError::InvalidPath {
                        path: path.to_owned(),
                    });
                }
            }
        }

        Ok(self.base_dir.join(relative))
    }

    fn metadata(&self, path: &str) -> PresignedUrlResult<fs::Metadata> {
        let full = self.resolve(path)?;
        fs::metadata(&full)
            .ok()
            .filter(fs::Metadata::is_file)
            .ok_or_else(|| PresignedUrlError::FileNotFound {
                path: path.to_owned(),
            })
    }
}

impl StorageBackend for LocalBackend {
    fn exists(&self, path: &str) -> PresignedUrlResult<bool> {
        let full = self.resolve(path)?;
        Ok(full.is_file())
    }

    fn read(&self, path: &str) -> PresignedUrlResult<Bytes> {
        let full = self.resolve(path)?;
        let data = fs::read(&full).map_err(|_| PresignedUrlError::FileNotFound {
            path: path.to_owned(),
        })?;
        Ok(Bytes::from(data))
    }

    fn read_stream(&self, path: &str) -> PresignedUrlResult<Box<dyn ObjectRead>> {
        let full = self.resolve(path)?;
        let file = fs::File::open(&full).map_err(|_| PresignedUrlError::FileNotFound {
            path: path.to_owned(),
        })?;
        Ok(Box::new(file))
    }

    fn size(&self, path: &str) -> PresignedUrlResult<u64> {
        Ok(self.metadata(path)?.len())
    }

    fn mime_type(&self, path: &str) -> String {
        mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_owned()
    }

    fn last_modified(&self, path: &str) -> i64 {
        let Ok(metadata) = self.metadata(path) else {
            return 0;
        };
        metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .and_then(|d| i64::try_from(d.as_secs()).ok())
            .unwrap_or(0)
    }
}
