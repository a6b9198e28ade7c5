//! The storage backend capability trait.

use bytes::Bytes;

use presigned_core::error::PresignedUrlResult;

/// A seekable, readable object stream.
///
/// Blanket-implemented for anything that is `Read + Seek + Send`, so
/// backends can hand out plain [`std::fs::File`]s or
/// [`std::io::Cursor`]s. Streams are owned by the single response they
/// serve and are closed on drop.
pub trait ObjectRead: std::io::Read + std::io::Seek + Send {}

impl<T: std::io::Read + std::io::Seek + Send> ObjectRead for T {}

/// Read-only capability interface over a storage backend.
///
/// One implementation exists per backend kind (filesystem, object store,
/// virtual filesystem); the kind is selected at configuration time, never
/// by runtime type inspection. Implementations must be safe for concurrent
/// reads and must normalize their own I/O failures into
/// [`FileNotFound`](presigned_core::error::PresignedUrlError::FileNotFound)
/// or
/// [`InvalidPath`](presigned_core::error::PresignedUrlError::InvalidPath)
/// before they surface.
pub trait StorageBackend: Send + Sync {
    /// Check whether an object exists at `path`.
    ///
    /// # Errors
    ///
    /// Filesystem-style backends return `InvalidPath` when the path
    /// escapes the backend root.
    fn exists(&self, path: &str) -> PresignedUrlResult<bool>;

    /// Read the full contents of the object at `path`.
    fn read(&self, path: &str) -> PresignedUrlResult<Bytes>;

    /// Open a seekable byte stream over the object at `path`.
    fn read_stream(&self, path: &str) -> PresignedUrlResult<Box<dyn ObjectRead>>;

    /// The object size in bytes.
    fn size(&self, path: &str) -> PresignedUrlResult<u64>;

    /// Best-effort mime type; `application/octet-stream` when unknown.
    fn mime_type(&self, path: &str) -> String;

    /// Last-modified unix timestamp; `0` when unknown.
    fn last_modified(&self, path: &str) -> i64;

    /// Whether this backend can issue its own presigned URLs
    /// (e.g. cloud-provider native signing).
    fn supports_native_presigned_url(&self) -> bool {
        false
    }

    /// Issue a backend-native presigned URL for `path` expiring at
    /// `expires`, or `None` to fall back to the generic signer.
    fn native_presigned_url(&self, path: &str, expires: i64) -> Option<String> {
        let _ = (path, expires);
        None
    }
}
