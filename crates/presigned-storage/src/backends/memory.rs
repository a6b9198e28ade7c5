//! In-memory storage backend.

use std::collections::HashMap;
use std::io::Cursor;

use bytes::Bytes;

use presigned_core::error::{PresignedUrlError, PresignedUrlResult};

use crate::backend::{ObjectRead, StorageBackend};

/// A stored in-memory object with optional explicit metadata.
#[derive(Debug, Clone)]
struct MemoryObject {
    data: Bytes,
    mime_type: Option<String>,
    last_modified: i64,
}

/// Storage backend holding objects entirely in memory.
///
/// Useful as a virtual filesystem for small fixed assets and as a test
/// double for the serving pipeline. Objects are inserted via `&mut`
/// before the backend is shared, then read concurrently.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    objects: HashMap<String, MemoryObject>,
    native_url_base: Option<String>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make this backend advertise native presigned URL support, issuing
    /// URLs of the form `{base}/{path}?expires={expires}`.
    ///
    /// Primarily for exercising the registry's delegation path.
    #[must_use]
    pub fn with_native_urls(mut self, base: impl Into<String>) -> Self {
        self.native_url_base = Some(base.into());
        self
    }

    /// Store an object, guessing its mime type from the path.
    pub fn put_object(&mut self, path: &str, data: impl Into<Bytes>) {
        self.objects.insert(
            path.to_owned(),
            MemoryObject {
                data: data.into(),
                mime_type: None,
                last_modified: 0,
            },
        );
    }

    /// Store an object with an explicit mime type and last-modified
    /// timestamp.
    pub fn put_object_with(
        &mut self,
        path: &str,
        data: impl Into<Bytes>,
        mime_type: impl Into<String>,
        last_modified: i64,
    ) {
        self.objects.insert(
            path.to_owned(),
            MemoryObject {
                data: data.into(),
                mime_type: Some(mime_type.into()),
                last_modified,
            },
        );
    }

    fn get(&self, path: &str) -> PresignedUrlResult<&MemoryObject> {
        self.objects
            .get(path)
            .ok_or_else(|| PresignedUrlError::FileNotFound {
                path: path.to_owned(),
            })
    }
}

impl StorageBackend for MemoryBackend {
    fn exists(&self, path: &str) -> PresignedUrlResult<bool> {
        Ok(self.objects.contains_key(path))
    }

    fn read(&self, path: &str) -> PresignedUrlResult<Bytes> {
        Ok(self.get(path)?.data.clone())
    }

    fn read_stream(&self, path: &str) -> PresignedUrlResult<Box<dyn ObjectRead>> {
        // Bytes is cheap to clone; the cursor owns its own handle.
        Ok(Box::new(Cursor::new(self.get(path)?.data.clone())))
    }

    fn size(&self, path: &str) -> PresignedUrlResult<u64> {
        Ok(self.get(path)?.data.len() as u64)
    }

    fn mime_type(&self, path: &str) -> String {
        if let Ok(object) = self.get(path) {
            if let Some(mime) = &object.mime_type {
                return mime.clone();
            }
        }
        mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_owned()
    }

    fn last_modified(&self, path: &str) -> i64 {
        self.get(path).map_or(0, |o| o.last_modified)
    }

    fn supports_native_presigned_url(&self) -> bool {
        self.native_url_base.is_some()
    }

    fn native_presigned_url(&self, path: &str, expires: i64) -> Option<String> {
        let base = self.native_url_base.as_deref()?;
        Some(format!(
            "{}/{}?expires={expires}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn test_should_report_existence() {
        let mut backend = MemoryBackend::new();
        backend.put_object("a.txt", "hi");
        assert!(backend.exists("a.txt").unwrap());
        assert!(!backend.exists("b.txt").unwrap());
    }

    #[test]
    fn test_should_read_stored_bytes() {
        let mut backend = MemoryBackend::new();
        backend.put_object("a.txt", "Hello World");
        assert_eq!(backend.read("a.txt").unwrap(), Bytes::from("Hello World"));
        assert_eq!(backend.size("a.txt").unwrap(), 11);
    }

    #[test]
    fn test_should_fail_reading_missing_object() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            backend.read("missing.txt"),
            Err(PresignedUrlError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_should_stream_stored_bytes() {
        let mut backend = MemoryBackend::new();
        backend.put_object("a.txt", "Hello World");
        let mut stream = backend.read_stream("a.txt").unwrap();
        let mut buf = String::new();
        stream.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "Hello World");
    }

    #[test]
    fn test_should_guess_mime_type_from_path() {
        let mut backend = MemoryBackend::new();
        backend.put_object("page.html", "<html></html>");
        assert_eq!(backend.mime_type("page.html"), "text/html");
    }

    #[test]
    fn test_should_prefer_explicit_mime_type() {
        let mut backend = MemoryBackend::new();
        backend.put_object_with("blob", "data", "application/json", 1_700_000_000);
        assert_eq!(backend.mime_type("blob"), "application/json");
        assert_eq!(backend.last_modified("blob"), 1_700_000_000);
    }

    #[test]
    fn test_should_default_mime_type_for_unknown_extension() {
        let mut backend = MemoryBackend::new();
        backend.put_object("blob.xyzzy", "data");
        assert_eq!(backend.mime_type("blob.xyzzy"), "application/octet-stream");
    }

    #[test]
    fn test_should_issue_native_urls_when_configured() {
        let mut backend = MemoryBackend::new().with_native_urls("https://native.example.com/");
        backend.put_object("a.txt", "hi");
        assert!(backend.supports_native_presigned_url());
        assert_eq!(
            backend.native_presigned_url("a.txt", 123).unwrap(),
            "https://native.example.com/a.txt?expires=123"
        );
    }

    #[test]
    fn test_should_not_advertise_native_urls_by_default() {
        let backend = MemoryBackend::new();
        assert!(!backend.supports_native_presigned_url());
        assert!(backend.native_presigned_url("a.txt", 123).is_none());
    }
}
