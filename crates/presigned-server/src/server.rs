//! The request-serving pipeline.

use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{
    ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, CACHE_CONTROL, CONTENT_DISPOSITION,
    CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED, ORIGIN, RANGE,
};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use tracing::{info, warn};

use presigned_core::config::Config;
use presigned_core::error::{PresignedUrlError, PresignedUrlResult};
use presigned_signer::UrlSigner;
use presigned_storage::{BucketRegistry, StorageBackend};

use crate::compression;
use crate::conditional;
use crate::range::{self, ByteRange};
use crate::response::{FileResponse, ResponseBody};

/// Serves objects referenced by signed URLs.
///
/// One call to [`serve`](Self::serve) runs the whole pipeline: signature
/// and expiry verification, bucket resolution, extension and size policy,
/// conditional-GET evaluation, byte-range handling, and body selection
/// (streamed, or buffered and possibly gzip-compressed). Every failure
/// maps to a fixed status; nothing escapes as an error.
///
/// Holds no mutable state; safe to share across concurrent requests as
/// long as the backends tolerate concurrent reads.
pub struct FileServer {
    registry: Arc<BucketRegistry>,
    signer: Arc<dyn UrlSigner>,
}

impl std::fmt::Debug for FileServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileServer")
            .field("registry", &self.registry)
            .finish()
    }
}

impl FileServer {
    /// Create a server over a frozen registry.
    ///
    /// The signer must be the same one the registry issues URLs with, or
    /// every verification will fail.
    #[must_use]
    pub fn new(registry: Arc<BucketRegistry>, signer: Arc<dyn UrlSigner>) -> Self {
        Self { registry, signer }
    }

    fn config(&self) -> &Config {
        self.registry.config()
    }

    /// Serve a request whose signed-URL components are already extracted.
    ///
    /// Always returns a response; the status encodes the outcome:
    /// 403 for a bad signature, 410 for an expired URL, 404 for a missing
    /// bucket or file, a blocked extension, or an oversize file
    /// (deliberately indistinguishable), 304/206/200 per the request's
    /// validators, range, and method, and 400 for anything else.
    pub fn serve(
        &self,
        bucket: &str,
        path: &str,
        expires: i64,
        signature: &str,
        method: &Method,
        headers: &HeaderMap,
    ) -> FileResponse {
        match self.try_serve(bucket, path, expires, signature, method, headers) {
            Ok(response) => {
                info!(
                    bucket,
                    path,
                    status = response.status.as_u16(),
                    method = %method,
                    "served file"
                );
                response
            }
            Err(err) => self.error_response(bucket, path, &err),
        }
    }

    /// Serve from a raw request target (path plus query string).
    ///
    /// Extracts `(bucket, path, expires, signature)` with the registry's
    /// URL parser; a request whose shape is malformed gets 400 without
    /// entering the pipeline and without a log entry (the shape itself is
    /// invalid, no security decision was made).
    pub fn serve_from_request(&self, uri: &str, method: &Method, headers: &HeaderMap) -> FileResponse {
        match self.registry.parse_url(uri) {
            Some(components) => self.serve(
                &components.bucket,
                &components.path,
                components.expires,
                &components.signature,
                method,
                headers,
            ),
            None => plain_response(StatusCode::BAD_REQUEST),
        }
    }

    // -----------------------------------------------------------------------
    // Pipeline
    // -----------------------------------------------------------------------

    fn try_serve(
        &self,
        bucket: &str,
        path: &str,
        expires: i64,
        signature: &str,
        method: &Method,
        request_headers: &HeaderMap,
    ) -> PresignedUrlResult<FileResponse> {
        if !self.signer.verify(bucket, path, expires, signature) {
            return Err(PresignedUrlError::InvalidSignature);
        }

        if Utc::now().timestamp() > expires {
            return Err(PresignedUrlError::ExpiredUrl { expires });
        }

        let backend = self.registry.get_bucket(bucket)?;

        // Policy refusals surface as FileNotFound: the response must not
        // reveal whether the file exists, the extension is blocked, or
        // the file is too large.
        let security = &self.config().security;
        if let Some(ext) = extension(path) {
            if !security.is_extension_allowed(ext) {
                info!(bucket, path, extension = ext, "refused blocked extension");
                return Err(PresignedUrlError::FileNotFound {
                    path: path.to_owned(),
                });
            }
        }

        if !backend.exists(path)? {
            return Err(PresignedUrlError::FileNotFound {
                path: path.to_owned(),
            });
        }

        let size = backend.size(path)?;
        if !security.is_file_size_allowed(size) {
            info!(bucket, path, size, "refused oversize file");
            return Err(PresignedUrlError::FileNotFound {
                path: path.to_owned(),
            });
        }

        let mime_type = backend.mime_type(path);
        let last_modified = backend.last_modified(path);
        let etag = conditional::compute_etag(path, size, last_modified);
        let headers =
            self.build_headers(request_headers, path, &mime_type, size, last_modified, &etag);

        if conditional::is_not_modified(request_headers, &etag, last_modified) {
            return Ok(FileResponse {
                status: StatusCode::NOT_MODIFIED,
                headers,
                body: ResponseBody::Empty,
            });
        }

        if method == Method::HEAD {
            return Ok(FileResponse {
                status: StatusCode::OK,
                headers,
                body: ResponseBody::Empty,
            });
        }

        if let Some(byte_range) = request_headers
            .get(RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| range::parse_range(v, size))
        {
            return serve_range(backend.as_ref(), path, size, byte_range, headers);
        }

        self.serve_full(backend.as_ref(), path, size, &mime_type, headers)
    }

    fn serve_full(
        &self,
        backend: &dyn StorageBackend,
        path: &str,
        size: u64,
        mime_type: &str,
        mut headers: HeaderMap,
    ) -> PresignedUrlResult<FileResponse> {
        let policy = &self.config().serving.compression;

        if policy.should_compress(mime_type, size) {
            let data = backend.read(path)?;
            // Compressed bodies intentionally carry no Content-Encoding
            // header; clients receive the gzip bytes as-is.
            let body = compression::gzip(&data, policy.level).unwrap_or(data);
            insert_header(&mut headers, CONTENT_LENGTH, &body.len().to_string());

            return Ok(FileResponse {
                status: StatusCode::OK,
                headers,
                body: ResponseBody::Buffered(body),
            });
        }

        // Plain transfers stream straight from the backend so the object
        // is never buffered whole.
        let stream = backend.read_stream(path)?;
        Ok(FileResponse {
            status: StatusCode::OK,
            headers,
            body: ResponseBody::Stream(stream),
        })
    }

    // -----------------------------------------------------------------------
    // Headers
    // -----------------------------------------------------------------------

    fn build_headers(
        &self,
        request: &HeaderMap,
        path: &str,
        mime_type: &str,
        size: u64,
        last_modified: i64,
        etag: &str,
    ) -> HeaderMap {
        let serving = &self.config().serving;
        let mut headers = HeaderMap::new();

        insert_header(&mut headers, CONTENT_TYPE, mime_type);
        insert_header(&mut headers, CONTENT_LENGTH, &size.to_string());
        insert_header(&mut headers, ETAG, &format!("\"{etag}\""));
        // An unknown mtime of 0 still emits the header, as the epoch date.
        if let Some(timestamp) = DateTime::from_timestamp(last_modified, 0) {
            insert_header(
                &mut headers,
                LAST_MODIFIED,
                &timestamp.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
            );
        }
        insert_header(&mut headers, CACHE_CONTROL, &serving.cache_control);
        insert_header(&mut headers, ACCEPT_RANGES, "bytes");
        insert_header(
            &mut headers,
            CONTENT_DISPOSITION,
            &format!(
                "{}; filename=\"{}\"",
                serving.content_disposition,
                basename(path)
            ),
        );

        if let Some(origin) = request.get(ORIGIN).and_then(|v| v.to_str().ok()) {
            if self.config().security.is_origin_allowed(origin) {
                insert_header(&mut headers, ACCESS_CONTROL_ALLOW_ORIGIN, origin);
                insert_header(&mut headers, ACCESS_CONTROL_ALLOW_METHODS, "GET, HEAD");
                insert_header(&mut headers, ACCESS_CONTROL_ALLOW_HEADERS, "Range");
                insert_header(
                    &mut headers,
                    ACCESS_CONTROL_EXPOSE_HEADERS,
                    "Content-Length, Content-Range, Accept-Ranges",
                );
            }
        }

        headers
    }

    // -----------------------------------------------------------------------
    // Error boundary
    // -----------------------------------------------------------------------

    fn error_response(&self, bucket: &str, path: &str, err: &PresignedUrlError) -> FileResponse {
        let status = match err {
            PresignedUrlError::InvalidSignature => {
                warn!(bucket, path, "rejected request with invalid signature");
                StatusCode::FORBIDDEN
            }
            PresignedUrlError::ExpiredUrl { expires } => {
                info!(bucket, path, expires = *expires, "rejected expired URL");
                StatusCode::GONE
            }
            PresignedUrlError::BucketNotFound { .. } | PresignedUrlError::FileNotFound { .. } => {
                info!(bucket, path, "object not served");
                StatusCode::NOT_FOUND
            }
            PresignedUrlError::InvalidPath { .. }
            | PresignedUrlError::InvalidBucketName { .. }
            | PresignedUrlError::Internal(_) => {
                warn!(bucket, path, error = %err, "request failed");
                StatusCode::BAD_REQUEST
            }
        };

        plain_response(status)
    }
}

/// Serve a validated byte range as 206 Partial Content.
///
/// The stream is opened, sought, read exactly, and closed before
/// returning on every path.
fn serve_range(
    backend: &dyn StorageBackend,
    path: &str,
    size: u64,
    byte_range: ByteRange,
    mut headers: HeaderMap,
) -> PresignedUrlResult<FileResponse> {
    let mut stream = backend.read_stream(path)?;
    stream
        .seek(SeekFrom::Start(byte_range.start))
        .context("seeking object stream to range start")?;

    let length =
        usize::try_from(byte_range.length()).context("range length exceeds addressable memory")?;
    let mut buf = vec![0u8; length];
    stream
        .read_exact(&mut buf)
        .context("reading ranged object bytes")?;
    drop(stream);

    insert_header(
        &mut headers,
        CONTENT_RANGE,
        &format!("bytes {}-{}/{size}", byte_range.start, byte_range.end),
    );
    insert_header(&mut headers, CONTENT_LENGTH, &byte_range.length().to_string());

    Ok(FileResponse {
        status: StatusCode::PARTIAL_CONTENT,
        headers,
        body: ResponseBody::Buffered(Bytes::from(buf)),
    })
}

/// Fixed error response: plain-text status phrase as the body.
fn plain_response(status: StatusCode) -> FileResponse {
    let body = match status {
        StatusCode::FORBIDDEN => "Forbidden",
        StatusCode::GONE => "Gone",
        StatusCode::NOT_FOUND => "Not Found",
        _ => "Bad Request",
    };

    let mut headers = HeaderMap::new();
    insert_header(&mut headers, CONTENT_TYPE, "text/plain");

    FileResponse {
        status,
        headers,
        body: ResponseBody::Buffered(Bytes::from_static(body.as_bytes())),
    }
}

/// Insert a header, dropping values that are not valid HTTP.
fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

/// The extension of the path's final segment, lowercase-agnostic.
///
/// A dotfile like `.php` counts as having the extension `php`; a
/// trailing dot counts as no extension.
fn extension(path: &str) -> Option<&str> {
    match basename(path).rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext),
        _ => None,
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
