//! Error taxonomy for presigned URL operations.
//!
//! Every failure mode in the signing, registry, and serving layers is
//! represented by a [`PresignedUrlError`] variant. All variants are narrow,
//! recoverable signals: the serving pipeline catches each one and maps it to
//! a fixed HTTP status, so none of them escape `serve()`. Backend adapters
//! are expected to normalize their own I/O failures into [`FileNotFound`]
//! or [`InvalidPath`] before they reach the pipeline.
//!
//! [`FileNotFound`]: PresignedUrlError::FileNotFound
//! [`InvalidPath`]: PresignedUrlError::InvalidPath

/// Errors produced by the presigned URL crates.
#[derive(Debug, thiserror::Error)]
pub enum PresignedUrlError {
    /// The named bucket is not registered.
    #[error("bucket not found: {bucket}")]
    BucketNotFound {
        /// The bucket name that was not found.
        bucket: String,
    },

    /// The requested file does not exist in the backend.
    #[error("file not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// The path escapes the backend root (e.g. contains `..` components).
    #[error("invalid path: {path}")]
    InvalidPath {
        /// The offending path.
        path: String,
    },

    /// The supplied signature does not match the expected one.
    #[error("invalid signature")]
    InvalidSignature,

    /// The URL's expiry timestamp is in the past.
    #[error("URL expired at {expires}")]
    ExpiredUrl {
        /// The unix timestamp the URL expired at.
        expires: i64,
    },

    /// The bucket name violates the naming constraints.
    ///
    /// Raised only at bucket-registration time, never per request. An
    /// unhandled occurrence should be treated as fatal to startup.
    #[error("invalid bucket name: {name}: {reason}")]
    InvalidBucketName {
        /// The invalid bucket name.
        name: String,
        /// Human-readable description of the violated rule.
        reason: String,
    },

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for presigned URL operations.
pub type PresignedUrlResult<T> = Result<T, PresignedUrlError>;
