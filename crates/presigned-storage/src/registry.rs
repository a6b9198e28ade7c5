//! Bucket registry and signed URL construction/parsing.
//!
//! The registry owns the name-to-backend mapping. It is populated at
//! startup via `&mut` registration and then frozen (typically behind an
//! [`Arc`]); late registration during live traffic is deliberately not
//! supported.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use tracing::debug;

use presigned_core::config::Config;
use presigned_core::error::{PresignedUrlError, PresignedUrlResult};
use presigned_core::types::UrlComponents;
use presigned_core::validation::validate_bucket_name;
use presigned_signer::UrlSigner;

use crate::backend::StorageBackend;

/// Characters percent-encoded in the path portion of built URLs.
///
/// Slashes stay literal (they separate path segments); everything that
/// would break URL structure is escaped.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'#')
    .add(b'%');

/// When a URL should stop being honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Absolute unix timestamp. Used as given, never clamped.
    At(i64),
    /// Relative lifetime in seconds, clamped to the configured `max_ttl`
    /// before being added to the current time.
    In(u64),
}

/// Mapping from bucket names to storage backends, plus URL issuance and
/// parsing.
///
/// Read-mostly: populate with [`add_bucket`](Self::add_bucket) during
/// startup, then share immutably.
pub struct BucketRegistry {
    config: Config,
    signer: Arc<dyn UrlSigner>,
    buckets: HashMap<String, Arc<dyn StorageBackend>>,
}

impl std::fmt::Debug for BucketRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketRegistry")
            .field("buckets", &self.buckets.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl BucketRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(config: Config, signer: Arc<dyn UrlSigner>) -> Self {
        Self {
            config,
            signer,
            buckets: HashMap::new(),
        }
    }

    /// The configuration this registry was built with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a backend under a validated bucket name.
    ///
    /// Re-registering an existing name silently overwrites it
    /// (last-writer-wins).
    ///
    /// # Errors
    ///
    /// Returns [`PresignedUrlError::InvalidBucketName`] if the name
    /// violates the naming constraints. Treat as fatal to startup.
    pub fn add_bucket(
        &mut self,
        name: &str,
        backend: Arc<dyn StorageBackend>,
    ) -> PresignedUrlResult<()> {
        validate_bucket_name(name)?;
        debug!(bucket = name, "registered bucket");
        self.buckets.insert(name.to_owned(), backend);
        Ok(())
    }

    /// Register a backend without validating the name.
    ///
    /// Escape hatch for pre-validated names; prefer
    /// [`add_bucket`](Self::add_bucket).
    pub fn add_bucket_unchecked(&mut self, name: &str, backend: Arc<dyn StorageBackend>) {
        debug!(bucket = name, "registered bucket (validation skipped)");
        self.buckets.insert(name.to_owned(), backend);
    }

    /// Resolve a bucket name to its backend.
    ///
    /// # Errors
    ///
    /// Returns [`PresignedUrlError::BucketNotFound`] if the name is not
    /// registered.
    pub fn get_bucket(&self, name: &str) -> PresignedUrlResult<Arc<dyn StorageBackend>> {
        self.buckets
            .get(name)
            .cloned()
            .ok_or_else(|| PresignedUrlError::BucketNotFound {
                bucket: name.to_owned(),
            })
    }

    /// Whether a bucket name is registered.
    #[must_use]
    pub fn has_bucket(&self, name: &str) -> bool {
        self.buckets.contains_key(name)
    }

    /// Issue a time-limited signed URL for an object.
    ///
    /// If the bucket's backend advertises native presigned URL support and
    /// produces one for `(path, expires)`, that URL is returned verbatim
    /// and the generic signer is bypassed entirely. Otherwise the URL is
    /// built from the configured base URL with the generic HMAC signature.
    ///
    /// Relative expirations are clamped to `serving.max_ttl`; absolute
    /// timestamps are used as given.
    ///
    /// # Errors
    ///
    /// Returns [`PresignedUrlError::BucketNotFound`] if the bucket is not
    /// registered.
    pub fn temporary_url(
        &self,
        bucket: &str,
        path: &str,
        expiration: Expiration,
    ) -> PresignedUrlResult<String> {
        let backend = self.get_bucket(bucket)?;
        let expires = self.resolve_expiration(expiration);

        if backend.supports_native_presigned_url() {
            if let Some(native_url) = backend.native_presigned_url(path, expires) {
                debug!(bucket, path, expires, "delegated to backend-native presigned URL");
                return Ok(native_url);
            }
        }

        let signature = self.signer.sign(bucket, path, expires);

        Ok(self.build_url(bucket, path, expires, &signature))
    }

    /// Build a signed URL from its components.
    ///
    /// Format: `{base}/{bucket}/{path}?{expires_param}={expires}&{signature_param}={signature}`
    /// with the path percent-encoded (slashes kept literal) and any
    /// leading slash stripped.
    #[must_use]
    pub fn build_url(&self, bucket: &str, path: &str, expires: i64, signature: &str) -> String {
        let base_url = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let encoded_path = utf8_percent_encode(path, PATH_ENCODE_SET);

        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(&self.config.signature.expires_param, &expires.to_string())
            .append_pair(&self.config.signature.signature_param, signature)
            .finish();

        format!("{base_url}/{bucket}/{encoded_path}?{query}")
    }

    /// Decompose a signed URL into its components, without verifying them.
    ///
    /// Returns `None` for anything structurally invalid: unparsable URLs,
    /// a path that does not split into bucket plus remainder, a missing or
    /// repeated expiry/signature parameter, an expiry of zero (or one that
    /// does not parse as an integer), or an empty signature.
    ///
    /// The result is untrusted: run it through the serving pipeline (or
    /// the signer directly) before acting on it.
    #[must_use]
    pub fn parse_url(&self, url: &str) -> Option<UrlComponents> {
        let uri: http::Uri = url.parse().ok()?;
        let query = uri.query()?;

        let path = uri.path().trim_start_matches('/');
        let (bucket, file_path) = path.split_once('/')?;
        let file_path = percent_decode_str(file_path).decode_utf8().ok()?;

        let expires_raw = single_query_value(query, &self.config.signature.expires_param)?;
        let signature = single_query_value(query, &self.config.signature.signature_param)?;

        let expires: i64 = expires_raw.parse().unwrap_or(0);
        if expires == 0 || signature.is_empty() {
            return None;
        }

        Some(UrlComponents {
            bucket: bucket.to_owned(),
            path: file_path.into_owned(),
            expires,
            signature,
        })
    }

    /// Resolve an [`Expiration`] to an absolute unix timestamp.
    fn resolve_expiration(&self, expiration: Expiration) -> i64 {
        match expiration {
            Expiration::At(timestamp) => timestamp,
            Expiration::In(ttl) => {
                let ttl = ttl.min(self.config.serving.max_ttl);
                Utc::now().timestamp() + i64::try_from(ttl).unwrap_or(i64::MAX)
            }
        }
    }
}

/// Extract a query parameter that appears exactly once.
///
/// Repeated parameters are treated as structurally invalid, not
/// last-writer-wins.
fn single_query_value(query: &str, name: &str) -> Option<String> {
    let mut found = None;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key == name {
            if found.is_some() {
                return None;
            }
            found = Some(value.into_owned());
        }
    }
    found
}
