//! Immutable configuration value records.
//!
//! Configuration is constructed once at startup and never mutated; every
//! record derives [`Clone`] so "modification" means building a new value.
//! All fields have defaults matching the reference deployment, reachable
//! through [`Default`] or the generated builders.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// HMAC hash algorithm used for URL signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SignatureAlgorithm {
    /// HMAC-SHA256 (default).
    #[default]
    Sha256,
    /// HMAC-SHA384.
    Sha384,
    /// HMAC-SHA512.
    Sha512,
}

/// Signature scheme configuration.
///
/// Invariant: a produced signature string is `2 * length` hex characters
/// (the raw HMAC digest is truncated to `length` bytes before hex
/// encoding).
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct SignatureConfig {
    /// The HMAC hash algorithm.
    #[builder(default)]
    pub algorithm: SignatureAlgorithm,

    /// Number of raw digest bytes kept in the signature.
    #[builder(default = 16)]
    pub length: usize,

    /// Query parameter name carrying the expiry timestamp.
    #[builder(default = String::from("X-Expires"))]
    pub expires_param: String,

    /// Query parameter name carrying the signature.
    #[builder(default = String::from("X-Signature"))]
    pub signature_param: String,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            algorithm: SignatureAlgorithm::Sha256,
            length: 16,
            expires_param: String::from("X-Expires"),
            signature_param: String::from("X-Signature"),
        }
    }
}

/// Response compression policy.
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct CompressionConfig {
    /// Whether compression is enabled at all.
    #[builder(default = true)]
    pub enabled: bool,

    /// Minimum object size (bytes) worth compressing.
    #[builder(default = 1024)]
    pub min_size: u64,

    /// Gzip compression level (0-9).
    #[builder(default = 6)]
    pub level: u32,

    /// Mime types eligible for compression.
    #[builder(default = CompressionConfig::default_types())]
    pub types: Vec<String>,
}

impl CompressionConfig {
    /// The default set of compressible mime types.
    #[must_use]
    pub fn default_types() -> Vec<String> {
        [
            "text/plain",
            "text/html",
            "text/css",
            "text/xml",
            "text/javascript",
            "application/javascript",
            "application/json",
            "application/xml",
            "image/svg+xml",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    /// Decide whether a response body should be compressed.
    ///
    /// Requires compression to be enabled, the object to be at least
    /// `min_size` bytes, and the mime type to be in the compressible set.
    ///
    /// # Examples
    ///
    /// ```
    /// use presigned_core::config::CompressionConfig;
    ///
    /// let config = CompressionConfig::default();
    /// assert!(config.should_compress("text/html", 4096));
    /// assert!(!config.should_compress("image/png", 4096));
    /// assert!(!config.should_compress("text/html", 10));
    /// ```
    #[must_use]
    pub fn should_compress(&self, mime_type: &str, size: u64) -> bool {
        if !self.enabled {
            return false;
        }

        if size < self.min_size {
            return false;
        }

        self.types.iter().any(|t| t == mime_type)
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_size: 1024,
            level: 6,
            types: Self::default_types(),
        }
    }
}

/// File-serving behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ServingConfig {
    /// Default URL lifetime in seconds when the caller does not specify one.
    #[builder(default = 3600)]
    pub default_ttl: u64,

    /// Upper bound (seconds) applied to relative URL lifetimes.
    #[builder(default = 86_400)]
    pub max_ttl: u64,

    /// Value of the `Cache-Control` response header.
    #[builder(default = String::from("private, max-age=3600, must-revalidate"))]
    pub cache_control: String,

    /// Disposition type for the `Content-Disposition` header
    /// (`inline` or `attachment`).
    #[builder(default = String::from("inline"))]
    pub content_disposition: String,

    /// Response compression policy.
    #[builder(default)]
    pub compression: CompressionConfig,
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            default_ttl: 3600,
            max_ttl: 86_400,
            cache_control: String::from("private, max-age=3600, must-revalidate"),
            content_disposition: String::from("inline"),
            compression: CompressionConfig::default(),
        }
    }
}

/// Access policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct SecurityConfig {
    /// Extensions that may be served. Empty means "any extension not
    /// otherwise blocked".
    #[builder(default)]
    pub allowed_extensions: Vec<String>,

    /// Extensions that are never served, regardless of the allow-list.
    #[builder(default = SecurityConfig::default_blocked_extensions())]
    pub blocked_extensions: Vec<String>,

    /// Maximum servable file size in bytes. Zero means unlimited.
    #[builder(default = 0)]
    pub max_file_size: u64,

    /// Origins permitted for cross-origin reads. Empty means any origin.
    #[builder(default)]
    pub allowed_origins: Vec<String>,
}

impl SecurityConfig {
    /// The default set of blocked (dangerous) extensions.
    #[must_use]
    pub fn default_blocked_extensions() -> Vec<String> {
        [
            "php", "phtml", "php3", "php4", "php5", "php7", "phps", "phar", "exe", "sh", "bat",
            "cmd",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    /// Check whether a file extension may be served.
    ///
    /// The block-list is consulted first and always wins. If the allow-list
    /// is non-empty, the extension must additionally be a member of it.
    /// Comparison is case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use presigned_core::config::SecurityConfig;
    ///
    /// let config = SecurityConfig::default();
    /// assert!(config.is_extension_allowed("jpg"));
    /// assert!(!config.is_extension_allowed("php"));
    /// assert!(!config.is_extension_allowed("PHP"));
    /// ```
    #[must_use]
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        let extension = extension.to_ascii_lowercase();

        if self.blocked_extensions.iter().any(|e| *e == extension) {
            return false;
        }

        if self.allowed_extensions.is_empty() {
            return true;
        }

        self.allowed_extensions.iter().any(|e| *e == extension)
    }

    /// Check whether a file of `size` bytes may be served.
    ///
    /// A `max_file_size` of zero disables the limit.
    #[must_use]
    pub fn is_file_size_allowed(&self, size: u64) -> bool {
        if self.max_file_size == 0 {
            return true;
        }

        size <= self.max_file_size
    }

    /// Check whether a request origin may read responses cross-origin.
    ///
    /// An empty allow-list permits any origin.
    #[must_use]
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.allowed_origins.is_empty() {
            return true;
        }

        self.allowed_origins.iter().any(|o| o == origin)
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: Vec::new(),
            blocked_extensions: Self::default_blocked_extensions(),
            max_file_size: 0,
            allowed_origins: Vec::new(),
        }
    }
}

/// Top-level configuration for URL signing and file serving.
///
/// Constructed once at startup; treat as immutable thereafter.
///
/// # Examples
///
/// ```
/// use presigned_core::config::Config;
///
/// let config = Config::builder()
///     .secret("0123456789abcdef".into())
///     .base_url("https://cdn.example.com".into())
///     .build();
/// assert_eq!(config.signature.length, 16);
/// ```
#[derive(Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// The HMAC signing key. Never logged.
    pub secret: String,

    /// Base URL that issued URLs are rooted at (scheme + authority,
    /// optionally a path prefix).
    pub base_url: String,

    /// Signature scheme configuration.
    #[builder(default)]
    pub signature: SignatureConfig,

    /// File-serving behavior configuration.
    #[builder(default)]
    pub serving: ServingConfig,

    /// Access policy configuration.
    #[builder(default)]
    pub security: SecurityConfig,
}

// The signing key must never appear in logs, so Debug is written by hand.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("signature", &self.signature)
            .field("serving", &self.serving)
            .field("security", &self.security)
            .finish()
    }
}
