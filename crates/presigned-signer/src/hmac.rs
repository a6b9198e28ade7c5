//! HMAC signature computation.

use hmac::{Hmac, KeyInit, Mac};
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;
use tracing::trace;

use presigned_core::config::{SignatureAlgorithm, SignatureConfig};

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

/// Signing scheme for presigned URLs.
///
/// The seam that lets a deployment swap in an alternative scheme (e.g. a
/// KMS-backed signer) without touching the registry or the serving
/// pipeline. Implementations must be pure and side-effect-free: the same
/// inputs always produce the same signature.
pub trait UrlSigner: Send + Sync {
    /// Compute the signature for `(bucket, path, expires)`.
    fn sign(&self, bucket: &str, path: &str, expires: i64) -> String;

    /// Check a supplied signature against the expected one.
    ///
    /// Implementations must compare in constant time.
    fn verify(&self, bucket: &str, path: &str, expires: i64, signature: &str) -> bool;
}

/// HMAC-based [`UrlSigner`].
///
/// Deterministic and infallible: signing never performs I/O and never
/// errors. Safe to share across any number of concurrent callers.
pub struct HmacSigner {
    secret: String,
    config: SignatureConfig,
}

impl std::fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The secret must never leak through Debug formatting.
        f.debug_struct("HmacSigner")
            .field("secret", &"<redacted>")
            .field("config", &self.config)
            .finish()
    }
}

impl HmacSigner {
    /// Create a signer from a secret key and signature configuration.
    #[must_use]
    pub fn new(secret: String, config: SignatureConfig) -> Self {
        Self { secret, config }
    }

    /// Build the canonical string covered by the signature.
    fn canonical_string(bucket: &str, path: &str, expires: i64) -> String {
        format!("{bucket}:{path}:{expires}")
    }

    /// Truncate a raw digest to the configured length and hex-encode it.
    ///
    /// A configured length longer than the digest yields the full digest.
    fn format_signature(&self, digest: &[u8]) -> String {
        let keep = self.config.length.min(digest.len());
        hex::encode(&digest[..keep])
    }
}

impl UrlSigner for HmacSigner {
    fn sign(&self, bucket: &str, path: &str, expires: i64) -> String {
        let data = Self::canonical_string(bucket, path, expires);
        let digest = hmac_digest(self.config.algorithm, self.secret.as_bytes(), data.as_bytes());

        trace!(bucket, path, expires, "computed URL signature");

        self.format_signature(&digest)
    }

    fn verify(&self, bucket: &str, path: &str, expires: i64, signature: &str) -> bool {
        let expected = self.sign(bucket, path, expires);

        expected.as_bytes().ct_eq(signature.as_bytes()).into()
    }
}

/// Compute an HMAC digest with the selected hash algorithm.
fn hmac_digest(algorithm: SignatureAlgorithm, key: &[u8], data: &[u8]) -> Vec<u8> {
    match algorithm {
        SignatureAlgorithm::Sha256 => {
            let mut mac =
                HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        }
        SignatureAlgorithm::Sha384 => {
            let mut mac =
                HmacSha384::new_from_slice(key).expect("HMAC can accept keys of any length");
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        }
        SignatureAlgorithm::Sha512 => {
            let mut mac =
                HmacSha512::new_from_slice(key).expect("HMAC can accept keys of any length");
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY";
    const TEST_EXPIRES: i64 = 1_700_000_000;

    fn test_signer() -> HmacSigner {
        HmacSigner::new(TEST_SECRET.to_owned(), SignatureConfig::default())
    }

    #[test]
    fn test_should_verify_own_signature() {
        let signer = test_signer();
        let sig = signer.sign("photos", "vacation/img.jpg", TEST_EXPIRES);
        assert!(signer.verify("photos", "vacation/img.jpg", TEST_EXPIRES, &sig));
    }

    #[test]
    fn test_should_reject_wrong_signature() {
        let signer = test_signer();
        assert!(!signer.verify("photos", "vacation/img.jpg", TEST_EXPIRES, "deadbeef"));
    }

    #[test]
    fn test_should_reject_empty_signature() {
        let signer = test_signer();
        assert!(!signer.verify("photos", "vacation/img.jpg", TEST_EXPIRES, ""));
    }

    #[test]
    fn test_should_produce_hex_of_twice_configured_length() {
        let signer = test_signer();
        let sig = signer.sign("photos", "img.jpg", TEST_EXPIRES);
        assert_eq!(sig.len(), 32); // 16 bytes hex-encoded
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_should_be_deterministic() {
        let signer = test_signer();
        let a = signer.sign("photos", "img.jpg", TEST_EXPIRES);
        let b = signer.sign("photos", "img.jpg", TEST_EXPIRES);
        assert_eq!(a, b);
    }

    #[test]
    fn test_should_change_signature_when_bucket_changes() {
        let signer = test_signer();
        let a = signer.sign("photos", "img.jpg", TEST_EXPIRES);
        let b = signer.sign("photoz", "img.jpg", TEST_EXPIRES);
        assert_ne!(a, b);
    }

    #[test]
    fn test_should_change_signature_when_path_changes() {
        let signer = test_signer();
        let a = signer.sign("photos", "img.jpg", TEST_EXPIRES);
        let b = signer.sign("photos", "img.jpeg", TEST_EXPIRES);
        assert_ne!(a, b);
    }

    #[test]
    fn test_should_change_signature_when_expiry_changes() {
        let signer = test_signer();
        let a = signer.sign("photos", "img.jpg", TEST_EXPIRES);
        let b = signer.sign("photos", "img.jpg", TEST_EXPIRES + 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_should_change_signature_with_different_secret() {
        let a = test_signer().sign("photos", "img.jpg", TEST_EXPIRES);
        let b = HmacSigner::new("other-secret".to_owned(), SignatureConfig::default())
            .sign("photos", "img.jpg", TEST_EXPIRES);
        assert_ne!(a, b);
    }

    #[test]
    fn test_should_honor_configured_length() {
        let config = SignatureConfig::builder().length(8).build();
        let signer = HmacSigner::new(TEST_SECRET.to_owned(), config);
        let sig = signer.sign("photos", "img.jpg", TEST_EXPIRES);
        assert_eq!(sig.len(), 16);
    }

    #[test]
    fn test_should_cap_length_at_digest_size() {
        // SHA-256 digests are 32 bytes; a larger configured length must not panic.
        let config = SignatureConfig::builder().length(64).build();
        let signer = HmacSigner::new(TEST_SECRET.to_owned(), config);
        let sig = signer.sign("photos", "img.jpg", TEST_EXPIRES);
        assert_eq!(sig.len(), 64); // full 32-byte digest, hex-encoded
    }

    #[test]
    fn test_should_sign_with_sha512() {
        use presigned_core::config::SignatureAlgorithm;

        let config = SignatureConfig::builder()
            .algorithm(SignatureAlgorithm::Sha512)
            .build();
        let signer = HmacSigner::new(TEST_SECRET.to_owned(), config);
        let sig = signer.sign("photos", "img.jpg", TEST_EXPIRES);
        assert_eq!(sig.len(), 32);
        assert_ne!(sig, test_signer().sign("photos", "img.jpg", TEST_EXPIRES));
        assert!(signer.verify("photos", "img.jpg", TEST_EXPIRES, &sig));
    }

    #[test]
    fn test_should_redact_secret_in_debug_output() {
        let signer = test_signer();
        let debug = format!("{signer:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(TEST_SECRET));
    }

    #[test]
    fn test_should_separate_fields_in_canonical_string() {
        // "ab" + "c" must not collide with "a" + "bc".
        let signer = test_signer();
        let a = signer.sign("ab", "c", TEST_EXPIRES);
        let b = signer.sign("a", "bc", TEST_EXPIRES);
        assert_ne!(a, b);
    }
}
