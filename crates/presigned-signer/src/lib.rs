//! HMAC signing and verification for presigned URLs.
//!
//! A signature is an HMAC over the canonical string
//! `"{bucket}:{path}:{expires}"`, truncated to a configured number of raw
//! digest bytes and hex-encoded. Verification recomputes the expected
//! signature and compares it to the supplied one in constant time, so the
//! comparison leaks no timing information about how many leading characters
//! matched.
//!
//! # Usage
//!
//! ```
//! use presigned_core::config::SignatureConfig;
//! use presigned_signer::{HmacSigner, UrlSigner};
//!
//! let signer = HmacSigner::new("secret-key".into(), SignatureConfig::default());
//! let sig = signer.sign("photos", "vacation/img.jpg", 1_700_000_000);
//! assert!(signer.verify("photos", "vacation/img.jpg", 1_700_000_000, &sig));
//! ```

mod hmac;

pub use hmac::{HmacSigner, UrlSigner};
