//! Bucket registry and storage backends for presigned URLs.
//!
//! The [`BucketRegistry`] maps bucket names to storage backends, builds
//! signed URLs for objects in those backends, and parses signed URLs back
//! into their components (without verifying them — verification belongs to
//! the serving pipeline).
//!
//! Backends implement the [`StorageBackend`] capability trait: existence,
//! metadata, and read access over named objects. Two backends ship with
//! this crate:
//!
//! - [`LocalBackend`] - files under a base directory on the local
//!   filesystem, with path-traversal rejection
//! - [`MemoryBackend`] - objects held in memory (virtual filesystem, also
//!   useful as a test double)
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use presigned_core::config::Config;
//! use presigned_signer::HmacSigner;
//! use presigned_storage::{BucketRegistry, Expiration, MemoryBackend};
//!
//! let config = Config::builder()
//!     .secret("secret-key".into())
//!     .base_url("https://cdn.example.com".into())
//!     .build();
//! let signer = Arc::new(HmacSigner::new(config.secret.clone(), config.signature.clone()));
//!
//! let mut backend = MemoryBackend::new();
//! backend.put_object("hello.txt", "Hello World");
//!
//! let mut registry = BucketRegistry::new(config, signer);
//! registry.add_bucket("my-bucket", Arc::new(backend)).unwrap();
//!
//! let url = registry
//!     .temporary_url("my-bucket", "hello.txt", Expiration::In(600))
//!     .unwrap();
//! let components = registry.parse_url(&url).unwrap();
//! assert_eq!(components.bucket, "my-bucket");
//! ```

pub mod backend;
pub mod backends;
pub mod registry;

pub use backend::{ObjectRead, StorageBackend};
pub use backends::local::LocalBackend;
pub use backends::memory::MemoryBackend;
pub use registry::{BucketRegistry, Expiration};
