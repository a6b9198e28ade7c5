//! Core types for the presigned URL file server.
//!
//! This crate provides the foundational building blocks shared across the
//! presigned-url crates: immutable configuration records, the error
//! taxonomy, bucket-name validation, and the parsed-URL value type.
//!
//! # Modules
//!
//! - [`config`] - Immutable configuration value records
//! - [`error`] - The crate-family error taxonomy
//! - [`validation`] - Bucket-name constraint checking
//! - [`types`] - Small shared value types

pub mod config;
pub mod error;
pub mod types;
pub mod validation;

pub use config::{Config, CompressionConfig, SecurityConfig, ServingConfig, SignatureConfig};
pub use error::{PresignedUrlError, PresignedUrlResult};
pub use types::UrlComponents;
pub use validation::{is_valid_bucket_name, validate_bucket_name};
