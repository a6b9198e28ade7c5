//! HTTP serving pipeline for presigned URLs.
//!
//! [`FileServer`] turns a signed request into an HTTP [`FileResponse`]:
//! it verifies the signature and expiry, enforces extension and size
//! policy, evaluates cache validators, honors byte ranges, and selects a
//! streamed or (possibly gzip-compressed) buffered body. All failures
//! map to fixed statuses — 403 for a bad signature, 410 for an expired
//! URL, 404 for anything the caller must not be able to enumerate, 400
//! for the rest.
//!
//! The pipeline is synchronous: one call does blocking backend I/O and
//! returns a complete response.

pub mod compression;
pub mod conditional;
pub mod range;
pub mod response;
pub mod server;

pub use response::{FileResponse, ResponseBody};
pub use server::FileServer;
