//! sieve-core
//!
//! Core library for forensic scanning of Android packages and firmware blobs.
//!
//! Binary parsing (PNG chunks, magic signatures, raster geometry), regex
//! pattern extraction, report aggregation and the scan/batch services all
//! live here, so every frontend shares the same behaviour and tests.

pub mod binary;
pub mod config;
pub mod firmware;
pub mod patterns;
pub mod report;
pub mod services;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
