//! packcore-core
//!
//! Core library for collecting a core dump together with the executable that
//! produced it and every shared library that executable needs.
//!
//! The pipeline resolves libraries (through `gdb` against the core, or `ldd`
//! against the binary), stages everything under a directory whose layout lets
//! `gdb` treat it as a sysroot, verifies the staged bundle and compresses it.
//!
//! All substantive logic lives here so it is testable without a terminal; the
//! `packcore` CLI is a thin frontend.

pub mod config;
pub mod env_guard;
pub mod errors;
pub mod layout;
pub mod pipeline;
pub mod prompt;
pub mod services;
pub mod tools;

pub use errors::{PackcoreError, Result};

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
