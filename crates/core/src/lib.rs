//! Core types and shared functionality for hotpack.
//!
//! This crate provides:
//! - The bundle container codec (encode/decode with embedded checksum)
//! - The persistent store (VFS) with SQLite backend
//! - Payload digests for staleness detection
//! - Unified error types
//! - Configuration structures

pub mod bundle;
pub mod config;
pub mod digest;
pub mod error;
pub mod vfs;

pub use bundle::{Bundle, Entry, MagicFamily};
pub use config::AppConfig;
pub use error::Error;
pub use vfs::{VFile, VfsDb};
