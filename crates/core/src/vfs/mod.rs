//! SQLite-backed persistent store (VFS) keyed by normalized URL.
//!
//! This module provides a durable key-value store with async access via
//! tokio-rusqlite. It supports:
//!
//! - Keys normalized to canonical absolute URLs against a fixed base
//! - Transparent reopen when the host closes an idle connection
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod files;
pub mod migrations;

pub use crate::Error;

pub use connection::VfsDb;
pub use files::VFile;
