//! The hotpack cache controller.
//!
//! A single intercepting process that owns the in-memory module index,
//! loads and persists bundles through the store, answers fetches from
//! cache, and runs the ingestion protocol driven by messages from open
//! pages, broadcasting outcomes to all of them.

pub mod controller;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod lifecycle;

pub use controller::CacheController;
pub use error::WorkerError;
pub use fetch::{FetchRequest, FetchResponse};
pub use ingest::{Envelope, IngestStatus};
pub use lifecycle::Lifecycle;
