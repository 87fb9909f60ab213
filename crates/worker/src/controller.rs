//! The cache controller.
//!
//! Owns the in-memory module index, the store handle, and the update
//! broadcast. Single-threaded and event-driven: ingestion messages are
//! consumed one at a time from a queue, so the most recently completed
//! successful ingestion always wins.

use crate::error::WorkerError;
use crate::fetch::{FetchRequest, FetchResponse, MODULE_CONTENT_TYPE, lookup_key};
use crate::ingest::{Envelope, INGEST_HEAD, IngestStatus, parse_modules};
use crate::lifecycle::Lifecycle;
use chrono::Utc;
use hotpack_core::config::AppConfig;
use hotpack_core::digest::payload_digest;
use hotpack_core::{VFile, VfsDb};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

/// Reserved store key holding the most recently accepted raw ingestion
/// payload, verbatim, for recovery on restart. The fragment form can never
/// collide with a fetchable URL.
pub const BUNDLE_KEY: &str = "#bundle";

/// Fixed name of the process-wide update channel pages subscribe to.
pub const UPDATE_CHANNEL: &str = "hotpack/updates";

/// The single intercepting process serving cached modules and managing
/// ingestion.
pub struct CacheController {
    vfs: VfsDb,
    index: HashMap<String, String>,
    digest: Option<String>,
    state: Lifecycle,
    startup_timeout: Duration,
    updates: broadcast::Sender<IngestStatus>,
}

impl CacheController {
    pub fn new(vfs: VfsDb, config: &AppConfig) -> Self {
        let (updates, _) = broadcast::channel(config.broadcast_capacity);
        Self {
            vfs,
            index: HashMap::new(),
            digest: None,
            state: Lifecycle::Installing,
            startup_timeout: config.startup_load_timeout(),
            updates,
        }
    }

    /// Subscribe a page to ingestion outcomes. Fire-and-forget: a lagging
    /// or absent subscriber simply catches up on its next interaction.
    pub fn subscribe(&self) -> broadcast::Receiver<IngestStatus> {
        self.updates.subscribe()
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    /// Number of modules currently served from memory.
    pub fn module_count(&self) -> usize {
        self.index.len()
    }

    /// Install step: load any persisted bundle into the module index so the
    /// first post-activation fetch can already hit cache, then request to
    /// skip the waiting phase.
    ///
    /// The load is bounded by the configured timeout; a stuck or failing
    /// store read degrades to an empty index and ordinary network fetches.
    pub async fn install(&mut self) {
        match tokio::time::timeout(self.startup_timeout, self.vfs.get_file(BUNDLE_KEY)).await {
            Ok(Ok(Some(file))) => match parse_modules(&file.content) {
                Ok(modules) => {
                    self.digest = Some(payload_digest(&file.content));
                    self.index = modules;
                    tracing::info!(modules = self.index.len(), "loaded persisted bundle");
                }
                Err(e) => tracing::warn!(error = %e, "persisted bundle unreadable, starting empty"),
            },
            Ok(Ok(None)) => tracing::debug!("no persisted bundle"),
            Ok(Err(e)) => tracing::warn!(error = %e, "store read failed during install, starting empty"),
            Err(_) => tracing::warn!(timeout = ?self.startup_timeout, "startup bundle load timed out, starting empty"),
        }
        self.state = Lifecycle::Waiting;
    }

    /// Activate step: claim all open pages immediately, without requiring
    /// navigation or reload.
    pub fn activate(&mut self) {
        self.state = Lifecycle::Activating;
        // claiming is immediate in-process; no page round-trip
        self.state = Lifecycle::Active;
        tracing::info!(channel = UPDATE_CHANNEL, "controller active");
    }

    /// Answer an intercepted fetch from memory, or fall through.
    ///
    /// A hit bypasses the network entirely; a miss returns `None` and the
    /// request proceeds to default handling unmodified. Interception is a
    /// pure accelerator, never the sole source of truth. Only an `Active`
    /// controller intercepts; any other state falls through.
    pub fn handle_fetch(&self, request: &FetchRequest) -> Option<FetchResponse> {
        if !self.state.is_active() {
            return None;
        }
        let key = lookup_key(&request.url, self.vfs.base());
        let source = self.index.get(&key)?;
        Some(FetchResponse { body: source.clone(), content_type: MODULE_CONTENT_TYPE })
    }

    /// Handle one message from a page. Messages without the ingestion
    /// sentinel, or arriving while the controller is not `Active`, are
    /// ignored without a reply; everything else goes through the ingestion
    /// protocol and broadcasts its outcome.
    pub async fn handle_message(&mut self, envelope: &Envelope) -> Option<IngestStatus> {
        if !self.state.is_active() {
            tracing::debug!(state = ?self.state, "ignoring message while not active");
            return None;
        }
        if envelope.head != INGEST_HEAD {
            tracing::debug!(head = envelope.head, "ignoring message with unknown header");
            return None;
        }
        let status = self.ingest(&envelope.payload).await;
        let _ = self.updates.send(status);
        Some(status)
    }

    async fn ingest(&mut self, payload: &[u8]) -> IngestStatus {
        let modules = match parse_modules(payload) {
            Ok(modules) => modules,
            Err(e) => {
                tracing::warn!(error = %e, "rejecting ingestion payload");
                return IngestStatus::Failed;
            }
        };

        let digest = payload_digest(payload);
        if self.digest.as_deref() == Some(digest.as_str()) {
            tracing::debug!(%digest, "bundle unchanged");
            return IngestStatus::Unchanged;
        }

        // persist before swapping the index, so a store failure leaves both
        // the index and the persisted record as they were
        let record = VFile {
            url: BUNDLE_KEY.to_string(),
            content: payload.to_vec(),
            content_type: Some("application/json".to_string()),
            last_modified: Some(Utc::now()),
        };
        if let Err(e) = self.vfs.put_file(&record).await {
            tracing::warn!(error = %e, "failed to persist ingested bundle");
            return IngestStatus::Failed;
        }

        self.index = modules;
        self.digest = Some(digest);
        tracing::info!(modules = self.index.len(), "module cache updated");
        IngestStatus::Updated
    }

    /// The controller caches modules; it never executes them. Any attempt
    /// to run a module's entry point from the controller's own execution
    /// context fails.
    pub fn fire(&self) -> Result<(), WorkerError> {
        Err(WorkerError::ExecutionRefused)
    }

    /// Consume envelopes one at a time until the queue closes, then retire.
    pub async fn run(mut self, mut messages: mpsc::Receiver<Envelope>) {
        while let Some(envelope) = messages.recv().await {
            self.handle_message(&envelope).await;
        }
        self.retire();
    }

    pub fn retire(&mut self) {
        self.state = Lifecycle::Redundant;
        tracing::info!("controller retired");
    }
}
