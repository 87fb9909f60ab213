//! Errors raised by the cache controller itself.

/// Controller-side failures that are not part of the shared core taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// Module execution was requested inside the controller's own execution
    /// context. The controller caches modules; pages run them.
    #[error("modules cannot be executed inside the cache controller; fire from a page context")]
    ExecutionRefused,
}
