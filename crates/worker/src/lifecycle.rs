//! Controller lifecycle states.

/// The controller's lifecycle: `Installing -> Waiting -> Activating ->
/// Active -> Redundant`.
///
/// The controller requests to skip the waiting phase during install, so
/// `Waiting` is passed through immediately instead of lasting until every
/// controlled page has closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Installing,
    Waiting,
    Activating,
    Active,
    Redundant,
}

impl Lifecycle {
    /// Whether the controller is serving fetches and ingestion messages.
    pub fn is_active(self) -> bool {
        self == Lifecycle::Active
    }
}
