//! Order lifecycle phases.

use serde::{Deserialize, Serialize};

/// The phase of an order in its coordinator lifecycle.
///
/// Phase transitions:
/// ```text
/// Created ──► Dispatching ──► Waiting ──┬──► Resolved
///                                       └──► HungFailure
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderPhase {
    /// Order accepted, coordinator not yet dispatching.
    #[default]
    Created,

    /// Dispatch attempts are being issued for every item.
    Dispatching,

    /// All dispatch attempts issued; waiting for completion notifications
    /// under the deadline.
    Waiting,

    /// Finalized with a computed disposition (terminal state).
    Resolved,

    /// Deadline elapsed before every item got a dispatch outcome
    /// (terminal state).
    HungFailure,
}

impl OrderPhase {
    /// Returns true if this is a terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderPhase::Resolved | OrderPhase::HungFailure)
    }

    /// Returns the phase name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderPhase::Created => "Created",
            OrderPhase::Dispatching => "Dispatching",
            OrderPhase::Waiting => "Waiting",
            OrderPhase::Resolved => "Resolved",
            OrderPhase::HungFailure => "HungFailure",
        }
    }
}

impl std::fmt::Display for OrderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
