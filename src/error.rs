//! Error types for the sitting engine.

use crate::session::SessionState;

/// Result alias for engine and partitioner operations.
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Contract violations reported by the group partitioner and the sitting engine.
///
/// Every variant is recoverable: the engine state is left exactly as it was
/// before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Start offset does not fall inside `[0, group_size)`.
    #[error("start offset {offset} is out of range (group size is {group_size})")]
    InvalidOffset { offset: usize, group_size: usize },

    /// Group index does not exist for the loaded deck.
    #[error("group {index} does not exist (deck has {group_count} groups)")]
    InvalidGroupIndex { index: usize, group_count: usize },

    /// Group size of zero cannot partition anything.
    #[error("group size must be at least 1")]
    InvalidGroupSize,

    /// Operation is not allowed in the engine's current state.
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: SessionState,
    },

    /// Card store is empty, so no sitting can begin.
    #[error("no cards are available to study")]
    NoCardsAvailable,
}
