//! Shared selection state.

use crate::catalog::Candidate;
use crate::orientation::{OrientationHistory, OrientationSample};

/// The engine's sticky selection state.
///
/// `current` is empty until the first adoption and is never cleared by a
/// failed cycle afterwards. `previous_orientation` is the last sample
/// consumed by an evaluation, whether or not that evaluation was suppressed.
#[derive(Debug, Default)]
pub struct SelectionState {
    /// Currently active candidate set (empty = no selection yet).
    pub current: Vec<Candidate>,
    /// Orientation the last evaluation consumed.
    pub previous_orientation: Option<OrientationSample>,
}

impl SelectionState {
    /// Create an empty selection state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a selection has ever been adopted.
    pub fn has_selection(&self) -> bool {
        !self.current.is_empty()
    }
}

/// Cross-thread state shared between the orientation producer and the
/// decision loop, guarded by the engine's single lock.
///
/// Critical sections over this state never include geometry or plugin calls.
#[derive(Debug)]
pub(crate) struct EngineShared {
    pub history: OrientationHistory,
    pub selection: SelectionState,
}

impl EngineShared {
    pub fn with_history_capacity(capacity: usize) -> Self {
        Self {
            history: OrientationHistory::with_capacity(capacity),
            selection: SelectionState::new(),
        }
    }
}
