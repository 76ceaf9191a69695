//! Committed state change notifications

use std::time::Instant;

use super::{PlayerEvent, PlayerState};

/// A committed transition whose new state differs from the old one
///
/// Delivered to listeners and change iterators in commit order. The
/// `sequence` starts at 1 and increases by one per change on a machine.
#[derive(Debug, Clone)]
pub struct StateChange {
    /// Position of this change in the machine's history
    pub sequence: u64,
    /// State before the transition
    pub from: PlayerState,
    /// State after the transition
    pub to: PlayerState,
    /// Event that caused it
    pub event: PlayerEvent,
    /// When the change was committed
    pub timestamp: Instant,
}

impl StateChange {
    pub fn new(sequence: u64, from: PlayerState, to: PlayerState, event: PlayerEvent) -> Self {
        Self {
            sequence,
            from,
            to,
            event,
            timestamp: Instant::now(),
        }
    }

    pub fn old(&self) -> &PlayerState {
        &self.from
    }

    pub fn new_state(&self) -> &PlayerState {
        &self.to
    }

    /// Whether this change entered the error state
    pub fn is_fault(&self) -> bool {
        self.to.is_error()
    }
}

impl PartialEq for StateChange {
    fn eq(&self, other: &Self) -> bool {
        // Timestamp not included in equality
        self.sequence == other.sequence
            && self.from == other.from
            && self.to == other.to
            && self.event == other.event
    }
}
