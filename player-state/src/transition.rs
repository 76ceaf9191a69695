//! Transition table: (state, event) → (state, effect)
//!
//! The table is a pure function consulted read-only by the machine. The
//! [`StandardTable`] encodes the default player policy:
//!
//! ```text
//! From     | Load        | Play          | Pause         | Resume         | Stop          | EndOfMedia    | Fault   | Reset
//! ---------+-------------+---------------+---------------+----------------+---------------+---------------+---------+------
//! Idle     | Idle (load) | -             | -             | -              | Stopped       | -             | Error   | Idle
//! Playing  | -           | -             | Paused (pause)| -              | Stopped (stop)| Stopped (stop)| Error   | Idle
//! Paused   | -           | -             | -             | Playing(resume)| Stopped (stop)| -             | Error   | Idle
//! Stopped  | Idle (load) | Playing(start)| -             | -              | no-op         | -             | Error   | Idle
//! Error    | -           | -             | -             | -              | -             | -             | Error   | Idle
//! ```
//!
//! Every `Fault` and every `Reset` carries the `Release` effect.

use serde::{Deserialize, Serialize};

use crate::error::TransitionError;
use crate::model::{Effect, PlayerEvent, PlayerState};

/// Outcome of a successful table lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// State the event was applied in
    pub from: PlayerState,
    /// The accepted event
    pub event: PlayerEvent,
    /// Resulting state
    pub to: PlayerState,
    /// Directive to hand to the engine, if any
    pub effect: Option<Effect>,
    noop: bool,
}

impl Transition {
    pub fn new(
        from: PlayerState,
        event: PlayerEvent,
        to: PlayerState,
        effect: Option<Effect>,
    ) -> Self {
        Self {
            from,
            event,
            to,
            effect,
            noop: false,
        }
    }

    /// An accepted event that leaves the state as it is and fires nothing
    pub fn noop(state: PlayerState, event: PlayerEvent) -> Self {
        Self {
            from: state.clone(),
            event,
            to: state,
            effect: None,
            noop: true,
        }
    }

    /// Whether the table defined this pair as an explicit no-op
    pub fn is_noop(&self) -> bool {
        self.noop
    }

    /// Whether the resulting state differs from the starting one
    pub fn changes_state(&self) -> bool {
        self.from != self.to
    }
}

/// Mapping from (state, event) to the next state and effect
///
/// Implementations must be deterministic and free of hidden context: the
/// machine may consult the table from any thread.
pub trait TransitionTable: Send + Sync {
    /// Look up the transition for `event` in state `from`
    fn lookup(&self, from: &PlayerState, event: &PlayerEvent)
        -> Result<Transition, TransitionError>;
}

/// The default player policy
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTable;

impl StandardTable {
    pub fn new() -> Self {
        Self
    }
}

impl TransitionTable for StandardTable {
    fn lookup(
        &self,
        from: &PlayerState,
        event: &PlayerEvent,
    ) -> Result<Transition, TransitionError> {
        use PlayerEvent as E;
        use PlayerState as S;

        let (to, effect) = match (from, event) {
            // Accepted from every state
            (_, E::Fault(cause)) => (S::Error(cause.clone()), Some(Effect::Release)),
            (_, E::Reset) => (S::Idle, Some(Effect::Release)),

            (S::Idle, E::Load) => (S::Idle, Some(Effect::Load)),
            (S::Idle, E::Stop) => (S::Stopped, None),

            (S::Playing, E::Pause) => (S::Paused, Some(Effect::Pause)),
            (S::Playing, E::Stop) | (S::Playing, E::EndOfMedia) => {
                (S::Stopped, Some(Effect::Stop))
            }

            (S::Paused, E::Resume) => (S::Playing, Some(Effect::Resume)),
            (S::Paused, E::Stop) => (S::Stopped, Some(Effect::Stop)),

            (S::Stopped, E::Load) => (S::Idle, Some(Effect::Load)),
            (S::Stopped, E::Play) => (S::Playing, Some(Effect::Start)),
            (S::Stopped, E::Stop) => return Ok(Transition::noop(S::Stopped, E::Stop)),

            _ => return Err(TransitionError::illegal(from, event)),
        };

        Ok(Transition::new(from.clone(), event.clone(), to, effect))
    }
}

impl<T: TransitionTable + ?Sized> TransitionTable for Box<T> {
    fn lookup(
        &self,
        from: &PlayerState,
        event: &PlayerEvent,
    ) -> Result<Transition, TransitionError> {
        (**self).lookup(from, event)
    }
}

impl<T: TransitionTable + ?Sized> TransitionTable for std::sync::Arc<T> {
    fn lookup(
        &self,
        from: &PlayerState,
        event: &PlayerEvent,
    ) -> Result<Transition, TransitionError> {
        (**self).lookup(from, event)
    }
}
