//! Data model for the player state machine

pub mod change;
pub mod effect;
pub mod event;
pub mod state;

pub use change::StateChange;
pub use effect::Effect;
pub use event::{EventKind, PlayerEvent};
pub use state::{FaultCause, FaultKind, ParseStateKindError, PlayerState, StateKind};
