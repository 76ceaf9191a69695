//! Error types for player-state

use thiserror::Error;

use crate::model::{Effect, EventKind, PlayerEvent, PlayerState, StateKind};
use crate::observer::SubscriptionId;

/// Result type for state machine operations
pub type Result<T> = std::result::Result<T, TransitionError>;

/// A requested event was rejected by the transition table
///
/// The machine's state is untouched when this is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// No transition is defined for this state and event
    #[error("Illegal transition: {event} is not accepted in state {from}")]
    IllegalTransition {
        from: PlayerState,
        event: PlayerEvent,
    },
}

impl TransitionError {
    pub fn illegal(from: &PlayerState, event: &PlayerEvent) -> Self {
        TransitionError::IllegalTransition {
            from: from.clone(),
            event: event.clone(),
        }
    }

    /// Label of the state the event was rejected in
    pub fn from_kind(&self) -> StateKind {
        match self {
            TransitionError::IllegalTransition { from, .. } => from.kind(),
        }
    }

    /// Label of the rejected event
    pub fn event_kind(&self) -> EventKind {
        match self {
            TransitionError::IllegalTransition { event, .. } => event.kind(),
        }
    }
}

/// Failure reported by a playback engine while handling a directive
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure returned by a listener from `on_state_changed`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ListenerError(pub String);

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A listener failed (or panicked) while being notified
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Listener {subscription} failed: {message}")]
pub struct ListenerFailure {
    /// Subscription whose listener failed
    pub subscription: SubscriptionId,
    /// Error text or panic payload
    pub message: String,
    /// Whether the listener panicked rather than returning an error
    pub panicked: bool,
}

/// Non-fatal problem reported alongside a successful transition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A listener failed during notification
    #[error(transparent)]
    Listener(#[from] ListenerFailure),

    /// The engine failed to carry out an effect directive
    #[error("Effect {effect} failed: {error}")]
    Effect {
        effect: Effect,
        #[source]
        error: EngineError,
    },
}

impl Warning {
    pub fn is_listener_failure(&self) -> bool {
        matches!(self, Warning::Listener(_))
    }
}
