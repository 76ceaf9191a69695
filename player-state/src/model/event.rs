//! Inputs that may provoke a state transition

use std::fmt;

use serde::{Deserialize, Serialize};

use super::FaultCause;

/// An instantaneous input submitted to the state machine
///
/// Events are applied and discarded; nothing keeps a log of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Prepare media for playback
    Load,
    /// Start playback from the beginning
    Play,
    /// Suspend playback, keeping the position
    Pause,
    /// Continue after a pause
    Resume,
    /// Halt playback and rewind
    Stop,
    /// The media ran out
    EndOfMedia,
    /// An external failure was reported
    Fault(FaultCause),
    /// Return to idle from anywhere
    Reset,
}

impl PlayerEvent {
    /// The payload-free label for this event
    pub fn kind(&self) -> EventKind {
        match self {
            PlayerEvent::Load => EventKind::Load,
            PlayerEvent::Play => EventKind::Play,
            PlayerEvent::Pause => EventKind::Pause,
            PlayerEvent::Resume => EventKind::Resume,
            PlayerEvent::Stop => EventKind::Stop,
            PlayerEvent::EndOfMedia => EventKind::EndOfMedia,
            PlayerEvent::Fault(_) => EventKind::Fault,
            PlayerEvent::Reset => EventKind::Reset,
        }
    }
}

impl From<FaultCause> for PlayerEvent {
    fn from(cause: FaultCause) -> Self {
        PlayerEvent::Fault(cause)
    }
}

impl fmt::Display for PlayerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerEvent::Fault(cause) => write!(f, "Fault({})", cause),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Payload-free label of a [`PlayerEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Load,
    Play,
    Pause,
    Resume,
    Stop,
    EndOfMedia,
    Fault,
    Reset,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        EventKind::Load,
        EventKind::Play,
        EventKind::Pause,
        EventKind::Resume,
        EventKind::Stop,
        EventKind::EndOfMedia,
        EventKind::Fault,
        EventKind::Reset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Load => "Load",
            EventKind::Play => "Play",
            EventKind::Pause => "Pause",
            EventKind::Resume => "Resume",
            EventKind::Stop => "Stop",
            EventKind::EndOfMedia => "EndOfMedia",
            EventKind::Fault => "Fault",
            EventKind::Reset => "Reset",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
