//! Player lifecycle states

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Category of an externally reported failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// Reading or writing media failed
    Io,
    /// The media could not be decoded
    Decode,
    /// A network source failed
    Network,
    /// The output device failed
    Device,
    /// The playback engine rejected or failed a directive
    Engine,
    /// An operation did not complete in time
    Timeout,
    /// Anything else
    Other,
}

impl FaultKind {
    /// Short lowercase name used in logs and display output
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultKind::Io => "io",
            FaultKind::Decode => "decode",
            FaultKind::Network => "network",
            FaultKind::Device => "device",
            FaultKind::Engine => "engine",
            FaultKind::Timeout => "timeout",
            FaultKind::Other => "other",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic carried by a fault event and kept while in [`PlayerState::Error`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaultCause {
    /// What kind of failure occurred
    pub kind: FaultKind,
    /// Human-readable description
    pub message: String,
}

impl FaultCause {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Io, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Decode, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Network, message)
    }

    pub fn device(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Device, message)
    }

    pub fn engine(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Engine, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Timeout, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Other, message)
    }
}

impl fmt::Display for FaultCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Current lifecycle phase of a player
///
/// Only `Error` carries data: the cause of the fault that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    /// No media is playing; a load may have been requested
    Idle,
    /// Media is loaded and advancing
    Playing,
    /// Media is loaded, advancement suspended, position retained
    Paused,
    /// Advancement halted, position reset to start
    Stopped,
    /// A fault occurred
    Error(FaultCause),
}

impl PlayerState {
    /// The bare label for this state
    pub fn kind(&self) -> StateKind {
        match self {
            PlayerState::Idle => StateKind::Idle,
            PlayerState::Playing => StateKind::Playing,
            PlayerState::Paused => StateKind::Paused,
            PlayerState::Stopped => StateKind::Stopped,
            PlayerState::Error(_) => StateKind::Error,
        }
    }

    /// The fault cause, if the player is in the error state
    pub fn fault(&self) -> Option<&FaultCause> {
        match self {
            PlayerState::Error(cause) => Some(cause),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PlayerState::Error(_))
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        PlayerState::Idle
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerState::Error(cause) => write!(f, "ERROR({})", cause),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Payload-free label of a [`PlayerState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateKind {
    Idle,
    Playing,
    Paused,
    Stopped,
    Error,
}

impl StateKind {
    pub const ALL: [StateKind; 5] = [
        StateKind::Idle,
        StateKind::Playing,
        StateKind::Paused,
        StateKind::Stopped,
        StateKind::Error,
    ];

    /// Uppercase label, e.g. `"PLAYING"`
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::Idle => "IDLE",
            StateKind::Playing => "PLAYING",
            StateKind::Paused => "PAUSED",
            StateKind::Stopped => "STOPPED",
            StateKind::Error => "ERROR",
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label that does not name any player state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown player state label: {0}")]
pub struct ParseStateKindError(pub String);

impl FromStr for StateKind {
    type Err = ParseStateKindError;

    /// Parse a state label, ignoring case
    ///
    /// Unknown labels are rejected instead of being mapped to a default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "IDLE" => Ok(StateKind::Idle),
            "PLAYING" => Ok(StateKind::Playing),
            "PAUSED" => Ok(StateKind::Paused),
            "STOPPED" => Ok(StateKind::Stopped),
            "ERROR" => Ok(StateKind::Error),
            _ => Err(ParseStateKindError(s.to_string())),
        }
    }
}
