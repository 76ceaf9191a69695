//! Side-effect directives dispatched to the playback engine

use std::fmt;

use serde::{Deserialize, Serialize};

/// Instruction handed to the playback engine when a transition commits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Load the media
    Load,
    /// Start playback from the beginning
    Start,
    /// Suspend playback
    Pause,
    /// Continue suspended playback
    Resume,
    /// Halt playback and rewind
    Stop,
    /// Release every engine resource
    Release,
}

impl Effect {
    /// Directive name as it appears in logs, e.g. `"engine.start"`
    pub fn directive(&self) -> &'static str {
        match self {
            Effect::Load => "engine.load",
            Effect::Start => "engine.start",
            Effect::Pause => "engine.pause",
            Effect::Resume => "engine.resume",
            Effect::Stop => "engine.stop",
            Effect::Release => "engine.release",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.directive())
    }
}
