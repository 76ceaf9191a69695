//! Playback engine seam
//!
//! The machine hands every effect directive to a [`PlaybackEngine`] while it
//! still holds its apply lock, so `dispatch` must be a non-blocking handoff:
//! post the directive somewhere and return. Long-running work belongs to the
//! engine's own threads, which report failures back by applying
//! `PlayerEvent::Fault` on a machine handle.
//!
//! Calling `apply` on the same machine from inside `dispatch` deadlocks.

use std::sync::mpsc;

use crate::error::EngineError;
use crate::model::Effect;

/// Receiver of effect directives
pub trait PlaybackEngine: Send + Sync {
    /// Hand off a directive without blocking
    fn dispatch(&self, effect: Effect) -> Result<(), EngineError>;
}

impl<F> PlaybackEngine for F
where
    F: Fn(Effect) -> Result<(), EngineError> + Send + Sync,
{
    fn dispatch(&self, effect: Effect) -> Result<(), EngineError> {
        self(effect)
    }
}

/// Engine that accepts and ignores every directive
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEngine;

impl PlaybackEngine for NullEngine {
    fn dispatch(&self, _effect: Effect) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Engine that posts directives onto a command queue
///
/// The consuming side owns the `Receiver` returned by [`QueueEngine::new`]
/// and executes directives on its own thread.
///
/// # Example
///
/// ```rust
/// use player_state::{Effect, PlaybackEngine, QueueEngine};
///
/// let (engine, commands) = QueueEngine::new();
/// engine.dispatch(Effect::Start).unwrap();
/// assert_eq!(commands.try_recv().unwrap(), Effect::Start);
/// ```
#[derive(Debug, Clone)]
pub struct QueueEngine {
    tx: mpsc::Sender<Effect>,
}

impl QueueEngine {
    pub fn new() -> (Self, mpsc::Receiver<Effect>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl PlaybackEngine for QueueEngine {
    fn dispatch(&self, effect: Effect) -> Result<(), EngineError> {
        self.tx
            .send(effect)
            .map_err(|_| EngineError::new("engine command queue disconnected"))
    }
}
