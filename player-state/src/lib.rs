//! Player State Machine
//!
//! The control-state core of a media player: which lifecycle phase the
//! player is in, which transitions are legal, which engine directive each
//! transition fires and who gets told about it.
//!
//! # Features
//!
//! - **Typed States**: `Error` carries the fault cause that produced it
//! - **Transition Table**: a pure, replaceable (state, event) → (state, effect) policy
//! - **Serialized Apply**: one lock per machine, consistent snapshot reads
//! - **Listener Isolation**: failing or panicking listeners become warnings
//! - **Blocking Iteration**: consume changes via `machine.iter()`
//!
//! # Architecture
//!
//! ```text
//! Collaborator ──apply(Event)──► StateMachine ──lookup──► TransitionTable
//!                                   │
//!                                   ├── commit  → RwLock<PlayerState>
//!                                   ├── effect  → PlaybackEngine
//!                                   └── notify  → ObserverRegistry → listeners / ChangeIterator
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use player_state::{PlayerEvent, PlayerState, QueueEngine, StateMachine, Effect};
//!
//! let (engine, commands) = QueueEngine::new();
//! let machine = StateMachine::builder().name("deck-a").engine(engine).build();
//! let changes = machine.iter();
//!
//! machine.apply(PlayerEvent::Stop).unwrap();
//! machine.apply(PlayerEvent::Play).unwrap();
//!
//! assert_eq!(machine.current(), PlayerState::Playing);
//! assert_eq!(commands.try_recv().unwrap(), Effect::Start);
//! assert_eq!(changes.try_iter().count(), 2);
//! ```

// Core modules
pub mod config;
pub mod engine;
pub mod machine;
pub mod model;
pub mod observer;
pub mod transition;

// Change iteration
pub mod iter;

// Error types
pub mod error;

// Logging infrastructure
pub mod logging;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::MachineConfig;
pub use engine::{NullEngine, PlaybackEngine, QueueEngine};
pub use machine::{Applied, StateMachine, StateMachineBuilder};
pub use model::{
    Effect, EventKind, FaultCause, FaultKind, ParseStateKindError, PlayerEvent, PlayerState,
    StateChange, StateKind,
};
pub use observer::{ObserverRegistry, StateListener, SubscriptionId};
pub use transition::{StandardTable, Transition, TransitionTable};

pub use iter::{ChangeIterator, TimeoutIter, TryIter};

pub use error::{
    EngineError, ListenerError, ListenerFailure, Result, TransitionError, Warning,
};

pub use logging::{init_logging, init_logging_from_env, init_silent, LoggingError, LoggingMode};

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::engine::PlaybackEngine;
    pub use crate::error::{ListenerError, TransitionError, Warning};
    pub use crate::machine::{Applied, StateMachine};
    pub use crate::model::{Effect, FaultCause, PlayerEvent, PlayerState, StateChange, StateKind};
    pub use crate::observer::{StateListener, SubscriptionId};
}
