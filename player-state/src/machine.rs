//! The player state machine
//!
//! Owns the current [`PlayerState`] and mediates every transition through a
//! [`TransitionTable`]. Each `apply` runs lookup → commit → effect → notify
//! as one critical section guarded by the machine's apply lock, so
//! concurrent callers are serialized. `current()` reads through a separate
//! lock and only waits for the instant of the swap itself.
//!
//! # Example
//!
//! ```rust
//! use player_state::{Effect, FaultCause, PlayerEvent, PlayerState, StateMachine};
//!
//! let machine = StateMachine::new();
//!
//! machine.apply(PlayerEvent::Stop).unwrap();
//! let applied = machine.apply(PlayerEvent::Play).unwrap();
//! assert_eq!(applied.state(), &PlayerState::Playing);
//! assert_eq!(applied.effect(), Some(Effect::Start));
//!
//! // Rejected events leave the state alone
//! assert!(machine.apply(PlayerEvent::Resume).is_err());
//! assert_eq!(machine.current(), PlayerState::Playing);
//!
//! machine.apply(PlayerEvent::Fault(FaultCause::io("read failed"))).unwrap();
//! assert!(machine.current().is_error());
//! ```

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace, warn};

use crate::config::MachineConfig;
use crate::engine::{NullEngine, PlaybackEngine};
use crate::error::{EngineError, Result, Warning};
use crate::iter::ChangeIterator;
use crate::model::{Effect, FaultCause, PlayerEvent, PlayerState, StateChange, StateKind};
use crate::observer::{panic_message, ObserverRegistry, StateListener, SubscriptionId};
use crate::transition::{StandardTable, Transition, TransitionTable};

// ============================================================================
// Applied - result of a successful apply()
// ============================================================================

/// Result of an accepted event
///
/// Carries the state the machine ended in along with any non-fatal
/// warnings raised while dispatching the effect or notifying listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    previous: PlayerState,
    state: PlayerState,
    effect: Option<Effect>,
    noop: bool,
    engine_fault: Option<FaultCause>,
    warnings: Vec<Warning>,
}

impl Applied {
    fn new(previous: PlayerState, transition: &Transition) -> Self {
        Self {
            previous,
            state: transition.to.clone(),
            effect: transition.effect,
            noop: transition.is_noop(),
            engine_fault: None,
            warnings: Vec::new(),
        }
    }

    /// State the machine is in after this apply
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// State the machine was in before this apply
    pub fn previous(&self) -> &PlayerState {
        &self.previous
    }

    /// Directive dispatched for the requested transition, if any
    pub fn effect(&self) -> Option<Effect> {
        self.effect
    }

    /// Whether the event was accepted as a no-op
    pub fn is_noop(&self) -> bool {
        self.noop
    }

    /// Whether the resulting state differs from the previous one
    pub fn changed(&self) -> bool {
        self.previous != self.state
    }

    /// Fault raised because the engine failed the effect directive
    pub fn engine_fault(&self) -> Option<&FaultCause> {
        self.engine_fault.as_ref()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn into_state(self) -> PlayerState {
        self.state
    }
}

// ============================================================================
// StateMachine
// ============================================================================

struct Inner {
    config: MachineConfig,
    table: Box<dyn TransitionTable>,
    engine: Box<dyn PlaybackEngine>,
    /// Serializes lookup → commit → effect → notify
    apply_lock: Mutex<()>,
    state: RwLock<PlayerState>,
    sequence: AtomicU64,
    observers: Arc<ObserverRegistry>,
}

/// Handle to a player state machine
///
/// Cloning is cheap and every clone drives the same machine, so the UI, the
/// decoder thread and the engine can each hold one.
#[derive(Clone)]
pub struct StateMachine {
    inner: Arc<Inner>,
}

impl StateMachine {
    /// Create a machine in `Idle` with the standard table and no engine
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> StateMachineBuilder {
        StateMachineBuilder::default()
    }

    /// Apply an event
    ///
    /// On success the new state is committed, the effect (if any) has been
    /// handed to the engine and all listeners have been notified. On error
    /// nothing changed and nobody was notified.
    pub fn apply(&self, event: PlayerEvent) -> Result<Applied> {
        let inner = &self.inner;
        let _guard = inner.apply_lock.lock();

        let current = inner.state.read().clone();
        let transition = match inner.table.lookup(&current, &event) {
            Ok(transition) => transition,
            Err(err) => {
                debug!(
                    machine = %inner.config.name,
                    state = %current,
                    event = %event,
                    "Rejected event"
                );
                return Err(err);
            }
        };

        let mut applied = Applied::new(current, &transition);

        if transition.is_noop() {
            trace!(
                machine = %inner.config.name,
                state = %transition.from,
                event = %event,
                "Accepted event as no-op"
            );
            return Ok(applied);
        }

        self.commit(transition, &mut applied);
        Ok(applied)
    }

    /// Commit a transition, dispatch its effect and notify listeners
    ///
    /// Must be called with the apply lock held. A failed effect is re-entered
    /// as a fault unless the transition was a Reset (which always lands in
    /// Idle) or already landed in Error, so a failing `Release` cannot loop.
    fn commit(&self, transition: Transition, applied: &mut Applied) {
        let inner = &self.inner;

        *inner.state.write() = transition.to.clone();
        applied.state = transition.to.clone();

        debug!(
            machine = %inner.config.name,
            from = %transition.from,
            event = %transition.event,
            to = %transition.to,
            effect = ?transition.effect,
            "Committed transition"
        );

        let failed_effect = transition
            .effect
            .and_then(|effect| self.dispatch(effect).err().map(|error| (effect, error)));

        if transition.changes_state() {
            let sequence = inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            let change = StateChange::new(
                sequence,
                transition.from.clone(),
                transition.to.clone(),
                transition.event.clone(),
            );
            applied
                .warnings
                .extend(inner.observers.notify(&change).into_iter().map(Warning::from));
        } else {
            trace!(
                machine = %inner.config.name,
                state = %transition.to,
                "State unchanged, listeners not notified"
            );
        }

        let Some((effect, error)) = failed_effect else {
            return;
        };

        warn!(
            machine = %inner.config.name,
            effect = %effect,
            state = %transition.to,
            "Effect dispatch failed: {}",
            error
        );
        let cause = FaultCause::engine(format!("{} failed: {}", effect, error));
        applied.warnings.push(Warning::Effect { effect, error });

        let is_reset = matches!(transition.event, PlayerEvent::Reset);
        if is_reset || transition.to.is_error() || !inner.config.fault_on_effect_failure {
            return;
        }

        let event = PlayerEvent::Fault(cause.clone());
        match inner.table.lookup(&transition.to, &event) {
            Ok(fault) if !fault.is_noop() => {
                applied.engine_fault = Some(cause);
                self.commit(fault, applied);
            }
            Ok(_) => {}
            Err(err) => {
                warn!(
                    machine = %inner.config.name,
                    "Transition table rejected engine fault: {}",
                    err
                );
            }
        }
    }

    /// Hand a directive to the engine, turning a panic into an `EngineError`
    fn dispatch(&self, effect: Effect) -> std::result::Result<(), EngineError> {
        match catch_unwind(AssertUnwindSafe(|| self.inner.engine.dispatch(effect))) {
            Ok(result) => result,
            Err(payload) => Err(EngineError::new(format!(
                "engine panicked: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }

    /// Snapshot of the current state
    pub fn current(&self) -> PlayerState {
        self.inner.state.read().clone()
    }

    /// Label of the current state
    pub fn kind(&self) -> StateKind {
        self.inner.state.read().kind()
    }

    /// Number of state changes notified so far
    pub fn transition_count(&self) -> u64 {
        self.inner.sequence.load(Ordering::SeqCst)
    }

    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    pub fn config(&self) -> &MachineConfig {
        &self.inner.config
    }

    /// Register a listener for committed state changes
    pub fn subscribe<L>(&self, listener: L) -> SubscriptionId
    where
        L: StateListener + 'static,
    {
        self.inner.observers.subscribe(listener)
    }

    /// Register a listener shared with other owners
    pub fn subscribe_shared(&self, listener: Arc<dyn StateListener>) -> SubscriptionId {
        self.inner.observers.subscribe_shared(listener)
    }

    /// Remove a listener, returning whether it was registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.observers.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.observers.len()
    }

    /// Iterate over every change committed from now on
    pub fn iter(&self) -> ChangeIterator {
        ChangeIterator::subscribe(&self.inner.observers)
    }

    pub fn load(&self) -> Result<Applied> {
        self.apply(PlayerEvent::Load)
    }

    pub fn play(&self) -> Result<Applied> {
        self.apply(PlayerEvent::Play)
    }

    pub fn pause(&self) -> Result<Applied> {
        self.apply(PlayerEvent::Pause)
    }

    pub fn resume(&self) -> Result<Applied> {
        self.apply(PlayerEvent::Resume)
    }

    pub fn stop(&self) -> Result<Applied> {
        self.apply(PlayerEvent::Stop)
    }

    pub fn end_of_media(&self) -> Result<Applied> {
        self.apply(PlayerEvent::EndOfMedia)
    }

    pub fn fault(&self, cause: FaultCause) -> Result<Applied> {
        self.apply(PlayerEvent::Fault(cause))
    }

    pub fn reset(&self) -> Result<Applied> {
        self.apply(PlayerEvent::Reset)
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("name", &self.inner.config.name)
            .field("state", &self.current())
            .field("transition_count", &self.transition_count())
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

// ============================================================================
// StateMachineBuilder
// ============================================================================

/// Builder for StateMachine configuration
pub struct StateMachineBuilder {
    config: MachineConfig,
    table: Option<Box<dyn TransitionTable>>,
    engine: Option<Box<dyn PlaybackEngine>>,
}

impl Default for StateMachineBuilder {
    fn default() -> Self {
        Self {
            config: MachineConfig::default(),
            table: None,
            engine: None,
        }
    }
}

impl StateMachineBuilder {
    /// Replace the whole configuration
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the name attached to log records
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Choose whether failed effects are re-entered as faults
    pub fn fault_on_effect_failure(mut self, enabled: bool) -> Self {
        self.config.fault_on_effect_failure = enabled;
        self
    }

    /// Use a custom transition policy instead of [`StandardTable`]
    pub fn table<T>(mut self, table: T) -> Self
    where
        T: TransitionTable + 'static,
    {
        self.table = Some(Box::new(table));
        self
    }

    /// Set the engine receiving effect directives
    ///
    /// Without one, directives go to a [`NullEngine`].
    pub fn engine<E>(mut self, engine: E) -> Self
    where
        E: PlaybackEngine + 'static,
    {
        self.engine = Some(Box::new(engine));
        self
    }

    /// Build the StateMachine, starting in `Idle`
    pub fn build(self) -> StateMachine {
        let inner = Inner {
            config: self.config,
            table: self.table.unwrap_or_else(|| Box::new(StandardTable)),
            engine: self.engine.unwrap_or_else(|| Box::new(NullEngine)),
            apply_lock: Mutex::new(()),
            state: RwLock::new(PlayerState::Idle),
            sequence: AtomicU64::new(0),
            observers: Arc::new(ObserverRegistry::new()),
        };

        debug!(machine = %inner.config.name, "StateMachine created");

        StateMachine {
            inner: Arc::new(inner),
        }
    }
}
