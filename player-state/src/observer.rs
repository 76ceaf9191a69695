//! Listener registry for committed state changes
//!
//! Listeners are notified in subscription order. A listener that returns an
//! error or panics is isolated: the remaining listeners still run and the
//! failure is handed back to the caller as a [`ListenerFailure`].

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use crate::error::{ListenerError, ListenerFailure};
use crate::model::StateChange;

/// Handle returned by `subscribe`, used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Collaborator informed of every committed state change
///
/// Called while the machine holds its apply lock. Reading `current()` is
/// fine; calling `apply` on the same machine deadlocks.
pub trait StateListener: Send + Sync {
    fn on_state_changed(&self, change: &StateChange) -> Result<(), ListenerError>;
}

impl<F> StateListener for F
where
    F: Fn(&StateChange) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_state_changed(&self, change: &StateChange) -> Result<(), ListenerError> {
        self(change)
    }
}

/// Ordered set of listeners
pub struct ObserverRegistry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(SubscriptionId, Arc<dyn StateListener>)>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Register a listener; it is notified after all earlier subscribers
    pub fn subscribe<L>(&self, listener: L) -> SubscriptionId
    where
        L: StateListener + 'static,
    {
        self.subscribe_shared(Arc::new(listener))
    }

    /// Register a listener that is shared with other owners
    pub fn subscribe_shared(&self, listener: Arc<dyn StateListener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, listener));
        id
    }

    /// Remove a listener, returning whether it was registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Notify every listener of `change`, collecting failures
    ///
    /// The listener list is snapshotted first, so listeners may subscribe or
    /// unsubscribe from inside their callback.
    pub fn notify(&self, change: &StateChange) -> Vec<ListenerFailure> {
        let snapshot: Vec<_> = self.listeners.read().iter().cloned().collect();
        let mut failures = Vec::new();

        for (id, listener) in snapshot {
            let outcome = catch_unwind(AssertUnwindSafe(|| listener.on_state_changed(change)));

            let failure = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => ListenerFailure {
                    subscription: id,
                    message: err.to_string(),
                    panicked: false,
                },
                Err(payload) => ListenerFailure {
                    subscription: id,
                    message: panic_message(payload.as_ref()),
                    panicked: true,
                },
            };

            warn!(
                subscription = %id,
                sequence = change.sequence,
                panicked = failure.panicked,
                "Listener failed: {}",
                failure.message
            );
            failures.push(failure);
        }

        failures
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("listener_count", &self.len())
            .finish()
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panicked without a message".to_string()
    }
}
