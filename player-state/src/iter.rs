//! Blocking iterator over committed state changes
//!
//! Provides various iteration patterns for consuming changes:
//! - Blocking: `recv()`, `for change in machine.iter()`
//! - Non-blocking: `try_recv()`, `try_iter()`
//! - Timeout: `recv_timeout()`, `timeout_iter()`
//!
//! Each iterator is its own subscription on the machine's observer registry
//! and receives every change committed after it was created. Dropping the
//! iterator unsubscribes it.

use std::sync::{mpsc, Arc, Weak};
use std::time::Duration;

use crate::error::ListenerError;
use crate::model::StateChange;
use crate::observer::{ObserverRegistry, StateListener, SubscriptionId};

/// Listener forwarding changes into a channel
struct ChannelListener {
    tx: mpsc::Sender<StateChange>,
}

impl StateListener for ChannelListener {
    fn on_state_changed(&self, change: &StateChange) -> Result<(), ListenerError> {
        // A receiver dropped mid-notification is being unsubscribed
        let _ = self.tx.send(change.clone());
        Ok(())
    }
}

/// Blocking iterator over state changes
///
/// # Example
///
/// ```rust,ignore
/// // Blocking iteration
/// for change in machine.iter() {
///     println!("{} -> {}", change.from, change.to);
/// }
///
/// // Non-blocking check
/// for change in changes.try_iter() {
///     println!("#{} {}", change.sequence, change.to);
/// }
/// ```
pub struct ChangeIterator {
    rx: mpsc::Receiver<StateChange>,
    subscription: SubscriptionId,
    registry: Weak<ObserverRegistry>,
}

impl ChangeIterator {
    pub(crate) fn subscribe(registry: &Arc<ObserverRegistry>) -> Self {
        let (tx, rx) = mpsc::channel();
        let subscription = registry.subscribe(ChannelListener { tx });

        Self {
            rx,
            subscription,
            registry: Arc::downgrade(registry),
        }
    }

    /// Subscription backing this iterator
    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    /// Block until the next change is available
    ///
    /// Returns `None` if the machine has been dropped.
    pub fn recv(&self) -> Option<StateChange> {
        self.rx.recv().ok()
    }

    /// Block until the next change or timeout expires
    ///
    /// Returns `None` if the timeout expires or the machine has been dropped.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<StateChange> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Try to receive a change without blocking
    pub fn try_recv(&self) -> Option<StateChange> {
        self.rx.try_recv().ok()
    }

    /// Get a non-blocking iterator over currently queued changes
    pub fn try_iter(&self) -> TryIter<'_> {
        TryIter { inner: self }
    }

    /// Get a blocking iterator with timeout
    ///
    /// Stops when a timeout expires without a change.
    pub fn timeout_iter(&self, timeout: Duration) -> TimeoutIter<'_> {
        TimeoutIter {
            inner: self,
            timeout,
        }
    }
}

impl Iterator for ChangeIterator {
    type Item = StateChange;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

impl Drop for ChangeIterator {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(self.subscription);
        }
    }
}

impl std::fmt::Debug for ChangeIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeIterator")
            .field("subscription", &self.subscription)
            .finish()
    }
}

/// Non-blocking iterator over currently queued changes
pub struct TryIter<'a> {
    inner: &'a ChangeIterator,
}

impl<'a> Iterator for TryIter<'a> {
    type Item = StateChange;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}

/// Blocking iterator with timeout
pub struct TimeoutIter<'a> {
    inner: &'a ChangeIterator,
    timeout: Duration,
}

impl<'a> Iterator for TimeoutIter<'a> {
    type Item = StateChange;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.recv_timeout(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlayerEvent, PlayerState};
    use std::thread;
    use std::time::Instant;

    fn create_test_change(sequence: u64) -> StateChange {
        StateChange::new(sequence, PlayerState::Stopped, PlayerState::Playing, PlayerEvent::Play)
    }

    #[test]
    fn test_try_recv_empty() {
        let registry = Arc::new(ObserverRegistry::new());
        let iter = ChangeIterator::subscribe(&registry);

        assert!(iter.try_recv().is_none());
    }

    #[test]
    fn test_receives_notified_changes() {
        let registry = Arc::new(ObserverRegistry::new());
        let iter = ChangeIterator::subscribe(&registry);

        registry.notify(&create_test_change(1));
        registry.notify(&create_test_change(2));

        let changes: Vec<_> = iter.try_iter().map(|c| c.sequence).collect();
        assert_eq!(changes, vec![1, 2]);
        assert!(iter.try_recv().is_none());
    }

    #[test]
    fn test_recv_timeout() {
        let registry = Arc::new(ObserverRegistry::new());
        let iter = ChangeIterator::subscribe(&registry);

        let start = Instant::now();
        assert!(iter.recv_timeout(Duration::from_millis(50)).is_none());
        assert!(start.elapsed() >= Duration::from_millis(45));
    }

    #[test]
    fn test_blocking_recv_from_other_thread() {
        let registry = Arc::new(ObserverRegistry::new());
        let iter = ChangeIterator::subscribe(&registry);

        let notifier = Arc::clone(&registry);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            notifier.notify(&create_test_change(7));
        });

        let change = iter.recv().unwrap();
        assert_eq!(change.sequence, 7);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let registry = Arc::new(ObserverRegistry::new());
        let iter = ChangeIterator::subscribe(&registry);
        assert_eq!(registry.len(), 1);

        drop(iter);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_closed_when_registry_dropped() {
        let registry = Arc::new(ObserverRegistry::new());
        let iter = ChangeIterator::subscribe(&registry);

        drop(registry);
        assert!(iter.recv().is_none());
    }
}
