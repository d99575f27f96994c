//! Group-wide cancel broadcast.

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::oneshot;

/// Name of the single event carried by a [`CancellationBroadcast`].
pub const CANCEL_EVENT: &str = "cancel";

/// Returns false when the listener should be dropped from the list.
type Listener = Arc<dyn Fn() -> bool + Send + Sync>;

struct Entry {
    id: u64,
    once: bool,
    listener: Listener,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Entry>,
}

impl Registry {
    fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }
}

/// Outcome of [`CancellationBroadcast::wait_for_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The event fired before the timeout.
    Fired,
    /// The timeout elapsed first.
    TimedOut,
}

/// One-to-many notifier for the `"cancel"` event.
///
/// Listeners run synchronously inside [`emit`](Self::emit), in registration
/// order. Clones share the same listener list.
#[derive(Clone, Default)]
pub struct CancellationBroadcast {
    registry: Arc<Mutex<Registry>>,
}

impl CancellationBroadcast {
    /// Create a broadcast with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener that stays until explicitly unsubscribed.
    pub fn on<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register(
            Arc::new(move || {
                listener();
                true
            }),
            false,
        )
    }

    /// Register a listener that stays while it returns true.
    ///
    /// A listener returning false is removed at the end of that emit.
    pub fn on_while<F>(&self, listener: F) -> Subscription
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.register(Arc::new(listener), false)
    }

    /// Register a listener that is removed after it runs once.
    pub fn once<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register(
            Arc::new(move || {
                listener();
                false
            }),
            true,
        )
    }

    /// Invoke every registered listener.
    ///
    /// The list is snapshotted first, so listeners may (un)subscribe freely.
    pub fn emit(&self) {
        let listeners: Vec<(u64, Listener)> = {
            let mut registry = self.lock();
            let listeners = registry
                .entries
                .iter()
                .map(|e| (e.id, e.listener.clone()))
                .collect();
            registry.entries.retain(|e| !e.once);
            listeners
        };

        tracing::debug!(
            event = CANCEL_EVENT,
            listeners = listeners.len(),
            "Emitting broadcast"
        );

        let stale: Vec<u64> = listeners
            .into_iter()
            .filter_map(|(id, listener)| (!listener()).then_some(id))
            .collect();

        if !stale.is_empty() {
            let mut registry = self.lock();
            for id in stale {
                registry.remove(id);
            }
        }
    }

    /// Wait until the event fires or `timeout` elapses, whichever is first.
    ///
    /// The temporary listener is removed in both cases.
    pub async fn wait_for_event(&self, timeout: Duration) -> WaitOutcome {
        let (tx, rx) = oneshot::channel::<()>();
        let tx = Mutex::new(Some(tx));
        // Dropping this future early also removes the listener.
        let _guard = self
            .once(move || {
                if let Some(tx) = tx.lock().unwrap_or_else(PoisonError::into_inner).take() {
                    let _ = tx.send(());
                }
            })
            .guard();

        tokio::select! {
            res = rx => match res {
                Ok(()) => WaitOutcome::Fired,
                Err(_) => WaitOutcome::TimedOut,
            },
            _ = tokio::time::sleep(timeout) => WaitOutcome::TimedOut,
        }
    }

    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().entries.len()
    }

    fn register(&self, listener: Listener, once: bool) -> Subscription {
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push(Entry { id, once, listener });
        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CancellationBroadcast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationBroadcast")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Handle to a registered listener.
///
/// Dropping the handle leaves the listener registered.
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    id: u64,
}

impl Subscription {
    /// Remove the listener. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(self.id),
            None => false,
        }
    }

    /// Tie the listener's lifetime to the returned guard.
    pub fn guard(self) -> SubscriptionGuard {
        SubscriptionGuard(Some(self))
    }
}

/// Unsubscribes its listener when dropped.
#[derive(Debug)]
pub struct SubscriptionGuard(Option<Subscription>);

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(subscription) = self.0.take() {
            subscription.unsubscribe();
        }
    }
}
