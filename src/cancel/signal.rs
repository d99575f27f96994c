//! Write-once cancellation signal.
//!
//! # Responsibilities
//! - Fire exactly once, with a reason, and never reset
//! - Let transports await cancellation
//! - Combine several signals with OR semantics
//!
//! # Design Decisions
//! - State is a `watch` channel holding `Option<reason>`; firing is a
//!   conditional send so the first reason wins
//! - Combined signals are registered as weak children of each source, so a
//!   long-lived source does not keep finished calls alive

use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::watch;

/// Reason attached when this library aborts a call.
pub const FETCH_REQUEST_ABORTED: &str = "Fetch request aborted";

#[derive(Debug)]
struct Inner {
    state: watch::Sender<Option<String>>,
    children: Mutex<Vec<Weak<Inner>>>,
}

/// A flag that transitions once from unset to fired.
///
/// Clones share the same flag.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    inner: Arc<Inner>,
}

impl CancellationSignal {
    /// Create a new, unfired signal.
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                state,
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Build a signal that fires as soon as any of `sources` fires.
    ///
    /// If a source has already fired, the result is born fired with that
    /// source's reason.
    pub fn any<'a, I>(sources: I) -> Self
    where
        I: IntoIterator<Item = &'a CancellationSignal>,
    {
        let combined = Self::new();
        for source in sources {
            if let Some(reason) = source.reason() {
                combined.abort_with(reason);
                break;
            }
            source.link(&combined);
            // The source may have fired between the check and the link.
            if let Some(reason) = source.reason() {
                combined.abort_with(reason);
                break;
            }
        }
        combined
    }

    /// Fire with [`FETCH_REQUEST_ABORTED`].
    pub fn abort(&self) {
        self.abort_with(FETCH_REQUEST_ABORTED);
    }

    /// Fire with the given reason. No effect if already fired.
    pub fn abort_with(&self, reason: impl Into<String>) {
        let reason = reason.into();
        let fired = self.inner.state.send_if_modified(|state| {
            if state.is_none() {
                *state = Some(reason.clone());
                true
            } else {
                false
            }
        });
        if !fired {
            return;
        }

        let children = std::mem::take(
            &mut *self
                .inner
                .children
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for child in children.iter().filter_map(Weak::upgrade) {
            CancellationSignal { inner: child }.abort_with(reason.clone());
        }
    }

    /// Whether the signal has fired.
    pub fn is_aborted(&self) -> bool {
        self.inner.state.borrow().is_some()
    }

    /// The reason the signal fired with, if it has fired.
    pub fn reason(&self) -> Option<String> {
        self.inner.state.borrow().clone()
    }

    /// Resolve once the signal fires, yielding the reason.
    pub async fn cancelled(&self) -> String {
        let mut rx = self.inner.state.subscribe();
        let reason = match rx.wait_for(Option::is_some).await {
            Ok(state) => state.clone(),
            Err(_) => None,
        };
        match reason {
            Some(reason) => reason,
            // The sender lives in `self.inner`, so the channel cannot close
            // while this future borrows `self`.
            None => std::future::pending().await,
        }
    }

    fn link(&self, child: &CancellationSignal) {
        let mut children = self
            .inner
            .children
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        children.retain(|c| c.strong_count() > 0);
        children.push(Arc::downgrade(&child.inner));
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_reason_wins() {
        let signal = CancellationSignal::new();
        assert!(!signal.is_aborted());

        signal.abort_with("first");
        signal.abort_with("second");

        assert!(signal.is_aborted());
        assert_eq!(signal.reason().as_deref(), Some("first"));
    }

    #[test]
    fn test_default_reason() {
        let signal = CancellationSignal::new();
        signal.abort();
        assert_eq!(signal.reason().as_deref(), Some(FETCH_REQUEST_ABORTED));
    }

    #[test]
    fn test_combined_fires_from_either_source() {
        let a = CancellationSignal::new();
        let b = CancellationSignal::new();
        let combined = CancellationSignal::any([&a, &b]);

        b.abort_with("caller gave up");
        assert_eq!(combined.reason().as_deref(), Some("caller gave up"));
        assert!(!a.is_aborted());
    }

    #[test]
    fn test_combined_born_fired() {
        let a = CancellationSignal::new();
        a.abort_with("already");
        let combined = CancellationSignal::any([&a, &CancellationSignal::new()]);
        assert_eq!(combined.reason().as_deref(), Some("already"));
    }

    #[test]
    fn test_combined_does_not_fire_source() {
        let a = CancellationSignal::new();
        let combined = CancellationSignal::any([&a]);
        combined.abort();
        assert!(!a.is_aborted());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_with_reason() {
        let signal = CancellationSignal::new();
        let waiter = signal.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        signal.abort_with("stop");

        assert_eq!(handle.await.unwrap(), "stop");
    }

    #[tokio::test]
    async fn test_cancelled_on_fired_signal_is_immediate() {
        let signal = CancellationSignal::new();
        signal.abort();
        assert_eq!(signal.cancelled().await, FETCH_REQUEST_ABORTED);
    }
}
