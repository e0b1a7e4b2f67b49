use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::action::TrayAction;
use crate::patch::{Patch, Snapshot};
use crate::reducer::apply_action;
use crate::state::TrayState;

pub type Observer = Box<dyn FnMut(&Snapshot) + Send + 'static>;

type SharedObserver = Arc<Mutex<Observer>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

struct StoreInner {
    state: TrayState,
    revision: u64,
    observers: Vec<(Subscription, SharedObserver)>,
    next_subscription: u64,
}

/// Unidirectional store for the tab tray. Cloning yields another handle to
/// the same state.
///
/// Observers run after the state lock is released and must not dispatch back
/// into the store from inside the callback.
#[derive(Clone)]
pub struct TrayStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl Default for TrayStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TrayStore {
    pub fn new() -> Self {
        Self::with_state(TrayState::default(), 0)
    }

    pub fn with_state(state: TrayState, revision: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                state,
                revision,
                observers: Vec::new(),
                next_subscription: 1,
            })),
        }
    }

    pub fn revision(&self) -> u64 {
        self.inner.lock().revision
    }

    pub fn state(&self) -> TrayState {
        self.inner.lock().state.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        let inner = self.inner.lock();
        Snapshot {
            state: inner.state.clone(),
            revision: inner.revision,
        }
    }

    pub fn dispatch(&self, action: TrayAction) -> Patch {
        let (patch, snapshot, observers) = {
            let mut inner = self.inner.lock();
            let from_revision = inner.revision;
            let changes = apply_action(&mut inner.state, action);
            if changes.is_empty() {
                return Patch {
                    changes,
                    from_revision,
                    to_revision: from_revision,
                };
            }

            inner.revision = from_revision + 1;
            let snapshot = Snapshot {
                state: inner.state.clone(),
                revision: inner.revision,
            };
            let observers: Vec<SharedObserver> = inner
                .observers
                .iter()
                .map(|(_, observer)| Arc::clone(observer))
                .collect();
            (
                Patch {
                    changes,
                    from_revision,
                    to_revision: inner.revision,
                },
                snapshot,
                observers,
            )
        };

        tracing::debug!(
            revision = patch.to_revision,
            changes = ?patch.changes,
            observers = observers.len(),
            "tray store updated"
        );

        for observer in observers {
            let mut observer = observer.lock();
            (*observer)(&snapshot);
        }

        patch
    }

    pub fn subscribe(&self, observer: Observer) -> Subscription {
        let shared: SharedObserver = Arc::new(Mutex::new(observer));
        // Held until the initial delivery finishes so a concurrent dispatch
        // cannot overtake it with a newer snapshot.
        let mut guard = shared.lock();
        let (subscription, snapshot) = {
            let mut inner = self.inner.lock();
            let subscription = Subscription(inner.next_subscription);
            inner.next_subscription += 1;
            inner.observers.push((subscription, Arc::clone(&shared)));
            (
                subscription,
                Snapshot {
                    state: inner.state.clone(),
                    revision: inner.revision,
                },
            )
        };
        (*guard)(&snapshot);
        subscription
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.observers.len();
        inner.observers.retain(|(id, _)| *id != subscription);
        inner.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.inner.lock().observers.len()
    }
}

impl Debug for TrayStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let inner = self.inner.lock();
        f.debug_struct("TrayStore")
            .field("revision", &inner.revision)
            .field("observers", &inner.observers.len())
            .finish()
    }
}
