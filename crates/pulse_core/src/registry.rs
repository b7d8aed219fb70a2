//! Per-widget callback registry
//!
//! Observers are stored in a slot map and indexed per [`Signal`] in insertion
//! order, which is also invocation order. The same closure may be registered
//! any number of times; every registration is independent and gets its own
//! [`ObserverId`].
//!
//! # Failure policy
//!
//! [`CallbackRegistry::notify`] always runs every observer registered for the
//! signal. Failures are collected and returned together as
//! [`WidgetError::Observer`] once the pass is complete.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::error::{BoxedObserverError, ObserverFailure, Result, WidgetError};
use crate::signal::{Change, Signal, WidgetId};

new_key_type! {
    /// Unique identifier for a registered observer
    pub struct ObserverId;
}

/// Outcome of a single observer invocation
pub type ObserverResult = std::result::Result<(), BoxedObserverError>;

/// Type-erased observer callback
pub type Observer = Arc<dyn Fn(&Change) -> ObserverResult + Send + Sync>;

/// Ordered snapshot of the observers registered for one signal
pub type ObserverList = SmallVec<[Observer; 4]>;

/// Handle returned by `subscribe`, used to remove a single registration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    widget: WidgetId,
    signal: Signal,
    id: ObserverId,
}

impl Subscription {
    pub(crate) fn new(widget: WidgetId, signal: Signal, id: ObserverId) -> Self {
        Self { widget, signal, id }
    }

    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }
}

struct ObserverEntry {
    signal: Signal,
    observer: Observer,
}

/// Registry of observers keyed by signal
#[derive(Default)]
pub struct CallbackRegistry {
    observers: SlotMap<ObserverId, ObserverEntry>,
    by_signal: FxHashMap<Signal, SmallVec<[ObserverId; 4]>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for `signal`
    pub fn subscribe(&mut self, signal: Signal, observer: Observer) -> ObserverId {
        let id = self.observers.insert(ObserverEntry { signal, observer });
        self.by_signal.entry(signal).or_default().push(id);
        id
    }

    /// Remove a single registration
    ///
    /// Returns `false` if the observer was already removed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let Some(entry) = self.observers.remove(id) else {
            return false;
        };
        if let Some(ids) = self.by_signal.get_mut(&entry.signal) {
            ids.retain(|existing| *existing != id);
            if ids.is_empty() {
                self.by_signal.remove(&entry.signal);
            }
        }
        true
    }

    /// Clone the observers for `signal` in registration order
    ///
    /// Widgets take this snapshot under their registry lock and invoke it
    /// afterwards, so observers may subscribe or unsubscribe freely.
    pub fn snapshot(&self, signal: Signal) -> ObserverList {
        self.by_signal
            .get(&signal)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.observers.get(*id))
                    .map(|entry| entry.observer.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Invoke every observer registered for the change's signal
    pub fn notify(&self, change: &Change) -> Result<()> {
        WidgetError::from_failures(run_observers(&self.snapshot(change.signal), change))
    }

    /// Number of observers registered for `signal`
    pub fn count(&self, signal: Signal) -> usize {
        self.by_signal.get(&signal).map_or(0, |ids| ids.len())
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

/// Run `observers` in order, collecting every failure
pub fn run_observers(observers: &[Observer], change: &Change) -> Vec<ObserverFailure> {
    let mut failures = Vec::new();
    for (position, observer) in observers.iter().enumerate() {
        if let Err(error) = observer(change) {
            tracing::warn!(
                "observer {} on {} `{}` failed: {}",
                position,
                change.widget,
                change.signal,
                error
            );
            failures.push(ObserverFailure {
                signal: change.signal,
                position,
                error,
            });
        }
    }
    failures
}
