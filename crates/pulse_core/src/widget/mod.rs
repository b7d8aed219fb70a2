//! Widget models
//!
//! A [`Widget`] is a cheap, clonable handle to one authoritative widget model.
//! The model owns its state (a [`WidgetKind`] variant plus the shared base
//! attributes) and its [`CallbackRegistry`]. Typed views ([`Button`],
//! [`Toggle`], [`MenuButton`], [`IconButton`]) deref to `Widget` and add the
//! variant-specific accessors.
//!
//! # Mutation passes
//!
//! Every mutating entry point runs as a single pass:
//!
//! 1. Acquire the per-model gate. Passes from other threads (other sessions
//!    sharing the model) block here, so mutations are serialized.
//! 2. Lock the state, validate, mutate, and compute a [`StateDelta`].
//! 3. Release the state lock and run the observers for each change in order.
//!
//! Observers may read the widget and subscribe or unsubscribe, but any
//! mutation of the same widget from inside an observer fails with
//! [`WidgetError::Reentrancy`].
//!
//! Re-entrancy is only detected on the thread that holds the gate. Passes on
//! different widgets are not ordered against each other: if an observer of
//! `a` mutates `b` on one thread while an observer of `b` mutates `a` on
//! another, the two passes wait on each other's gate forever. Observers that
//! write to other widgets must keep those writes acyclic or run them on a
//! single thread.

mod button;
mod menu;
mod toggle;

pub use button::{Button, ButtonModel, IconButton, IconButtonModel};
pub use menu::{MenuButton, MenuItem, MenuModel};
pub use toggle::{Toggle, ToggleModel};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};

use crate::dispatch::{Dispatch, Outcome, StateDelta};
use crate::error::{Result, WidgetError};
use crate::event::{Event, EventKind, PropertyChange, RawEvent};
use crate::registry::{run_observers, CallbackRegistry, Observer, ObserverResult, Subscription};
use crate::signal::{Change, Signal, SignalValue, WidgetId, WidgetKindTag};

/// Variant-specific widget state
#[derive(Clone, Debug)]
pub enum WidgetKind {
    Button(ButtonModel),
    Toggle(ToggleModel),
    MenuButton(MenuModel),
    IconButton(IconButtonModel),
}

impl Dispatch for WidgetKind {
    fn kind(&self) -> WidgetKindTag {
        match self {
            WidgetKind::Button(m) => m.kind(),
            WidgetKind::Toggle(m) => m.kind(),
            WidgetKind::MenuButton(m) => m.kind(),
            WidgetKind::IconButton(m) => m.kind(),
        }
    }

    fn dispatch(&mut self, widget: WidgetId, event: &Event) -> Result<StateDelta> {
        match self {
            WidgetKind::Button(m) => m.dispatch(widget, event),
            WidgetKind::Toggle(m) => m.dispatch(widget, event),
            WidgetKind::MenuButton(m) => m.dispatch(widget, event),
            WidgetKind::IconButton(m) => m.dispatch(widget, event),
        }
    }

    fn accepts(&self, event: EventKind) -> bool {
        match self {
            WidgetKind::Button(m) => m.accepts(event),
            WidgetKind::Toggle(m) => m.accepts(event),
            WidgetKind::MenuButton(m) => m.accepts(event),
            WidgetKind::IconButton(m) => m.accepts(event),
        }
    }

    fn mirrors(&self, change: &PropertyChange) -> bool {
        match self {
            WidgetKind::Button(m) => m.mirrors(change),
            WidgetKind::Toggle(m) => m.mirrors(change),
            WidgetKind::MenuButton(m) => m.mirrors(change),
            WidgetKind::IconButton(m) => m.mirrors(change),
        }
    }

    fn sync_property(&mut self, widget: WidgetId, change: &PropertyChange) -> Result<StateDelta> {
        match self {
            WidgetKind::Button(m) => m.sync_property(widget, change),
            WidgetKind::Toggle(m) => m.sync_property(widget, change),
            WidgetKind::MenuButton(m) => m.sync_property(widget, change),
            WidgetKind::IconButton(m) => m.sync_property(widget, change),
        }
    }
}

/// Authoritative state of one widget
#[derive(Clone, Debug)]
pub struct WidgetState {
    name: String,
    disabled: bool,
    kind: WidgetKind,
    /// Client-side callback code keyed by front-end event name
    client_callbacks: BTreeMap<String, Vec<String>>,
}

impl WidgetState {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn disabled(&self) -> bool {
        self.disabled
    }

    pub fn kind(&self) -> &WidgetKind {
        &self.kind
    }
}

/// Point-in-time copy of a widget's state, used for rendering
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetSnapshot {
    pub id: WidgetId,
    pub kind: WidgetKindTag,
    pub name: String,
    pub disabled: bool,
    /// Button/IconButton (always `false`) and Toggle
    pub value: Option<bool>,
    /// Button/IconButton
    pub clicks: Option<u64>,
    /// MenuButton
    pub clicked: Option<String>,
    /// MenuButton
    pub items: Vec<MenuItem>,
    /// IconButton
    pub icon: Option<String>,
    pub active_icon: Option<String>,
    pub client_callbacks: BTreeMap<String, Vec<String>>,
}

struct WidgetInner {
    id: WidgetId,
    state: Mutex<WidgetState>,
    registry: Mutex<CallbackRegistry>,
    /// Serializes mutation passes across threads
    gate: Mutex<()>,
    /// Thread currently running a pass
    owner: Mutex<Option<ThreadId>>,
}

/// Shared handle to a widget model
#[derive(Clone)]
pub struct Widget {
    inner: Arc<WidgetInner>,
}

/// Non-owning widget reference, held by render bindings
#[derive(Clone)]
pub struct WeakWidget {
    inner: Weak<WidgetInner>,
}

impl WeakWidget {
    pub fn upgrade(&self) -> Option<Widget> {
        self.inner.upgrade().map(|inner| Widget { inner })
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Held for the duration of a mutation pass
struct PassGuard<'a> {
    _gate: MutexGuard<'a, ()>,
    owner: &'a Mutex<Option<ThreadId>>,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        *lock(self.owner) = None;
    }
}

impl Widget {
    pub(crate) fn from_kind(name: impl Into<String>, kind: WidgetKind) -> Self {
        let id = WidgetId::next();
        let name = name.into();
        tracing::trace!("created {} {} {:?}", kind.kind(), id, name);
        Self {
            inner: Arc::new(WidgetInner {
                id,
                state: Mutex::new(WidgetState {
                    name,
                    disabled: false,
                    kind,
                    client_callbacks: BTreeMap::new(),
                }),
                registry: Mutex::new(CallbackRegistry::new()),
                gate: Mutex::new(()),
                owner: Mutex::new(None),
            }),
        }
    }

    pub fn id(&self) -> WidgetId {
        self.inner.id
    }

    pub fn kind(&self) -> WidgetKindTag {
        lock(&self.inner.state).kind.kind()
    }

    pub fn name(&self) -> String {
        lock(&self.inner.state).name.clone()
    }

    pub fn disabled(&self) -> bool {
        lock(&self.inner.state).disabled
    }

    pub fn downgrade(&self) -> WeakWidget {
        WeakWidget {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Read the state under its lock
    pub fn with_state<R>(&self, f: impl FnOnce(&WidgetState) -> R) -> R {
        f(&lock(&self.inner.state))
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        let state = lock(&self.inner.state);
        let mut snapshot = WidgetSnapshot {
            id: self.inner.id,
            kind: state.kind.kind(),
            name: state.name.clone(),
            disabled: state.disabled,
            value: None,
            clicks: None,
            clicked: None,
            items: Vec::new(),
            icon: None,
            active_icon: None,
            client_callbacks: state.client_callbacks.clone(),
        };
        match &state.kind {
            WidgetKind::Button(m) => {
                snapshot.value = Some(false);
                snapshot.clicks = Some(m.clicks());
            }
            WidgetKind::IconButton(m) => {
                snapshot.value = Some(false);
                snapshot.clicks = Some(m.clicks());
                snapshot.icon = Some(m.icon().to_string());
                snapshot.active_icon = m.active_icon().map(str::to_string);
            }
            WidgetKind::Toggle(m) => snapshot.value = Some(m.value()),
            WidgetKind::MenuButton(m) => {
                snapshot.clicked = m.clicked().map(str::to_string);
                snapshot.items = m.items().to_vec();
            }
        }
        snapshot
    }

    // =========================================================================
    // OBSERVERS
    // =========================================================================

    /// Watch `signal` with an infallible observer
    pub fn subscribe<F>(&self, signal: Signal, observer: F) -> Result<Subscription>
    where
        F: Fn(&Change) + Send + Sync + 'static,
    {
        self.try_subscribe(signal, move |change| {
            observer(change);
            Ok(())
        })
    }

    /// Watch `signal` with an observer that may fail
    ///
    /// A failing observer does not stop later observers; see
    /// [`WidgetError::Observer`].
    pub fn try_subscribe<F>(&self, signal: Signal, observer: F) -> Result<Subscription>
    where
        F: Fn(&Change) -> ObserverResult + Send + Sync + 'static,
    {
        self.subscribe_observer(signal, Arc::new(observer))
    }

    /// Register an already type-erased observer
    pub fn subscribe_observer(&self, signal: Signal, observer: Observer) -> Result<Subscription> {
        let kind = self.kind();
        if !kind.supports(signal) {
            return Err(WidgetError::UnsupportedSignal { kind, signal });
        }
        Ok(self.register(signal, observer))
    }

    pub(crate) fn register(&self, signal: Signal, observer: Observer) -> Subscription {
        let id = lock(&self.inner.registry).subscribe(signal, observer);
        Subscription::new(self.inner.id, signal, id)
    }

    /// Remove a registration; a no-op if it is already gone
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        if subscription.widget() != self.inner.id {
            return false;
        }
        lock(&self.inner.registry).unsubscribe(subscription.id())
    }

    pub fn observer_count(&self, signal: Signal) -> usize {
        lock(&self.inner.registry).count(signal)
    }

    /// Register a click observer; registrations stack
    pub fn on_click<F>(&self, observer: F) -> Result<Subscription>
    where
        F: Fn(&Change) + Send + Sync + 'static,
    {
        self.subscribe(Signal::Click, observer)
    }

    /// Attach client-side callback code to `signal`
    ///
    /// The code is carried to rendered controls keyed by the front-end event
    /// the signal maps to (for example `clicks` → `button_click`).
    pub fn js_callback(&self, signal: Signal, code: impl Into<String>) -> Result<()> {
        let mut state = lock(&self.inner.state);
        let kind = state.kind.kind();
        if !kind.supports(signal) {
            return Err(WidgetError::UnsupportedSignal { kind, signal });
        }
        let event = signal.frontend_event(kind).ok_or_else(|| {
            WidgetError::Validation(format!(
                "`{signal}` on {kind} widgets has no front-end event to attach code to"
            ))
        })?;
        state
            .client_callbacks
            .entry(event.to_string())
            .or_default()
            .push(code.into());
        Ok(())
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Validate a raw transport record and dispatch it
    pub fn process_event(&self, raw: RawEvent) -> Result<Outcome> {
        let event = Event::try_from(raw)?;
        self.dispatch(&event)
    }

    /// Apply a front-end event
    ///
    /// Events reaching a disabled widget are dropped without mutation. An
    /// event kind the variant never accepts is reported even when disabled.
    pub fn dispatch(&self, event: &Event) -> Result<Outcome> {
        let id = self.inner.id;
        self.mutate(|state| {
            if !state.kind.accepts(event.kind()) {
                return Err(WidgetError::unexpected_event(state.kind.kind(), event.kind()));
            }
            if state.disabled {
                tracing::debug!(
                    "{} disabled, dropping {} from {}",
                    id,
                    event.kind(),
                    event.source()
                );
                return Ok(None);
            }
            let delta = state.kind.dispatch(id, event)?;
            tracing::debug!(
                "{} applied {} from {} ({} change(s))",
                id,
                event.kind(),
                event.source(),
                delta.len()
            );
            Ok(Some(delta))
        })
    }

    /// Apply a front-end property edit (e.g. a toggle's `active`)
    pub fn sync_property(&self, change: &PropertyChange) -> Result<Outcome> {
        let id = self.inner.id;
        self.mutate(|state| {
            if !state.kind.mirrors(change) {
                return Err(WidgetError::unmirrored_property(state.kind.kind(), change));
            }
            if state.disabled {
                tracing::debug!("{} disabled, ignoring front-end `{}`", id, change.attribute());
                return Ok(None);
            }
            state.kind.sync_property(id, change).map(Some)
        })
    }

    // =========================================================================
    // BASE ATTRIBUTES
    // =========================================================================

    pub fn set_name(&self, name: impl Into<String>) -> Result<Outcome> {
        let id = self.inner.id;
        let name = name.into();
        self.mutate(move |state| {
            if state.name == name {
                return Ok(Some(StateDelta::new()));
            }
            let old = std::mem::replace(&mut state.name, name.clone());
            Ok(Some(StateDelta::new().with(Change::new(
                id,
                Signal::Name,
                SignalValue::Text(old),
                SignalValue::Text(name),
            ))))
        })
    }

    pub fn set_disabled(&self, disabled: bool) -> Result<Outcome> {
        let id = self.inner.id;
        self.mutate(move |state| {
            if state.disabled == disabled {
                return Ok(Some(StateDelta::new()));
            }
            state.disabled = disabled;
            Ok(Some(
                StateDelta::new().with(Change::new(id, Signal::Disabled, !disabled, disabled)),
            ))
        })
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    /// Set initial state before the widget is shared; fires no notifications
    pub(crate) fn init(&self, f: impl FnOnce(&mut WidgetState)) {
        f(&mut lock(&self.inner.state));
    }

    /// Run one mutation pass
    ///
    /// `f` returns `Ok(None)` when the input is dropped.
    pub(crate) fn mutate<F>(&self, f: F) -> Result<Outcome>
    where
        F: FnOnce(&mut WidgetState) -> Result<Option<StateDelta>>,
    {
        let _pass = self.begin_pass()?;

        let delta = {
            let mut state = lock(&self.inner.state);
            f(&mut state)?
        };
        let Some(delta) = delta else {
            return Ok(Outcome::Dropped);
        };

        self.notify_delta(&delta)?;
        Ok(Outcome::Applied(delta))
    }

    /// Mutate the variant model in place
    pub(crate) fn mutate_kind<F>(&self, f: F) -> Result<Outcome>
    where
        F: FnOnce(WidgetId, &mut WidgetKind) -> Result<StateDelta>,
    {
        let id = self.inner.id;
        self.mutate(move |state| f(id, &mut state.kind).map(Some))
    }

    fn begin_pass(&self) -> Result<PassGuard<'_>> {
        let current = thread::current().id();
        if *lock(&self.inner.owner) == Some(current) {
            return Err(WidgetError::Reentrancy(self.inner.id.to_string()));
        }

        let gate = lock(&self.inner.gate);
        *lock(&self.inner.owner) = Some(current);
        Ok(PassGuard {
            _gate: gate,
            owner: &self.inner.owner,
        })
    }

    fn notify_delta(&self, delta: &StateDelta) -> Result<()> {
        let mut failures = Vec::new();
        for change in delta.changes() {
            let observers = lock(&self.inner.registry).snapshot(change.signal);
            failures.extend(run_observers(&observers, change));
        }
        WidgetError::from_failures(failures)
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("Widget")
            .field("id", &self.inner.id)
            .field("name", &state.name)
            .field("disabled", &state.disabled)
            .field("kind", &state.kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ControlId;

    #[test]
    fn test_unsupported_signal_rejected() {
        let toggle = Toggle::new("Toggle", false);
        let err = toggle.on_click(|_| {}).unwrap_err();
        assert!(matches!(
            err,
            WidgetError::UnsupportedSignal {
                kind: WidgetKindTag::Toggle,
                signal: Signal::Click
            }
        ));
    }

    #[test]
    fn test_unsubscribe_foreign_handle_is_noop() {
        let a = Button::new("a");
        let b = Button::new("b");
        let sub = a.subscribe(Signal::Clicks, |_| {}).unwrap();
        assert!(!b.unsubscribe(&sub));
        assert!(a.unsubscribe(&sub));
        assert!(!a.unsubscribe(&sub));
    }

    #[test]
    fn test_reentrant_dispatch_fails_fast() {
        let button = Button::new("Button");
        let inner = button.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        button
            .on_click(move |_| {
                let result = inner.dispatch(&Event::click(ControlId::SYNTHETIC));
                seen_clone
                    .lock()
                    .unwrap()
                    .push(matches!(result, Err(WidgetError::Reentrancy(_))));
            })
            .unwrap();

        button.click().unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![true]);
        assert_eq!(button.clicks(), 1);
    }

    #[test]
    fn test_observers_may_read_during_notification() {
        let button = Button::new("Button");
        let reader = button.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        button
            .subscribe(Signal::Clicks, move |_| {
                seen_clone.lock().unwrap().push(reader.clicks());
            })
            .unwrap();

        button.click().unwrap();
        button.click().unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_observer_failure_keeps_committed_state() {
        let button = Button::new("Button");
        button
            .try_subscribe(Signal::Clicks, |_| Err("observer failed".into()))
            .unwrap();

        let err = button.click().unwrap_err();
        assert!(!err.is_atomic_failure());
        assert_eq!(button.clicks(), 1);
    }

    #[test]
    fn test_set_disabled_notifies_once() {
        let button = Button::new("Button");
        let changes = Arc::new(Mutex::new(Vec::new()));
        let changes_clone = changes.clone();
        button
            .subscribe(Signal::Disabled, move |c| {
                changes_clone.lock().unwrap().push(c.new.as_bool());
            })
            .unwrap();

        button.set_disabled(true).unwrap();
        button.set_disabled(true).unwrap();
        assert_eq!(*changes.lock().unwrap(), vec![Some(true)]);
        assert!(button.disabled());
    }

    #[test]
    fn test_disabled_widget_still_rejects_foreign_events() {
        let button = Button::new("Button").with_disabled(true);
        let err = button
            .dispatch(&Event::menu_item(ControlId::SYNTHETIC, "help"))
            .unwrap_err();
        assert!(matches!(err, WidgetError::MalformedEvent(_)));

        let err = button
            .sync_property(&PropertyChange::Active(true))
            .unwrap_err();
        assert!(matches!(err, WidgetError::MalformedEvent(_)));

        // matching input is still dropped
        let outcome = button.dispatch(&Event::click(ControlId::SYNTHETIC)).unwrap();
        assert!(outcome.is_dropped());
        assert_eq!(button.clicks(), 0);
    }

    #[test]
    fn test_set_name_notifies_old_and_new() {
        let button = Button::new("Before");
        let changes = Arc::new(Mutex::new(Vec::new()));
        let changes_clone = changes.clone();
        button
            .subscribe(Signal::Name, move |c| {
                changes_clone.lock().unwrap().push(c.clone());
            })
            .unwrap();

        button.set_name("After").unwrap();
        let changes = changes.lock().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].old.as_text(), Some("Before"));
        assert_eq!(changes[0].new.as_text(), Some("After"));
        assert_eq!(button.name(), "After");
    }

    #[test]
    fn test_js_callback_keyed_by_frontend_event() {
        let button = Button::new("Button");
        button
            .js_callback(Signal::Clicks, "console.log(\"Clicked!\")")
            .unwrap();

        let snapshot = button.snapshot();
        assert_eq!(snapshot.client_callbacks.len(), 1);
        let callbacks = &snapshot.client_callbacks["button_click"];
        assert_eq!(callbacks.len(), 1);
        assert!(callbacks[0].contains("Clicked!"));

        assert!(matches!(
            button.js_callback(Signal::Name, "noop()"),
            Err(WidgetError::Validation(_))
        ));
    }

    #[test]
    fn test_shared_model_serializes_cross_thread_clicks() {
        let button = Button::new("Shared");
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let button = button.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        button.click().unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(button.clicks(), 100);
    }

    #[test]
    fn test_weak_handle_does_not_keep_model_alive() {
        let button = Button::new("Button");
        let weak = button.downgrade();
        assert!(weak.upgrade().is_some());
        drop(button);
        assert!(weak.upgrade().is_none());
    }
}
