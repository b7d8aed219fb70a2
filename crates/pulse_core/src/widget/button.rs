//! Button and IconButton models
//!
//! A click increments `clicks` and pulses `value`: observers of `value` see a
//! single `false → true` change, while the stored value reads `false` before
//! and after every dispatch.

use std::ops::Deref;
use std::sync::Arc;

use crate::dispatch::{Dispatch, Outcome, StateDelta};
use crate::error::{Result, WidgetError};
use crate::event::{ControlId, Event, EventKind};
use crate::registry::{Observer, ObserverResult};
use crate::signal::{Change, Signal, SignalValue, WidgetId, WidgetKindTag};

use super::{Widget, WidgetKind};

/// Click counter state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ButtonModel {
    clicks: u64,
}

impl ButtonModel {
    pub fn clicks(&self) -> u64 {
        self.clicks
    }

    fn click(&mut self, widget: WidgetId) -> StateDelta {
        let old = self.clicks;
        self.clicks += 1;
        StateDelta::new()
            .with(pulse(widget))
            .with(Change::new(widget, Signal::Clicks, old, self.clicks))
            .with(Change::new(widget, Signal::Click, old, self.clicks))
    }
}

fn pulse(widget: WidgetId) -> Change {
    Change::new(widget, Signal::Value, false, true)
}

impl Dispatch for ButtonModel {
    fn kind(&self) -> WidgetKindTag {
        WidgetKindTag::Button
    }

    fn accepts(&self, event: EventKind) -> bool {
        event == EventKind::PlainClick
    }

    fn dispatch(&mut self, widget: WidgetId, event: &Event) -> Result<StateDelta> {
        match event.kind() {
            EventKind::PlainClick => Ok(self.click(widget)),
            other => Err(WidgetError::unexpected_event(self.kind(), other)),
        }
    }
}

/// Button contract plus icon styling
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconButtonModel {
    button: ButtonModel,
    icon: String,
    active_icon: Option<String>,
}

impl IconButtonModel {
    pub fn new(icon: impl Into<String>) -> Self {
        Self {
            button: ButtonModel::default(),
            icon: icon.into(),
            active_icon: None,
        }
    }

    pub fn clicks(&self) -> u64 {
        self.button.clicks()
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    /// Icon shown while the button is being pressed
    pub fn active_icon(&self) -> Option<&str> {
        self.active_icon.as_deref()
    }
}

impl Dispatch for IconButtonModel {
    fn kind(&self) -> WidgetKindTag {
        WidgetKindTag::IconButton
    }

    fn accepts(&self, event: EventKind) -> bool {
        event == EventKind::PlainClick
    }

    fn dispatch(&mut self, widget: WidgetId, event: &Event) -> Result<StateDelta> {
        match event.kind() {
            EventKind::PlainClick => Ok(self.button.click(widget)),
            other => Err(WidgetError::unexpected_event(self.kind(), other)),
        }
    }
}

pub(super) fn wrap<F>(observer: F) -> Observer
where
    F: Fn(&Change) + Send + Sync + 'static,
{
    Arc::new(move |change: &Change| -> ObserverResult {
        observer(change);
        Ok(())
    })
}

/// Pulse `value` without touching the counter
fn set_button_value(widget: &Widget, value: bool) -> Result<Outcome> {
    widget.mutate_kind(move |id, _kind| {
        if value {
            Ok(StateDelta::new().with(pulse(id)))
        } else {
            Ok(StateDelta::new())
        }
    })
}

// =============================================================================
// BUTTON
// =============================================================================

/// Push button
///
/// ```ignore
/// let button = Button::new("Save").with_on_click(|_| println!("saved"));
/// button.click()?;
/// assert_eq!(button.clicks(), 1);
/// assert!(!button.value());
/// ```
#[derive(Clone, Debug)]
pub struct Button(Widget);

impl Button {
    pub fn new(name: impl Into<String>) -> Self {
        Button(Widget::from_kind(
            name,
            WidgetKind::Button(ButtonModel::default()),
        ))
    }

    pub fn with_disabled(self, disabled: bool) -> Self {
        self.0.init(|state| state.disabled = disabled);
        self
    }

    /// Construction-time click observer; may be called repeatedly
    pub fn with_on_click<F>(self, observer: F) -> Self
    where
        F: Fn(&Change) + Send + Sync + 'static,
    {
        self.0.register(Signal::Click, wrap(observer));
        self
    }

    /// Number of accepted clicks
    pub fn clicks(&self) -> u64 {
        self.0.with_state(|state| match &state.kind {
            WidgetKind::Button(m) => m.clicks(),
            _ => unreachable!("Button view over a non-button widget"),
        })
    }

    /// Always `false` between dispatches
    pub fn value(&self) -> bool {
        false
    }

    /// Writing `true` pulses `value` observers without counting a click
    pub fn set_value(&self, value: bool) -> Result<Outcome> {
        set_button_value(&self.0, value)
    }

    /// Inject a synthetic plain click and dispatch it synchronously
    pub fn click(&self) -> Result<Outcome> {
        self.0.dispatch(&Event::click(ControlId::SYNTHETIC))
    }

    pub fn widget(&self) -> &Widget {
        &self.0
    }
}

impl Deref for Button {
    type Target = Widget;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Button> for Widget {
    fn from(button: Button) -> Self {
        button.0
    }
}

// =============================================================================
// ICON BUTTON
// =============================================================================

/// Button rendered as an icon
#[derive(Clone, Debug)]
pub struct IconButton(Widget);

impl IconButton {
    pub fn new(icon: impl Into<String>) -> Self {
        IconButton(Widget::from_kind(
            String::new(),
            WidgetKind::IconButton(IconButtonModel::new(icon)),
        ))
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.0.init(|state| state.name = name);
        self
    }

    pub fn with_active_icon(self, icon: impl Into<String>) -> Self {
        let icon = icon.into();
        self.0.init(|state| {
            if let WidgetKind::IconButton(m) = &mut state.kind {
                m.active_icon = Some(icon);
            }
        });
        self
    }

    pub fn with_disabled(self, disabled: bool) -> Self {
        self.0.init(|state| state.disabled = disabled);
        self
    }

    pub fn with_on_click<F>(self, observer: F) -> Self
    where
        F: Fn(&Change) + Send + Sync + 'static,
    {
        self.0.register(Signal::Click, wrap(observer));
        self
    }

    fn model<R>(&self, f: impl FnOnce(&IconButtonModel) -> R) -> R {
        self.0.with_state(|state| match &state.kind {
            WidgetKind::IconButton(m) => f(m),
            _ => unreachable!("IconButton view over a non-icon widget"),
        })
    }

    pub fn clicks(&self) -> u64 {
        self.model(|m| m.clicks())
    }

    pub fn icon(&self) -> String {
        self.model(|m| m.icon().to_string())
    }

    pub fn active_icon(&self) -> Option<String> {
        self.model(|m| m.active_icon().map(str::to_string))
    }

    pub fn value(&self) -> bool {
        false
    }

    pub fn set_value(&self, value: bool) -> Result<Outcome> {
        set_button_value(&self.0, value)
    }

    pub fn set_icon(&self, icon: impl Into<String>) -> Result<Outcome> {
        let icon = icon.into();
        self.0.mutate_kind(move |id, kind| {
            let WidgetKind::IconButton(m) = kind else {
                unreachable!("IconButton view over a non-icon widget")
            };
            if m.icon == icon {
                return Ok(StateDelta::new());
            }
            let old = std::mem::replace(&mut m.icon, icon.clone());
            Ok(StateDelta::new().with(Change::new(
                id,
                Signal::Icon,
                SignalValue::Text(old),
                SignalValue::Text(icon),
            )))
        })
    }

    pub fn click(&self) -> Result<Outcome> {
        self.0.dispatch(&Event::click(ControlId::SYNTHETIC))
    }

    pub fn widget(&self) -> &Widget {
        &self.0
    }
}

impl Deref for IconButton {
    type Target = Widget;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<IconButton> for Widget {
    fn from(button: IconButton) -> Self {
        button.0
    }
}

impl Widget {
    pub fn as_button(&self) -> Option<Button> {
        (self.kind() == WidgetKindTag::Button).then(|| Button(self.clone()))
    }

    pub fn as_icon_button(&self) -> Option<IconButton> {
        (self.kind() == WidgetKindTag::IconButton).then(|| IconButton(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::event::RawEvent;

    #[test]
    fn test_button_click_counts() {
        let button = Button::new("Button");
        button
            .process_event(RawEvent {
                kind: EventKind::PlainClick,
                source: ControlId::from_raw(1),
                item: None,
            })
            .unwrap();
        assert_eq!(button.clicks(), 1);
        assert!(!button.value());
    }

    #[test]
    fn test_n_clicks_leave_value_false() {
        let button = Button::new("Button");
        for n in 1..=10u64 {
            button.click().unwrap();
            assert_eq!(button.clicks(), n);
            assert!(!button.value());
            assert_eq!(button.snapshot().value, Some(false));
        }
    }

    #[test]
    fn test_value_watcher_sees_single_pulse() {
        let button = Button::new("Button");
        button.click().unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        button
            .subscribe(Signal::Value, move |c| {
                events_clone.lock().unwrap().push(c.new.as_bool());
            })
            .unwrap();

        assert!(!button.value());
        button.click().unwrap();
        assert_eq!(*events.lock().unwrap(), vec![Some(true)]);
        assert!(!button.value());
        assert_eq!(button.clicks(), 2);
    }

    #[test]
    fn test_click_notification_order() {
        let button = Button::new("Button");
        let log = Arc::new(Mutex::new(Vec::new()));
        for signal in [Signal::Click, Signal::Value, Signal::Clicks] {
            let log = log.clone();
            button
                .subscribe(signal, move |c| log.lock().unwrap().push(c.clone()))
                .unwrap();
        }

        let outcome = button.click().unwrap();
        let log = log.lock().unwrap();
        let order: Vec<_> = log.iter().map(|c| c.signal).collect();
        assert_eq!(order, vec![Signal::Value, Signal::Clicks, Signal::Click]);
        assert_eq!(log[0].new, SignalValue::Bool(true));
        assert_eq!(log[1].old, SignalValue::Count(0));
        assert_eq!(log[1].new, SignalValue::Count(1));
        assert_eq!(outcome.delta().map(|d| d.len()), Some(3));
    }

    #[test]
    fn test_on_click_registrations_stack_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = log.clone();
        let second = log.clone();
        let button = Button::new("Button")
            .with_on_click(move |_| first.lock().unwrap().push("first"));
        button
            .on_click(move |_| second.lock().unwrap().push("second"))
            .unwrap();

        button.click().unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_disabled_button_drops_clicks() {
        let button = Button::new("Button").with_disabled(true);
        let fired = Arc::new(Mutex::new(0));
        let fired_clone = fired.clone();
        button
            .on_click(move |_| *fired_clone.lock().unwrap() += 1)
            .unwrap();

        let outcome = button.click().unwrap();
        assert!(outcome.is_dropped());
        assert_eq!(button.clicks(), 0);
        assert_eq!(*fired.lock().unwrap(), 0);
    }

    #[test]
    fn test_button_rejects_menu_events() {
        let button = Button::new("Button");
        let err = button
            .dispatch(&Event::menu_item(ControlId::from_raw(1), "a"))
            .unwrap_err();
        assert!(matches!(err, WidgetError::MalformedEvent(_)));
        assert_eq!(button.clicks(), 0);
    }

    #[test]
    fn test_programmatic_value_pulse() {
        let button = Button::new("Button");
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        button
            .subscribe(Signal::Value, move |c| {
                events_clone.lock().unwrap().push(c.new.as_bool());
            })
            .unwrap();

        button.set_value(true).unwrap();
        button.set_value(false).unwrap();
        assert_eq!(*events.lock().unwrap(), vec![Some(true)]);
        assert_eq!(button.clicks(), 0);
        assert!(!button.value());
    }

    #[test]
    fn test_icon_button_on_click() {
        let events = Arc::new(Mutex::new(0));
        let events_clone = events.clone();
        let button = IconButton::new("heart")
            .with_on_click(move |_| *events_clone.lock().unwrap() += 1);

        button.click().unwrap();
        assert_eq!(*events.lock().unwrap(), 1);
        assert_eq!(button.clicks(), 1);
        assert_eq!(button.icon(), "heart");
        assert_eq!(button.name(), "");
    }

    #[test]
    fn test_icon_button_set_icon() {
        let button = IconButton::new("heart").with_active_icon("heart-filled");
        let changes = Arc::new(Mutex::new(Vec::new()));
        let changes_clone = changes.clone();
        button
            .subscribe(Signal::Icon, move |c| {
                changes_clone
                    .lock()
                    .unwrap()
                    .push(c.new.as_text().map(str::to_string));
            })
            .unwrap();

        button.set_icon("star").unwrap();
        button.set_icon("star").unwrap();
        assert_eq!(*changes.lock().unwrap(), vec![Some("star".to_string())]);
        assert_eq!(button.active_icon().as_deref(), Some("heart-filled"));
    }

    #[test]
    fn test_widget_downcasts() {
        let widget: Widget = Button::new("Button").into();
        assert!(widget.as_button().is_some());
        assert!(widget.as_icon_button().is_none());
    }
}
