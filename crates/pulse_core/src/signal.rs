//! Observable signals and change records
//!
//! Every widget variant exposes a closed set of [`Signal`]s. Observers subscribe
//! to a signal and receive a [`Change`] carrying the old and new value each time
//! it fires. The synthetic [`Signal::Click`] fires once per accepted click and
//! carries the old/new value of the attribute the click mutated (`clicks` for
//! buttons, `clicked` for menu buttons).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::widget::MenuItem;

/// Identifier of a widget model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

static NEXT_WIDGET_ID: AtomicU64 = AtomicU64::new(1);

impl WidgetId {
    pub(crate) fn next() -> Self {
        WidgetId(NEXT_WIDGET_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn to_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget#{}", self.0)
    }
}

/// Widget variant discriminant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKindTag {
    Button,
    Toggle,
    MenuButton,
    IconButton,
}

impl WidgetKindTag {
    /// Signals a widget of this kind exposes
    pub fn signals(&self) -> &'static [Signal] {
        use Signal::*;
        match self {
            WidgetKindTag::Button => &[Name, Disabled, Value, Clicks, Click],
            WidgetKindTag::IconButton => &[Name, Disabled, Value, Clicks, Icon, Click],
            WidgetKindTag::Toggle => &[Name, Disabled, Value],
            WidgetKindTag::MenuButton => &[Name, Disabled, Clicked, Items, Click],
        }
    }

    pub fn supports(&self, signal: Signal) -> bool {
        self.signals().contains(&signal)
    }
}

impl fmt::Display for WidgetKindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WidgetKindTag::Button => "Button",
            WidgetKindTag::Toggle => "Toggle",
            WidgetKindTag::MenuButton => "MenuButton",
            WidgetKindTag::IconButton => "IconButton",
        })
    }
}

/// Observable widget signal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Name,
    Disabled,
    Value,
    Clicks,
    Clicked,
    Items,
    Icon,
    /// Fires once per accepted click or menu selection
    Click,
}

impl Signal {
    /// Front-end event name a client-side callback on this signal binds to
    pub fn frontend_event(&self, kind: WidgetKindTag) -> Option<&'static str> {
        match (self, kind) {
            (Signal::Clicks, _) => Some("button_click"),
            (Signal::Clicked, _) => Some("menu_item_click"),
            (Signal::Click, WidgetKindTag::MenuButton) => Some("menu_item_click"),
            (Signal::Click, _) => Some("button_click"),
            (Signal::Value, WidgetKindTag::Toggle) => Some("change:active"),
            _ => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Signal::Name => "name",
            Signal::Disabled => "disabled",
            Signal::Value => "value",
            Signal::Clicks => "clicks",
            Signal::Clicked => "clicked",
            Signal::Items => "items",
            Signal::Icon => "icon",
            Signal::Click => "click",
        })
    }
}

/// Typed value carried by a change record
#[derive(Clone, Debug, PartialEq)]
pub enum SignalValue {
    Bool(bool),
    Count(u64),
    Text(String),
    Item(Option<String>),
    Items(Vec<MenuItem>),
}

impl SignalValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SignalValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<u64> {
        match self {
            SignalValue::Count(n) => Some(*n),
            _ => None,
        }
    }

    /// Selected item id (for `clicked` changes)
    pub fn as_item(&self) -> Option<&str> {
        match self {
            SignalValue::Item(item) => item.as_deref(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SignalValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<bool> for SignalValue {
    fn from(value: bool) -> Self {
        SignalValue::Bool(value)
    }
}

impl From<u64> for SignalValue {
    fn from(value: u64) -> Self {
        SignalValue::Count(value)
    }
}

/// Record passed to observers when a signal fires
#[derive(Clone, Debug, PartialEq)]
pub struct Change {
    pub widget: WidgetId,
    pub signal: Signal,
    pub old: SignalValue,
    pub new: SignalValue,
}

impl Change {
    pub fn new(
        widget: WidgetId,
        signal: Signal,
        old: impl Into<SignalValue>,
        new: impl Into<SignalValue>,
    ) -> Self {
        Self {
            widget,
            signal,
            old: old.into(),
            new: new.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_sets_per_kind() {
        assert!(WidgetKindTag::Button.supports(Signal::Clicks));
        assert!(!WidgetKindTag::Button.supports(Signal::Clicked));
        assert!(WidgetKindTag::MenuButton.supports(Signal::Click));
        assert!(!WidgetKindTag::MenuButton.supports(Signal::Clicks));
        assert!(!WidgetKindTag::Toggle.supports(Signal::Click));
        assert!(WidgetKindTag::IconButton.supports(Signal::Icon));
    }

    #[test]
    fn test_frontend_event_names() {
        assert_eq!(
            Signal::Clicks.frontend_event(WidgetKindTag::Button),
            Some("button_click")
        );
        assert_eq!(
            Signal::Click.frontend_event(WidgetKindTag::MenuButton),
            Some("menu_item_click")
        );
        assert_eq!(
            Signal::Value.frontend_event(WidgetKindTag::Toggle),
            Some("change:active")
        );
        assert_eq!(Signal::Name.frontend_event(WidgetKindTag::Button), None);
    }

    #[test]
    fn test_signal_value_accessors() {
        assert_eq!(SignalValue::from(true).as_bool(), Some(true));
        assert_eq!(SignalValue::from(3u64).as_count(), Some(3));
        assert_eq!(SignalValue::Item(Some("b".into())).as_item(), Some("b"));
        assert_eq!(SignalValue::Item(None).as_item(), None);
        assert_eq!(SignalValue::Bool(true).as_count(), None);
    }
}
