//! Toggle model
//!
//! `value` is persistent and mirrors the rendered control's `active` flag in
//! both directions: front-end edits arrive as [`PropertyChange::Active`], and
//! programmatic writes notify `value` observers, which is how render bindings
//! reflect the new state forward.

use std::ops::Deref;

use crate::dispatch::{Dispatch, Outcome, StateDelta};
use crate::error::Result;
use crate::event::PropertyChange;
use crate::signal::{Change, Signal, WidgetId, WidgetKindTag};

use super::{Widget, WidgetKind};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToggleModel {
    value: bool,
}

impl ToggleModel {
    pub fn new(value: bool) -> Self {
        Self { value }
    }

    pub fn value(&self) -> bool {
        self.value
    }

    fn set(&mut self, widget: WidgetId, value: bool) -> StateDelta {
        if self.value == value {
            return StateDelta::new();
        }
        let old = std::mem::replace(&mut self.value, value);
        StateDelta::new().with(Change::new(widget, Signal::Value, old, value))
    }
}

impl Dispatch for ToggleModel {
    fn kind(&self) -> WidgetKindTag {
        WidgetKindTag::Toggle
    }

    fn mirrors(&self, change: &PropertyChange) -> bool {
        matches!(change, PropertyChange::Active(_))
    }

    fn sync_property(&mut self, widget: WidgetId, change: &PropertyChange) -> Result<StateDelta> {
        match change {
            PropertyChange::Active(active) => Ok(self.set(widget, *active)),
        }
    }
}

/// Two-state toggle button
#[derive(Clone, Debug)]
pub struct Toggle(Widget);

impl Toggle {
    pub fn new(name: impl Into<String>, value: bool) -> Self {
        Toggle(Widget::from_kind(
            name,
            WidgetKind::Toggle(ToggleModel::new(value)),
        ))
    }

    pub fn with_disabled(self, disabled: bool) -> Self {
        self.0.init(|state| state.disabled = disabled);
        self
    }

    pub fn value(&self) -> bool {
        self.0.with_state(|state| match &state.kind {
            WidgetKind::Toggle(m) => m.value(),
            _ => unreachable!("Toggle view over a non-toggle widget"),
        })
    }

    /// Programmatic write; reflected into every bound control
    pub fn set_value(&self, value: bool) -> Result<Outcome> {
        self.0.mutate_kind(move |id, kind| {
            let WidgetKind::Toggle(m) = kind else {
                unreachable!("Toggle view over a non-toggle widget")
            };
            Ok(m.set(id, value))
        })
    }

    /// Apply a front-end `active` edit as if it arrived from a control
    pub fn sync_active(&self, active: bool) -> Result<Outcome> {
        self.0.sync_property(&PropertyChange::Active(active))
    }

    pub fn widget(&self) -> &Widget {
        &self.0
    }
}

impl Deref for Toggle {
    type Target = Widget;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Toggle> for Widget {
    fn from(toggle: Toggle) -> Self {
        toggle.0
    }
}

impl Widget {
    pub fn as_toggle(&self) -> Option<Toggle> {
        (self.kind() == WidgetKindTag::Toggle).then(|| Toggle(self.clone()))
    }
}
