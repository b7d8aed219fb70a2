//! Front-end events delivered to widget models
//!
//! An [`Event`] is what the transport hands to a widget after something
//! happened to one of its rendered controls. Events are immutable and can only
//! be built through validating constructors, so a value of type `Event` always
//! satisfies the kind/item invariant:
//!
//! - `PlainClick` never carries an item id
//! - `MenuItemClick` always carries one
//!
//! Transports that receive loosely-typed records (for example JSON from a
//! browser) deserialize a [`RawEvent`] and convert it with [`Event::try_from`],
//! which is where malformed input is rejected.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WidgetError};

/// Identifier of a rendered control instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlId(u64);

static NEXT_CONTROL_ID: AtomicU64 = AtomicU64::new(1);

impl ControlId {
    /// Source id used for events injected directly by application code
    pub const SYNTHETIC: ControlId = ControlId(0);

    /// Allocate a fresh, process-unique control id
    pub fn next() -> Self {
        ControlId(NEXT_CONTROL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap a raw id received from the transport
    pub fn from_raw(raw: u64) -> Self {
        ControlId(raw)
    }

    pub fn to_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control#{}", self.0)
    }
}

/// What happened to the control
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PlainClick,
    MenuItemClick,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::PlainClick => f.write_str("plain-click"),
            EventKind::MenuItemClick => f.write_str("menu-item-click"),
        }
    }
}

/// Unvalidated event record as received from the transport
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub kind: EventKind,
    pub source: ControlId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
}

/// A validated, immutable front-end event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    kind: EventKind,
    source: ControlId,
    item: Option<String>,
}

impl Event {
    /// A plain click on `source`
    pub fn click(source: ControlId) -> Self {
        Self {
            kind: EventKind::PlainClick,
            source,
            item: None,
        }
    }

    /// Selection of menu item `item` on `source`
    pub fn menu_item(source: ControlId, item: impl Into<String>) -> Self {
        Self {
            kind: EventKind::MenuItemClick,
            source,
            item: Some(item.into()),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn source(&self) -> ControlId {
        self.source
    }

    /// Selected item id, present iff this is a menu item click
    pub fn item(&self) -> Option<&str> {
        self.item.as_deref()
    }
}

impl TryFrom<RawEvent> for Event {
    type Error = WidgetError;

    fn try_from(raw: RawEvent) -> Result<Self> {
        match (raw.kind, raw.item) {
            (EventKind::PlainClick, None) => Ok(Event::click(raw.source)),
            (EventKind::MenuItemClick, Some(item)) => Ok(Event::menu_item(raw.source, item)),
            (EventKind::PlainClick, Some(item)) => Err(WidgetError::MalformedEvent(format!(
                "plain-click from {} carries item id {item:?}",
                raw.source
            ))),
            (EventKind::MenuItemClick, None) => Err(WidgetError::MalformedEvent(format!(
                "menu-item-click from {} has no item id",
                raw.source
            ))),
        }
    }
}

impl From<Event> for RawEvent {
    fn from(event: Event) -> Self {
        RawEvent {
            kind: event.kind,
            source: event.source,
            item: event.item,
        }
    }
}

/// A front-end property edit mirrored back into the model
///
/// Unlike [`Event`], a property change carries the new attribute value of the
/// rendered control itself (for example a toggle's `active` flag).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyChange {
    Active(bool),
}

impl PropertyChange {
    /// Name of the control attribute that changed
    pub fn attribute(&self) -> &'static str {
        match self {
            PropertyChange::Active(_) => "active",
        }
    }
}
