//! Rendered controls
//!
//! A [`Control`] is the live front-end counterpart of a widget model inside
//! one session. It holds the attributes the front-end displays and an outbox
//! into the session's inbound queue. Front-end interactions (`press`,
//! `select`, `set_active`) are sent through the outbox; model-side changes
//! arrive through [`Control::reflect`].

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use pulse_core::{ControlId, EventKind, MenuItem, PropertyChange, RawEvent, WidgetId, WidgetKindTag};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::{Result, SessionError};

/// Front-end control model a widget renders to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    Button,
    Toggle,
    Dropdown,
    ButtonIcon,
}

impl From<WidgetKindTag> for ControlKind {
    fn from(kind: WidgetKindTag) -> Self {
        match kind {
            WidgetKindTag::Button => ControlKind::Button,
            WidgetKindTag::Toggle => ControlKind::Toggle,
            WidgetKindTag::MenuButton => ControlKind::Dropdown,
            WidgetKindTag::IconButton => ControlKind::ButtonIcon,
        }
    }
}

/// Displayed attributes of a control
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ControlProps {
    pub label: String,
    pub disabled: bool,
    /// Toggle only
    pub active: Option<bool>,
    /// Dropdown only
    pub menu: Vec<MenuItem>,
    /// ButtonIcon only
    pub icon: Option<String>,
    pub active_icon: Option<String>,
    /// Client-side callback code keyed by front-end event name
    pub js_event_callbacks: BTreeMap<String, Vec<String>>,
}

/// Model-side attribute write pushed into a live control
#[derive(Clone, Debug, PartialEq)]
pub enum Attribute {
    Label(String),
    Disabled(bool),
    Active(bool),
    Menu(Vec<MenuItem>),
    Icon(String),
}

impl Attribute {
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Label(_) => "label",
            Attribute::Disabled(_) => "disabled",
            Attribute::Active(_) => "active",
            Attribute::Menu(_) => "menu",
            Attribute::Icon(_) => "icon",
        }
    }
}

/// Message travelling from a control to its session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    /// A click or menu selection
    Event(RawEvent),
    /// A front-end edit of a mirrored attribute
    Property {
        source: ControlId,
        change: PropertyChange,
    },
}

impl Inbound {
    pub fn source(&self) -> ControlId {
        match self {
            Inbound::Event(raw) => raw.source,
            Inbound::Property { source, .. } => *source,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Live control bound to one session
#[derive(Debug)]
pub struct Control {
    id: ControlId,
    kind: ControlKind,
    widget: WidgetId,
    props: Mutex<ControlProps>,
    outbox: UnboundedSender<Inbound>,
}

impl Control {
    pub(crate) fn new(
        kind: ControlKind,
        widget: WidgetId,
        props: ControlProps,
        outbox: UnboundedSender<Inbound>,
    ) -> Self {
        Self {
            id: ControlId::next(),
            kind,
            widget,
            props: Mutex::new(props),
            outbox,
        }
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    /// Model this control renders
    pub fn widget_id(&self) -> WidgetId {
        self.widget
    }

    // =========================================================================
    // DISPLAYED ATTRIBUTES
    // =========================================================================

    pub fn props(&self) -> ControlProps {
        lock(&self.props).clone()
    }

    pub fn label(&self) -> String {
        lock(&self.props).label.clone()
    }

    pub fn disabled(&self) -> bool {
        lock(&self.props).disabled
    }

    pub fn active(&self) -> Option<bool> {
        lock(&self.props).active
    }

    pub fn menu(&self) -> Vec<MenuItem> {
        lock(&self.props).menu.clone()
    }

    pub fn icon(&self) -> Option<String> {
        lock(&self.props).icon.clone()
    }

    pub fn js_event_callbacks(&self) -> BTreeMap<String, Vec<String>> {
        lock(&self.props).js_event_callbacks.clone()
    }

    // =========================================================================
    // MODEL -> FRONT-END
    // =========================================================================

    /// Push a model-side change into the control
    pub fn reflect(&self, attribute: Attribute) {
        tracing::trace!("{} reflect `{}`", self.id, attribute.name());
        let mut props = lock(&self.props);
        match attribute {
            Attribute::Label(label) => props.label = label,
            Attribute::Disabled(disabled) => props.disabled = disabled,
            Attribute::Active(active) => props.active = Some(active),
            Attribute::Menu(menu) => props.menu = menu,
            Attribute::Icon(icon) => props.icon = Some(icon),
        }
    }

    pub(crate) fn replace_props(&self, props: ControlProps) {
        *lock(&self.props) = props;
    }

    // =========================================================================
    // FRONT-END -> MODEL
    // =========================================================================

    /// Click the control
    pub fn press(&self) -> Result<()> {
        self.send(Inbound::Event(RawEvent {
            kind: EventKind::PlainClick,
            source: self.id,
            item: None,
        }))
    }

    /// Pick a dropdown entry
    pub fn select(&self, item: impl Into<String>) -> Result<()> {
        self.send(Inbound::Event(RawEvent {
            kind: EventKind::MenuItemClick,
            source: self.id,
            item: Some(item.into()),
        }))
    }

    /// Flip the displayed `active` flag, as a user would, and forward it
    pub fn set_active(&self, active: bool) -> Result<()> {
        lock(&self.props).active = Some(active);
        self.send(Inbound::Property {
            source: self.id,
            change: PropertyChange::Active(active),
        })
    }

    /// Forward an arbitrary record, bypassing the typed helpers
    pub fn send(&self, inbound: Inbound) -> Result<()> {
        self.outbox
            .send(inbound)
            .map_err(|_| SessionError::Closed(self.id))
    }
}
