//! Dispatch engine
//!
//! Each widget variant implements [`Dispatch`]. A dispatch call validates the
//! incoming event against the variant's state, mutates that state, and returns
//! the ordered [`StateDelta`] describing which notifications must fire. The
//! widget handle runs the notifications afterwards, outside of any state lock.
//!
//! Validation always happens before mutation, so an `Err` from `dispatch`
//! guarantees the state is untouched.

use smallvec::SmallVec;

use crate::error::{Result, WidgetError};
use crate::event::{Event, EventKind, PropertyChange};
use crate::signal::{Change, WidgetId, WidgetKindTag};

/// Ordered notifications produced by one accepted mutation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateDelta {
    changes: SmallVec<[Change; 3]>,
}

impl StateDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Builder-style push
    pub fn with(mut self, change: Change) -> Self {
        self.push(change);
        self
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// Result of handing an event or write to a widget
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// State was committed and these notifications fired
    Applied(StateDelta),
    /// The widget is disabled; nothing was mutated or notified
    Dropped,
}

impl Outcome {
    pub fn is_dropped(&self) -> bool {
        matches!(self, Outcome::Dropped)
    }

    pub fn delta(&self) -> Option<&StateDelta> {
        match self {
            Outcome::Applied(delta) => Some(delta),
            Outcome::Dropped => None,
        }
    }
}

/// Per-variant state machine
pub trait Dispatch {
    /// Variant discriminant
    fn kind(&self) -> WidgetKindTag;

    /// Whether the variant handles events of this kind at all
    fn accepts(&self, _event: EventKind) -> bool {
        false
    }

    /// Whether the variant mirrors this control attribute
    fn mirrors(&self, _change: &PropertyChange) -> bool {
        false
    }

    /// Apply a front-end event
    fn dispatch(&mut self, _widget: WidgetId, event: &Event) -> Result<StateDelta> {
        Err(WidgetError::unexpected_event(self.kind(), event.kind()))
    }

    /// Apply a front-end property edit
    fn sync_property(&mut self, _widget: WidgetId, change: &PropertyChange) -> Result<StateDelta> {
        Err(WidgetError::unmirrored_property(self.kind(), change))
    }
}
