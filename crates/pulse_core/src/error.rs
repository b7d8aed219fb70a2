//! Widget error types

use thiserror::Error;

use crate::event::{EventKind, PropertyChange};
use crate::signal::{Signal, WidgetKindTag};

/// Boxed error returned by a fallible observer
pub type BoxedObserverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A single observer failure collected during a notify pass
#[derive(Debug)]
pub struct ObserverFailure {
    /// Signal whose notification failed
    pub signal: Signal,
    /// Position of the failing observer in registration order
    pub position: usize,
    /// The error the observer returned
    pub error: BoxedObserverError,
}

/// Errors produced by widget models and the dispatch engine
#[derive(Error, Debug)]
pub enum WidgetError {
    /// Structurally invalid event (kind/item mismatch or wrong widget variant)
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// Semantically invalid reference, e.g. an unknown menu item id
    #[error("Validation failed: {0}")]
    Validation(String),

    /// One or more observers failed after state was committed
    #[error("{} observer(s) failed during notification", .failures.len())]
    Observer { failures: Vec<ObserverFailure> },

    /// A mutation was attempted from inside one of the widget's own observers
    #[error("Re-entrant mutation of widget {0} while a dispatch is in progress")]
    Reentrancy(String),

    /// The widget variant does not expose the requested signal
    #[error("{kind} widgets do not expose the `{signal}` signal")]
    UnsupportedSignal { kind: WidgetKindTag, signal: Signal },
}

impl WidgetError {
    /// Turn collected observer failures into a result
    pub fn from_failures(failures: Vec<ObserverFailure>) -> Result<()> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(WidgetError::Observer { failures })
        }
    }

    pub(crate) fn unexpected_event(kind: WidgetKindTag, event: EventKind) -> Self {
        WidgetError::MalformedEvent(format!("{kind} widgets do not accept {event} events"))
    }

    pub(crate) fn unmirrored_property(kind: WidgetKindTag, change: &PropertyChange) -> Self {
        WidgetError::MalformedEvent(format!(
            "{kind} widgets do not mirror the `{}` attribute",
            change.attribute()
        ))
    }

    /// Whether the error was raised before any state was mutated
    pub fn is_atomic_failure(&self) -> bool {
        !matches!(self, WidgetError::Observer { .. })
    }
}

/// Result type for widget operations
pub type Result<T> = std::result::Result<T, WidgetError>;
