//! Session error types

use pulse_core::{ControlId, WidgetError};
use thiserror::Error;

/// Errors produced while delivering front-end input to widget models
#[derive(Error, Debug)]
pub enum SessionError {
    /// The record names a control this session never rendered (or unbound)
    #[error("Unknown control: {0}")]
    UnknownControl(ControlId),

    /// The session's inbound queue is gone
    #[error("Session closed, cannot deliver from {0}")]
    Closed(ControlId),

    /// The bound widget has been dropped by every owner
    #[error("Widget behind {0} no longer exists")]
    WidgetGone(ControlId),

    /// The model rejected the input or an observer failed
    #[error(transparent)]
    Widget(#[from] WidgetError),
}

impl SessionError {
    /// Borrow the model-side error, if this is one
    pub fn as_widget_error(&self) -> Option<&WidgetError> {
        match self {
            SessionError::Widget(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
