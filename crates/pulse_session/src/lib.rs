//! Pulse Session
//!
//! Render binding between widget models and their front-end controls:
//!
//! - **Controls**: in-memory mirrors of what a front-end displays
//! - **Rendering**: widget snapshot to control attributes
//! - **Reflection**: model changes pushed into every bound control
//! - **Sessions**: per-document inbound queue dispatched in arrival order
//!
//! # Example
//!
//! ```rust
//! use pulse_core::Toggle;
//! use pulse_session::Session;
//!
//! let toggle = Toggle::new("Toggle", true);
//! let mut session = Session::new();
//! let control = session.render(&toggle).unwrap();
//!
//! control.set_active(false).unwrap();
//! session.pump();
//! assert!(!toggle.value());
//!
//! toggle.set_value(true).unwrap();
//! assert_eq!(control.active(), Some(true));
//! ```

pub mod binding;
pub mod control;
pub mod error;
pub mod render;
pub mod session;

pub use binding::Binding;
pub use control::{Attribute, Control, ControlKind, ControlProps, Inbound};
pub use error::{Result, SessionError};
pub use render::{attribute_for, reflected_signals, render};
pub use session::{Delivery, EventSender, Session, SessionId};
