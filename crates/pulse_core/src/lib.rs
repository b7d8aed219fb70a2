//! Pulse Core
//!
//! Authoritative widget models and the event-synchronization core:
//!
//! - **Events**: validated front-end events (plain clicks, menu selections)
//! - **Signals**: the closed set of observable attributes per widget variant
//! - **Callback Registry**: ordered observers with collect-and-reraise failures
//! - **Widget Models**: Button, Toggle, MenuButton and IconButton state
//! - **Dispatch Engine**: per-variant state machines turning events into
//!   ordered state deltas
//!
//! # Example
//!
//! ```rust
//! use pulse_core::{Button, Signal};
//! use std::sync::{Arc, Mutex};
//!
//! let button = Button::new("Button");
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let seen_clone = seen.clone();
//! button
//!     .subscribe(Signal::Value, move |change| {
//!         seen_clone.lock().unwrap().push(change.new.as_bool());
//!     })
//!     .unwrap();
//!
//! button.click().unwrap();
//! assert_eq!(button.clicks(), 1);
//! assert!(!button.value());
//! assert_eq!(*seen.lock().unwrap(), vec![Some(true)]);
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod registry;
pub mod signal;
pub mod widget;

pub use config::{MenuItemConfig, WidgetConfig};
pub use dispatch::{Dispatch, Outcome, StateDelta};
pub use error::{ObserverFailure, Result, WidgetError};
pub use event::{ControlId, Event, EventKind, PropertyChange, RawEvent};
pub use registry::{CallbackRegistry, Observer, ObserverId, ObserverResult, Subscription};
pub use signal::{Change, Signal, SignalValue, WidgetId, WidgetKindTag};
pub use widget::{
    Button, ButtonModel, IconButton, IconButtonModel, MenuButton, MenuItem, MenuModel, Toggle,
    ToggleModel, WeakWidget, Widget, WidgetKind, WidgetSnapshot, WidgetState,
};
