//! Render bindings
//!
//! A [`Binding`] ties one widget model to one rendered [`Control`]. It keeps a
//! weak handle to the model, so application code decides how long the model
//! lives, and registers reflection observers that push model changes into the
//! control. Dropping the binding removes those observers again.

use std::sync::{Arc, Weak};

use pulse_core::{Subscription, WeakWidget, Widget, WidgetKindTag};
use tokio::sync::mpsc::UnboundedSender;

use crate::control::{Control, Inbound};
use crate::error::{Result, SessionError};
use crate::render::{attribute_for, reflected_signals, render};

pub struct Binding {
    widget: WeakWidget,
    kind: WidgetKindTag,
    control: Arc<Control>,
    subscriptions: Vec<Subscription>,
}

impl Binding {
    /// Render `widget` and start reflecting its changes
    pub(crate) fn new(widget: &Widget, outbox: UnboundedSender<Inbound>) -> Result<Self> {
        let kind = widget.kind();
        let (control_kind, props) = render(&widget.snapshot());
        let control = Arc::new(Control::new(control_kind, widget.id(), props, outbox));

        let mut subscriptions = Vec::new();
        for &signal in reflected_signals(kind) {
            let weak: Weak<Control> = Arc::downgrade(&control);
            let subscription = widget.subscribe(signal, move |change| {
                let Some(control) = weak.upgrade() else {
                    return;
                };
                if let Some(attribute) = attribute_for(kind, change) {
                    control.reflect(attribute);
                }
            });
            match subscription {
                Ok(subscription) => subscriptions.push(subscription),
                Err(err) => {
                    for subscription in &subscriptions {
                        widget.unsubscribe(subscription);
                    }
                    return Err(err.into());
                }
            }
        }

        // Catch changes committed between the first render and the subscriptions
        control.replace_props(render(&widget.snapshot()).1);

        tracing::debug!("bound {} to {} ({:?})", widget.id(), control.id(), control.kind());
        Ok(Self {
            widget: widget.downgrade(),
            kind,
            control,
            subscriptions,
        })
    }

    pub fn control(&self) -> &Arc<Control> {
        &self.control
    }

    pub fn kind(&self) -> WidgetKindTag {
        self.kind
    }

    /// The bound model, if application code still holds it
    pub fn widget(&self) -> Result<Widget> {
        self.widget
            .upgrade()
            .ok_or(SessionError::WidgetGone(self.control.id()))
    }

    /// Re-render the control from current model state
    pub fn resync(&self) -> Result<()> {
        let widget = self.widget()?;
        let (_, props) = render(&widget.snapshot());
        tracing::trace!("resync {} from {}", self.control.id(), widget.id());
        self.control.replace_props(props);
        Ok(())
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        let Some(widget) = self.widget.upgrade() else {
            return;
        };
        for subscription in &self.subscriptions {
            widget.unsubscribe(subscription);
        }
        tracing::debug!("unbound {} from {}", widget.id(), self.control.id());
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("kind", &self.kind)
            .field("control", &self.control.id())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
