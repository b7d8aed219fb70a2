//! Sessions
//!
//! A [`Session`] is one front-end document. It renders widgets into
//! controls, owns the queue those controls send into, and dispatches queued
//! input to the bound models strictly in arrival order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use pulse_core::{ControlId, Outcome, PropertyChange, RawEvent, Widget};
use rustc_hash::FxHashMap;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::binding::Binding;
use crate::control::{Control, Inbound};
use crate::error::{Result, SessionError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SessionId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn to_raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Result of delivering one queued record
#[derive(Debug)]
pub struct Delivery {
    pub inbound: Inbound,
    pub result: Result<Outcome>,
}

impl Delivery {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Cloneable handle for transports injecting records into a session
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: UnboundedSender<Inbound>,
}

impl EventSender {
    /// Queue a raw record; fails once the session is closed
    pub fn send(&self, inbound: Inbound) -> Result<()> {
        let source = inbound.source();
        self.tx.send(inbound).map_err(|_| SessionError::Closed(source))
    }

    pub fn send_event(&self, raw: RawEvent) -> Result<()> {
        self.send(Inbound::Event(raw))
    }
}

pub struct Session {
    id: SessionId,
    bindings: FxHashMap<ControlId, Binding>,
    tx: UnboundedSender<Inbound>,
    rx: UnboundedReceiver<Inbound>,
}

impl Session {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = SessionId::next();
        tracing::debug!("{id} opened");
        Self {
            id,
            bindings: FxHashMap::default(),
            tx,
            rx,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    // =========================================================================
    // RENDERING
    // =========================================================================

    /// Render `widget` into a new control bound to this session
    ///
    /// A widget may be rendered any number of times; each call yields an
    /// independent control that reflects the same model.
    pub fn render(&mut self, widget: &Widget) -> Result<Arc<Control>> {
        let binding = Binding::new(widget, self.tx.clone())?;
        let control = binding.control().clone();
        self.bindings.insert(control.id(), binding);
        Ok(control)
    }

    /// Remove a control's binding; its reflection observers go with it
    pub fn unbind(&mut self, control: ControlId) -> bool {
        self.bindings.remove(&control).is_some()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Handle for feeding records in from outside the session's controls
    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    // =========================================================================
    // DELIVERY
    // =========================================================================

    /// Dispatch one record to the model behind its source control
    pub fn deliver(&self, inbound: &Inbound) -> Result<Outcome> {
        let source = inbound.source();
        let binding = self
            .bindings
            .get(&source)
            .ok_or(SessionError::UnknownControl(source))?;
        let widget = binding.widget()?;

        match inbound {
            Inbound::Event(raw) => {
                tracing::trace!("{} delivering {} from {}", self.id, raw.kind, source);
                Ok(widget.process_event(raw.clone())?)
            }
            Inbound::Property { change, .. } => {
                tracing::trace!("{} syncing `{}` from {}", self.id, change.attribute(), source);
                // the control already shows the edit; undo it unless applied
                match widget.sync_property(change) {
                    Ok(outcome) if outcome.is_dropped() => {
                        self.resync_rejected(binding, change)?;
                        Ok(outcome)
                    }
                    Ok(outcome) => Ok(outcome),
                    Err(err) => {
                        self.resync_rejected(binding, change)?;
                        Err(err.into())
                    }
                }
            }
        }
    }

    fn resync_rejected(&self, binding: &Binding, change: &PropertyChange) -> Result<()> {
        tracing::debug!(
            "{} re-syncing {} after rejected `{}`",
            self.id,
            binding.control().id(),
            change.attribute()
        );
        binding.resync()
    }

    /// Deliver everything currently queued, in order
    pub fn pump(&mut self) -> Vec<Delivery> {
        let mut deliveries = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(inbound) => deliveries.push(self.delivery(inbound)),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        deliveries
    }

    /// Wait for the next queued record and deliver it
    pub async fn next_delivery(&mut self) -> Option<Delivery> {
        let inbound = self.rx.recv().await?;
        Some(self.delivery(inbound))
    }

    fn delivery(&self, inbound: Inbound) -> Delivery {
        let result = self.deliver(&inbound);
        if let Err(err) = &result {
            tracing::debug!("{} delivery from {} failed: {err}", self.id, inbound.source());
        }
        Delivery { inbound, result }
    }

    /// End the session
    ///
    /// Queued records are discarded and every binding is removed from its
    /// model. Controls still held elsewhere fail to send afterwards.
    pub fn close(mut self) {
        self.rx.close();
        let dropped = std::iter::from_fn(|| self.rx.try_recv().ok()).count();
        tracing::debug!(
            "{} closed ({} binding(s), {} queued record(s) discarded)",
            self.id,
            self.bindings.len(),
            dropped
        );
        self.bindings.clear();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("bindings", &self.bindings.len())
            .finish()
    }
}
