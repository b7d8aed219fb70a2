//! Scenario replay
//!
//! Builds every declared widget, renders each one into every session, then
//! runs the scripted steps in order. Control-side steps are queued on the
//! target session and pumped immediately, so each step observes the state
//! left by the previous one.

use anyhow::{Context, Result};
use pulse_core::{Outcome, Signal, Widget, WidgetKindTag};
use pulse_session::{Control, Session};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::scenario::{Action, Scenario};

/// A declared widget and its controls, one per session
struct Entry {
    widget: Widget,
    controls: Vec<Arc<Control>>,
}

/// Outcome of a replay
#[derive(Debug, Default)]
pub struct Report {
    pub steps: usize,
    pub dropped: usize,
    pub failures: Vec<String>,
}

impl Report {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Runner {
    sessions: Vec<Session>,
    entries: BTreeMap<String, Entry>,
}

impl Runner {
    pub fn new(scenario: &Scenario) -> Result<Self> {
        let mut sessions: Vec<Session> =
            (0..scenario.scenario.sessions).map(|_| Session::new()).collect();
        let mut entries = BTreeMap::new();

        for decl in &scenario.widgets {
            let widget = decl
                .config
                .build()
                .with_context(|| format!("Failed to build widget '{}'", decl.key))?;

            if let Some(code) = &decl.js_on_click {
                let signal = click_counter(widget.kind());
                widget
                    .js_callback(signal, code.clone())
                    .with_context(|| format!("Failed to attach js_on_click to '{}'", decl.key))?;
            }
            trace_changes(&decl.key, &widget)?;

            let controls = sessions
                .iter_mut()
                .map(|session| session.render(&widget))
                .collect::<pulse_session::Result<Vec<_>>>()
                .with_context(|| format!("Failed to render widget '{}'", decl.key))?;

            entries.insert(decl.key.clone(), Entry { widget, controls });
        }

        Ok(Self { sessions, entries })
    }

    /// Replay `actions`
    ///
    /// Failures are collected; with `fail_fast` the replay stops at the first.
    pub fn run(&mut self, actions: &[Action], fail_fast: bool) -> Result<Report> {
        let mut report = Report::default();
        for (index, action) in actions.iter().enumerate() {
            report.steps += 1;
            debug!("step {}: {} {}", index + 1, action.op(), action.widget());
            match self.step(action) {
                Ok(Some(Outcome::Dropped)) => {
                    info!("step {}: {} on '{}' dropped", index + 1, action.op(), action.widget());
                    report.dropped += 1;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("step {} failed: {:#}", index + 1, err);
                    report
                        .failures
                        .push(format!("step {} ({}): {:#}", index + 1, action.op(), err));
                    if fail_fast {
                        break;
                    }
                }
            }
        }
        Ok(report)
    }

    fn step(&mut self, action: &Action) -> Result<Option<Outcome>> {
        let entry = self
            .entries
            .get(action.widget())
            .with_context(|| format!("Unknown widget '{}'", action.widget()))?;
        let widget = &entry.widget;

        let outcome = match action {
            Action::Press { session, .. } => {
                entry.controls[*session].press()?;
                pump(&mut self.sessions, *session)?
            }
            Action::Select { session, item, .. } => {
                entry.controls[*session].select(item.clone())?;
                pump(&mut self.sessions, *session)?
            }
            Action::SetActive { session, active, .. } => {
                entry.controls[*session].set_active(*active)?;
                pump(&mut self.sessions, *session)?
            }
            Action::SetValue { value, .. } => {
                let outcome = if let Some(toggle) = widget.as_toggle() {
                    toggle.set_value(*value)?
                } else if let Some(button) = widget.as_button() {
                    button.set_value(*value)?
                } else if let Some(button) = widget.as_icon_button() {
                    button.set_value(*value)?
                } else {
                    anyhow::bail!("{} widgets have no writable value", widget.kind());
                };
                Some(outcome)
            }
            Action::SetClicked { item, .. } => {
                let menu = widget
                    .as_menu_button()
                    .with_context(|| format!("{} widgets have no `clicked`", widget.kind()))?;
                Some(menu.set_clicked(item.clone())?)
            }
            Action::SetDisabled { disabled, .. } => Some(widget.set_disabled(*disabled)?),
            Action::SetName { name, .. } => Some(widget.set_name(name.clone())?),
            Action::Expect {
                clicks,
                value,
                clicked,
                disabled,
                ..
            } => {
                let snapshot = widget.snapshot();
                expect("clicks", *clicks, snapshot.clicks)?;
                expect("value", *value, snapshot.value)?;
                expect("clicked", clicked.clone(), snapshot.clicked)?;
                expect("disabled", *disabled, Some(snapshot.disabled))?;
                None
            }
        };
        Ok(outcome)
    }

    /// Render the final model and control state
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (key, entry) in &self.entries {
            let snapshot = entry.widget.snapshot();
            out.push_str(&format!("{key} ({}) \"{}\"", snapshot.kind, snapshot.name));
            if snapshot.disabled {
                out.push_str(" [disabled]");
            }
            out.push('\n');
            if let Some(clicks) = snapshot.clicks {
                out.push_str(&format!("  clicks: {clicks}\n"));
            }
            if snapshot.kind == WidgetKindTag::Toggle {
                out.push_str(&format!("  value: {}\n", snapshot.value.unwrap_or_default()));
            }
            if snapshot.kind == WidgetKindTag::MenuButton {
                out.push_str(&format!(
                    "  clicked: {}\n",
                    snapshot.clicked.as_deref().unwrap_or("-")
                ));
            }
            for control in &entry.controls {
                let props = control.props();
                out.push_str(&format!(
                    "  {} {:?}: label={:?} disabled={}",
                    control.id(),
                    control.kind(),
                    props.label,
                    props.disabled
                ));
                if let Some(active) = props.active {
                    out.push_str(&format!(" active={active}"));
                }
                out.push('\n');
            }
        }
        out
    }
}

/// Deliver everything queued on one session; the first failure wins
fn pump(sessions: &mut [Session], index: usize) -> Result<Option<Outcome>> {
    let session = sessions
        .get_mut(index)
        .with_context(|| format!("No session {index}"))?;
    let mut last = None;
    for delivery in session.pump() {
        last = Some(delivery.result?);
    }
    Ok(last)
}

fn expect<T>(field: &str, wanted: Option<T>, actual: Option<T>) -> Result<()>
where
    T: PartialEq + std::fmt::Debug,
{
    let Some(wanted) = wanted else {
        return Ok(());
    };
    if actual.as_ref() != Some(&wanted) {
        anyhow::bail!("expected {field} = {wanted:?}, found {actual:?}");
    }
    Ok(())
}

fn click_counter(kind: WidgetKindTag) -> Signal {
    match kind {
        WidgetKindTag::MenuButton => Signal::Clicked,
        WidgetKindTag::Toggle => Signal::Value,
        WidgetKindTag::Button | WidgetKindTag::IconButton => Signal::Clicks,
    }
}

/// Log every change the widget notifies
fn trace_changes(key: &str, widget: &Widget) -> Result<()> {
    for &signal in widget.kind().signals() {
        let key = key.to_string();
        widget.subscribe(signal, move |change| {
            info!("{key}.{}: {:?} -> {:?}", change.signal, change.old, change.new);
        })?;
    }
    Ok(())
}
