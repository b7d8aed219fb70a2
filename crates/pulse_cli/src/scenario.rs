//! Scenario file handling
//!
//! A scenario declares widgets and a script of steps to replay against them:
//!
//! ```toml
//! [scenario]
//! name = "menu"
//! sessions = 2
//!
//! [[widget]]
//! key = "actions"
//! kind = "menu_button"
//! items = [["Option A", "a"], { separator = true }, ["Help", "help"]]
//!
//! [[action]]
//! op = "select"
//! widget = "actions"
//! item = "a"
//!
//! [[action]]
//! op = "expect"
//! widget = "actions"
//! clicked = "a"
//! ```

use anyhow::{Context, Result};
use pulse_core::WidgetConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

// =============================================================================
// Scenario file
// =============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct Scenario {
    #[serde(default)]
    pub scenario: ScenarioMetadata,
    #[serde(default, rename = "widget")]
    pub widgets: Vec<WidgetEntry>,
    #[serde(default, rename = "action")]
    pub actions: Vec<Action>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ScenarioMetadata {
    #[serde(default = "default_name")]
    pub name: String,
    /// Number of sessions every widget is rendered into
    #[serde(default = "default_sessions")]
    pub sessions: usize,
}

impl Default for ScenarioMetadata {
    fn default() -> Self {
        Self {
            name: default_name(),
            sessions: default_sessions(),
        }
    }
}

fn default_name() -> String {
    "scenario".to_string()
}

fn default_sessions() -> usize {
    1
}

/// A widget declaration plus the key actions refer to it by
#[derive(Debug, Deserialize, Serialize)]
pub struct WidgetEntry {
    pub key: String,
    #[serde(flatten)]
    pub config: WidgetConfig,
    /// Client-side callback code for the widget's click signal
    #[serde(default)]
    pub js_on_click: Option<String>,
}

/// One scripted step
///
/// `press`, `select` and `set_active` act on a rendered control and go
/// through the session queue; the rest act on the model directly.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    Press {
        widget: String,
        #[serde(default)]
        session: usize,
    },
    Select {
        widget: String,
        item: String,
        #[serde(default)]
        session: usize,
    },
    SetActive {
        widget: String,
        active: bool,
        #[serde(default)]
        session: usize,
    },
    SetValue {
        widget: String,
        value: bool,
    },
    SetClicked {
        widget: String,
        item: Option<String>,
    },
    SetDisabled {
        widget: String,
        disabled: bool,
    },
    SetName {
        widget: String,
        name: String,
    },
    /// Assert model state; unset fields are not checked
    Expect {
        widget: String,
        #[serde(default)]
        clicks: Option<u64>,
        #[serde(default)]
        value: Option<bool>,
        #[serde(default)]
        clicked: Option<String>,
        #[serde(default)]
        disabled: Option<bool>,
    },
}

impl Action {
    pub fn widget(&self) -> &str {
        match self {
            Action::Press { widget, .. }
            | Action::Select { widget, .. }
            | Action::SetActive { widget, .. }
            | Action::SetValue { widget, .. }
            | Action::SetClicked { widget, .. }
            | Action::SetDisabled { widget, .. }
            | Action::SetName { widget, .. }
            | Action::Expect { widget, .. } => widget,
        }
    }

    /// Session index for control-side steps
    pub fn session(&self) -> Option<usize> {
        match self {
            Action::Press { session, .. }
            | Action::Select { session, .. }
            | Action::SetActive { session, .. } => Some(*session),
            _ => None,
        }
    }

    pub fn op(&self) -> &'static str {
        match self {
            Action::Press { .. } => "press",
            Action::Select { .. } => "select",
            Action::SetActive { .. } => "set_active",
            Action::SetValue { .. } => "set_value",
            Action::SetClicked { .. } => "set_clicked",
            Action::SetDisabled { .. } => "set_disabled",
            Action::SetName { .. } => "set_name",
            Action::Expect { .. } => "expect",
        }
    }
}

impl Scenario {
    /// Load and validate a scenario file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("No scenario found at {}", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let scenario = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(scenario)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check cross references that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.scenario.sessions == 0 {
            anyhow::bail!("`sessions` must be at least 1");
        }

        let mut keys = HashSet::new();
        for entry in &self.widgets {
            if !keys.insert(entry.key.as_str()) {
                anyhow::bail!("Duplicate widget key '{}'", entry.key);
            }
            entry
                .config
                .validate()
                .with_context(|| format!("Invalid widget '{}'", entry.key))?;
        }

        for (index, action) in self.actions.iter().enumerate() {
            if !keys.contains(action.widget()) {
                anyhow::bail!(
                    "Action {} ({}) refers to unknown widget '{}'",
                    index + 1,
                    action.op(),
                    action.widget()
                );
            }
            if let Some(session) = action.session() {
                if session >= self.scenario.sessions {
                    anyhow::bail!(
                        "Action {} ({}) targets session {} but only {} exist",
                        index + 1,
                        action.op(),
                        session,
                        self.scenario.sessions
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::WidgetKindTag;

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::parse(
            r#"
            [scenario]
            name = "buttons"

            [[widget]]
            key = "save"
            kind = "button"
            name = "Save"
            js_on_click = "console.log('saved')"

            [[widget]]
            key = "menu"
            kind = "menu_button"
            items = [["Option A", "a"], { separator = true }, "Help"]

            [[action]]
            op = "press"
            widget = "save"

            [[action]]
            op = "select"
            widget = "menu"
            item = "a"

            [[action]]
            op = "expect"
            widget = "save"
            clicks = 1
            "#,
        )
        .unwrap();

        assert_eq!(scenario.scenario.name, "buttons");
        assert_eq!(scenario.scenario.sessions, 1);
        assert_eq!(scenario.widgets.len(), 2);
        assert_eq!(scenario.widgets[1].config.kind, WidgetKindTag::MenuButton);
        assert_eq!(scenario.widgets[1].config.items.len(), 3);
        assert_eq!(scenario.actions.len(), 3);
        assert!(matches!(
            scenario.actions[2],
            Action::Expect {
                clicks: Some(1),
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_widget_rejected() {
        let err = Scenario::parse(
            r#"
            [[action]]
            op = "press"
            widget = "ghost"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_session_out_of_range_rejected() {
        let result = Scenario::parse(
            r#"
            [[widget]]
            key = "b"
            kind = "button"

            [[action]]
            op = "press"
            widget = "b"
            session = 1
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let result = Scenario::parse(
            r#"
            [[widget]]
            key = "b"
            kind = "button"

            [[widget]]
            key = "b"
            kind = "toggle"
            "#,
        );
        assert!(result.is_err());
    }
}
