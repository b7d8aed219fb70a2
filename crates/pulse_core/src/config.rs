//! Declarative widget construction
//!
//! A [`WidgetConfig`] describes one widget with the same options application
//! code passes to the typed constructors. It deserializes from TOML:
//!
//! ```toml
//! kind = "menu_button"
//! name = "Actions"
//! items = [["Option A", "a"], "Plain", { separator = true }, ["Help", "help"]]
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, WidgetError};
use crate::signal::WidgetKindTag;
use crate::widget::{Button, IconButton, MenuButton, MenuItem, Toggle, Widget};

/// Menu entry as written in a config file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MenuItemConfig {
    /// Label doubles as id
    Plain(String),
    /// `[label, id]`
    Pair(String, String),
    /// `{ separator = true }`
    Separator { separator: bool },
}

impl MenuItemConfig {
    fn to_item(&self) -> Result<MenuItem> {
        match self {
            MenuItemConfig::Plain(label) => Ok(MenuItem::plain(label.clone())),
            MenuItemConfig::Pair(label, id) => Ok(MenuItem::entry(label.clone(), id.clone())),
            MenuItemConfig::Separator { separator: true } => Ok(MenuItem::Separator),
            MenuItemConfig::Separator { separator: false } => Err(WidgetError::Validation(
                "menu entry `{ separator = false }` is neither an item nor a separator".into(),
            )),
        }
    }
}

/// Options for constructing one widget
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub kind: WidgetKindTag,
    #[serde(default)]
    pub name: Option<String>,
    /// Initial toggle state
    #[serde(default)]
    pub value: Option<bool>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub items: Vec<MenuItemConfig>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub active_icon: Option<String>,
}

impl WidgetConfig {
    pub fn new(kind: WidgetKindTag) -> Self {
        Self {
            kind,
            name: None,
            value: None,
            disabled: false,
            items: Vec::new(),
            icon: None,
            active_icon: None,
        }
    }

    /// Reject options that make no sense for the configured kind
    pub fn validate(&self) -> Result<()> {
        let kind = self.kind;
        let reject = |option: &str| -> Result<()> {
            Err(WidgetError::Validation(format!(
                "`{option}` is not an option of {kind} widgets"
            )))
        };

        if self.value.is_some() && kind != WidgetKindTag::Toggle {
            return reject("value");
        }
        if !self.items.is_empty() && kind != WidgetKindTag::MenuButton {
            return reject("items");
        }
        if kind != WidgetKindTag::IconButton {
            if self.icon.is_some() {
                return reject("icon");
            }
            if self.active_icon.is_some() {
                return reject("active_icon");
            }
        } else if self.icon.is_none() {
            return Err(WidgetError::Validation(
                "IconButton widgets require an `icon`".into(),
            ));
        }
        Ok(())
    }

    /// Build the widget described by this config
    pub fn build(&self) -> Result<Widget> {
        self.validate()?;
        let name = self.name.clone().unwrap_or_default();

        let widget: Widget = match self.kind {
            WidgetKindTag::Button => Button::new(name).with_disabled(self.disabled).into(),
            WidgetKindTag::Toggle => Toggle::new(name, self.value.unwrap_or(false))
                .with_disabled(self.disabled)
                .into(),
            WidgetKindTag::MenuButton => {
                let items = self
                    .items
                    .iter()
                    .map(MenuItemConfig::to_item)
                    .collect::<Result<Vec<_>>>()?;
                MenuButton::new(name, items)
                    .with_disabled(self.disabled)
                    .into()
            }
            WidgetKindTag::IconButton => {
                let mut button = IconButton::new(self.icon.clone().unwrap_or_default())
                    .with_name(name)
                    .with_disabled(self.disabled);
                if let Some(active) = &self.active_icon {
                    button = button.with_active_icon(active.clone());
                }
                button.into()
            }
        };
        Ok(widget)
    }
}
