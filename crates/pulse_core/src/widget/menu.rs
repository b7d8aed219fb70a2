//! MenuButton model

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatch, Outcome, StateDelta};
use crate::error::{Result, WidgetError};
use crate::event::{ControlId, Event, EventKind};
use crate::signal::{Change, Signal, SignalValue, WidgetId, WidgetKindTag};

use super::button::wrap;
use super::{Widget, WidgetKind};

/// Entry in a menu button's dropdown
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuItem {
    Entry { label: String, id: String },
    Separator,
}

impl MenuItem {
    pub fn entry(label: impl Into<String>, id: impl Into<String>) -> Self {
        MenuItem::Entry {
            label: label.into(),
            id: id.into(),
        }
    }

    /// Item whose label doubles as its id
    pub fn plain(label: impl Into<String>) -> Self {
        let label = label.into();
        MenuItem::Entry {
            id: label.clone(),
            label,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            MenuItem::Entry { id, .. } => Some(id),
            MenuItem::Separator => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            MenuItem::Entry { label, .. } => Some(label),
            MenuItem::Separator => None,
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, MenuItem::Separator)
    }
}

impl From<&str> for MenuItem {
    fn from(label: &str) -> Self {
        MenuItem::plain(label)
    }
}

impl From<(&str, &str)> for MenuItem {
    fn from((label, id): (&str, &str)) -> Self {
        MenuItem::entry(label, id)
    }
}

/// `None` is a separator
impl From<Option<(&str, &str)>> for MenuItem {
    fn from(item: Option<(&str, &str)>) -> Self {
        item.map_or(MenuItem::Separator, MenuItem::from)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MenuModel {
    items: Vec<MenuItem>,
    clicked: Option<String>,
}

impl MenuModel {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self {
            items,
            clicked: None,
        }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Most recently selected item id
    pub fn clicked(&self) -> Option<&str> {
        self.clicked.as_deref()
    }

    /// Whether `id` names a selectable (non-separator) item
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id() == Some(id))
    }

    fn validate(&self, id: &str) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(WidgetError::Validation(format!(
                "menu has no item with id {id:?}"
            )))
        }
    }
}

impl Dispatch for MenuModel {
    fn kind(&self) -> WidgetKindTag {
        WidgetKindTag::MenuButton
    }

    fn accepts(&self, event: EventKind) -> bool {
        event == EventKind::MenuItemClick
    }

    fn dispatch(&mut self, widget: WidgetId, event: &Event) -> Result<StateDelta> {
        if event.kind() != EventKind::MenuItemClick {
            return Err(WidgetError::unexpected_event(self.kind(), event.kind()));
        }
        let id = event.item().ok_or_else(|| {
            WidgetError::MalformedEvent(format!(
                "menu-item-click from {} has no item id",
                event.source()
            ))
        })?;
        self.validate(id)?;

        let old = self.clicked.replace(id.to_string());
        let new = self.clicked.clone();
        Ok(StateDelta::new()
            .with(Change::new(
                widget,
                Signal::Clicked,
                SignalValue::Item(old.clone()),
                SignalValue::Item(new.clone()),
            ))
            .with(Change::new(
                widget,
                Signal::Click,
                SignalValue::Item(old),
                SignalValue::Item(new),
            )))
    }
}

/// Button with a dropdown of selectable items
#[derive(Clone, Debug)]
pub struct MenuButton(Widget);

impl MenuButton {
    pub fn new<I, T>(name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<MenuItem>,
    {
        let items = items.into_iter().map(Into::into).collect();
        MenuButton(Widget::from_kind(
            name,
            WidgetKind::MenuButton(MenuModel::new(items)),
        ))
    }

    pub fn with_disabled(self, disabled: bool) -> Self {
        self.0.init(|state| state.disabled = disabled);
        self
    }

    pub fn with_on_click<F>(self, observer: F) -> Self
    where
        F: Fn(&Change) + Send + Sync + 'static,
    {
        self.0.register(Signal::Click, wrap(observer));
        self
    }

    fn model<R>(&self, f: impl FnOnce(&MenuModel) -> R) -> R {
        self.0.with_state(|state| match &state.kind {
            WidgetKind::MenuButton(m) => f(m),
            _ => unreachable!("MenuButton view over a non-menu widget"),
        })
    }

    pub fn clicked(&self) -> Option<String> {
        self.model(|m| m.clicked().map(str::to_string))
    }

    pub fn items(&self) -> Vec<MenuItem> {
        self.model(|m| m.items().to_vec())
    }

    /// Programmatic selection; notifies `clicked` only when it changes
    pub fn set_clicked(&self, item: Option<String>) -> Result<Outcome> {
        self.0.mutate_kind(move |id, kind| {
            let WidgetKind::MenuButton(m) = kind else {
                unreachable!("MenuButton view over a non-menu widget")
            };
            if let Some(item) = &item {
                m.validate(item)?;
            }
            if m.clicked == item {
                return Ok(StateDelta::new());
            }
            let old = std::mem::replace(&mut m.clicked, item.clone());
            Ok(StateDelta::new().with(Change::new(
                id,
                Signal::Clicked,
                SignalValue::Item(old),
                SignalValue::Item(item),
            )))
        })
    }

    /// Replace the dropdown entries
    ///
    /// The last selection is kept even if its item is removed.
    pub fn set_items<I, T>(&self, items: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<MenuItem>,
    {
        let items: Vec<MenuItem> = items.into_iter().map(Into::into).collect();
        self.0.mutate_kind(move |id, kind| {
            let WidgetKind::MenuButton(m) = kind else {
                unreachable!("MenuButton view over a non-menu widget")
            };
            if m.items == items {
                return Ok(StateDelta::new());
            }
            let old = std::mem::replace(&mut m.items, items.clone());
            Ok(StateDelta::new().with(Change::new(
                id,
                Signal::Items,
                SignalValue::Items(old),
                SignalValue::Items(items),
            )))
        })
    }

    /// Inject a synthetic menu selection and dispatch it synchronously
    pub fn select(&self, item: impl Into<String>) -> Result<Outcome> {
        self.0.dispatch(&Event::menu_item(ControlId::SYNTHETIC, item))
    }

    pub fn widget(&self) -> &Widget {
        &self.0
    }
}

impl Deref for MenuButton {
    type Target = Widget;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<MenuButton> for Widget {
    fn from(menu: MenuButton) -> Self {
        menu.0
    }
}

impl Widget {
    pub fn as_menu_button(&self) -> Option<MenuButton> {
        (self.kind() == WidgetKindTag::MenuButton).then(|| MenuButton(self.clone()))
    }
}
