//! Model to control translation
//!
//! [`render`] turns a widget snapshot into the attributes a control displays.
//! [`attribute_for`] maps a single model change onto the control attribute it
//! updates, which is what reflection observers push.

use pulse_core::{Change, Signal, SignalValue, WidgetKindTag, WidgetSnapshot};

use crate::control::{Attribute, ControlKind, ControlProps};

/// Signals a binding watches to keep its control current
///
/// A button's `value` is a zero-duration pulse and is never reflected.
pub fn reflected_signals(kind: WidgetKindTag) -> &'static [Signal] {
    match kind {
        WidgetKindTag::Button => &[Signal::Name, Signal::Disabled],
        WidgetKindTag::IconButton => &[Signal::Name, Signal::Disabled, Signal::Icon],
        WidgetKindTag::Toggle => &[Signal::Name, Signal::Disabled, Signal::Value],
        WidgetKindTag::MenuButton => &[Signal::Name, Signal::Disabled, Signal::Items],
    }
}

/// Build a control description from a widget snapshot
pub fn render(snapshot: &WidgetSnapshot) -> (ControlKind, ControlProps) {
    let kind = ControlKind::from(snapshot.kind);
    let mut props = ControlProps {
        label: snapshot.name.clone(),
        disabled: snapshot.disabled,
        js_event_callbacks: snapshot.client_callbacks.clone(),
        ..ControlProps::default()
    };

    match snapshot.kind {
        WidgetKindTag::Toggle => props.active = snapshot.value,
        WidgetKindTag::MenuButton => props.menu = snapshot.items.clone(),
        WidgetKindTag::IconButton => {
            props.icon = snapshot.icon.clone();
            props.active_icon = snapshot.active_icon.clone();
        }
        WidgetKindTag::Button => {}
    }
    (kind, props)
}

/// Control attribute updated by `change`, if any
pub fn attribute_for(kind: WidgetKindTag, change: &Change) -> Option<Attribute> {
    if !reflected_signals(kind).contains(&change.signal) {
        return None;
    }
    match (change.signal, &change.new) {
        (Signal::Name, SignalValue::Text(label)) => Some(Attribute::Label(label.clone())),
        (Signal::Disabled, SignalValue::Bool(disabled)) => Some(Attribute::Disabled(*disabled)),
        (Signal::Value, SignalValue::Bool(active)) => Some(Attribute::Active(*active)),
        (Signal::Items, SignalValue::Items(items)) => Some(Attribute::Menu(items.clone())),
        (Signal::Icon, SignalValue::Text(icon)) => Some(Attribute::Icon(icon.clone())),
        (signal, value) => {
            tracing::warn!("`{signal}` change carries unexpected value {value:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::{Button, IconButton, MenuButton, MenuItem, Toggle};

    #[test]
    fn test_render_button() {
        let button = Button::new("Click me").with_disabled(true);
        button.click().unwrap();

        let (kind, props) = render(&button.snapshot());
        assert_eq!(kind, ControlKind::Button);
        assert_eq!(props.label, "Click me");
        assert!(props.disabled);
        assert_eq!(props.active, None);
        assert!(props.menu.is_empty());
    }

    #[test]
    fn test_render_menu_button() {
        let menu = MenuButton::new("Menu", vec![Some(("A", "a")), None, Some(("B", "b"))]);
        let (kind, props) = render(&menu.snapshot());
        assert_eq!(kind, ControlKind::Dropdown);
        assert_eq!(
            props.menu,
            vec![MenuItem::entry("A", "a"), MenuItem::Separator, MenuItem::entry("B", "b")]
        );
    }

    #[test]
    fn test_render_toggle_and_icon() {
        let (kind, props) = render(&Toggle::new("T", true).snapshot());
        assert_eq!(kind, ControlKind::Toggle);
        assert_eq!(props.active, Some(true));

        let icon = IconButton::new("heart").with_active_icon("heart-filled");
        let (kind, props) = render(&icon.snapshot());
        assert_eq!(kind, ControlKind::ButtonIcon);
        assert_eq!(props.label, "");
        assert_eq!(props.icon.as_deref(), Some("heart"));
        assert_eq!(props.active_icon.as_deref(), Some("heart-filled"));
    }

    #[test]
    fn test_button_pulse_is_not_reflected() {
        let button = Button::new("B");
        let change = Change::new(button.id(), Signal::Value, false, true);
        assert_eq!(attribute_for(WidgetKindTag::Button, &change), None);

        let change = Change::new(button.id(), Signal::Value, false, true);
        assert_eq!(
            attribute_for(WidgetKindTag::Toggle, &change),
            Some(Attribute::Active(true))
        );
    }

    #[test]
    fn test_name_change_maps_to_label() {
        let button = Button::new("B");
        let change = Change::new(
            button.id(),
            Signal::Name,
            SignalValue::Text("B".into()),
            SignalValue::Text("C".into()),
        );
        assert_eq!(
            attribute_for(WidgetKindTag::Button, &change),
            Some(Attribute::Label("C".into()))
        );
    }
}
