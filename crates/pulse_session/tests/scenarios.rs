//! End-to-end scenarios: control interaction through a session to observers

use std::sync::{Arc, Mutex};

use pulse_core::{
    Button, EventKind, IconButton, MenuButton, MenuItem, RawEvent, Signal, Toggle, WidgetError,
};
use pulse_session::{ControlKind, Session, SessionError};

#[test]
fn test_button_click_pulses_value() {
    let button = Button::new("Button");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    button
        .subscribe(Signal::Value, move |c| {
            seen_clone.lock().unwrap().push(c.new.as_bool().unwrap());
        })
        .unwrap();

    let mut session = Session::new();
    let control = session.render(&button).unwrap();
    assert_eq!(control.kind(), ControlKind::Button);

    control.press().unwrap();
    let deliveries = session.pump();
    assert!(deliveries[0].is_ok());

    assert_eq!(button.clicks(), 1);
    assert!(!button.value());
    assert_eq!(*seen.lock().unwrap(), vec![true]);
}

#[test]
fn test_button_on_click_stack() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let first = log.clone();
    let button = Button::new("Button").with_on_click(move |_| first.lock().unwrap().push("first"));
    let second = log.clone();
    button
        .on_click(move |_| second.lock().unwrap().push("second"))
        .unwrap();

    let mut session = Session::new();
    let control = session.render(&button).unwrap();
    for _ in 0..3 {
        control.press().unwrap();
    }
    session.pump();

    assert_eq!(button.clicks(), 3);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["first", "second", "first", "second", "first", "second"]
    );
}

#[test]
fn test_menu_button_selection() {
    let menu = MenuButton::new(
        "",
        vec![
            Some(("Option A", "a")),
            Some(("Option B", "b")),
            Some(("Option C", "c")),
            None,
            Some(("Help", "help")),
        ],
    );
    let clicked = Arc::new(Mutex::new(Vec::new()));
    let clicked_clone = clicked.clone();
    menu.subscribe(Signal::Clicked, move |c| {
        clicked_clone
            .lock()
            .unwrap()
            .push(c.new.as_item().map(str::to_string));
    })
    .unwrap();

    let mut session = Session::new();
    let control = session.render(&menu).unwrap();
    assert_eq!(control.kind(), ControlKind::Dropdown);
    assert_eq!(control.menu()[3], MenuItem::Separator);

    control.select("b").unwrap();
    control.select("missing").unwrap();
    let deliveries = session.pump();

    assert!(deliveries[0].is_ok());
    assert!(matches!(
        deliveries[1].result.as_ref().unwrap_err().as_widget_error(),
        Some(WidgetError::Validation(_))
    ));
    assert_eq!(menu.clicked().as_deref(), Some("b"));
    assert_eq!(*clicked.lock().unwrap(), vec![Some("b".to_string())]);
}

#[test]
fn test_toggle_round_trip() {
    let toggle = Toggle::new("Toggle", true);
    let mut session = Session::new();
    let control = session.render(&toggle).unwrap();
    assert_eq!(control.active(), Some(true));

    control.set_active(false).unwrap();
    session.pump();
    assert!(!toggle.value());

    toggle.set_value(true).unwrap();
    assert_eq!(control.active(), Some(true));
}

#[test]
fn test_reflection_reaches_every_session() {
    let toggle = Toggle::new("Toggle", false);
    let mut first = Session::new();
    let mut second = Session::new();
    let a = first.render(&toggle).unwrap();
    let b = second.render(&toggle).unwrap();

    a.set_active(true).unwrap();
    first.pump();

    assert!(toggle.value());
    assert_eq!(b.active(), Some(true));

    toggle.set_disabled(true).unwrap();
    toggle.set_name("Locked").unwrap();
    assert!(a.disabled() && b.disabled());
    assert_eq!(b.label(), "Locked");
}

#[test]
fn test_programmatic_attribute_reflection() {
    let menu = MenuButton::new("Menu", vec!["x"]);
    let icon = IconButton::new("heart");
    let mut session = Session::new();
    let menu_control = session.render(&menu).unwrap();
    let icon_control = session.render(&icon).unwrap();

    menu.set_items(vec!["x", "y"]).unwrap();
    icon.set_icon("star").unwrap();

    assert_eq!(menu_control.menu(), vec![MenuItem::plain("x"), MenuItem::plain("y")]);
    assert_eq!(icon_control.icon().as_deref(), Some("star"));
}

#[test]
fn test_js_callback_rendered() {
    let button = Button::new("Button");
    button.js_callback(Signal::Clicks, "1 + 1").unwrap();

    let mut session = Session::new();
    let control = session.render(&button).unwrap();
    let callbacks = control.js_event_callbacks();
    assert_eq!(callbacks.len(), 1);
    assert_eq!(callbacks["button_click"], vec!["1 + 1".to_string()]);
}

#[test]
fn test_disabled_button_drops_presses() {
    let button = Button::new("Button").with_disabled(true);
    let mut session = Session::new();
    let control = session.render(&button).unwrap();
    assert!(control.disabled());

    control.press().unwrap();
    let deliveries = session.pump();
    assert!(deliveries[0].result.as_ref().unwrap().is_dropped());
    assert_eq!(button.clicks(), 0);
}

#[test]
fn test_rejected_active_edit_resyncs_control() {
    let button = Button::new("Button");
    let mut session = Session::new();
    let control = session.render(&button).unwrap();
    assert_eq!(control.widget_id(), button.id());
    assert_eq!(control.active(), None);

    control.set_active(true).unwrap();
    assert_eq!(control.active(), Some(true));

    let deliveries = session.pump();
    let err = deliveries[0].result.as_ref().unwrap_err();
    assert!(matches!(
        err.as_widget_error(),
        Some(WidgetError::MalformedEvent(_))
    ));
    assert_eq!(control.active(), None);
    assert!(!button.value());
}

#[test]
fn test_unbind_stops_delivery() {
    let button = Button::new("Button");
    let mut session = Session::new();
    let control = session.render(&button).unwrap();
    assert!(session.unbind(control.id()));
    assert!(!session.unbind(control.id()));

    control.press().unwrap();
    let deliveries = session.pump();
    assert!(matches!(
        deliveries[0].result,
        Err(SessionError::UnknownControl(_))
    ));
}

#[test]
fn test_external_sender_injects_raw_records() {
    let menu = MenuButton::new("Menu", vec!["x"]);
    let mut session = Session::new();
    let control = session.render(&menu).unwrap();
    let sender = session.sender();

    sender
        .send_event(RawEvent {
            kind: EventKind::MenuItemClick,
            source: control.id(),
            item: None,
        })
        .unwrap();
    sender
        .send_event(RawEvent {
            kind: EventKind::MenuItemClick,
            source: control.id(),
            item: Some("x".into()),
        })
        .unwrap();

    let deliveries = session.pump();
    assert!(matches!(
        deliveries[0].result.as_ref().unwrap_err().as_widget_error(),
        Some(WidgetError::MalformedEvent(_))
    ));
    assert!(deliveries[1].is_ok());
    assert_eq!(menu.clicked().as_deref(), Some("x"));
}

#[tokio::test]
async fn test_async_delivery_in_order() {
    let button = Button::new("Button");
    let counts = Arc::new(Mutex::new(Vec::new()));
    let counts_clone = counts.clone();
    button
        .subscribe(Signal::Clicks, move |c| {
            counts_clone.lock().unwrap().push(c.new.as_count().unwrap());
        })
        .unwrap();

    let mut session = Session::new();
    let control = session.render(&button).unwrap();
    let task = tokio::spawn(async move {
        for _ in 0..5 {
            control.press().unwrap();
            tokio::task::yield_now().await;
        }
    });

    for _ in 0..5 {
        let delivery = session.next_delivery().await.unwrap();
        assert!(delivery.is_ok());
    }
    task.await.unwrap();

    assert_eq!(*counts.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    assert_eq!(button.clicks(), 5);
}
