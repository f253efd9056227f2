// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover tracking and popups.
//!
//! Move the pointer across two buttons to see over/out, then open a popup menu and close it
//! by pressing outside.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p gadget_demos --example hover_and_popup`

use gadget_elements::canvas::recording::RecordingGraphics;
use gadget_elements::kinds::{ButtonElement, ButtonState};
use gadget_elements::{BasicElement, ElementFactory, Length, Owner, View, ViewConfig, ViewHost};
use gadget_events::{EventType, Modifiers, MouseButtons, MouseEvent};
use kurbo::Point;

struct PrintingHost;

impl ViewHost for PrintingHost {
    fn on_element_add(&mut self, element: &BasicElement) -> bool {
        log::info!("adding <{}> {:?}", element.tag_name(), element.name());
        true
    }

    fn queue_redraw(&mut self) {
        log::debug!("redraw requested");
    }
}

fn mouse(kind: EventType, x: f64, y: f64) -> MouseEvent {
    let buttons = if matches!(kind, EventType::MouseDown | EventType::MouseUp) {
        MouseButtons::LEFT
    } else {
        MouseButtons::empty()
    };
    MouseEvent::new(kind, Point::new(x, y), buttons, Modifiers::empty())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let mut view = View::new(
        ElementFactory::with_builtin_elements(),
        RecordingGraphics::new(),
        ViewConfig::default(),
    )
    .with_host(PrintingHost);

    let mut root = view.children_mut(Owner::Root).unwrap();
    let left = root.append_element("button", "left").unwrap();
    let right = root.append_element("button", "right").unwrap();
    let menu = root.append_element("div", "menu").unwrap();
    for (id, x) in [(left, 10.0), (right, 120.0)] {
        view.element_mut(id)
            .unwrap()
            .set_position(Length::Pixels(x), Length::Pixels(10.0))
            .set_size(Some(Length::Pixels(100.0)), Some(Length::Pixels(30.0)));
    }
    view.element_mut(menu)
        .unwrap()
        .set_position(Length::Pixels(10.0), Length::Pixels(40.0))
        .set_size(Some(Length::Pixels(100.0)), Some(Length::Pixels(80.0)));
    view.layout();

    let state = |view: &View, id| {
        let e = view.element(id).unwrap();
        view.kind::<ButtonElement>(id).unwrap().state(e)
    };

    for x in [20.0, 130.0, 300.0] {
        view.on_mouse_event(&mouse(EventType::MouseMove, x, 20.0));
        println!(
            "pointer at x={x}: over={:?} left={:?} right={:?}",
            view.mouse_over_element().and_then(|id| view.element(id)).map(BasicElement::name),
            state(&view, left),
            state(&view, right),
        );
    }

    view.on_mouse_event(&mouse(EventType::MouseDown, 20.0, 20.0));
    assert_eq!(state(&view, left), ButtonState::Down);
    view.on_mouse_event(&mouse(EventType::MouseUp, 20.0, 20.0));
    println!("focus after pressing left: {:?}", view.focused_element());

    view.set_popup_element(Some(menu));
    view.on_mouse_event(&mouse(EventType::MouseDown, 60.0, 60.0));
    println!("press inside menu: popup={:?}", view.popup_element());
    view.on_mouse_event(&mouse(EventType::MouseUp, 60.0, 60.0));
    view.on_mouse_event(&mouse(EventType::MouseDown, 300.0, 200.0));
    println!("press outside menu: popup={:?}", view.popup_element());
    assert_eq!(view.popup_element(), None);
}
