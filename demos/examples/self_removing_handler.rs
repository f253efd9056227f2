// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A handler that removes its own element.
//!
//! Two stacked rectangles; the top one deletes itself when pressed.
//! Dispatch notices the removal and stops, and the release goes to the survivor.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p gadget_demos --example self_removing_handler`

use gadget_elements::canvas::recording::RecordingGraphics;
use gadget_elements::{ElementFactory, Length, Owner, View, ViewConfig};
use gadget_events::{EventResult, EventType, Modifiers, MouseButtons, MouseEvent};
use kurbo::Point;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let mut view = View::new(
        ElementFactory::with_builtin_elements(),
        RecordingGraphics::new(),
        ViewConfig::default(),
    );
    let mut root = view.children_mut(Owner::Root).unwrap();
    let bottom = root.append_element("div", "bottom").unwrap();
    let top = root.append_element("div", "top").unwrap();
    for id in [bottom, top] {
        view.element_mut(id)
            .unwrap()
            .set_size(Some(Length::Pixels(100.0)), Some(Length::Pixels(100.0)));
    }

    view.connect(top, EventType::MouseDown, |cx, _| {
        log::info!("top pressed; removing it");
        cx.remove_target();
        EventResult::Handled
    });
    for kind in [EventType::MouseDown, EventType::MouseUp] {
        view.connect(bottom, kind, move |_, ev| {
            log::info!("bottom got {:?} at {:?}", kind, ev.position());
            EventResult::Handled
        });
    }
    view.layout();

    let at = Point::new(10.0, 10.0);
    for kind in [EventType::MouseDown, EventType::MouseUp] {
        let ev = MouseEvent::new(kind, at, MouseButtons::LEFT, Modifiers::empty());
        let result = view.on_mouse_event(&ev);
        println!("{kind:?} -> {result:?}");
    }

    assert!(!view.is_alive(top));
    assert_eq!(view.children(Owner::Root).unwrap().count(), 1);
    println!("remaining: {:?}", view.element_by_name("bottom"));
}
