// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element tree basics.
//!
//! Build a small gadget out of the built-in kinds, lay it out, draw it into a recording
//! canvas, and draw it again to see the cache at work.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p gadget_demos --example elements_basics`

use std::rc::Rc;

use gadget_elements::canvas::recording::{RecordingCanvas, RecordingGraphics};
use gadget_elements::kinds::{ButtonElement, ButtonState, ImgElement, MaskImage};
use gadget_elements::{ElementFactory, Length, Owner, View, ViewConfig};
use kurbo::Point;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let graphics = RecordingGraphics::new();
    let mut view = View::new(
        ElementFactory::with_builtin_elements(),
        graphics.clone(),
        ViewConfig::default(),
    );

    // A panel filling the left half, holding a label and a round image.
    let mut root = view.children_mut(Owner::Root).unwrap();
    let panel = root.append_element("div", "panel").unwrap();
    let ok = root.append_element("button", "ok").unwrap();
    let mut children = view.children_mut(panel).unwrap();
    let title = children.append_element("label", "title").unwrap();
    let icon = children.append_element("img", "icon").unwrap();

    view.set_property(panel, "width", "50%").unwrap();
    view.set_property(panel, "height", "100%").unwrap();
    view.set_property(panel, "background", "#202830").unwrap();
    view.set_property(title, "innerText", "Weather\nSunny, 21°").unwrap();
    view.set_property(title, "color", "#ffffff").unwrap();
    view.element_mut(title)
        .unwrap()
        .set_position(Length::Pixels(8.0), Length::Pixels(8.0));

    let disc = MaskImage::from_fn(32, 32, |x, y| {
        let (dx, dy) = (x as f64 - 15.5, y as f64 - 15.5);
        if dx * dx + dy * dy <= 16.0 * 16.0 { 1.0 } else { 0.0 }
    });
    view.kind_mut::<ImgElement>(icon)
        .unwrap()
        .set_image(Some(Rc::new(disc)));
    view.element_mut(icon)
        .unwrap()
        .set_position(Length::Percent(50.0), Length::Percent(50.0))
        .set_pin(Length::Percent(50.0), Length::Percent(50.0))
        .set_rotation(30.0);

    view.kind_mut::<ButtonElement>(ok).unwrap().set_image(
        ButtonState::Normal,
        Some(Rc::new(MaskImage::filled(60, 24, 1.0))),
    );
    view.set_property(ok, "caption", "OK").unwrap();
    view.element_mut(ok)
        .unwrap()
        .set_position(Length::Pixels(240.0), Length::Pixels(200.0));

    view.layout();
    let mut target = RecordingCanvas::new(320, 240);
    let changed = view.draw(&mut target);
    println!(
        "first frame: changed={changed}, canvases allocated={}",
        graphics.canvases_created()
    );
    for id in [panel, title, icon, ok] {
        let e = view.element(id).unwrap();
        println!("  {:<6} {:<7} {:?}", e.tag_name(), e.name(), e.pixel_size());
    }

    view.layout();
    let changed = view.draw(&mut target);
    println!(
        "second frame: changed={changed}, canvases allocated={}",
        graphics.canvases_created()
    );
    assert!(!changed, "nothing moved, so nothing should be redrawn");

    let corner = view
        .element_coord_to_view_coord(icon, Point::ZERO)
        .unwrap();
    println!("icon's top-left corner lands at {corner:?} in the view");
}
