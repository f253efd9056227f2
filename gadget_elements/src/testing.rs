// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixtures shared by the view and collection tests.

use std::cell::RefCell;
use std::rc::Rc;

use gadget_events::{
    DragEvent, Event, EventResult, EventType, KeyboardEvent, Modifiers, MouseButtons, MouseEvent,
};
use kurbo::{Point, Rect};

use crate::canvas::Canvas;
use crate::canvas::recording::{RecordingCanvas, RecordingGraphics};
use crate::element::{BasicElement, Element};
use crate::factory::ElementFactory;
use crate::types::{Color, ElementId, Length, Owner};
use crate::view::{EventContext, View, ViewConfig, ViewHost};

pub(crate) type EventLog = Rc<RefCell<Vec<String>>>;

/// A filled rectangle that logs every event it receives as `"<name> <kind>"`.
#[derive(Debug)]
pub(crate) struct RectElement {
    log: EventLog,
    handles: bool,
    focusable: bool,
    children: bool,
    mask: Option<RecordingCanvas>,
}

impl RectElement {
    fn record(&self, cx: &EventContext<'_>, kind: EventType) {
        let name = cx.element().map(|e| e.name().to_owned()).unwrap_or_default();
        self.log.borrow_mut().push(format!("{name} {kind:?}"));
    }

    fn answer(&self) -> EventResult {
        if self.handles {
            EventResult::Handled
        } else {
            EventResult::Unhandled
        }
    }
}

impl Element for RectElement {
    fn draw(&mut self, element: &BasicElement, canvas: &mut dyn Canvas) {
        let size = element.pixel_size();
        canvas.fill_rect(Rect::new(0.0, 0.0, size.width, size.height), Color::BLACK);
    }

    fn handle_mouse_event(&mut self, cx: &mut EventContext<'_>, event: &MouseEvent) -> EventResult {
        self.record(cx, event.kind());
        match event.kind() {
            EventType::MouseDown | EventType::MouseUp | EventType::Click => self.answer(),
            _ => EventResult::Unhandled,
        }
    }

    fn handle_key_event(&mut self, cx: &mut EventContext<'_>, event: &KeyboardEvent) -> EventResult {
        self.record(cx, event.kind());
        self.answer()
    }

    fn handle_drag_event(&mut self, cx: &mut EventContext<'_>, event: &DragEvent) -> EventResult {
        self.record(cx, event.kind());
        self.answer()
    }

    fn handle_other_event(&mut self, cx: &mut EventContext<'_>, event: &Event) -> EventResult {
        self.record(cx, event.kind());
        EventResult::Unhandled
    }

    fn has_children(&self) -> bool {
        self.children
    }

    fn is_focusable(&self) -> bool {
        self.focusable
    }

    fn mask(&self) -> Option<&dyn Canvas> {
        self.mask.as_ref().map(|m| m as &dyn Canvas)
    }
}

/// A view with the built-in kinds plus test kinds:
///
/// - `rect`: handles button events.
/// - `field`: like `rect`, and takes focus.
/// - `pane`: a container that handles nothing.
/// - `masked`: like `rect`, composited through a mask.
pub(crate) struct Fixture {
    pub(crate) view: View,
    pub(crate) log: EventLog,
    pub(crate) graphics: RecordingGraphics,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        let log = EventLog::default();
        let mut factory = ElementFactory::with_builtin_elements();
        let kinds: [(&str, bool, bool, bool, bool); 4] = [
            ("rect", true, false, false, false),
            ("field", true, true, false, false),
            ("pane", false, false, true, false),
            ("masked", true, false, false, true),
        ];
        for (tag, handles, focusable, children, masked) in kinds {
            let log = log.clone();
            factory
                .register(tag, move || {
                    Box::new(RectElement {
                        log: log.clone(),
                        handles,
                        focusable,
                        children,
                        mask: masked.then(|| RecordingCanvas::new(4, 4)),
                    })
                })
                .unwrap();
        }
        let graphics = RecordingGraphics::new();
        let view = View::new(factory, graphics.clone(), ViewConfig::default());
        Self {
            view,
            log,
            graphics,
        }
    }

    /// Same as [`Fixture::new`], reporting to `host`.
    pub(crate) fn with_host(host: impl ViewHost + 'static) -> Self {
        let Self {
            view,
            log,
            graphics,
        } = Self::new();
        Self {
            view: view.with_host(host),
            log,
            graphics,
        }
    }

    /// Append a `tag` element to `owner` at `(x, y)` with size `w` by `h`.
    pub(crate) fn add(
        &mut self,
        owner: impl Into<Owner>,
        tag: &str,
        name: &str,
        [x, y, w, h]: [f64; 4],
    ) -> ElementId {
        let id = self
            .view
            .children_mut(owner)
            .and_then(|mut c| c.append_element(tag, name))
            .unwrap();
        self.view
            .element_mut(id)
            .unwrap()
            .set_position(Length::Pixels(x), Length::Pixels(y))
            .set_size(Some(Length::Pixels(w)), Some(Length::Pixels(h)));
        id
    }

    /// Drain the event log.
    pub(crate) fn events(&self) -> Vec<String> {
        self.log.borrow_mut().drain(..).collect()
    }

    /// Lay out and draw into a fresh view-sized target.
    pub(crate) fn frame(&mut self) -> (bool, RecordingCanvas) {
        self.view.layout();
        let mut target = RecordingCanvas::new(320, 240);
        let changed = self.view.draw(&mut target);
        (changed, target)
    }

    /// Id of the cached surface of `id`, if it has one.
    pub(crate) fn surface_id(&self, id: ElementId) -> Option<u64> {
        let canvas = self.view.slot(id)?.canvas.as_deref()?;
        Some(RecordingCanvas::from_canvas(canvas)?.id())
    }

    /// The composited surface of `owner`'s children.
    pub(crate) fn children_surface(&self, owner: impl Into<Owner>) -> Option<&RecordingCanvas> {
        RecordingCanvas::from_canvas(self.view.children(owner)?.surface()?)
    }
}

/// A mouse event in view coordinates; button events carry the left button.
pub(crate) fn mouse(kind: EventType, x: f64, y: f64) -> MouseEvent {
    let buttons = match kind {
        EventType::MouseDown | EventType::MouseUp | EventType::Click => MouseButtons::LEFT,
        _ => MouseButtons::empty(),
    };
    MouseEvent::new(kind, Point::new(x, y), buttons, Modifiers::empty())
}

/// A drag event in view coordinates.
pub(crate) fn drag(kind: EventType, x: f64, y: f64) -> DragEvent {
    DragEvent::new(kind, Point::new(x, y), vec!["file.txt".to_owned()])
}
