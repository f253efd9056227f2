// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gadget Elements: a retained-mode element tree for desktop gadgets.
//!
//! A gadget is a small, layered picture made of elements: images, buttons, labels and
//! containers, each placed by a pin inside its parent and optionally rotated about it.
//! This crate owns that tree and does four things with it:
//!
//! - Keeps ordered sibling collections where insertion order is z-order.
//! - Resolves declared geometry (pixels or percentages of the parent) to pixels.
//! - Composites every element into a cached off-screen surface and redraws only what changed.
//! - Routes pointer, drag and keyboard input to the topmost element that wants it, in that
//!   element's local coordinates.
//!
//! Handlers may restructure the tree while an event is being dispatched, including removing
//! the very element whose handler is running.
//! The dispatcher watches each element it hands an event to through a [`DeathDetector`] and
//! stops cleanly when the element disappears.
//!
//! ## API overview
//!
//! - [`View`]: owns the element arena, the top-level collection, and view-wide state such as
//!   focus, popup and the element under the pointer.
//! - [`Elements`] / [`ElementsMut`]: one sibling collection, read-only and mutating.
//! - [`BasicElement`]: state every element shares; [`ElementMut`] changes it.
//! - [`Element`]: the trait element kinds implement. Built-in kinds live in [`kinds`].
//! - [`ElementFactory`]: maps tag names to kind constructors.
//! - [`canvas`]: the drawing contract ([`canvas::Canvas`], [`canvas::Graphics`],
//!   [`canvas::Image`]) plus a recording backend.
//! - [`geometry`]: pin/rotation transforms between parent and child coordinates.
//!
//! ## Minimal usage
//!
//! ```
//! use gadget_elements::canvas::recording::{RecordingCanvas, RecordingGraphics};
//! use gadget_elements::{ElementFactory, Length, Owner, View, ViewConfig};
//! use gadget_events::{EventResult, EventType, Modifiers, MouseButtons, MouseEvent};
//! use kurbo::Point;
//!
//! let mut view = View::new(
//!     ElementFactory::with_builtin_elements(),
//!     RecordingGraphics::new(),
//!     ViewConfig::default(),
//! );
//!
//! let panel = view
//!     .children_mut(Owner::Root)
//!     .and_then(|mut root| root.append_element("div", "panel"))
//!     .unwrap();
//! view.element_mut(panel)
//!     .unwrap()
//!     .set_position(Length::Pixels(10.0), Length::Pixels(10.0))
//!     .set_size(Some(Length::Pixels(100.0)), Some(Length::Percent(50.0)));
//! view.connect(panel, EventType::MouseDown, |_, _| EventResult::Handled);
//!
//! view.layout();
//! assert_eq!(view.element(panel).unwrap().pixel_size().height, 120.0);
//!
//! let mut target = RecordingCanvas::new(320, 240);
//! assert!(view.draw(&mut target));
//!
//! let down = MouseEvent::new(
//!     EventType::MouseDown,
//!     Point::new(50.0, 50.0),
//!     MouseButtons::LEFT,
//!     Modifiers::empty(),
//! );
//! assert_eq!(view.on_mouse_event(&down), EventResult::Handled);
//! assert_eq!(view.mouse_over_element(), Some(panel));
//! ```
//!
//! ## Names
//!
//! Element names are compared ASCII case-insensitively.
//! Enable the `case_sensitive_names` feature for byte-for-byte comparison.

pub mod canvas;
pub mod geometry;
pub mod kinds;

mod element;
mod elements;
mod error;
mod factory;
mod guard;
mod types;
mod view;

#[cfg(test)]
mod testing;

pub use element::{BasicElement, Element, names_match};
pub use elements::{DispatchOutcome, Elements, ElementsMut};
pub use error::{FactoryError, PropertyError};
pub use factory::ElementFactory;
pub use guard::{DeathDetector, Watch};
pub use types::{Color, ElementFlags, ElementId, Length, Owner};
pub use view::{ElementMut, EventContext, NullHost, View, ViewConfig, ViewHost};

pub use gadget_events;
