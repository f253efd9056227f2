// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gadget Events: immutable event values for the gadget element tree.
//!
//! ## Overview
//!
//! This crate describes the input that flows through a gadget view: mouse motion, clicks and
//! wheel turns, drag-and-drop, keyboard input, and a handful of generic notifications such as
//! focus changes.
//! It does not route anything by itself.
//! The element tree in `gadget_elements` walks its children and hands these values to the
//! element currently being asked to handle them, re-expressed in that element's local space.
//!
//! ## Results
//!
//! Every handler answers with an [`EventResult`](crate::types::EventResult):
//!
//! - `Unhandled`: the element did not claim the event; the caller may offer it elsewhere.
//! - `Handled`: the element claimed the event; propagation stops.
//! - `Canceled`: the element claimed the event and asks the host to skip its default handling.
//!
//! Results are ordered (`Unhandled < Handled < Canceled`) so combining two handler answers is a
//! plain `max`.
//!
//! ## Coordinates
//!
//! Positional events ([`MouseEvent`](crate::types::MouseEvent) and
//! [`DragEvent`](crate::types::DragEvent)) carry a [`kurbo::Point`].
//! A dispatcher never mutates an event; it derives a copy with
//! [`PositionEvent::with_position`](crate::types::PositionEvent::with_position) at each level.
//!
//! ## Over/out tracking
//!
//! [`HoverState`](crate::hover::HoverState) turns a changing "element under the pointer" into
//! the `out` then `over` notifications the view sends to the elements involved.
//!
//! ```
//! use gadget_events::hover::{HoverEvent, HoverState};
//! let mut h: HoverState<u32> = HoverState::new();
//! assert_eq!(h.update(Some(1)), vec![HoverEvent::Over(1)]);
//! assert_eq!(h.update(Some(2)), vec![HoverEvent::Out(1), HoverEvent::Over(2)]);
//! assert!(h.update(Some(2)).is_empty());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod hover;
pub mod types;

pub use types::{
    AnyEvent, DragEvent, Event, EventResult, EventType, KeyboardEvent, Modifiers, MouseButtons,
    MouseEvent, PositionEvent,
};
