// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types: event kinds, handler results, and the event values themselves.
//!
//! ## Overview
//!
//! Event values are immutable once built.
//! Positional events expose [`PositionEvent::with_position`] so a dispatcher can hand each level
//! of the tree a copy expressed in that level's coordinates.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Vec2};

/// Outcome of offering an event to a handler.
///
/// Ordered so that combining two answers is `max`: a `Canceled` answer wins over `Handled`,
/// which wins over `Unhandled`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum EventResult {
    /// The handler did not claim the event.
    #[default]
    Unhandled,
    /// The handler claimed the event.
    Handled,
    /// The handler claimed the event and asks the host to skip its default processing.
    Canceled,
}

impl EventResult {
    /// True for `Handled` and `Canceled`.
    pub const fn is_handled(self) -> bool {
        !matches!(self, Self::Unhandled)
    }
}

/// Kinds of events understood by the element tree.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EventType {
    /// A mouse button was pressed.
    MouseDown,
    /// A mouse button was released.
    MouseUp,
    /// Left-button click.
    Click,
    /// Left-button double click.
    DblClick,
    /// Right-button click.
    RClick,
    /// Right-button double click.
    RDblClick,
    /// Pointer moved.
    MouseMove,
    /// Pointer entered an element (or the view).
    MouseOver,
    /// Pointer left an element (or the view).
    MouseOut,
    /// Wheel turned.
    MouseWheel,
    /// Key pressed.
    KeyDown,
    /// Key released.
    KeyUp,
    /// Character input.
    KeyPress,
    /// A drag entered an element (or the view).
    DragOver,
    /// A drag left an element (or the view).
    DragOut,
    /// A drag moved.
    DragMotion,
    /// A drag was dropped.
    DragDrop,
    /// Keyboard focus arrived.
    FocusIn,
    /// Keyboard focus left.
    FocusOut,
}

impl EventType {
    /// True for the mouse family, including over/out and wheel.
    pub const fn is_mouse(self) -> bool {
        matches!(
            self,
            Self::MouseDown
                | Self::MouseUp
                | Self::Click
                | Self::DblClick
                | Self::RClick
                | Self::RDblClick
                | Self::MouseMove
                | Self::MouseOver
                | Self::MouseOut
                | Self::MouseWheel
        )
    }

    /// True for key down/up/press.
    pub const fn is_key(self) -> bool {
        matches!(self, Self::KeyDown | Self::KeyUp | Self::KeyPress)
    }

    /// True for the drag family.
    pub const fn is_drag(self) -> bool {
        matches!(
            self,
            Self::DragOver | Self::DragOut | Self::DragMotion | Self::DragDrop
        )
    }
}

bitflags::bitflags! {
    /// Mouse buttons held (or changed) during a mouse event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MouseButtons: u8 {
        /// Primary button.
        const LEFT   = 0b0000_0001;
        /// Secondary button.
        const RIGHT  = 0b0000_0010;
        /// Middle button.
        const MIDDLE = 0b0000_0100;
    }
}

bitflags::bitflags! {
    /// Keyboard modifiers held during an event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT   = 0b0000_0001;
        /// Control.
        const CONTROL = 0b0000_0010;
        /// Alt / Option.
        const ALT     = 0b0000_0100;
        /// Meta / Command.
        const META    = 0b0000_1000;
    }
}

/// Events that carry a position in the coordinate space of their current receiver.
pub trait PositionEvent: Sized {
    /// Position in the receiver's local coordinates.
    fn position(&self) -> Point;

    /// A copy of this event positioned at `position`.
    fn with_position(&self, position: Point) -> Self;
}

/// A generic event with no payload beyond its kind (focus changes and the like).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Event {
    kind: EventType,
}

impl Event {
    /// Create a generic event.
    pub const fn new(kind: EventType) -> Self {
        Self { kind }
    }

    /// Event kind.
    pub const fn kind(&self) -> EventType {
        self.kind
    }
}

/// Mouse motion, button, click and wheel events.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MouseEvent {
    kind: EventType,
    position: Point,
    buttons: MouseButtons,
    wheel_delta: Vec2,
    modifiers: Modifiers,
}

impl MouseEvent {
    /// Create a mouse event at `position` with the given buttons and modifiers.
    pub fn new(
        kind: EventType,
        position: Point,
        buttons: MouseButtons,
        modifiers: Modifiers,
    ) -> Self {
        debug_assert!(kind.is_mouse(), "{kind:?} is not a mouse event type");
        Self {
            kind,
            position,
            buttons,
            wheel_delta: Vec2::ZERO,
            modifiers,
        }
    }

    /// Create a wheel event.
    pub fn wheel(position: Point, delta: Vec2, modifiers: Modifiers) -> Self {
        Self {
            kind: EventType::MouseWheel,
            position,
            buttons: MouseButtons::empty(),
            wheel_delta: delta,
            modifiers,
        }
    }

    /// A copy of this event with a different kind, keeping position and buttons.
    ///
    /// Used by the view to synthesize over/out notifications from a move.
    pub fn with_kind(&self, kind: EventType) -> Self {
        Self { kind, ..*self }
    }

    /// Event kind.
    pub const fn kind(&self) -> EventType {
        self.kind
    }

    /// Buttons involved.
    pub const fn buttons(&self) -> MouseButtons {
        self.buttons
    }

    /// Wheel delta; zero for non-wheel events.
    pub const fn wheel_delta(&self) -> Vec2 {
        self.wheel_delta
    }

    /// Modifier keys.
    pub const fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

impl PositionEvent for MouseEvent {
    fn position(&self) -> Point {
        self.position
    }

    fn with_position(&self, position: Point) -> Self {
        Self { position, ..*self }
    }
}

/// Keyboard events.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyboardEvent {
    kind: EventType,
    key_code: u32,
    modifiers: Modifiers,
}

impl KeyboardEvent {
    /// Create a keyboard event.
    pub fn new(kind: EventType, key_code: u32, modifiers: Modifiers) -> Self {
        debug_assert!(kind.is_key(), "{kind:?} is not a keyboard event type");
        Self {
            kind,
            key_code,
            modifiers,
        }
    }

    /// Event kind.
    pub const fn kind(&self) -> EventType {
        self.kind
    }

    /// Key code (or character code for `KeyPress`).
    pub const fn key_code(&self) -> u32 {
        self.key_code
    }

    /// Modifier keys.
    pub const fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

/// Drag-and-drop events.
#[derive(Clone, Debug, PartialEq)]
pub struct DragEvent {
    kind: EventType,
    position: Point,
    files: Vec<String>,
}

impl DragEvent {
    /// Create a drag event carrying the dragged file names.
    pub fn new(kind: EventType, position: Point, files: Vec<String>) -> Self {
        debug_assert!(kind.is_drag(), "{kind:?} is not a drag event type");
        Self {
            kind,
            position,
            files,
        }
    }

    /// A copy of this event with a different kind.
    pub fn with_kind(&self, kind: EventType) -> Self {
        Self {
            kind,
            position: self.position,
            files: self.files.clone(),
        }
    }

    /// Event kind.
    pub const fn kind(&self) -> EventType {
        self.kind
    }

    /// Names of the dragged files.
    pub fn files(&self) -> &[String] {
        &self.files
    }
}

impl PositionEvent for DragEvent {
    fn position(&self) -> Point {
        self.position
    }

    fn with_position(&self, position: Point) -> Self {
        Self {
            kind: self.kind,
            position,
            files: self.files.clone(),
        }
    }
}

/// A borrowed event of any family, as seen by event listeners.
#[derive(Copy, Clone, Debug)]
pub enum AnyEvent<'a> {
    /// Generic event.
    Generic(&'a Event),
    /// Mouse event.
    Mouse(&'a MouseEvent),
    /// Keyboard event.
    Key(&'a KeyboardEvent),
    /// Drag event.
    Drag(&'a DragEvent),
}

impl AnyEvent<'_> {
    /// Kind of the wrapped event.
    pub fn kind(&self) -> EventType {
        match self {
            Self::Generic(e) => e.kind(),
            Self::Mouse(e) => e.kind(),
            Self::Key(e) => e.kind(),
            Self::Drag(e) => e.kind(),
        }
    }

    /// Position for positional events.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::Mouse(e) => Some(e.position()),
            Self::Drag(e) => Some(e.position()),
            Self::Generic(_) | Self::Key(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn results_combine_with_max() {
        assert!(EventResult::Canceled > EventResult::Handled);
        assert!(EventResult::Handled > EventResult::Unhandled);
        assert_eq!(
            EventResult::Unhandled.max(EventResult::Handled),
            EventResult::Handled
        );
        assert_eq!(
            EventResult::Canceled.max(EventResult::Handled),
            EventResult::Canceled
        );
        assert!(!EventResult::Unhandled.is_handled());
        assert!(EventResult::Canceled.is_handled());
    }

    #[test]
    fn with_position_keeps_everything_else() {
        let e = MouseEvent::new(
            EventType::MouseDown,
            Point::new(10.0, 20.0),
            MouseButtons::LEFT,
            Modifiers::SHIFT,
        );
        let moved = e.with_position(Point::new(1.0, 2.0));
        assert_eq!(moved.position(), Point::new(1.0, 2.0));
        assert_eq!(moved.kind(), EventType::MouseDown);
        assert_eq!(moved.buttons(), MouseButtons::LEFT);
        assert_eq!(moved.modifiers(), Modifiers::SHIFT);
        // The original is untouched.
        assert_eq!(e.position(), Point::new(10.0, 20.0));
    }

    #[test]
    fn wheel_carries_delta() {
        let e = MouseEvent::wheel(Point::ZERO, Vec2::new(0.0, -120.0), Modifiers::empty());
        assert_eq!(e.kind(), EventType::MouseWheel);
        assert_eq!(e.wheel_delta(), Vec2::new(0.0, -120.0));
        assert!(e.buttons().is_empty());
    }

    #[test]
    fn drag_event_keeps_files_across_copies() {
        let e = DragEvent::new(
            EventType::DragMotion,
            Point::new(5.0, 5.0),
            vec!["a.txt".to_string()],
        );
        let c = e.with_position(Point::new(1.0, 1.0)).with_kind(EventType::DragDrop);
        assert_eq!(c.files(), &["a.txt".to_string()]);
        assert_eq!(c.kind(), EventType::DragDrop);
        assert_eq!(c.position(), Point::new(1.0, 1.0));
    }

    #[test]
    fn event_families() {
        assert!(EventType::MouseOver.is_mouse());
        assert!(!EventType::MouseOver.is_drag());
        assert!(EventType::DragMotion.is_drag());
        assert!(EventType::KeyPress.is_key());
        assert!(!EventType::FocusIn.is_mouse());
        let ev = Event::new(EventType::FocusIn);
        let any = AnyEvent::Generic(&ev);
        assert_eq!(any.kind(), EventType::FocusIn);
        assert_eq!(any.position(), None);
    }
}
