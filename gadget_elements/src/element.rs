// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element state shared by every kind, and the capability trait kinds implement.

use core::any::Any;
use core::fmt::Debug;

use gadget_events::{DragEvent, Event, EventResult, KeyboardEvent, MouseEvent};
use kurbo::{Point, Size};

use crate::canvas::Canvas;
use crate::error::PropertyError;
use crate::geometry::PixelGeometry;
use crate::types::{ElementFlags, ElementId, Length, Owner};
use crate::view::EventContext;

/// Compare two element names under the crate's name policy.
///
/// ASCII case-insensitive by default; byte-for-byte with the `case_sensitive_names` feature.
pub fn names_match(a: &str, b: &str) -> bool {
    #[cfg(feature = "case_sensitive_names")]
    {
        a == b
    }
    #[cfg(not(feature = "case_sensitive_names"))]
    {
        a.eq_ignore_ascii_case(b)
    }
}

/// Behavior of one element kind (`img`, `button`, ...).
///
/// Every method has a default, so a kind implements only what it needs.
/// The shared state of the element is passed in as a [`BasicElement`]; a kind keeps only
/// its own state.
///
/// Event handlers receive an [`EventContext`] giving access to the whole view.
/// A handler may remove any element, including its own, through it.
pub trait Element: Any + Debug {
    /// Recompute content-dependent state before the element's geometry is resolved.
    fn layout(&mut self, _element: &BasicElement) {}

    /// Size used when width or height is not set.
    fn default_size(&self) -> Size {
        Size::ZERO
    }

    /// Draw the element's own content into `canvas`, which is sized to the element.
    ///
    /// Children are composited on top by the view.
    fn draw(&mut self, _element: &BasicElement, _canvas: &mut dyn Canvas) {}

    /// Whether the element occupies `point`, in local coordinates.
    fn is_point_in(&self, element: &BasicElement, point: Point) -> bool {
        element.bounds_contain(point)
    }

    /// Handle a mouse event delivered to this element.
    fn handle_mouse_event(
        &mut self,
        _cx: &mut EventContext<'_>,
        _event: &MouseEvent,
    ) -> EventResult {
        EventResult::Unhandled
    }

    /// Handle a keyboard event delivered to this element.
    fn handle_key_event(
        &mut self,
        _cx: &mut EventContext<'_>,
        _event: &KeyboardEvent,
    ) -> EventResult {
        EventResult::Unhandled
    }

    /// Handle a drag event. Only called on drop targets.
    fn handle_drag_event(&mut self, _cx: &mut EventContext<'_>, _event: &DragEvent) -> EventResult {
        EventResult::Unhandled
    }

    /// Handle a generic event such as a focus change.
    fn handle_other_event(&mut self, _cx: &mut EventContext<'_>, _event: &Event) -> EventResult {
        EventResult::Unhandled
    }

    /// Apply a kind-specific string property.
    fn set_property(&mut self, name: &str, _value: &str) -> Result<(), PropertyError> {
        Err(PropertyError::Unknown(name.to_owned()))
    }

    /// True if the element owns a child collection.
    fn has_children(&self) -> bool {
        false
    }

    /// True if a mouse press on the element should move keyboard focus to it.
    fn is_focusable(&self) -> bool {
        false
    }

    /// Alpha mask applied when compositing the element into its parent.
    fn mask(&self) -> Option<&dyn Canvas> {
        None
    }
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Dirty {
    pub(crate) position: bool,
    pub(crate) size: bool,
    pub(crate) redraw: bool,
}

/// State common to all elements: identity, placement, visibility and change tracking.
///
/// Placement is stored as [`Length`]s and resolved to [`PixelGeometry`] during layout,
/// against the parent's pixel size.
/// Pin percentages are relative to the element's own size.
#[derive(Clone, Debug)]
pub struct BasicElement {
    id: ElementId,
    tag_name: String,
    name: String,
    parent: Owner,
    x: Length,
    y: Length,
    pin_x: Length,
    pin_y: Length,
    width: Option<Length>,
    height: Option<Length>,
    rotation: f64,
    opacity: f64,
    flags: ElementFlags,
    pixel: PixelGeometry,
    pub(crate) dirty: Dirty,
}

impl BasicElement {
    pub(crate) fn new(id: ElementId, tag_name: &str, parent: Owner, name: &str) -> Self {
        Self {
            id,
            tag_name: tag_name.to_owned(),
            name: name.to_owned(),
            parent,
            x: Length::default(),
            y: Length::default(),
            pin_x: Length::default(),
            pin_y: Length::default(),
            width: None,
            height: None,
            rotation: 0.0,
            opacity: 1.0,
            flags: ElementFlags::default(),
            pixel: PixelGeometry::default(),
            dirty: Dirty {
                position: true,
                size: true,
                redraw: true,
            },
        }
    }

    /// The element's id.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Tag name the element was created with.
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Name; empty if unnamed.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The collection owner this element belongs to.
    pub fn parent(&self) -> Owner {
        self.parent
    }

    /// Declared x.
    pub fn x(&self) -> Length {
        self.x
    }

    /// Declared y.
    pub fn y(&self) -> Length {
        self.y
    }

    /// Declared pin x.
    pub fn pin_x(&self) -> Length {
        self.pin_x
    }

    /// Declared pin y.
    pub fn pin_y(&self) -> Length {
        self.pin_y
    }

    /// Declared width; `None` falls back to the default size.
    pub fn width(&self) -> Option<Length> {
        self.width
    }

    /// Declared height; `None` falls back to the default size.
    pub fn height(&self) -> Option<Length> {
        self.height
    }

    /// Rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Opacity in `[0, 1]`.
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Flags.
    pub fn flags(&self) -> ElementFlags {
        self.flags
    }

    /// Visible flag.
    pub fn is_visible(&self) -> bool {
        self.flags.contains(ElementFlags::VISIBLE)
    }

    /// Enabled flag.
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(ElementFlags::ENABLED)
    }

    /// Drop target flag.
    pub fn is_drop_target(&self) -> bool {
        self.flags.contains(ElementFlags::DROP_TARGET)
    }

    /// Geometry resolved by the last layout.
    pub fn pixel(&self) -> &PixelGeometry {
        &self.pixel
    }

    /// Resolved size.
    pub fn pixel_size(&self) -> Size {
        self.pixel.size()
    }

    /// True if the resolved position, pin or rotation changed since the parent last composited.
    pub fn is_position_changed(&self) -> bool {
        self.dirty.position
    }

    /// True if the resolved size changed since the element last drew.
    pub fn is_size_changed(&self) -> bool {
        self.dirty.size
    }

    /// Base hit test: the half-open local box `[0, w) x [0, h)`.
    pub fn bounds_contain(&self, p: Point) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.pixel.width && p.y < self.pixel.height
    }

    pub(crate) fn set_name(&mut self, name: &str) -> bool {
        if self.name == name {
            return false;
        }
        name.clone_into(&mut self.name);
        true
    }

    pub(crate) fn set_x(&mut self, v: Length) -> bool {
        replace(&mut self.x, v)
    }

    pub(crate) fn set_y(&mut self, v: Length) -> bool {
        replace(&mut self.y, v)
    }

    pub(crate) fn set_pin_x(&mut self, v: Length) -> bool {
        replace(&mut self.pin_x, v)
    }

    pub(crate) fn set_pin_y(&mut self, v: Length) -> bool {
        replace(&mut self.pin_y, v)
    }

    pub(crate) fn set_width(&mut self, v: Option<Length>) -> bool {
        replace(&mut self.width, v)
    }

    pub(crate) fn set_height(&mut self, v: Option<Length>) -> bool {
        replace(&mut self.height, v)
    }

    pub(crate) fn set_rotation(&mut self, degrees: f64) -> bool {
        replace(&mut self.rotation, degrees)
    }

    pub(crate) fn set_opacity(&mut self, opacity: f64) -> bool {
        replace(&mut self.opacity, opacity)
    }

    pub(crate) fn set_flag(&mut self, flag: ElementFlags, on: bool) -> bool {
        if self.flags.contains(flag) == on {
            return false;
        }
        self.flags.set(flag, on);
        true
    }

    /// Resolve declared geometry against the parent's pixel size.
    ///
    /// Sets the position/size dirty flags when the resolved values move.
    pub(crate) fn resolve_geometry(&mut self, parent: Size, default_size: Size) {
        let width = self
            .width
            .map_or(default_size.width, |w| w.resolve(parent.width))
            .max(0.0);
        let height = self
            .height
            .map_or(default_size.height, |h| h.resolve(parent.height))
            .max(0.0);
        let next = PixelGeometry {
            x: self.x.resolve(parent.width),
            y: self.y.resolve(parent.height),
            pin_x: self.pin_x.resolve(width),
            pin_y: self.pin_y.resolve(height),
            width,
            height,
            rotation: self.rotation,
        };
        let old = self.pixel;
        if next.width != old.width || next.height != old.height {
            self.dirty.size = true;
        }
        if next.x != old.x
            || next.y != old.y
            || next.pin_x != old.pin_x
            || next.pin_y != old.pin_y
            || next.rotation != old.rotation
        {
            self.dirty.position = true;
        }
        self.pixel = next;
    }

    /// Apply one of the shared properties.
    ///
    /// Returns whether anything changed, or [`PropertyError::Unknown`] for names the kind
    /// should handle instead.
    pub(crate) fn apply_property(&mut self, name: &str, value: &str) -> Result<bool, PropertyError> {
        let changed = match name {
            "name" => self.set_name(value),
            "x" => self.set_x(parse_length(name, value)?),
            "y" => self.set_y(parse_length(name, value)?),
            "pinX" => self.set_pin_x(parse_length(name, value)?),
            "pinY" => self.set_pin_y(parse_length(name, value)?),
            "width" => self.set_width(parse_extent(name, value)?),
            "height" => self.set_height(parse_extent(name, value)?),
            "rotation" => self.set_rotation(parse_number(name, value)?),
            "opacity" => {
                let v = parse_number(name, value)?;
                if !(0.0..=1.0).contains(&v) {
                    return Err(PropertyError::invalid(name, value));
                }
                self.set_opacity(v)
            }
            "visible" => self.set_flag(ElementFlags::VISIBLE, parse_bool(name, value)?),
            "enabled" => self.set_flag(ElementFlags::ENABLED, parse_bool(name, value)?),
            "dropTarget" => self.set_flag(ElementFlags::DROP_TARGET, parse_bool(name, value)?),
            _ => return Err(PropertyError::Unknown(name.to_owned())),
        };
        Ok(changed)
    }
}

fn replace<T: PartialEq>(slot: &mut T, v: T) -> bool {
    if *slot == v {
        return false;
    }
    *slot = v;
    true
}

pub(crate) fn parse_number(name: &str, value: &str) -> Result<f64, PropertyError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PropertyError::invalid(name, value))
}

pub(crate) fn parse_bool(name: &str, value: &str) -> Result<bool, PropertyError> {
    let v = value.trim();
    if v.eq_ignore_ascii_case("true") || v == "1" {
        Ok(true)
    } else if v.eq_ignore_ascii_case("false") || v == "0" {
        Ok(false)
    } else {
        Err(PropertyError::invalid(name, value))
    }
}

fn parse_length(name: &str, value: &str) -> Result<Length, PropertyError> {
    Length::parse(value).ok_or_else(|| PropertyError::invalid(name, value))
}

// Width and height: empty resets to the default size; negative values are rejected.
fn parse_extent(name: &str, value: &str) -> Result<Option<Length>, PropertyError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    let len = parse_length(name, value)?;
    if len.is_negative() {
        return Err(PropertyError::invalid(name, value));
    }
    Ok(Some(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element() -> BasicElement {
        BasicElement::new(ElementId::new(0, 1), "div", Owner::Root, "e")
    }

    #[test]
    fn percent_geometry_resolves_against_parent_and_self() {
        let mut e = element();
        e.set_x(Length::Percent(50.0));
        e.set_width(Some(Length::Percent(25.0)));
        e.set_height(Some(Length::Pixels(10.0)));
        e.set_pin_x(Length::Percent(50.0));
        e.resolve_geometry(Size::new(200.0, 100.0), Size::ZERO);
        let p = e.pixel();
        assert_eq!((p.x, p.width, p.pin_x, p.height), (100.0, 50.0, 25.0, 10.0));
    }

    #[test]
    fn default_size_fills_unset_extent() {
        let mut e = element();
        e.resolve_geometry(Size::new(10.0, 10.0), Size::new(33.0, 44.0));
        assert_eq!(e.pixel_size(), Size::new(33.0, 44.0));
    }

    #[test]
    fn dirty_flags_follow_resolved_values() {
        let mut e = element();
        e.resolve_geometry(Size::new(100.0, 100.0), Size::new(5.0, 5.0));
        e.dirty.position = false;
        e.dirty.size = false;
        // Same inputs, same outputs: nothing marked.
        e.resolve_geometry(Size::new(100.0, 100.0), Size::new(5.0, 5.0));
        assert!(!e.is_position_changed() && !e.is_size_changed());
        e.set_y(Length::Pixels(3.0));
        e.resolve_geometry(Size::new(100.0, 100.0), Size::new(5.0, 5.0));
        assert!(e.is_position_changed() && !e.is_size_changed());
        e.resolve_geometry(Size::new(100.0, 100.0), Size::new(6.0, 5.0));
        assert!(e.is_size_changed());
    }

    #[test]
    fn bounds_are_half_open() {
        let mut e = element();
        e.resolve_geometry(Size::ZERO, Size::new(10.0, 10.0));
        assert!(e.bounds_contain(Point::new(0.0, 0.0)));
        assert!(e.bounds_contain(Point::new(9.99, 9.99)));
        assert!(!e.bounds_contain(Point::new(10.0, 5.0)));
        assert!(!e.bounds_contain(Point::new(-0.1, 5.0)));
    }

    #[test]
    fn property_validation() {
        let mut e = element();
        assert_eq!(e.apply_property("x", "12"), Ok(true));
        assert_eq!(e.apply_property("x", "12"), Ok(false));
        assert_eq!(e.apply_property("width", "50%"), Ok(true));
        assert_eq!(e.width(), Some(Length::Percent(50.0)));
        assert_eq!(e.apply_property("width", ""), Ok(true));
        assert_eq!(e.width(), None);
        assert_eq!(
            e.apply_property("height", "-1"),
            Err(PropertyError::invalid("height", "-1"))
        );
        assert!(e.apply_property("rotation", "NaN").is_err());
        assert!(e.apply_property("opacity", "1.5").is_err());
        assert_eq!(e.apply_property("opacity", "0.5"), Ok(true));
        assert_eq!(e.apply_property("visible", "FALSE"), Ok(true));
        assert!(!e.is_visible());
        assert!(e.apply_property("enabled", "maybe").is_err());
        assert_eq!(e.apply_property("dropTarget", "1"), Ok(true));
        assert!(e.is_drop_target());
        assert_eq!(
            e.apply_property("src", "a.png"),
            Err(PropertyError::Unknown("src".into()))
        );
    }

    #[test]
    fn name_policy() {
        assert!(names_match("abc", "abc"));
        #[cfg(not(feature = "case_sensitive_names"))]
        assert!(names_match("Top", "tOP"));
        #[cfg(feature = "case_sensitive_names")]
        assert!(!names_match("Top", "tOP"));
        assert!(!names_match("top", "topper"));
    }
}
