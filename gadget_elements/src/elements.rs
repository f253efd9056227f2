// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered sibling collections: z-order, lifetime, compositing and hit dispatch.
//!
//! Insertion order is z-order: index `0` is at the back.
//! Compositing walks children front to back in that order; hit testing walks them in reverse
//! so the topmost element under the pointer is asked first.

use core::mem;

use gadget_events::{AnyEvent, DragEvent, EventResult, EventType, MouseEvent, PositionEvent};
use kurbo::{Point, Rect, Size};

use crate::canvas::{Canvas, apply_child_transform, pixel_dimension};
use crate::element::names_match;
use crate::geometry::PixelGeometry;
use crate::types::{Color, ElementId, Owner};
use crate::view::{View, node_mut};

/// Result of dispatching a positional event into a collection or element.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Combined handler result.
    pub result: EventResult,
    /// The element whose handlers claimed the event, if it is still alive.
    pub fired: Option<ElementId>,
    /// The innermost element found under the point, if it is still alive.
    pub in_element: Option<ElementId>,
}

impl DispatchOutcome {
    // Handlers may have destroyed anything; never hand out a dead id.
    fn revalidated(self, view: &View) -> Self {
        Self {
            result: self.result,
            fired: self.fired.filter(|&id| view.is_alive(id)),
            in_element: self.in_element.filter(|&id| view.is_alive(id)),
        }
    }
}

/// The children of one element, or the top level of a view.
///
/// Reading is done through [`View::children`]; mutation through [`ElementsMut`].
pub struct Elements {
    pub(crate) children: Vec<ElementId>,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) canvas: Option<Box<dyn Canvas>>,
    pub(crate) count_changed: bool,
    pub(crate) has_popup: bool,
    pub(crate) scrollable: bool,
}

impl Default for Elements {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Elements {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Elements")
            .field("children", &self.children)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("scrollable", &self.scrollable)
            .field("count_changed", &self.count_changed)
            .finish_non_exhaustive()
    }
}

impl Elements {
    pub(crate) fn new() -> Self {
        Self {
            children: Vec::new(),
            width: 0.0,
            height: 0.0,
            canvas: None,
            count_changed: true,
            has_popup: false,
            scrollable: false,
        }
    }

    /// Number of children.
    pub fn count(&self) -> usize {
        self.children.len()
    }

    /// True if there are no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child at `index` in z-order.
    pub fn item_by_index(&self, index: usize) -> Option<ElementId> {
        self.children.get(index).copied()
    }

    /// Children back to front.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = ElementId> + '_ {
        self.children.iter().copied()
    }

    /// Pixel extent computed by the last layout.
    pub fn extent(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// True if the extent follows the children rather than the owner.
    pub fn is_scrollable(&self) -> bool {
        self.scrollable
    }

    /// The composited surface from the last draw; `None` when there is nothing to show.
    pub fn surface(&self) -> Option<&dyn Canvas> {
        if self.children.is_empty() {
            return None;
        }
        self.canvas.as_deref()
    }
}

/// Mutating handle on one collection of a [`View`].
#[derive(Debug)]
pub struct ElementsMut<'a> {
    view: &'a mut View,
    owner: Owner,
}

impl<'a> ElementsMut<'a> {
    pub(crate) fn new(view: &'a mut View, owner: Owner) -> Self {
        Self { view, owner }
    }
}

impl ElementsMut<'_> {
    /// Owner of the collection.
    pub fn owner(&self) -> Owner {
        self.owner
    }

    /// Read access to the collection.
    pub fn get(&self) -> Option<&Elements> {
        self.view.elements(self.owner)
    }

    /// Number of children.
    pub fn count(&self) -> usize {
        self.get().map_or(0, Elements::count)
    }

    /// Child at `index` in z-order.
    pub fn item_by_index(&self, index: usize) -> Option<ElementId> {
        self.get()?.item_by_index(index)
    }

    /// First child whose name matches; `None` for an empty name.
    pub fn item_by_name(&self, name: &str) -> Option<ElementId> {
        self.view.item_by_name(self.owner, name)
    }

    /// Create an element with `tag` and add it on top.
    ///
    /// Returns `None` if the tag is unknown or the host vetoes the addition.
    pub fn append_element(&mut self, tag: &str, name: &str) -> Option<ElementId> {
        self.insert_element(tag, None, name)
    }

    /// Create an element with `tag` and add it right below `before`.
    ///
    /// If `before` is `None` or not a child of this collection, the element goes on top.
    pub fn insert_element(
        &mut self,
        tag: &str,
        before: Option<ElementId>,
        name: &str,
    ) -> Option<ElementId> {
        self.get()?;
        let id = self.view.create_element(tag, self.owner, name)?;
        let Some(elements) = self.view.elements_mut(self.owner) else {
            self.view.destroy_element(id);
            return None;
        };
        let at = before
            .and_then(|b| elements.children.iter().position(|&c| c == b))
            .unwrap_or(elements.children.len());
        elements.children.insert(at, id);
        elements.count_changed = true;
        self.view.request_redraw();
        Some(id)
    }

    /// Destroy `id` if it is a direct child.
    ///
    /// Returns false, and does nothing, otherwise.
    pub fn remove_element(&mut self, id: ElementId) -> bool {
        if !self.get().is_some_and(|e| e.children.contains(&id)) {
            return false;
        }
        self.view.destroy_element(id);
        if let Some(elements) = self.view.elements_mut(self.owner) {
            elements.children.retain(|&c| c != id);
            elements.count_changed = true;
        }
        self.view.request_redraw();
        true
    }

    /// Destroy every child.
    pub fn remove_all_elements(&mut self) {
        let Some(children) = self.get().map(|e| e.children.clone()) else {
            return;
        };
        for child in children {
            self.view.destroy_element(child);
        }
        if let Some(elements) = self.view.elements_mut(self.owner) {
            elements.children.clear();
            elements.count_changed = true;
        }
        self.view.request_redraw();
    }

    /// Size the surface to the children's extent (`true`) or to the owner (`false`).
    pub fn set_scrollable(&mut self, scrollable: bool) {
        if let Some(elements) = self.view.elements_mut(self.owner)
            && elements.scrollable != scrollable
        {
            elements.scrollable = scrollable;
            // Forces the next layout to recompute the extent.
            elements.canvas = None;
            self.view.request_redraw();
        }
    }

    /// Force every child to redraw.
    pub fn mark_redraw(&mut self) {
        self.view.mark_redraw_elements(self.owner);
        self.view.request_redraw();
    }

    /// Lay out every child, then recompute the extent.
    pub fn layout(&mut self) {
        self.view.layout_elements(self.owner);
    }

    /// Composite the children; returns true if the surface changed.
    ///
    /// Read the result with [`Elements::surface`].
    pub fn draw(&mut self) -> bool {
        self.view.draw_elements(self.owner)
    }

    /// Dispatch a mouse event given in the owner's coordinates.
    ///
    /// Over/out are not dispatched this way; see [`View::on_mouse_event`].
    pub fn on_mouse_event(&mut self, event: &MouseEvent) -> DispatchOutcome {
        self.view.dispatch_mouse_to_children(self.owner, event)
    }

    /// Dispatch a drag motion given in the owner's coordinates.
    pub fn on_drag_event(&mut self, event: &DragEvent) -> DispatchOutcome {
        self.view.dispatch_drag_to_children(self.owner, event)
    }
}

// Grow `(width, height)` to cover `geom`; the exact corners are only computed when the cheap
// estimate could exceed the current extent.
fn update_child_extent(geom: &PixelGeometry, width: &mut f64, height: &mut f64) {
    let estimate = geom.estimated_extent();
    if estimate.x > *width || estimate.y > *height {
        let exact = geom.extent_in_parent();
        *width = width.max(exact.x);
        *height = height.max(exact.y);
    }
}

fn draw_debug_frame(canvas: &mut dyn Canvas, size: Size) {
    let (w, h) = (size.width, size.height);
    let corners = [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ];
    for i in 0..4 {
        canvas.draw_line(corners[i], corners[(i + 1) % 4], 1.0, Color::BLACK);
    }
    canvas.draw_line(corners[0], corners[2], 1.0, Color::BLACK);
    canvas.draw_line(corners[1], corners[3], 1.0, Color::BLACK);
}

impl View {
    pub(crate) fn index_by_name(&self, owner: Owner, name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        self.elements(owner)?.children.iter().position(|&c| {
            self.element(c)
                .is_some_and(|e| names_match(e.name(), name))
        })
    }

    fn child_ids(&self, owner: Owner) -> Vec<ElementId> {
        self.elements(owner)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    pub(crate) fn mark_redraw_elements(&mut self, owner: Owner) {
        for child in self.child_ids(owner) {
            if let Some(node) = self.slot_mut(child) {
                node.element.dirty.redraw = true;
                if node.children.is_some() {
                    self.mark_redraw_elements(Owner::Element(child));
                }
            }
        }
    }

    pub(crate) fn layout_elements(&mut self, owner: Owner) {
        let parent_size = match owner {
            Owner::Root => Size::new(self.config.width, self.config.height),
            Owner::Element(id) => match self.element(id) {
                Some(e) => e.pixel_size(),
                None => return,
            },
        };
        let children = self.child_ids(owner);
        for &child in &children {
            self.layout_element(child, parent_size);
        }

        let Some(elements) = self.elements(owner) else {
            return;
        };
        let (width, height) = if elements.scrollable {
            let stale = elements.canvas.is_none()
                || children.iter().any(|&c| {
                    self.element(c)
                        .is_some_and(|e| e.is_position_changed() || e.is_size_changed())
                });
            if !stale {
                return;
            }
            let (mut width, mut height) = (0.0, 0.0);
            for &child in &children {
                if let Some(e) = self.element(child) {
                    update_child_extent(e.pixel(), &mut width, &mut height);
                }
            }
            log::trace!("{owner:?} scrollable extent is {width}x{height}");
            (width, height)
        } else {
            (parent_size.width.ceil(), parent_size.height.ceil())
        };
        if let Some(elements) = self.elements_mut(owner) {
            elements.width = width;
            elements.height = height;
        }
    }

    fn layout_element(&mut self, id: ElementId, parent_size: Size) {
        let Some(node) = self.slot_mut(id) else {
            return;
        };
        let default_size = match node.kind.as_mut() {
            Some(kind) => {
                kind.layout(&node.element);
                kind.default_size()
            }
            // The kind is out running a handler; keep the last resolved size.
            None => node.element.pixel_size(),
        };
        node.element.resolve_geometry(parent_size, default_size);
        if node.children.is_some() {
            self.layout_elements(Owner::Element(id));
        }
    }

    /// Draw one element into its own surface; returns true if the surface changed.
    pub(crate) fn draw_element(&mut self, id: ElementId) -> bool {
        let draws_children = match self.slot(id) {
            Some(node) => node.element.is_visible() && node.children.is_some(),
            None => return false,
        };
        let children_changed = draws_children && self.draw_elements(Owner::Element(id));

        let Some(node) = node_mut(&mut self.nodes, id) else {
            return false;
        };
        let flags_changed =
            mem::take(&mut node.element.dirty.redraw) | mem::take(&mut node.element.dirty.size);
        let size = node.element.pixel_size();
        let (w, h) = (pixel_dimension(size.width), pixel_dimension(size.height));
        if !node.element.is_visible() || w == 0 || h == 0 {
            let dropped = node.canvas.take().is_some();
            return dropped || flags_changed;
        }

        let mut changed = children_changed || flags_changed;
        let mut canvas = match node.canvas.take() {
            Some(canvas) if canvas.width() == w && canvas.height() == h => canvas,
            _ => {
                changed = true;
                let Some(canvas) = self.graphics.new_canvas(w, h) else {
                    log::warn!("graphics backend could not allocate a {w}x{h} canvas for {id:?}");
                    return true;
                };
                canvas
            }
        };
        if changed {
            canvas.clear();
            if let Some(kind) = node.kind.as_mut() {
                kind.draw(&node.element, canvas.as_mut());
            }
            if let Some(surface) = node.children.as_ref().and_then(Elements::surface) {
                canvas.draw_canvas(Point::ZERO, surface);
            }
        }
        node.canvas = Some(canvas);
        changed
    }

    /// Composite the children of `owner`; returns true if the surface changed.
    pub(crate) fn draw_elements(&mut self, owner: Owner) -> bool {
        let popup = self.popup;
        let debug = self.config.debug_mode > 0;
        let Some(elements) = self.elements_mut(owner) else {
            return false;
        };
        let mut changed = mem::take(&mut elements.count_changed);
        if elements.children.is_empty() {
            return changed;
        }
        let children = elements.children.clone();
        let (w, h) = (
            pixel_dimension(elements.width),
            pixel_dimension(elements.height),
        );
        let mut canvas = elements.canvas.take();
        if canvas
            .as_ref()
            .is_some_and(|c| c.width() != w || c.height() != h)
        {
            canvas = None;
        }
        if canvas.is_none() {
            changed = true;
            if w == 0 || h == 0 {
                return changed;
            }
            canvas = self.graphics.new_canvas(w, h);
            if canvas.is_none() {
                log::warn!("graphics backend could not allocate a {w}x{h} canvas for {owner:?}");
                return changed;
            }
        }
        let Some(mut canvas) = canvas else {
            return changed;
        };

        let mut has_popup = false;
        for &child in &children {
            if Some(child) == popup {
                has_popup = true;
                continue;
            }
            let child_changed = self.draw_element(child);
            let moved = self
                .slot_mut(child)
                .is_some_and(|n| mem::take(&mut n.element.dirty.position));
            changed |= child_changed || moved;
        }
        if let Some(elements) = self.elements_mut(owner)
            && elements.has_popup != has_popup
        {
            elements.has_popup = has_popup;
            changed = true;
        }

        if changed {
            canvas.clear();
            canvas.push_state();
            canvas.intersect_clip_rect(Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
            for &child in &children {
                if Some(child) == popup {
                    continue;
                }
                let Some(node) = self.slot(child) else {
                    continue;
                };
                if !node.element.is_visible() {
                    continue;
                }
                let Some(surface) = node.canvas.as_deref() else {
                    continue;
                };
                let geom = *node.element.pixel();
                canvas.push_state();
                if node.element.opacity() < 1.0 {
                    canvas.multiply_opacity(node.element.opacity());
                }
                apply_child_transform(canvas.as_mut(), &geom);
                match node.kind.as_deref().and_then(|k| k.mask()) {
                    Some(mask) => {
                        canvas.draw_canvas_with_mask(Point::ZERO, surface, Point::ZERO, mask);
                    }
                    None => canvas.draw_canvas(Point::ZERO, surface),
                }
                if debug {
                    draw_debug_frame(canvas.as_mut(), geom.size());
                }
                canvas.pop_state();
            }
            canvas.pop_state();
            log::trace!("recomposited {} children of {owner:?}", children.len());
        }
        if let Some(elements) = self.elements_mut(owner) {
            elements.canvas = Some(canvas);
        }
        changed
    }

    /// Offer a mouse event to the children of `owner`, topmost first.
    ///
    /// `event` is in the owner's coordinates.
    pub(crate) fn dispatch_mouse_to_children(
        &mut self,
        owner: Owner,
        event: &MouseEvent,
    ) -> DispatchOutcome {
        debug_assert!(
            !matches!(event.kind(), EventType::MouseOver | EventType::MouseOut),
            "over/out are routed by the view"
        );
        let mut in_element = None;
        for child in self.child_ids(owner).into_iter().rev() {
            let Some(local) = self.hit_local(child, event.position()) else {
                continue;
            };
            let watch = self.death.watch(child);
            let out = self.dispatch_mouse_to_element(child, &event.with_position(local), false);
            if !self.death.release(watch) {
                log::debug!("{:?} dispatch aborted: {child:?} was destroyed", event.kind());
                return DispatchOutcome {
                    in_element: in_element.or(out.in_element),
                    ..out
                }
                .revalidated(self);
            }
            if in_element.is_none() {
                in_element = out.in_element.or(Some(child));
            }
            // A disabled element still covers whatever lies beneath it.
            let blocked = self.element(child).is_some_and(|e| !e.is_enabled());
            if out.fired.is_some() || out.result.is_handled() || blocked {
                return DispatchOutcome { in_element, ..out }.revalidated(self);
            }
        }
        DispatchOutcome {
            result: EventResult::Unhandled,
            fired: None,
            in_element,
        }
        .revalidated(self)
    }

    /// Offer a mouse event to one element, in its local coordinates.
    ///
    /// Unless `direct`, its children get the first chance.
    pub(crate) fn dispatch_mouse_to_element(
        &mut self,
        id: ElementId,
        event: &MouseEvent,
        direct: bool,
    ) -> DispatchOutcome {
        let mut out = DispatchOutcome::default();
        if !direct && self.slot(id).is_some_and(|n| n.children.is_some()) {
            out = self.dispatch_mouse_to_children(Owner::Element(id), event);
            if out.fired.is_some() || out.result.is_handled() || !self.is_alive(id) {
                return out;
            }
        }
        if out.in_element.is_none() {
            out.in_element = Some(id);
        }
        if !self.element(id).is_some_and(|e| e.is_enabled()) {
            return out;
        }
        let watch = self.death.watch(id);
        let result = self.invoke_handlers(id, AnyEvent::Mouse(event), |kind, cx| {
            kind.handle_mouse_event(cx, event)
        });
        out.result = result;
        if !self.death.release(watch) {
            log::debug!("{:?} handler destroyed {id:?}", event.kind());
            out.fired = None;
            return out.revalidated(self);
        }
        if result.is_handled() {
            out.fired = Some(id);
        }
        out
    }

    /// Offer a drag motion to the children of `owner`, topmost first.
    pub(crate) fn dispatch_drag_to_children(
        &mut self,
        owner: Owner,
        event: &DragEvent,
    ) -> DispatchOutcome {
        for child in self.child_ids(owner).into_iter().rev() {
            let Some(local) = self.hit_local(child, event.position()) else {
                continue;
            };
            let watch = self.death.watch(child);
            let out = self.dispatch_drag_to_element(child, &event.with_position(local), false);
            if !self.death.release(watch) {
                log::debug!("{:?} dispatch aborted: {child:?} was destroyed", event.kind());
                return out.revalidated(self);
            }
            if out.fired.is_some() || out.result.is_handled() {
                return out.revalidated(self);
            }
        }
        DispatchOutcome::default()
    }

    /// Offer a drag event to one element; only drop targets handle it.
    pub(crate) fn dispatch_drag_to_element(
        &mut self,
        id: ElementId,
        event: &DragEvent,
        direct: bool,
    ) -> DispatchOutcome {
        if !direct && self.slot(id).is_some_and(|n| n.children.is_some()) {
            let out = self.dispatch_drag_to_children(Owner::Element(id), event);
            if out.fired.is_some() || out.result.is_handled() || !self.is_alive(id) {
                return out;
            }
        }
        if !self
            .element(id)
            .is_some_and(|e| e.is_enabled() && e.is_drop_target())
        {
            return DispatchOutcome::default();
        }
        let watch = self.death.watch(id);
        let result = self.invoke_handlers(id, AnyEvent::Drag(event), |kind, cx| {
            kind.handle_drag_event(cx, event)
        });
        if !self.death.release(watch) {
            log::debug!("{:?} handler destroyed {id:?}", event.kind());
            return DispatchOutcome {
                result,
                ..DispatchOutcome::default()
            };
        }
        DispatchOutcome {
            result,
            fired: result.is_handled().then_some(id),
            in_element: Some(id),
        }
    }
}
