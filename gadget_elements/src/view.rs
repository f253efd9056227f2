// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The view: element arena, root collection and view-level event routing.

use core::any::Any;

use gadget_events::hover::{HoverEvent, HoverState};
use gadget_events::{
    AnyEvent, DragEvent, Event, EventResult, EventType, KeyboardEvent, MouseButtons, MouseEvent,
    PositionEvent,
};
use kurbo::Point;

use crate::canvas::{Canvas, Graphics, apply_child_transform};
use crate::element::{BasicElement, Element};
use crate::elements::{DispatchOutcome, Elements, ElementsMut};
use crate::error::PropertyError;
use crate::factory::ElementFactory;
use crate::geometry::PixelGeometry;
use crate::guard::DeathDetector;
use crate::types::{ElementFlags, ElementId, Length, Owner};

/// Callbacks from the view to whatever hosts it.
///
/// Every method has an accepting / no-op default.
pub trait ViewHost {
    /// Called after an element is constructed and before it joins a collection.
    ///
    /// Returning false vetoes the addition; the element is destroyed and the
    /// append/insert returns `None`.
    fn on_element_add(&mut self, _element: &BasicElement) -> bool {
        true
    }

    /// Called right before an element is destroyed.
    fn on_element_remove(&mut self, _element: &BasicElement) {}

    /// The view needs to be drawn again.
    ///
    /// Coalesced: called once until the next [`View::draw`].
    fn queue_redraw(&mut self) {}
}

/// A host that accepts everything and ignores notifications.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullHost;

impl ViewHost for NullHost {}

/// Run-time view settings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewConfig {
    /// View width in pixels.
    pub width: f64,
    /// View height in pixels.
    pub height: f64,
    /// `0` is off; anything greater overlays element frames when compositing.
    pub debug_mode: u32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 320.0,
            height: 240.0,
            debug_mode: 0,
        }
    }
}

pub(crate) type Listener = Box<dyn FnMut(&mut EventContext<'_>, AnyEvent<'_>) -> EventResult>;

pub(crate) struct Node {
    pub(crate) element: BasicElement,
    // Taken out while one of the kind's handlers runs.
    pub(crate) kind: Option<Box<dyn Element>>,
    pub(crate) children: Option<Elements>,
    pub(crate) canvas: Option<Box<dyn Canvas>>,
    pub(crate) listeners: Vec<(EventType, Listener)>,
}

pub(crate) fn node_ref(nodes: &[Option<Node>], id: ElementId) -> Option<&Node> {
    nodes
        .get(id.idx())?
        .as_ref()
        .filter(|n| n.element.id() == id)
}

pub(crate) fn node_mut(nodes: &mut [Option<Node>], id: ElementId) -> Option<&mut Node> {
    nodes
        .get_mut(id.idx())?
        .as_mut()
        .filter(|n| n.element.id() == id)
}

/// Owner of an element tree.
///
/// A view owns every element through a generational arena, the top-level [`Elements`]
/// collection, the [`ElementFactory`] used to construct elements, the [`Graphics`] backend
/// used for off-screen surfaces, and the [`ViewHost`] it reports to.
///
/// It also keeps the state that spans the tree: popup, keyboard focus, the element under the
/// pointer, mouse grab and drag target.
///
/// ## Frame cycle
///
/// 1. Feed host events to [`View::on_mouse_event`] and friends.
/// 2. Call [`View::layout`] to resolve geometry bottom-up.
/// 3. Call [`View::draw`] to composite into the host's canvas.
pub struct View {
    pub(crate) nodes: Vec<Option<Node>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    pub(crate) root: Elements,
    factory: ElementFactory,
    pub(crate) graphics: Box<dyn Graphics>,
    host: Box<dyn ViewHost>,
    pub(crate) config: ViewConfig,
    pub(crate) death: DeathDetector,
    pub(crate) popup: Option<ElementId>,
    focus: Option<ElementId>,
    grab: Option<ElementId>,
    hover: HoverState<ElementId>,
    drag_over: HoverState<ElementId>,
    redraw_requested: bool,
}

impl core::fmt::Debug for View {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("View")
            .field("elements_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("root", &self.root)
            .field("factory", &self.factory)
            .field("config", &self.config)
            .field("popup", &self.popup)
            .field("focus", &self.focus)
            .field("grab", &self.grab)
            .field("mouse_over", &self.hover.current())
            .field("drag_over", &self.drag_over.current())
            .finish_non_exhaustive()
    }
}

impl View {
    /// Create an empty view.
    pub fn new(
        factory: ElementFactory,
        graphics: impl Graphics + 'static,
        config: ViewConfig,
    ) -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: Elements::new(),
            factory,
            graphics: Box::new(graphics),
            host: Box::new(NullHost),
            config,
            death: DeathDetector::new(),
            popup: None,
            focus: None,
            grab: None,
            hover: HoverState::new(),
            drag_over: HoverState::new(),
            redraw_requested: false,
        }
    }

    /// Replace the host.
    pub fn with_host(mut self, host: impl ViewHost + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Resize the view. Top-level percentages resolve against this size on the next layout.
    pub fn set_size(&mut self, width: f64, height: f64) {
        if self.config.width != width || self.config.height != height {
            self.config.width = width;
            self.config.height = height;
            self.request_redraw();
        }
    }

    /// Debug overlay level.
    pub fn debug_mode(&self) -> u32 {
        self.config.debug_mode
    }

    /// Change the debug overlay level; forces every element to redraw.
    pub fn set_debug_mode(&mut self, debug_mode: u32) {
        if self.config.debug_mode != debug_mode {
            self.config.debug_mode = debug_mode;
            self.mark_redraw();
        }
    }

    /// The factory used to create elements.
    pub fn factory(&self) -> &ElementFactory {
        &self.factory
    }

    /// Mutable access to the factory, to register further kinds.
    pub fn factory_mut(&mut self) -> &mut ElementFactory {
        &mut self.factory
    }

    /// The death-detector registry consulted by dispatch.
    pub fn death_detector(&self) -> &DeathDetector {
        &self.death
    }

    /// True if `id` refers to a live element.
    pub fn is_alive(&self, id: ElementId) -> bool {
        node_ref(&self.nodes, id).is_some()
    }

    pub(crate) fn slot(&self, id: ElementId) -> Option<&Node> {
        node_ref(&self.nodes, id)
    }

    pub(crate) fn slot_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        node_mut(&mut self.nodes, id)
    }

    /// Shared state of a live element.
    pub fn element(&self, id: ElementId) -> Option<&BasicElement> {
        self.slot(id).map(|n| &n.element)
    }

    /// Typed setters for a live element.
    pub fn element_mut(&mut self, id: ElementId) -> Option<ElementMut<'_>> {
        self.is_alive(id).then_some(ElementMut { view: self, id })
    }

    /// The kind of a live element, downcast to `T`.
    ///
    /// `None` while one of the element's own handlers is running.
    pub fn kind<T: Element>(&self, id: ElementId) -> Option<&T> {
        let kind: &dyn Element = self.slot(id)?.kind.as_deref()?;
        let any: &dyn Any = kind;
        any.downcast_ref::<T>()
    }

    /// Mutable access to the kind of a live element; schedules a redraw of it.
    pub fn kind_mut<T: Element>(&mut self, id: ElementId) -> Option<&mut T> {
        self.queue_element_draw(id);
        let kind: &mut dyn Element = self.slot_mut(id)?.kind.as_deref_mut()?;
        let any: &mut dyn Any = kind;
        any.downcast_mut::<T>()
    }

    pub(crate) fn elements(&self, owner: Owner) -> Option<&Elements> {
        match owner {
            Owner::Root => Some(&self.root),
            Owner::Element(id) => self.slot(id)?.children.as_ref(),
        }
    }

    pub(crate) fn elements_mut(&mut self, owner: Owner) -> Option<&mut Elements> {
        match owner {
            Owner::Root => Some(&mut self.root),
            Owner::Element(id) => self.slot_mut(id)?.children.as_mut(),
        }
    }

    /// The collection owned by `owner`; `None` for leaf kinds and dead elements.
    pub fn children(&self, owner: impl Into<Owner>) -> Option<&Elements> {
        self.elements(owner.into())
    }

    /// Mutating handle on the collection owned by `owner`.
    pub fn children_mut(&mut self, owner: impl Into<Owner>) -> Option<ElementsMut<'_>> {
        let owner = owner.into();
        self.elements(owner)?;
        Some(ElementsMut::new(self, owner))
    }

    /// First child of `owner` whose name matches, in z-order.
    pub fn item_by_name(&self, owner: impl Into<Owner>, name: &str) -> Option<ElementId> {
        let owner = owner.into();
        let index = self.index_by_name(owner, name)?;
        self.elements(owner)?.item_by_index(index)
    }

    /// First element in the whole tree whose name matches.
    ///
    /// Depth-first, each collection in z-order, a parent before its children.
    pub fn element_by_name(&self, name: &str) -> Option<ElementId> {
        if name.is_empty() {
            return None;
        }
        let mut stack: Vec<ElementId> = self.root.iter().rev().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.slot(id) else {
                continue;
            };
            if crate::element::names_match(node.element.name(), name) {
                return Some(id);
            }
            if let Some(children) = &node.children {
                stack.extend(children.iter().rev());
            }
        }
        None
    }

    /// Attach a listener to `id` for events of type `kind`.
    ///
    /// Listeners run before the kind's own handler, in the order they were connected.
    /// A listener answering [`EventResult::Canceled`] suppresses the kind's handler.
    /// Returns false if `id` is dead.
    pub fn connect(
        &mut self,
        id: ElementId,
        kind: EventType,
        listener: impl FnMut(&mut EventContext<'_>, AnyEvent<'_>) -> EventResult + 'static,
    ) -> bool {
        let Some(node) = self.slot_mut(id) else {
            return false;
        };
        node.listeners.push((kind, Box::new(listener)));
        true
    }

    /// Apply a string property.
    ///
    /// Shared properties (`name`, `x`, `y`, `pinX`, `pinY`, `width`, `height`, `rotation`,
    /// `opacity`, `visible`, `enabled`, `dropTarget`) are handled here; anything else goes to the
    /// element's kind.
    pub fn set_property(
        &mut self,
        id: ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), PropertyError> {
        let node = self.slot_mut(id).ok_or(PropertyError::NoSuchElement(id))?;
        let changed = match node.element.apply_property(name, value) {
            Err(PropertyError::Unknown(_)) => {
                let kind = node
                    .kind
                    .as_deref_mut()
                    .ok_or_else(|| PropertyError::Unknown(name.to_owned()))?;
                kind.set_property(name, value)?;
                true
            }
            other => other?,
        };
        if changed {
            self.queue_element_draw(id);
        }
        Ok(())
    }

    /// The popup element, if any.
    pub fn popup_element(&self) -> Option<ElementId> {
        self.popup
    }

    /// Set or clear the popup element.
    ///
    /// The popup is skipped by its parent's compositing and drawn on top of the whole view.
    /// Returns false if `popup` is dead.
    pub fn set_popup_element(&mut self, popup: Option<ElementId>) -> bool {
        if popup.is_some_and(|p| !self.is_alive(p)) {
            return false;
        }
        if self.popup != popup {
            self.popup = popup;
            self.request_redraw();
        }
        true
    }

    /// Element holding keyboard focus.
    pub fn focused_element(&self) -> Option<ElementId> {
        self.focus
    }

    /// Element currently under the pointer.
    pub fn mouse_over_element(&self) -> Option<ElementId> {
        self.hover.current()
    }

    /// Drop target currently under a drag.
    pub fn drag_over_element(&self) -> Option<ElementId> {
        self.drag_over.current()
    }

    /// Element holding the mouse grab.
    pub fn grabbed_element(&self) -> Option<ElementId> {
        self.grab
    }

    /// Move keyboard focus, delivering `FocusOut` to the old element and `FocusIn` to the new.
    ///
    /// Returns false if focus did not change.
    pub fn set_focus(&mut self, next: Option<ElementId>) -> bool {
        let next = next.filter(|&id| self.is_alive(id));
        if next == self.focus {
            return false;
        }
        let old = core::mem::replace(&mut self.focus, next);
        if let Some(old) = old {
            let _ = self.send_other_event(old, &Event::new(EventType::FocusOut));
        }
        // A FocusOut handler may have moved focus again or destroyed the new element.
        if let Some(new) = next
            && self.focus == Some(new)
        {
            let _ = self.send_other_event(new, &Event::new(EventType::FocusIn));
        }
        true
    }

    /// Ask the host for a redraw, once per frame.
    pub fn request_redraw(&mut self) {
        if !self.redraw_requested {
            self.redraw_requested = true;
            self.host.queue_redraw();
        }
    }

    /// True if a redraw was requested since the last [`View::draw`].
    pub fn redraw_requested(&self) -> bool {
        self.redraw_requested
    }

    pub(crate) fn queue_element_draw(&mut self, id: ElementId) {
        if let Some(node) = self.slot_mut(id) {
            node.element.dirty.redraw = true;
            self.request_redraw();
        }
    }

    /// `id` and its ancestors, outermost first.
    pub fn ancestry(&self, id: ElementId) -> Vec<ElementId> {
        let mut chain = Vec::new();
        let mut cur = Owner::Element(id);
        while let Owner::Element(e) = cur {
            let Some(element) = self.element(e) else {
                return Vec::new();
            };
            chain.push(e);
            cur = element.parent();
        }
        chain.reverse();
        chain
    }

    fn geometry_chain(&self, id: ElementId) -> Option<Vec<PixelGeometry>> {
        let chain = self.ancestry(id);
        if chain.is_empty() {
            return None;
        }
        chain
            .iter()
            .map(|&e| self.element(e).map(|el| *el.pixel()))
            .collect()
    }

    /// Map a point in view space into `id`'s local space.
    pub fn view_coord_to_element_coord(&self, id: ElementId, p: Point) -> Option<Point> {
        Some(
            self.geometry_chain(id)?
                .iter()
                .fold(p, |p, g| g.parent_to_local(p)),
        )
    }

    /// Map a point in `id`'s local space into view space.
    pub fn element_coord_to_view_coord(&self, id: ElementId, p: Point) -> Option<Point> {
        Some(
            self.geometry_chain(id)?
                .iter()
                .rev()
                .fold(p, |p, g| g.local_to_parent(p)),
        )
    }

    /// Resolve geometry for the whole tree.
    pub fn layout(&mut self) {
        self.layout_elements(Owner::Root);
    }

    /// Composite the tree into `target`, then the popup on top.
    ///
    /// Returns true if anything changed since the previous draw.
    pub fn draw(&mut self, target: &mut dyn Canvas) -> bool {
        let mut changed = self.draw_elements(Owner::Root);
        target.clear();
        if let Some(surface) = self.root.surface() {
            target.draw_canvas(Point::ZERO, surface);
        }
        if let Some(popup) = self.popup.filter(|&p| self.is_alive(p)) {
            changed |= self.draw_element(popup);
            if let Some(node) = self.slot_mut(popup) {
                node.element.dirty.position = false;
            }
            let chain = self.geometry_chain(popup).unwrap_or_default();
            if let Some(surface) = self.slot(popup).and_then(|n| n.canvas.as_deref()) {
                target.push_state();
                for g in &chain {
                    apply_child_transform(target, g);
                }
                target.draw_canvas(Point::ZERO, surface);
                target.pop_state();
            }
        }
        self.redraw_requested = false;
        changed
    }

    /// Force every element to redraw on the next frame.
    pub fn mark_redraw(&mut self) {
        self.mark_redraw_elements(Owner::Root);
        self.request_redraw();
    }

    /// Remove `id` from its parent collection, destroying it and its subtree.
    ///
    /// Returns false if `id` is dead.
    pub fn remove_element(&mut self, id: ElementId) -> bool {
        let Some(parent) = self.element(id).map(BasicElement::parent) else {
            return false;
        };
        self.children_mut(parent)
            .is_some_and(|mut children| children.remove_element(id))
    }

    fn alloc_slot(&mut self) -> ElementId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            self.nodes.push(None);
            self.generations.push(1);
            (self.nodes.len() - 1, 1)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Element indices are 32-bit."
        )]
        let idx = idx as u32;
        ElementId::new(idx, generation)
    }

    pub(crate) fn create_element(
        &mut self,
        tag: &str,
        parent: Owner,
        name: &str,
    ) -> Option<ElementId> {
        let Some(kind) = self.factory.create(tag) else {
            log::debug!("no element kind registered for tag `{tag}`");
            return None;
        };
        let id = self.alloc_slot();
        let children = kind.has_children().then(Elements::new);
        let node = Node {
            element: BasicElement::new(id, tag, parent, name),
            kind: Some(kind),
            children,
            canvas: None,
            listeners: Vec::new(),
        };
        if !self.host.on_element_add(&node.element) {
            log::debug!("host vetoed adding `{tag}` element {id:?}");
            self.free_list.push(id.idx());
            return None;
        }
        self.nodes[id.idx()] = Some(node);
        Some(id)
    }

    // Callers unlink `id` from its collection themselves.
    pub(crate) fn destroy_element(&mut self, id: ElementId) {
        let Some(node) = node_ref(&self.nodes, id) else {
            return;
        };
        let children: Vec<ElementId> = node
            .children
            .as_ref()
            .map(|c| c.iter().collect())
            .unwrap_or_default();
        self.death.notify_destroyed(id);
        self.hover.forget(id);
        self.drag_over.forget(id);
        for slot in [&mut self.focus, &mut self.grab, &mut self.popup] {
            if *slot == Some(id) {
                *slot = None;
            }
        }
        if let Some(node) = node_ref(&self.nodes, id) {
            self.host.on_element_remove(&node.element);
        }
        for child in children {
            self.destroy_element(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Run the listeners and then the kind handler of `id` for one event.
    pub(crate) fn invoke_handlers(
        &mut self,
        id: ElementId,
        event: AnyEvent<'_>,
        handler: impl FnOnce(&mut dyn Element, &mut EventContext<'_>) -> EventResult,
    ) -> EventResult {
        let result = self.run_listeners(id, event);
        if result == EventResult::Canceled || !self.is_alive(id) {
            return result;
        }
        match self.with_kind(id, handler) {
            Some(r) => result.max(r),
            None => result,
        }
    }

    fn run_listeners(&mut self, id: ElementId, event: AnyEvent<'_>) -> EventResult {
        let kind = event.kind();
        let Some(node) = self.slot_mut(id) else {
            return EventResult::Unhandled;
        };
        if !node.listeners.iter().any(|(k, _)| *k == kind) {
            return EventResult::Unhandled;
        }
        let mut listeners = core::mem::take(&mut node.listeners);
        let mut result = EventResult::Unhandled;
        let mut alive = true;
        for (k, listener) in &mut listeners {
            if *k != kind {
                continue;
            }
            let mut cx = EventContext {
                view: self,
                target: id,
            };
            result = result.max(listener(&mut cx, event));
            if !self.is_alive(id) {
                alive = false;
                break;
            }
        }
        if alive && let Some(node) = self.slot_mut(id) {
            // Listeners connected while we ran go after the existing ones.
            let added = core::mem::replace(&mut node.listeners, listeners);
            node.listeners.extend(added);
        }
        result
    }

    fn with_kind<R>(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut dyn Element, &mut EventContext<'_>) -> R,
    ) -> Option<R> {
        let mut kind = self.slot_mut(id)?.kind.take()?;
        let r = f(
            kind.as_mut(),
            &mut EventContext {
                view: self,
                target: id,
            },
        );
        if let Some(node) = self.slot_mut(id) {
            node.kind = Some(kind);
        }
        Some(r)
    }

    fn send_other_event(&mut self, id: ElementId, event: &Event) -> EventResult {
        if !self.element(id).is_some_and(BasicElement::is_enabled) {
            return EventResult::Unhandled;
        }
        let watch = self.death.watch(id);
        let result = self.invoke_handlers(id, AnyEvent::Generic(event), |kind, cx| {
            kind.handle_other_event(cx, event)
        });
        if !self.death.release(watch) {
            log::debug!("{:?} handler destroyed {id:?}", event.kind());
        }
        result
    }

    fn send_mouse_direct(&mut self, id: ElementId, event: &MouseEvent) -> EventResult {
        let Some(local) = self.view_coord_to_element_coord(id, event.position()) else {
            return EventResult::Unhandled;
        };
        self.dispatch_mouse_to_element(id, &event.with_position(local), true)
            .result
    }

    fn send_drag_direct(&mut self, id: ElementId, event: &DragEvent) -> EventResult {
        let Some(local) = self.view_coord_to_element_coord(id, event.position()) else {
            return EventResult::Unhandled;
        };
        self.dispatch_drag_to_element(id, &event.with_position(local), true)
            .result
    }

    fn update_hover(&mut self, next: Option<ElementId>, event: &MouseEvent) {
        for change in self.hover.update(next) {
            match change {
                HoverEvent::Out(old) => {
                    if self.is_alive(old) {
                        let _ = self.send_mouse_direct(old, &event.with_kind(EventType::MouseOut));
                    }
                }
                HoverEvent::Over(new) => {
                    if self.is_alive(new) {
                        let _ = self.send_mouse_direct(new, &event.with_kind(EventType::MouseOver));
                    } else {
                        self.hover.forget(new);
                    }
                }
            }
        }
    }

    fn after_mouse_down(&mut self, fired: Option<ElementId>, event: &MouseEvent) {
        let Some(fired) = fired.filter(|&id| self.is_alive(id)) else {
            let _ = self.set_focus(None);
            return;
        };
        if event.buttons().contains(MouseButtons::LEFT) {
            self.grab = Some(fired);
        }
        let focusable = self
            .slot(fired)
            .and_then(|n| n.kind.as_deref())
            .is_some_and(|kind| kind.is_focusable());
        let _ = self.set_focus(focusable.then_some(fired));
    }

    fn is_hit(&self, id: ElementId, local: Point) -> bool {
        self.slot(id).is_some_and(|node| {
            node.element.is_visible()
                && node.kind.as_deref().map_or_else(
                    || node.element.bounds_contain(local),
                    |kind| kind.is_point_in(&node.element, local),
                )
        })
    }

    pub(crate) fn hit_local(&self, id: ElementId, parent_point: Point) -> Option<Point> {
        let local = self.element(id)?.pixel().parent_to_local(parent_point);
        self.is_hit(id, local).then_some(local)
    }

    fn route_to_popup(&mut self, event: &MouseEvent) -> Option<DispatchOutcome> {
        let popup = self.popup?;
        let local = self.view_coord_to_element_coord(popup, event.position())?;
        if self.is_hit(popup, local) {
            return Some(self.dispatch_mouse_to_element(popup, &event.with_position(local), false));
        }
        if event.kind() == EventType::MouseDown {
            log::debug!("mouse down outside popup {popup:?}; closing it");
            let _ = self.set_popup_element(None);
        }
        None
    }

    /// Route a mouse event from the host, in view coordinates.
    ///
    /// Over/out from the host update the element under the pointer directly.
    /// Everything else goes to the popup if the pointer is over it, then to the grabbing
    /// element for moves and releases, and otherwise down the tree topmost first.
    pub fn on_mouse_event(&mut self, event: &MouseEvent) -> EventResult {
        match event.kind() {
            EventType::MouseOut => {
                return match self.hover.clear() {
                    Some(HoverEvent::Out(old)) => self.send_mouse_direct(old, event),
                    _ => EventResult::Unhandled,
                };
            }
            EventType::MouseOver => return EventResult::Unhandled,
            _ => {}
        }

        if let Some(grab) = self.grab
            && matches!(event.kind(), EventType::MouseMove | EventType::MouseUp)
        {
            if event.kind() == EventType::MouseUp {
                self.grab = None;
            }
            if self.is_alive(grab) {
                return self.send_mouse_direct(grab, event);
            }
        }

        let out = match self.route_to_popup(event) {
            Some(out) => out,
            None => self.dispatch_mouse_to_children(Owner::Root, event),
        };
        self.update_hover(out.in_element, event);
        if event.kind() == EventType::MouseDown {
            self.after_mouse_down(out.fired, event);
        }
        out.result
    }

    /// Deliver a keyboard event to the focused element.
    pub fn on_key_event(&mut self, event: &KeyboardEvent) -> EventResult {
        let Some(focus) = self.focus.filter(|&id| self.is_alive(id)) else {
            return EventResult::Unhandled;
        };
        if !self.element(focus).is_some_and(BasicElement::is_enabled) {
            return EventResult::Unhandled;
        }
        let watch = self.death.watch(focus);
        let result = self.invoke_handlers(focus, AnyEvent::Key(event), |kind, cx| {
            kind.handle_key_event(cx, event)
        });
        if !self.death.release(watch) {
            log::debug!("key handler destroyed focused element {focus:?}");
        }
        result
    }

    /// Route a drag event from the host, in view coordinates.
    ///
    /// Motion (and the host's over) is dispatched down the tree; the drop target that accepts
    /// it becomes the current drag target. Drop goes to that target directly.
    pub fn on_drag_event(&mut self, event: &DragEvent) -> EventResult {
        match event.kind() {
            EventType::DragOut => match self.drag_over.clear() {
                Some(HoverEvent::Out(old)) => self.send_drag_direct(old, event),
                _ => EventResult::Unhandled,
            },
            EventType::DragDrop => match self.drag_over.clear() {
                Some(HoverEvent::Out(target)) => self.send_drag_direct(target, event),
                _ => EventResult::Unhandled,
            },
            _ => {
                let motion = event.with_kind(EventType::DragMotion);
                let out = self.dispatch_drag_to_children(Owner::Root, &motion);
                for change in self.drag_over.update(out.fired) {
                    match change {
                        HoverEvent::Out(old) => {
                            if self.is_alive(old) {
                                let _ = self.send_drag_direct(old, &event.with_kind(EventType::DragOut));
                            }
                        }
                        HoverEvent::Over(new) => {
                            if self.is_alive(new) {
                                let _ = self.send_drag_direct(new, &event.with_kind(EventType::DragOver));
                            } else {
                                self.drag_over.forget(new);
                            }
                        }
                    }
                }
                out.result
            }
        }
    }

    /// Handle a generic event addressed to the view.
    ///
    /// `FocusOut` clears keyboard focus.
    pub fn on_other_event(&mut self, event: &Event) -> EventResult {
        if event.kind() == EventType::FocusOut && self.set_focus(None) {
            EventResult::Handled
        } else {
            EventResult::Unhandled
        }
    }
}

/// Typed mutation of one element's shared state.
///
/// Values are sanitized instead of rejected: negative sizes clamp to zero, opacity clamps to
/// `[0, 1]`, and non-finite numbers are ignored.
/// Every change schedules a redraw.
#[derive(Debug)]
pub struct ElementMut<'a> {
    view: &'a mut View,
    id: ElementId,
}

impl ElementMut<'_> {
    fn apply(&mut self, f: impl FnOnce(&mut BasicElement) -> bool) -> &mut Self {
        let changed = self.view.slot_mut(self.id).is_some_and(|n| f(&mut n.element));
        if changed {
            self.view.queue_element_draw(self.id);
        }
        self
    }

    /// The element.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Current shared state.
    pub fn get(&self) -> Option<&BasicElement> {
        self.view.element(self.id)
    }

    /// Set the name.
    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.apply(|e| e.set_name(name))
    }

    /// Set the position of the pin in the parent.
    pub fn set_position(&mut self, x: Length, y: Length) -> &mut Self {
        if !finite_length(x) || !finite_length(y) {
            return self;
        }
        self.apply(|e| e.set_x(x) | e.set_y(y))
    }

    /// Set the pin.
    pub fn set_pin(&mut self, x: Length, y: Length) -> &mut Self {
        if !finite_length(x) || !finite_length(y) {
            return self;
        }
        self.apply(|e| e.set_pin_x(x) | e.set_pin_y(y))
    }

    /// Set the size; `None` falls back to the kind's default size.
    pub fn set_size(&mut self, width: Option<Length>, height: Option<Length>) -> &mut Self {
        if !width.is_none_or(finite_length) || !height.is_none_or(finite_length) {
            return self;
        }
        let width = width.map(clamp_extent);
        let height = height.map(clamp_extent);
        self.apply(|e| e.set_width(width) | e.set_height(height))
    }

    /// Set the rotation in degrees.
    pub fn set_rotation(&mut self, degrees: f64) -> &mut Self {
        if !degrees.is_finite() {
            return self;
        }
        self.apply(|e| e.set_rotation(degrees))
    }

    /// Set the opacity.
    pub fn set_opacity(&mut self, opacity: f64) -> &mut Self {
        if opacity.is_nan() {
            return self;
        }
        self.apply(|e| e.set_opacity(opacity.clamp(0.0, 1.0)))
    }

    /// Show or hide.
    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.apply(|e| e.set_flag(ElementFlags::VISIBLE, visible))
    }

    /// Enable or disable the element's own handlers.
    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        self.apply(|e| e.set_flag(ElementFlags::ENABLED, enabled))
    }

    /// Accept or ignore drag events.
    pub fn set_drop_target(&mut self, drop_target: bool) -> &mut Self {
        self.apply(|e| e.set_flag(ElementFlags::DROP_TARGET, drop_target))
    }

    /// Schedule a redraw of the element.
    pub fn queue_draw(&mut self) -> &mut Self {
        self.view.queue_element_draw(self.id);
        self
    }
}

fn finite_length(l: Length) -> bool {
    match l {
        Length::Pixels(v) | Length::Percent(v) => v.is_finite(),
    }
}

fn clamp_extent(l: Length) -> Length {
    match l {
        Length::Pixels(v) => Length::Pixels(v.max(0.0)),
        Length::Percent(v) => Length::Percent(v.max(0.0)),
    }
}

/// What a handler sees of the view while it runs.
///
/// The context gives full mutable access, so a handler may restructure the tree, including
/// removing its own element.
/// The dispatcher notices and stops.
pub struct EventContext<'a> {
    view: &'a mut View,
    target: ElementId,
}

impl core::fmt::Debug for EventContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventContext")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl EventContext<'_> {
    /// The element whose handler is running.
    pub fn target(&self) -> ElementId {
        self.target
    }

    /// The view.
    pub fn view(&self) -> &View {
        self.view
    }

    /// The view, mutably.
    pub fn view_mut(&mut self) -> &mut View {
        self.view
    }

    /// Shared state of the target; `None` once it has been removed.
    pub fn element(&self) -> Option<&BasicElement> {
        self.view.element(self.target)
    }

    /// Schedule a redraw of the target.
    pub fn queue_draw(&mut self) {
        self.view.queue_element_draw(self.target);
    }

    /// Remove the target from its parent collection.
    pub fn remove_target(&mut self) -> bool {
        self.view.remove_element(self.target)
    }
}
