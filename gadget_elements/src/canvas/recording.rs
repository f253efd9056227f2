// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A canvas backend that records calls instead of drawing.
//!
//! Every [`RecordingCanvas`] has a process-unique id, so a composite of one recorded surface
//! into another shows up as [`CanvasOp::DrawCanvas`] naming the source id.
//! [`RecordingGraphics`] counts allocations and can be capped to simulate allocation failure.
//!
//! ```
//! use gadget_elements::canvas::Canvas;
//! use gadget_elements::canvas::recording::{CanvasOp, RecordingCanvas};
//! use gadget_elements::Color;
//! use kurbo::Rect;
//!
//! let mut c = RecordingCanvas::new(4, 4);
//! c.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Color::BLACK);
//! c.clear();
//! assert_eq!(c.ops(), &[CanvasOp::Clear]);
//! ```

use core::any::Any;
use core::cell::Cell;
use core::sync::atomic::{AtomicU64, Ordering};
use std::rc::Rc;

use kurbo::{Point, Rect, Size, Vec2};

use super::{Canvas, Graphics, Image};
use crate::types::Color;

static NEXT_CANVAS_ID: AtomicU64 = AtomicU64::new(1);

/// One recorded canvas call.
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasOp {
    /// [`Canvas::clear`].
    Clear,
    /// [`Canvas::push_state`].
    PushState,
    /// [`Canvas::pop_state`].
    PopState,
    /// [`Canvas::multiply_opacity`].
    MultiplyOpacity(f64),
    /// [`Canvas::translate`].
    Translate(Vec2),
    /// [`Canvas::rotate`], in radians.
    Rotate(f64),
    /// [`Canvas::scale`].
    Scale(f64, f64),
    /// [`Canvas::intersect_clip_rect`].
    IntersectClipRect(Rect),
    /// [`Canvas::draw_canvas`]; `source` is the recorded id, or 0 for a foreign canvas.
    DrawCanvas {
        /// Destination of the source's origin.
        at: Point,
        /// Id of the source canvas.
        source: u64,
    },
    /// [`Canvas::draw_canvas_with_mask`].
    DrawCanvasWithMask {
        /// Destination of the source's origin.
        at: Point,
        /// Id of the source canvas.
        source: u64,
        /// Destination of the mask's origin.
        mask_at: Point,
        /// Id of the mask canvas.
        mask: u64,
    },
    /// [`Canvas::draw_line`].
    DrawLine {
        /// Start.
        from: Point,
        /// End.
        to: Point,
        /// Stroke width.
        width: f64,
        /// Stroke color.
        color: Color,
    },
    /// [`Canvas::fill_rect`].
    FillRect(Rect, Color),
    /// [`Canvas::draw_text`].
    DrawText {
        /// Layout box.
        rect: Rect,
        /// The text.
        text: String,
        /// Font size.
        size: f64,
        /// Fill color.
        color: Color,
    },
    /// [`Canvas::draw_image`].
    DrawImage {
        /// Natural size of the image.
        image_size: Size,
        /// Destination rectangle.
        dest: Rect,
    },
}

/// A canvas that records the calls made on it.
#[derive(Debug)]
pub struct RecordingCanvas {
    id: u64,
    width: u32,
    height: u32,
    depth: usize,
    ops: Vec<CanvasOp>,
}

impl RecordingCanvas {
    /// Create a canvas with a fresh id.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            id: NEXT_CANVAS_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            depth: 0,
            ops: Vec::new(),
        }
    }

    /// The canvas id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Calls recorded since the last [`Canvas::clear`] (which is itself kept).
    pub fn ops(&self) -> &[CanvasOp] {
        &self.ops
    }

    /// Current `push_state` nesting depth.
    pub fn state_depth(&self) -> usize {
        self.depth
    }

    /// Downcast a trait object produced by this backend.
    pub fn from_canvas(canvas: &dyn Canvas) -> Option<&Self> {
        let any: &dyn Any = canvas;
        any.downcast_ref::<Self>()
    }

    /// Ids of every canvas drawn into this one, in order.
    pub fn drawn_sources(&self) -> Vec<u64> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                CanvasOp::DrawCanvas { source, .. } | CanvasOp::DrawCanvasWithMask { source, .. } => {
                    Some(*source)
                }
                _ => None,
            })
            .collect()
    }
}

fn recorded_id(canvas: &dyn Canvas) -> u64 {
    RecordingCanvas::from_canvas(canvas).map_or(0, RecordingCanvas::id)
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.ops.push(CanvasOp::Clear);
    }

    fn push_state(&mut self) {
        self.depth += 1;
        self.ops.push(CanvasOp::PushState);
    }

    fn pop_state(&mut self) -> bool {
        if self.depth == 0 {
            return false;
        }
        self.depth -= 1;
        self.ops.push(CanvasOp::PopState);
        true
    }

    fn multiply_opacity(&mut self, opacity: f64) {
        self.ops.push(CanvasOp::MultiplyOpacity(opacity));
    }

    fn translate(&mut self, offset: Vec2) {
        self.ops.push(CanvasOp::Translate(offset));
    }

    fn rotate(&mut self, radians: f64) {
        self.ops.push(CanvasOp::Rotate(radians));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.ops.push(CanvasOp::Scale(sx, sy));
    }

    fn intersect_clip_rect(&mut self, rect: Rect) {
        self.ops.push(CanvasOp::IntersectClipRect(rect));
    }

    fn draw_canvas(&mut self, at: Point, source: &dyn Canvas) {
        self.ops.push(CanvasOp::DrawCanvas {
            at,
            source: recorded_id(source),
        });
    }

    fn draw_canvas_with_mask(
        &mut self,
        at: Point,
        source: &dyn Canvas,
        mask_at: Point,
        mask: &dyn Canvas,
    ) {
        self.ops.push(CanvasOp::DrawCanvasWithMask {
            at,
            source: recorded_id(source),
            mask_at,
            mask: recorded_id(mask),
        });
    }

    fn draw_line(&mut self, from: Point, to: Point, width: f64, color: Color) {
        self.ops.push(CanvasOp::DrawLine {
            from,
            to,
            width,
            color,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(CanvasOp::FillRect(rect, color));
    }

    fn draw_text(&mut self, rect: Rect, text: &str, size: f64, color: Color) {
        self.ops.push(CanvasOp::DrawText {
            rect,
            text: text.to_owned(),
            size,
            color,
        });
    }

    fn draw_image(&mut self, image: &dyn Image, dest: Rect) {
        self.ops.push(CanvasOp::DrawImage {
            image_size: image.size(),
            dest,
        });
    }
}

#[derive(Debug, Default)]
struct Stats {
    created: Cell<usize>,
    limit: Cell<Option<usize>>,
}

/// A [`Graphics`] backend producing [`RecordingCanvas`]es.
///
/// Clones share their allocation counter, so a test can keep a handle after giving the backend
/// to a view.
#[derive(Clone, Debug, Default)]
pub struct RecordingGraphics {
    stats: Rc<Stats>,
}

impl RecordingGraphics {
    /// Create a backend with no allocation limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of canvases allocated so far.
    pub fn canvases_created(&self) -> usize {
        self.stats.created.get()
    }

    /// Fail every allocation once `limit` canvases have been created.
    ///
    /// `None` removes the limit.
    pub fn set_allocation_limit(&self, limit: Option<usize>) {
        self.stats.limit.set(limit);
    }
}

impl Graphics for RecordingGraphics {
    fn new_canvas(&self, width: u32, height: u32) -> Option<Box<dyn Canvas>> {
        let created = self.stats.created.get();
        if self.stats.limit.get().is_some_and(|limit| created >= limit) {
            return None;
        }
        self.stats.created.set(created + 1);
        Some(Box::new(RecordingCanvas::new(width, height)))
    }
}
