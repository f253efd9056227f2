// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing contract between the element tree and a graphics backend.
//!
//! The element tree never touches pixels.
//! It asks a [`Graphics`] backend for off-screen [`Canvas`]es, composites child surfaces into
//! them with transforms, clips and opacity, and hands finished surfaces up to its parent.
//!
//! State model: [`Canvas::push_state`] saves the current transform, clip and opacity;
//! [`Canvas::pop_state`] restores them.
//! Transforms compose in call order, like most immediate-mode 2D APIs.
//!
//! [`recording`] provides a backend that records calls instead of rasterizing them.

pub mod recording;

use core::any::Any;
use core::fmt::Debug;

use kurbo::{Point, Rect, Size, Vec2};

use crate::geometry::PixelGeometry;
use crate::types::Color;

/// An off-screen drawing surface.
///
/// Canvases are `Any` so a backend can recognise its own surfaces when one is composited
/// into another.
pub trait Canvas: Any + Debug {
    /// Width in pixels.
    fn width(&self) -> u32;
    /// Height in pixels.
    fn height(&self) -> u32;

    /// Clear every pixel to transparent.
    fn clear(&mut self);

    /// Save transform, clip and opacity.
    fn push_state(&mut self);
    /// Restore the most recently saved state.
    ///
    /// Returns false if there was nothing to restore.
    fn pop_state(&mut self) -> bool;

    /// Multiply the current opacity by `opacity`.
    fn multiply_opacity(&mut self, opacity: f64);
    /// Translate subsequent drawing.
    fn translate(&mut self, offset: Vec2);
    /// Rotate subsequent drawing by `radians` about the current origin.
    fn rotate(&mut self, radians: f64);
    /// Scale subsequent drawing.
    fn scale(&mut self, sx: f64, sy: f64);
    /// Intersect the clip region with `rect` (in current coordinates).
    fn intersect_clip_rect(&mut self, rect: Rect);

    /// Draw `source` with its top-left corner at `at`.
    fn draw_canvas(&mut self, at: Point, source: &dyn Canvas);
    /// Draw `source` at `at`, modulated by the alpha of `mask` placed at `mask_at`.
    fn draw_canvas_with_mask(
        &mut self,
        at: Point,
        source: &dyn Canvas,
        mask_at: Point,
        mask: &dyn Canvas,
    );

    /// Stroke a line.
    fn draw_line(&mut self, from: Point, to: Point, width: f64, color: Color);
    /// Fill a rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);
    /// Draw text inside `rect`.
    fn draw_text(&mut self, rect: Rect, text: &str, size: f64, color: Color);
    /// Draw `image` scaled into `dest`.
    fn draw_image(&mut self, image: &dyn Image, dest: Rect);
}

/// A factory for canvases.
pub trait Graphics {
    /// Allocate a `width` by `height` canvas.
    ///
    /// Returns `None` if the backend cannot allocate one.
    fn new_canvas(&self, width: u32, height: u32) -> Option<Box<dyn Canvas>>;
}

/// A decoded image that elements can draw and hit-test against.
pub trait Image: Debug {
    /// Natural size in pixels.
    fn size(&self) -> Size;

    /// Alpha in `[0, 1]` of the pixel at `point` (image pixels).
    ///
    /// `None` means the value cannot be read (out of range, or the format keeps no alpha).
    fn alpha_at(&self, point: Point) -> Option<f64>;
}

/// Apply the child-to-parent transform of `geom` to `canvas`.
///
/// An unrotated child takes the single-translate path.
/// A rotated one is translated to its pin, rotated, and moved back by the pin, so the
/// rotation happens about the pin rather than the child's origin.
pub fn apply_child_transform(canvas: &mut dyn Canvas, geom: &PixelGeometry) {
    if geom.is_unrotated() {
        canvas.translate(Vec2::new(geom.x - geom.pin_x, geom.y - geom.pin_y));
    } else {
        canvas.translate(Vec2::new(geom.x, geom.y));
        canvas.rotate(geom.rotation.to_radians());
        canvas.translate(-geom.pin().to_vec2());
    }
}

/// Canvas dimension in whole pixels for a fractional extent.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Value is integral and range-checked before the cast."
)]
pub(crate) fn pixel_dimension(extent: f64) -> u32 {
    let v = extent.ceil();
    if v.is_nan() || v <= 0.0 {
        0
    } else if v >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        v as u32
    }
}

#[cfg(test)]
mod tests {
    use super::recording::{CanvasOp, RecordingCanvas};
    use super::*;

    #[test]
    fn pixel_dimension_rounds_up_and_saturates() {
        assert_eq!(pixel_dimension(0.0), 0);
        assert_eq!(pixel_dimension(-3.0), 0);
        assert_eq!(pixel_dimension(f64::NAN), 0);
        assert_eq!(pixel_dimension(10.2), 11);
        assert_eq!(pixel_dimension(10.0), 10);
        assert_eq!(pixel_dimension(1e20), u32::MAX);
    }

    #[test]
    fn rotated_transform_goes_through_pin() {
        let mut c = RecordingCanvas::new(10, 10);
        let g = PixelGeometry {
            x: 5.0,
            y: 6.0,
            pin_x: 1.0,
            pin_y: 2.0,
            width: 4.0,
            height: 4.0,
            rotation: 180.0,
        };
        apply_child_transform(&mut c, &g);
        assert_eq!(
            c.ops(),
            &[
                CanvasOp::Translate(Vec2::new(5.0, 6.0)),
                CanvasOp::Rotate(core::f64::consts::PI),
                CanvasOp::Translate(Vec2::new(-1.0, -2.0)),
            ]
        );

        let mut c = RecordingCanvas::new(10, 10);
        let g = PixelGeometry {
            rotation: 0.0,
            ..g
        };
        apply_child_transform(&mut c, &g);
        assert_eq!(c.ops(), &[CanvasOp::Translate(Vec2::new(4.0, 4.0))]);
    }
}
