// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinate mapping between a parent and a child element.
//!
//! A child is placed in its parent by three numbers and a pin:
//! `(x, y)` is where the child's pin lands in parent space, `(pin_x, pin_y)` is the pin in the
//! child's own space, and `rotation` (degrees, clockwise in a y-down space) turns the child
//! about that pin.
//!
//! The child-to-parent transform is therefore `translate(x, y) * rotate(r) * translate(-pin)`.
//! With no rotation this collapses to a single translation by `(x - pin_x, y - pin_y)`.

use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Resolved pixel geometry of an element, as seen by its parent.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PixelGeometry {
    /// Pin position in parent space (x).
    pub x: f64,
    /// Pin position in parent space (y).
    pub y: f64,
    /// Pin position in local space (x).
    pub pin_x: f64,
    /// Pin position in local space (y).
    pub pin_y: f64,
    /// Local width.
    pub width: f64,
    /// Local height.
    pub height: f64,
    /// Rotation in degrees.
    pub rotation: f64,
}

impl PixelGeometry {
    /// Local size.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Pin in local space.
    pub fn pin(&self) -> Point {
        Point::new(self.pin_x, self.pin_y)
    }

    /// Child-to-parent transform.
    pub fn transform(&self) -> Affine {
        child_to_parent_transform(self)
    }

    /// Map a point in parent space into local space.
    pub fn parent_to_local(&self, p: Point) -> Point {
        parent_coord_to_child_coord(p, self)
    }

    /// Map a point in local space into parent space.
    pub fn local_to_parent(&self, p: Point) -> Point {
        child_coord_to_parent_coord(p, self)
    }

    /// Bottom-right reach of this element in parent space; see [`child_extent_in_parent`].
    pub fn extent_in_parent(&self) -> Point {
        child_extent_in_parent(self)
    }

    /// Cheap upper bound of [`Self::extent_in_parent`] valid for any rotation.
    ///
    /// The element can reach at most `max(pin, size - pin)` away from its pin on each axis,
    /// and a rotation can move that reach onto either axis.
    pub fn estimated_extent(&self) -> Point {
        let reach = self.pin_x.max(self.width - self.pin_x) + self.pin_y.max(self.height - self.pin_y);
        Point::new(self.x + reach, self.y + reach)
    }

    /// True if rotation is exactly zero (the direct-translate path applies).
    pub fn is_unrotated(&self) -> bool {
        self.rotation == 0.0
    }
}

/// Child-to-parent transform for `geom`.
pub fn child_to_parent_transform(geom: &PixelGeometry) -> Affine {
    if geom.is_unrotated() {
        Affine::translate(Vec2::new(geom.x - geom.pin_x, geom.y - geom.pin_y))
    } else {
        Affine::translate(Vec2::new(geom.x, geom.y))
            * Affine::rotate(geom.rotation.to_radians())
            * Affine::translate(-geom.pin().to_vec2())
    }
}

/// Map `p`, given in the parent's space, into the child's local space.
pub fn parent_coord_to_child_coord(p: Point, geom: &PixelGeometry) -> Point {
    if geom.is_unrotated() {
        return Point::new(p.x - geom.x + geom.pin_x, p.y - geom.y + geom.pin_y);
    }
    child_to_parent_transform(geom).inverse() * p
}

/// Map `p`, given in the child's local space, into the parent's space.
pub fn child_coord_to_parent_coord(p: Point, geom: &PixelGeometry) -> Point {
    child_to_parent_transform(geom) * p
}

/// Largest x and y reached by the child's four corners in parent space.
///
/// Scrollable collections size their surface to the maximum of this over all children.
pub fn child_extent_in_parent(geom: &PixelGeometry) -> Point {
    let t = child_to_parent_transform(geom);
    let local = Rect::new(0.0, 0.0, geom.width, geom.height);
    let corners = [
        Point::new(local.x0, local.y0),
        Point::new(local.x1, local.y0),
        Point::new(local.x0, local.y1),
        Point::new(local.x1, local.y1),
    ];
    corners
        .into_iter()
        .map(|c| t * c)
        .fold(Point::new(f64::MIN, f64::MIN), |acc, c| {
            Point::new(acc.x.max(c.x), acc.y.max(c.y))
        })
}

/// Axis-aligned bounding box of the child in parent space.
pub fn child_bounds_in_parent(geom: &PixelGeometry) -> Rect {
    geom.transform()
        .transform_rect_bbox(Rect::new(0.0, 0.0, geom.width, geom.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn unrotated_is_plain_offset() {
        let g = PixelGeometry {
            x: 50.0,
            y: 50.0,
            pin_x: 10.0,
            pin_y: 20.0,
            width: 100.0,
            height: 100.0,
            rotation: 0.0,
        };
        assert_eq!(g.parent_to_local(Point::new(75.0, 75.0)), Point::new(35.0, 45.0));
        assert_eq!(g.local_to_parent(Point::new(35.0, 45.0)), Point::new(75.0, 75.0));
        assert_eq!(g.extent_in_parent(), Point::new(140.0, 130.0));
    }

    // 90 degrees about the center keeps the center and swaps width and height.
    #[test]
    fn rotation_about_center_pin() {
        let g = PixelGeometry {
            x: 100.0,
            y: 100.0,
            pin_x: 40.0,
            pin_y: 10.0,
            width: 80.0,
            height: 20.0,
            rotation: 90.0,
        };
        assert!(approx(g.local_to_parent(g.pin()), Point::new(100.0, 100.0)));
        let bounds = child_bounds_in_parent(&g);
        assert!((bounds.width() - 20.0).abs() < 1e-9);
        assert!((bounds.height() - 80.0).abs() < 1e-9);
        assert!(approx(bounds.center(), Point::new(100.0, 100.0)));
        // A point above the pin in parent space lies within the rotated element.
        let local = g.parent_to_local(Point::new(100.0, 70.0));
        assert!(local.x >= 0.0 && local.x < 80.0 && local.y >= 0.0 && local.y < 20.0);
        // A point right of the pin beyond half the height does not.
        let local = g.parent_to_local(Point::new(115.0, 100.0));
        assert!(!(local.y >= 0.0 && local.y < 20.0));
    }

    #[test]
    fn mapping_round_trips_under_rotation() {
        let g = PixelGeometry {
            x: 12.0,
            y: -3.0,
            pin_x: 5.0,
            pin_y: 7.0,
            width: 30.0,
            height: 40.0,
            rotation: 33.0,
        };
        let p = Point::new(17.5, 2.25);
        assert!(approx(g.local_to_parent(g.parent_to_local(p)), p));
    }

    #[test]
    fn estimate_bounds_exact_extent() {
        for rotation in [0.0, 15.0, 45.0, 90.0, 180.0, 271.0] {
            let g = PixelGeometry {
                x: 30.0,
                y: 40.0,
                pin_x: 5.0,
                pin_y: 25.0,
                width: 60.0,
                height: 30.0,
                rotation,
            };
            let exact = g.extent_in_parent();
            let estimate = g.estimated_extent();
            assert!(estimate.x + 1e-9 >= exact.x, "rotation {rotation}");
            assert!(estimate.y + 1e-9 >= exact.y, "rotation {rotation}");
        }
    }
}
