// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use kurbo::{Point, Rect, Size};

use crate::canvas::{Canvas, Image};
use crate::element::{BasicElement, Element};
use crate::error::PropertyError;

/// How an image is fitted into an element of a different aspect ratio.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CropMaintainAspect {
    /// Stretch to fill, ignoring aspect.
    #[default]
    False,
    /// Scale to cover, keeping aspect, cropping evenly on both sides.
    True,
    /// Like `True`, but never crop the top.
    Photo,
}

impl CropMaintainAspect {
    fn parse(text: &str) -> Option<Self> {
        let t = text.trim();
        if t.eq_ignore_ascii_case("false") {
            Some(Self::False)
        } else if t.eq_ignore_ascii_case("true") {
            Some(Self::True)
        } else if t.eq_ignore_ascii_case("photo") {
            Some(Self::Photo)
        } else {
            None
        }
    }
}

/// An element showing an image.
///
/// Hit testing follows the image's alpha: fully transparent pixels let clicks through.
#[derive(Clone, Debug, Default)]
pub struct ImgElement {
    image: Option<Rc<dyn Image>>,
    src_size: Size,
    crop: CropMaintainAspect,
}

impl ImgElement {
    /// The image, if any.
    pub fn image(&self) -> Option<&Rc<dyn Image>> {
        self.image.as_ref()
    }

    /// Replace the image; the source size follows the new image.
    pub fn set_image(&mut self, image: Option<Rc<dyn Image>>) {
        self.src_size = image.as_ref().map_or(Size::ZERO, |i| i.size());
        self.image = image;
    }

    /// Size reported as the element's default size.
    pub fn src_size(&self) -> Size {
        self.src_size
    }

    /// Override the source size without touching the image.
    pub fn set_src_size(&mut self, size: Size) {
        self.src_size = size;
    }

    /// Fitting mode.
    pub fn crop_maintain_aspect(&self) -> CropMaintainAspect {
        self.crop
    }

    /// Change the fitting mode.
    pub fn set_crop_maintain_aspect(&mut self, crop: CropMaintainAspect) {
        self.crop = crop;
    }

    // Where the image lands in element space.
    fn placement(&self, image_size: Size, element_size: Size) -> Rect {
        if self.crop == CropMaintainAspect::False {
            return Rect::from_origin_size(Point::ZERO, element_size);
        }
        let scale = (element_size.width / image_size.width)
            .max(element_size.height / image_size.height);
        let (w, h) = (scale * image_size.width, scale * image_size.height);
        let x = (element_size.width - w) / 2.0;
        let mut y = (element_size.height - h) / 2.0;
        if self.crop == CropMaintainAspect::Photo && y < 0.0 {
            y = 0.0;
        }
        Rect::new(x, y, x + w, y + h)
    }
}

impl Element for ImgElement {
    fn default_size(&self) -> Size {
        self.src_size
    }

    fn draw(&mut self, element: &BasicElement, canvas: &mut dyn Canvas) {
        let Some(image) = &self.image else {
            return;
        };
        let image_size = image.size();
        if image_size.width <= 0.0 || image_size.height <= 0.0 {
            return;
        }
        canvas.draw_image(image.as_ref(), self.placement(image_size, element.pixel_size()));
    }

    fn is_point_in(&self, element: &BasicElement, point: Point) -> bool {
        if !element.bounds_contain(point) {
            return false;
        }
        let Some(image) = &self.image else {
            return false;
        };
        let image_size = image.size();
        if image_size.width <= 0.0 || image_size.height <= 0.0 {
            return true;
        }
        let dest = self.placement(image_size, element.pixel_size());
        let src = Point::new(
            (point.x - dest.x0) * image_size.width / dest.width(),
            (point.y - dest.y0) * image_size.height / dest.height(),
        );
        // Unreadable pixels count as opaque.
        image.alpha_at(src).is_none_or(|alpha| alpha > 0.0)
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<(), PropertyError> {
        match name {
            "cropMaintainAspect" => {
                self.crop =
                    CropMaintainAspect::parse(value).ok_or_else(|| PropertyError::invalid(name, value))?;
                Ok(())
            }
            _ => Err(PropertyError::Unknown(name.to_owned())),
        }
    }
}

/// An in-memory image holding only an alpha channel.
///
/// Useful as a hit-test shape and in tests.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskImage {
    width: usize,
    height: usize,
    alpha: Vec<f64>,
}

impl MaskImage {
    /// Build from a function of integer pixel coordinates.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut alpha = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                alpha.push(f(x, y).clamp(0.0, 1.0));
            }
        }
        Self {
            width,
            height,
            alpha,
        }
    }

    /// A uniformly filled image.
    pub fn filled(width: usize, height: usize, alpha: f64) -> Self {
        Self::from_fn(width, height, |_, _| alpha)
    }
}

#[allow(
    clippy::cast_precision_loss,
    reason = "Image dimensions are far below 2^52."
)]
fn dimension(v: usize) -> f64 {
    v as f64
}

impl Image for MaskImage {
    fn size(&self) -> Size {
        Size::new(dimension(self.width), dimension(self.height))
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Coordinates are floored and range-checked before the cast."
    )]
    fn alpha_at(&self, point: Point) -> Option<f64> {
        let (x, y) = (point.x.floor(), point.y.floor());
        if !(x >= 0.0 && y >= 0.0 && x < dimension(self.width) && y < dimension(self.height)) {
            return None;
        }
        self.alpha
            .get(y as usize * self.width + x as usize)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ElementId, Owner};

    fn sized(w: f64, h: f64) -> BasicElement {
        let mut e = BasicElement::new(ElementId::new(0, 1), "img", Owner::Root, "");
        e.resolve_geometry(Size::ZERO, Size::new(w, h));
        e
    }

    // Left half transparent, right half opaque.
    fn half_mask() -> Rc<dyn Image> {
        Rc::new(MaskImage::from_fn(10, 10, |x, _| if x < 5 { 0.0 } else { 1.0 }))
    }

    #[test]
    fn transparent_pixels_let_clicks_through() {
        let mut img = ImgElement::default();
        img.set_image(Some(half_mask()));
        assert_eq!(img.default_size(), Size::new(10.0, 10.0));
        // Stretched to twice the size.
        let e = sized(20.0, 20.0);
        assert!(!img.is_point_in(&e, Point::new(5.0, 5.0)));
        assert!(img.is_point_in(&e, Point::new(15.0, 5.0)));
        assert!(!img.is_point_in(&e, Point::new(25.0, 5.0)));
    }

    #[test]
    fn no_image_is_never_hit() {
        let img = ImgElement::default();
        assert!(!img.is_point_in(&sized(10.0, 10.0), Point::new(1.0, 1.0)));
    }

    #[derive(Debug)]
    struct NoAlpha;
    impl Image for NoAlpha {
        fn size(&self) -> Size {
            Size::new(4.0, 4.0)
        }
        fn alpha_at(&self, _: Point) -> Option<f64> {
            None
        }
    }

    #[test]
    fn unreadable_alpha_counts_as_opaque() {
        let mut img = ImgElement::default();
        img.set_image(Some(Rc::new(NoAlpha)));
        assert!(img.is_point_in(&sized(4.0, 4.0), Point::new(1.0, 1.0)));
    }

    #[test]
    fn crop_modes_place_image() {
        // A 10x10 image in a 20x40 element covers 40x40.
        let mut img = ImgElement::default();
        img.set_crop_maintain_aspect(CropMaintainAspect::True);
        let r = img.placement(Size::new(10.0, 10.0), Size::new(20.0, 40.0));
        assert_eq!(r, Rect::new(-10.0, 0.0, 30.0, 40.0));
        // A wide element crops vertically; photo mode keeps the top.
        let r = img.placement(Size::new(10.0, 10.0), Size::new(40.0, 20.0));
        assert_eq!(r, Rect::new(0.0, -10.0, 40.0, 30.0));
        img.set_property("cropMaintainAspect", "photo").unwrap();
        let r = img.placement(Size::new(10.0, 10.0), Size::new(40.0, 20.0));
        assert_eq!(r, Rect::new(0.0, 0.0, 40.0, 40.0));
        assert!(img.set_property("cropMaintainAspect", "sideways").is_err());
    }

    #[test]
    fn photo_crop_hit_test_uses_top_aligned_image() {
        // Top half of the image opaque.
        let mut img = ImgElement::default();
        img.set_image(Some(Rc::new(MaskImage::from_fn(10, 10, |_, y| {
            if y < 5 { 1.0 } else { 0.0 }
        }))));
        img.set_crop_maintain_aspect(CropMaintainAspect::Photo);
        // 40x20 element: image scaled to 40x40 from the top, so the element shows the opaque half.
        let e = sized(40.0, 20.0);
        assert!(img.is_point_in(&e, Point::new(20.0, 19.0)));
        img.set_crop_maintain_aspect(CropMaintainAspect::True);
        // Centered: rows 10..20 of the element map to image rows 5..10, transparent.
        assert!(!img.is_point_in(&e, Point::new(20.0, 15.0)));
        assert!(img.is_point_in(&e, Point::new(20.0, 5.0)));
    }
}
