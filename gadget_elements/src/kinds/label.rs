// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Rect, Size};

use crate::canvas::Canvas;
use crate::element::{BasicElement, Element, parse_number};
use crate::error::PropertyError;
use crate::types::Color;

const DEFAULT_FONT_SIZE: f64 = 12.0;
// Rough per-character metrics; there is no font engine behind labels.
const CHAR_WIDTH_EM: f64 = 0.6;
const LINE_HEIGHT_EM: f64 = 1.2;

/// A block of text.
#[derive(Clone, Debug)]
pub struct LabelElement {
    text: String,
    color: Color,
    size: f64,
}

impl Default for LabelElement {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: Color::BLACK,
            size: DEFAULT_FONT_SIZE,
        }
    }
}

impl LabelElement {
    /// The text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text.
    pub fn set_text(&mut self, text: &str) {
        text.clone_into(&mut self.text);
    }

    /// Text color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Font size in pixels.
    pub fn size(&self) -> f64 {
        self.size
    }
}

impl Element for LabelElement {
    fn default_size(&self) -> Size {
        if self.text.is_empty() {
            return Size::ZERO;
        }
        let (lines, longest) = self
            .text
            .lines()
            .fold((0_u32, 0_u32), |(n, longest), line| {
                let chars = u32::try_from(line.chars().count()).unwrap_or(u32::MAX);
                (n + 1, longest.max(chars))
            });
        Size::new(
            f64::from(longest) * self.size * CHAR_WIDTH_EM,
            f64::from(lines.max(1)) * self.size * LINE_HEIGHT_EM,
        )
    }

    fn draw(&mut self, element: &BasicElement, canvas: &mut dyn Canvas) {
        if self.text.is_empty() {
            return;
        }
        let size = element.pixel_size();
        canvas.draw_text(
            Rect::new(0.0, 0.0, size.width, size.height),
            &self.text,
            self.size,
            self.color,
        );
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<(), PropertyError> {
        match name {
            "innerText" => self.set_text(value),
            "color" => {
                self.color = Color::parse(value).ok_or_else(|| PropertyError::invalid(name, value))?;
            }
            "size" => {
                let size = parse_number(name, value)?;
                if size <= 0.0 {
                    return Err(PropertyError::invalid(name, value));
                }
                self.size = size;
            }
            _ => return Err(PropertyError::Unknown(name.to_owned())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_size_follows_text() {
        let mut l = LabelElement::default();
        assert_eq!(l.default_size(), Size::ZERO);
        l.set_property("innerText", "abcde\nab").unwrap();
        l.set_property("size", "10").unwrap();
        let s = l.default_size();
        assert!((s.width - 30.0).abs() < 1e-9);
        assert!((s.height - 24.0).abs() < 1e-9);
        assert!(l.set_property("size", "0").is_err());
        assert!(l.set_property("color", "red").is_err());
        assert_eq!(l.set_property("href", "x"), Err(PropertyError::Unknown("href".into())));
    }
}
