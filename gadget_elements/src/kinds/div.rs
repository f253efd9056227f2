// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Rect;

use crate::canvas::Canvas;
use crate::element::{BasicElement, Element};
use crate::error::PropertyError;
use crate::types::Color;

/// A plain container with an optional background color.
#[derive(Clone, Debug, Default)]
pub struct DivElement {
    background: Option<Color>,
}

impl DivElement {
    /// Background color.
    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// Set or clear the background color.
    pub fn set_background(&mut self, background: Option<Color>) {
        self.background = background;
    }
}

impl Element for DivElement {
    fn draw(&mut self, element: &BasicElement, canvas: &mut dyn Canvas) {
        if let Some(color) = self.background {
            let size = element.pixel_size();
            canvas.fill_rect(Rect::new(0.0, 0.0, size.width, size.height), color);
        }
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<(), PropertyError> {
        match name {
            "background" if value.trim().is_empty() => self.background = None,
            "background" => {
                self.background =
                    Some(Color::parse(value).ok_or_else(|| PropertyError::invalid(name, value))?);
            }
            _ => return Err(PropertyError::Unknown(name.to_owned())),
        }
        Ok(())
    }

    fn has_children(&self) -> bool {
        true
    }
}
